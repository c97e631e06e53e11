use sea_orm::{DatabaseTransaction, prelude::*};
use uuid::Uuid;

use crate::{Account, AccountKind, EngineError, ResultEngine, Wallet, accounts, wallets};

use super::Engine;

impl Engine {
    /// Load an account and check it has the expected kind.
    ///
    /// A wrong kind is reported as a missing key so ids of other kinds are
    /// not revealed.
    pub(super) async fn require_account(
        &self,
        db: &DatabaseTransaction,
        account_id: Uuid,
        kind: AccountKind,
    ) -> ResultEngine<Account> {
        let missing = || EngineError::KeyNotFound(format!("{} not exists", kind.as_str()));
        let model = accounts::Entity::find_by_id(account_id.to_string())
            .one(db)
            .await?
            .ok_or_else(missing)?;
        if model.account_kind()? != kind {
            return Err(missing());
        }
        Account::try_from(model)
    }

    pub(super) async fn require_wallet(
        &self,
        db: &DatabaseTransaction,
        institute_id: Uuid,
    ) -> ResultEngine<Wallet> {
        let model = wallets::Entity::find_by_id(institute_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("wallet not exists".to_string()))?;
        Wallet::try_from(model)
    }

    pub(super) async fn update_wallet(
        &self,
        db: &DatabaseTransaction,
        wallet: &Wallet,
    ) -> ResultEngine<()> {
        let model: wallets::ActiveModel = wallet.into();
        model.update(db).await?;
        Ok(())
    }
}
