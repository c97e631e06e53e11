use chrono::{DateTime, Utc};
use sea_orm::{QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Account, AccountKind, EngineError, NewAccount, ResultEngine, Wallet, accounts,
    util::{normalize_optional_text, normalize_required_text},
    wallets,
};

use super::{Engine, with_tx};

impl Engine {
    /// Create an account.
    ///
    /// Institutes must declare their type and get an empty, inactive wallet
    /// in the same transaction.
    pub async fn create_account(
        &self,
        cmd: NewAccount,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Account> {
        let username = normalize_required_text(&cmd.username, "username")?;
        if cmd.password.is_empty() {
            return Err(EngineError::Validation(
                "password must not be empty".to_string(),
            ));
        }
        let display_name = normalize_required_text(&cmd.display_name, "display name")?;
        match (cmd.kind, cmd.institute_type) {
            (AccountKind::Institute, None) => {
                return Err(EngineError::Validation(
                    "institute type is required for institutes".to_string(),
                ));
            }
            (AccountKind::User | AccountKind::Admin, Some(_)) => {
                return Err(EngineError::Validation(
                    "only institutes have an institute type".to_string(),
                ));
            }
            _ => {}
        }

        with_tx!(self, |db_tx| {
            let exists = accounts::Entity::find()
                .filter(accounts::Column::Username.eq(username.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(username));
            }

            let account = Account {
                id: Uuid::new_v4(),
                username,
                kind: cmd.kind,
                display_name,
                location: normalize_optional_text(cmd.location.as_deref()),
                institute_type: cmd.institute_type,
                created_at,
            };
            let model: accounts::ActiveModel = (&account, cmd.password.as_str()).into();
            model.insert(&db_tx).await?;

            if account.kind == AccountKind::Institute {
                let wallet = Wallet::new(account.id, created_at);
                let model: wallets::ActiveModel = (&wallet).into();
                model.insert(&db_tx).await?;
            }

            tracing::info!(
                account_id = %account.id,
                kind = account.kind.as_str(),
                "account created"
            );
            Ok(account)
        })
    }

    /// Resolve Basic credentials to an account.
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<Account> {
        let invalid = || EngineError::Unauthorized("invalid credentials".to_string());
        if username.is_empty() || password.is_empty() {
            return Err(invalid());
        }
        let model = accounts::Entity::find()
            .filter(accounts::Column::Username.eq(username))
            .filter(accounts::Column::Password.eq(password))
            .one(&self.database)
            .await?
            .ok_or_else(invalid)?;
        Account::try_from(model)
    }

    /// Return an account by id.
    pub async fn account(&self, account_id: Uuid) -> ResultEngine<Account> {
        let model = accounts::Entity::find_by_id(account_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))?;
        Account::try_from(model)
    }
}
