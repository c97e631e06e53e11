use chrono::{DateTime, Utc};
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    AccountKind, EngineError, PaymentCmd, ResultEngine, Transaction, TransactionKind,
    TransactionStatus, Wallet, WithdrawRequest, ledger,
    util::{normalize_optional_text, require_positive_amount},
    withdraw_requests,
};

use super::{Engine, with_tx};

/// A wallet with its ledger, newest first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WalletView {
    pub wallet: Wallet,
    pub transactions: Vec<Transaction>,
}

impl Engine {
    /// Record money sent by a user to an institute.
    ///
    /// The ledger row, the wallet credit and, for donations, the credit on
    /// the target donation request are written in one transaction.
    pub async fn record_payment(&self, cmd: PaymentCmd) -> ResultEngine<Transaction> {
        require_positive_amount(cmd.amount_minor, "amount")?;
        if !matches!(cmd.kind, TransactionKind::Payment | TransactionKind::Donation) {
            return Err(EngineError::Validation(format!(
                "cannot record a {} transaction as a payment",
                cmd.kind.as_str()
            )));
        }
        if cmd.fee_minor.is_some_and(|fee| fee < 0) {
            return Err(EngineError::InvalidAmount("fee must be >= 0".to_string()));
        }
        let donation_request_id = match cmd.kind {
            TransactionKind::Donation => Some(cmd.donation_request_id.ok_or_else(|| {
                EngineError::Validation("donation requires a donation request".to_string())
            })?),
            _ => None,
        };

        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, cmd.user_id, AccountKind::User)
                .await?;
            self.require_account(&db_tx, cmd.institute_id, AccountKind::Institute)
                .await?;
            let mut wallet = self.require_wallet(&db_tx, cmd.institute_id).await?;

            if let Some(request_id) = donation_request_id {
                let request = self.load_request(&db_tx, request_id).await?;
                if request.institute_id != cmd.institute_id {
                    return Err(EngineError::Validation(
                        "donation request belongs to another institute".to_string(),
                    ));
                }
            }

            let tx = Transaction {
                id: Uuid::new_v4(),
                kind: cmd.kind,
                status: TransactionStatus::Accepted,
                from_account_id: Some(cmd.user_id),
                institute_id: cmd.institute_id,
                amount_minor: cmd.amount_minor,
                fee_minor: cmd.fee_minor,
                external_id: normalize_optional_text(cmd.external_id.as_deref()),
                donation_request_id,
                occurred_at: cmd.occurred_at,
            };
            let model: ledger::ActiveModel = (&tx).into();
            model.insert(&db_tx).await?;

            wallet.balance = checked_credit(wallet.balance, tx.amount_minor)?;
            wallet.total_received = checked_credit(wallet.total_received, tx.amount_minor)?;
            wallet.updated_at = cmd.occurred_at;
            self.update_wallet(&db_tx, &wallet).await?;

            if let Some(request_id) = donation_request_id {
                self.credit_request(&db_tx, request_id, tx.amount_minor)
                    .await?;
            }

            tracing::info!(
                transaction_id = %tx.id,
                kind = tx.kind.as_str(),
                institute_id = %tx.institute_id,
                amount = tx.amount_minor,
                "payment recorded"
            );
            Ok(tx)
        })
    }

    /// Ledger rows sent by a user, newest first.
    pub async fn user_transactions(&self, user_id: Uuid) -> ResultEngine<Vec<Transaction>> {
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, user_id, AccountKind::User)
                .await?;
            let rows = ledger::Entity::find()
                .filter(ledger::Column::FromAccountId.eq(user_id.to_string()))
                .order_by_desc(ledger::Column::OccurredAt)
                .order_by_desc(ledger::Column::Id)
                .all(&db_tx)
                .await?;
            rows.into_iter()
                .map(Transaction::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// An institute wallet with its ledger.
    pub async fn wallet(&self, institute_id: Uuid) -> ResultEngine<WalletView> {
        with_tx!(self, |db_tx| {
            let wallet = self.require_wallet(&db_tx, institute_id).await?;
            let rows = ledger::Entity::find()
                .filter(ledger::Column::InstituteId.eq(institute_id.to_string()))
                .order_by_desc(ledger::Column::OccurredAt)
                .order_by_desc(ledger::Column::Id)
                .all(&db_tx)
                .await?;
            let transactions = rows
                .into_iter()
                .map(Transaction::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;
            Ok(WalletView {
                wallet,
                transactions,
            })
        })
    }

    /// Ask an admin to pay out `amount` from an institute wallet.
    ///
    /// Creates a pending `withdraw` ledger row and a queued request linked
    /// to it. The wallet is only debited when an admin accepts.
    pub async fn request_withdraw(
        &self,
        institute_id: Uuid,
        amount_minor: i64,
        now: DateTime<Utc>,
    ) -> ResultEngine<WithdrawRequest> {
        require_positive_amount(amount_minor, "amount")?;

        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, institute_id, AccountKind::Institute)
                .await?;
            let wallet = self.require_wallet(&db_tx, institute_id).await?;
            if wallet.balance < amount_minor {
                return Err(EngineError::InsufficientFunds(format!(
                    "wallet balance {} is lower than {amount_minor}",
                    wallet.balance
                )));
            }

            let tx = Transaction {
                id: Uuid::new_v4(),
                kind: TransactionKind::Withdraw,
                status: TransactionStatus::Pending,
                from_account_id: None,
                institute_id,
                amount_minor,
                fee_minor: None,
                external_id: None,
                donation_request_id: None,
                occurred_at: now,
            };
            let model: ledger::ActiveModel = (&tx).into();
            model.insert(&db_tx).await?;

            let request = WithdrawRequest {
                id: Uuid::new_v4(),
                institute_id,
                transaction_id: tx.id,
                amount_minor,
                status: TransactionStatus::Pending,
                reviewed_by: None,
                created_at: now,
                updated_at: now,
            };
            let model: withdraw_requests::ActiveModel = (&request).into();
            model.insert(&db_tx).await?;

            tracing::info!(
                withdraw_request_id = %request.id,
                institute_id = %institute_id,
                amount = amount_minor,
                "withdraw requested"
            );
            Ok(request)
        })
    }
}

fn checked_credit(current: i64, amount: i64) -> ResultEngine<i64> {
    current
        .checked_add(amount)
        .ok_or_else(|| EngineError::InvalidAmount("wallet amount too large".to_string()))
}
