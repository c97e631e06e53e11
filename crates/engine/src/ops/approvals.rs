//! Admin approval queue.
//!
//! Withdrawals and wallet activations are queued as rows of their own and
//! reviewed by id, so two admins never contend on a shared record.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    AccountKind, ActivationDecision, ActivationRequest, ActivationStatus, BankDetails,
    BankDetailsInput, EngineError, ResultEngine, TransactionStatus, WithdrawDecision,
    WithdrawRequest, activation_requests, ledger,
    util::normalize_required_text,
    withdraw_requests,
};

use super::{Engine, with_tx};

impl Engine {
    /// Withdraw requests, oldest first.
    pub async fn withdraw_requests(
        &self,
        status: Option<TransactionStatus>,
    ) -> ResultEngine<Vec<WithdrawRequest>> {
        let mut query = withdraw_requests::Entity::find();
        if let Some(status) = status {
            query = query.filter(withdraw_requests::Column::Status.eq(status.as_str()));
        }
        let rows = query
            .order_by_asc(withdraw_requests::Column::CreatedAt)
            .order_by_asc(withdraw_requests::Column::Id)
            .all(&self.database)
            .await?;
        rows.into_iter().map(WithdrawRequest::try_from).collect()
    }

    /// Settle a pending withdraw request.
    ///
    /// Accepting debits the wallet and fails with `InsufficientFunds` if the
    /// balance no longer covers the amount. Both outcomes settle the linked
    /// ledger row.
    pub async fn review_withdraw_request(
        &self,
        admin_id: Uuid,
        request_id: Uuid,
        decision: WithdrawDecision,
        now: DateTime<Utc>,
    ) -> ResultEngine<WithdrawRequest> {
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, admin_id, AccountKind::Admin)
                .await?;
            let model = withdraw_requests::Entity::find_by_id(request_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("withdraw request not exists".to_string()))?;
            let mut request = WithdrawRequest::try_from(model)?;
            if request.status != TransactionStatus::Pending {
                return Err(EngineError::InvalidTransition(format!(
                    "withdraw request already {}",
                    request.status.as_str()
                )));
            }

            if decision == WithdrawDecision::Accept {
                let mut wallet = self.require_wallet(&db_tx, request.institute_id).await?;
                if wallet.balance < request.amount_minor {
                    return Err(EngineError::InsufficientFunds(format!(
                        "wallet balance {} is lower than {}",
                        wallet.balance, request.amount_minor
                    )));
                }
                wallet.balance -= request.amount_minor;
                wallet.total_withdrawn = wallet
                    .total_withdrawn
                    .checked_add(request.amount_minor)
                    .ok_or_else(|| {
                        EngineError::InvalidAmount("wallet amount too large".to_string())
                    })?;
                wallet.updated_at = now;
                self.update_wallet(&db_tx, &wallet).await?;
            }

            request.status = decision.status();
            request.reviewed_by = Some(admin_id);
            request.updated_at = now;
            let model: withdraw_requests::ActiveModel = (&request).into();
            model.update(&db_tx).await?;

            ledger::ActiveModel {
                id: ActiveValue::Unchanged(request.transaction_id.to_string()),
                status: ActiveValue::Set(request.status.as_str().to_string()),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            tracing::info!(
                withdraw_request_id = %request.id,
                admin_id = %admin_id,
                status = request.status.as_str(),
                "withdraw request reviewed"
            );
            Ok(request)
        })
    }

    /// Submit bank details and queue the wallet for activation.
    pub async fn request_wallet_activation(
        &self,
        institute_id: Uuid,
        input: BankDetailsInput,
        now: DateTime<Utc>,
    ) -> ResultEngine<ActivationRequest> {
        let details = validate_bank_details(&input)?;

        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, institute_id, AccountKind::Institute)
                .await?;
            let mut wallet = self.require_wallet(&db_tx, institute_id).await?;
            match wallet.activation_status {
                ActivationStatus::Pending => {
                    return Err(EngineError::ExistingKey(
                        "wallet activation request already pending".to_string(),
                    ));
                }
                ActivationStatus::Accepted => {
                    return Err(EngineError::ExistingKey(
                        "wallet already activated".to_string(),
                    ));
                }
                ActivationStatus::NotSubmitted | ActivationStatus::Rejected => {}
            }

            wallet.bank_details = Some(details);
            wallet.activation_status = ActivationStatus::Pending;
            wallet.updated_at = now;
            self.update_wallet(&db_tx, &wallet).await?;

            let request = ActivationRequest {
                id: Uuid::new_v4(),
                institute_id,
                status: ActivationStatus::Pending,
                reviewed_by: None,
                created_at: now,
                updated_at: now,
            };
            let model: activation_requests::ActiveModel = (&request).into();
            model.insert(&db_tx).await?;

            tracing::info!(
                activation_request_id = %request.id,
                institute_id = %institute_id,
                "wallet activation requested"
            );
            Ok(request)
        })
    }

    /// Wallet activation requests, oldest first.
    pub async fn wallet_activation_requests(
        &self,
        status: Option<ActivationStatus>,
    ) -> ResultEngine<Vec<ActivationRequest>> {
        let mut query = activation_requests::Entity::find();
        if let Some(status) = status {
            query = query.filter(activation_requests::Column::Status.eq(status.as_str()));
        }
        let rows = query
            .order_by_asc(activation_requests::Column::CreatedAt)
            .order_by_asc(activation_requests::Column::Id)
            .all(&self.database)
            .await?;
        rows.into_iter().map(ActivationRequest::try_from).collect()
    }

    /// Accept or reject a pending wallet activation.
    pub async fn review_wallet_activation(
        &self,
        admin_id: Uuid,
        request_id: Uuid,
        decision: ActivationDecision,
        now: DateTime<Utc>,
    ) -> ResultEngine<ActivationRequest> {
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, admin_id, AccountKind::Admin)
                .await?;
            let model = activation_requests::Entity::find_by_id(request_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| {
                    EngineError::KeyNotFound("activation request not exists".to_string())
                })?;
            let mut request = ActivationRequest::try_from(model)?;
            if request.status != ActivationStatus::Pending {
                return Err(EngineError::InvalidTransition(format!(
                    "activation request already {}",
                    request.status.as_str()
                )));
            }

            request.status = decision.status();
            request.reviewed_by = Some(admin_id);
            request.updated_at = now;
            let model: activation_requests::ActiveModel = (&request).into();
            model.update(&db_tx).await?;

            let mut wallet = self.require_wallet(&db_tx, request.institute_id).await?;
            wallet.activation_status = request.status;
            wallet.is_active = decision == ActivationDecision::Accept;
            wallet.updated_at = now;
            self.update_wallet(&db_tx, &wallet).await?;

            tracing::info!(
                activation_request_id = %request.id,
                admin_id = %admin_id,
                status = request.status.as_str(),
                "wallet activation reviewed"
            );
            Ok(request)
        })
    }
}

fn validate_bank_details(input: &BankDetailsInput) -> ResultEngine<BankDetails> {
    let details = BankDetails {
        bank_name: normalize_required_text(&input.bank_name, "bank name")?,
        account_holder_name: normalize_required_text(
            &input.account_holder_name,
            "account holder name",
        )?,
        account_number: normalize_required_text(&input.account_number, "account number")?,
        ifsc_code: normalize_required_text(&input.ifsc_code, "ifsc code")?,
        finance_mobile: normalize_required_text(&input.finance_mobile, "finance mobile")?,
    };
    if input.confirm_account_number.trim() != details.account_number {
        return Err(EngineError::Validation(
            "account numbers do not match".to_string(),
        ));
    }
    Ok(details)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> BankDetailsInput {
        BankDetailsInput {
            bank_name: "State Bank".to_string(),
            account_holder_name: "Masjid Trust".to_string(),
            account_number: "001122".to_string(),
            confirm_account_number: "001122".to_string(),
            ifsc_code: "SBIN0001".to_string(),
            finance_mobile: "9000000000".to_string(),
        }
    }

    #[test]
    fn bank_details_are_trimmed() {
        let mut input = input();
        input.bank_name = "  State Bank ".to_string();
        assert_eq!(validate_bank_details(&input).unwrap().bank_name, "State Bank");
    }

    #[test]
    fn account_numbers_must_match() {
        let mut input = input();
        input.confirm_account_number = "001123".to_string();
        assert_eq!(
            validate_bank_details(&input),
            Err(EngineError::Validation(
                "account numbers do not match".to_string()
            ))
        );
    }

    #[test]
    fn every_field_is_required() {
        let mut input = input();
        input.ifsc_code = " ".to_string();
        assert!(matches!(
            validate_bank_details(&input),
            Err(EngineError::Validation(_))
        ));
    }
}
