//! Wallets API endpoints.

use api_types::{
    admin::ActivationRequestView,
    wallet::{ActivationStatus as ApiActivationStatus, BankDetails, WalletActivationNew, WalletView},
};
use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::Utc;
use engine::{Account, AccountKind, ActivationStatus};
use uuid::Uuid;

use crate::{
    ServerError, admin,
    server::{ServerState, require_kind},
    transactions::transaction_view,
};

pub(crate) fn map_activation_status(status: ActivationStatus) -> ApiActivationStatus {
    match status {
        ActivationStatus::NotSubmitted => ApiActivationStatus::NotSubmitted,
        ActivationStatus::Pending => ApiActivationStatus::Pending,
        ActivationStatus::Accepted => ApiActivationStatus::Accepted,
        ActivationStatus::Rejected => ApiActivationStatus::Rejected,
    }
}

pub(crate) fn activation_status_from_api(status: ApiActivationStatus) -> ActivationStatus {
    match status {
        ApiActivationStatus::NotSubmitted => ActivationStatus::NotSubmitted,
        ApiActivationStatus::Pending => ActivationStatus::Pending,
        ApiActivationStatus::Accepted => ActivationStatus::Accepted,
        ApiActivationStatus::Rejected => ActivationStatus::Rejected,
    }
}

pub async fn get(
    State(state): State<ServerState>,
    Path(institute_id): Path<Uuid>,
) -> Result<Json<WalletView>, ServerError> {
    let engine::WalletView {
        wallet,
        transactions,
    } = state.engine.wallet(institute_id).await?;

    Ok(Json(WalletView {
        institute_id: wallet.institute_id,
        balance_minor: wallet.balance,
        total_received_minor: wallet.total_received,
        total_withdrawn_minor: wallet.total_withdrawn,
        is_active: wallet.is_active,
        activation_status: map_activation_status(wallet.activation_status),
        bank_details: wallet.bank_details.map(|details| BankDetails {
            bank_name: details.bank_name,
            account_holder_name: details.account_holder_name,
            account_number: details.account_number,
            ifsc_code: details.ifsc_code,
            finance_mobile: details.finance_mobile,
        }),
        transactions: transactions.into_iter().map(transaction_view).collect(),
    }))
}

pub async fn request_activation(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    payload: Result<Json<WalletActivationNew>, JsonRejection>,
) -> Result<(StatusCode, Json<ActivationRequestView>), ServerError> {
    let Json(payload) = payload?;
    require_kind(&account, AccountKind::Institute)?;

    let input = engine::BankDetailsInput {
        bank_name: payload.bank_name,
        account_holder_name: payload.account_holder_name,
        account_number: payload.account_number,
        confirm_account_number: payload.confirm_account_number,
        ifsc_code: payload.ifsc_code,
        finance_mobile: payload.finance_mobile,
    };
    let request = state
        .engine
        .request_wallet_activation(account.id, input, Utc::now())
        .await?;

    Ok((StatusCode::CREATED, Json(admin::activation_view(request))))
}
