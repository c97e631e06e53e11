//! Transactions API endpoints

use api_types::{
    admin::WithdrawRequestView,
    transaction::{
        PaymentNew, TransactionKind as ApiKind, TransactionStatus as ApiStatus, TransactionView,
        WithdrawNew,
    },
};
use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::Utc;
use engine::{Account, AccountKind, TransactionKind, TransactionStatus};
use uuid::Uuid;

use crate::{
    ServerError, admin,
    server::{ServerState, require_kind},
};

fn map_kind(kind: TransactionKind) -> ApiKind {
    match kind {
        TransactionKind::Payment => ApiKind::Payment,
        TransactionKind::Donation => ApiKind::Donation,
        TransactionKind::Withdraw => ApiKind::Withdraw,
        TransactionKind::Zakat => ApiKind::Zakat,
    }
}

fn kind_from_api(kind: ApiKind) -> TransactionKind {
    match kind {
        ApiKind::Payment => TransactionKind::Payment,
        ApiKind::Donation => TransactionKind::Donation,
        ApiKind::Withdraw => TransactionKind::Withdraw,
        ApiKind::Zakat => TransactionKind::Zakat,
    }
}

pub(crate) fn map_status(status: TransactionStatus) -> ApiStatus {
    match status {
        TransactionStatus::Pending => ApiStatus::Pending,
        TransactionStatus::Accepted => ApiStatus::Accepted,
        TransactionStatus::Cancelled => ApiStatus::Cancelled,
    }
}

pub(crate) fn status_from_api(status: ApiStatus) -> TransactionStatus {
    match status {
        ApiStatus::Pending => TransactionStatus::Pending,
        ApiStatus::Accepted => TransactionStatus::Accepted,
        ApiStatus::Cancelled => TransactionStatus::Cancelled,
    }
}

pub(crate) fn transaction_view(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        kind: map_kind(tx.kind),
        status: map_status(tx.status),
        from_account_id: tx.from_account_id,
        institute_id: tx.institute_id,
        amount_minor: tx.amount_minor,
        fee_minor: tx.fee_minor,
        external_id: tx.external_id,
        donation_request_id: tx.donation_request_id,
        occurred_at: tx.occurred_at,
    }
}

pub async fn pay(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path(institute_id): Path<Uuid>,
    payload: Result<Json<PaymentNew>, JsonRejection>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let Json(payload) = payload?;
    require_kind(&account, AccountKind::User)?;

    let cmd = engine::PaymentCmd {
        user_id: account.id,
        institute_id,
        kind: kind_from_api(payload.kind),
        amount_minor: payload.amount_minor,
        fee_minor: payload.fee_minor,
        external_id: payload.external_id,
        donation_request_id: payload.donation_request_id,
        occurred_at: Utc::now(),
    };
    let tx = state.engine.record_payment(cmd).await?;

    Ok((StatusCode::CREATED, Json(transaction_view(tx))))
}

pub async fn list(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    require_kind(&account, AccountKind::User)?;

    let txs = state.engine.user_transactions(account.id).await?;
    Ok(Json(txs.into_iter().map(transaction_view).collect()))
}

pub async fn withdraw(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    payload: Result<Json<WithdrawNew>, JsonRejection>,
) -> Result<(StatusCode, Json<WithdrawRequestView>), ServerError> {
    let Json(payload) = payload?;
    require_kind(&account, AccountKind::Institute)?;

    let request = state
        .engine
        .request_withdraw(account.id, payload.amount_minor, Utc::now())
        .await?;

    Ok((StatusCode::CREATED, Json(admin::withdraw_view(request))))
}
