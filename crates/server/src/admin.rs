//! Admin approval queue endpoints.

use api_types::admin::{
    ActivationDecision as ApiActivationDecision, ActivationListQuery, ActivationRequestView,
    ActivationReview, WithdrawDecision as ApiWithdrawDecision, WithdrawListQuery,
    WithdrawRequestView, WithdrawReview,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::JsonRejection},
};
use chrono::Utc;
use engine::{Account, AccountKind, ActivationDecision, WithdrawDecision};
use uuid::Uuid;

use crate::{
    ServerError,
    server::{ServerState, require_kind},
    transactions, wallets,
};

pub(crate) fn withdraw_view(request: engine::WithdrawRequest) -> WithdrawRequestView {
    WithdrawRequestView {
        id: request.id,
        institute_id: request.institute_id,
        transaction_id: request.transaction_id,
        amount_minor: request.amount_minor,
        status: transactions::map_status(request.status),
        reviewed_by: request.reviewed_by,
        created_at: request.created_at,
        updated_at: request.updated_at,
    }
}

pub(crate) fn activation_view(request: engine::ActivationRequest) -> ActivationRequestView {
    ActivationRequestView {
        id: request.id,
        institute_id: request.institute_id,
        status: wallets::map_activation_status(request.status),
        reviewed_by: request.reviewed_by,
        created_at: request.created_at,
        updated_at: request.updated_at,
    }
}

pub async fn list_withdraw_requests(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Query(query): Query<WithdrawListQuery>,
) -> Result<Json<Vec<WithdrawRequestView>>, ServerError> {
    require_kind(&account, AccountKind::Admin)?;

    let requests = state
        .engine
        .withdraw_requests(query.status.map(transactions::status_from_api))
        .await?;
    Ok(Json(requests.into_iter().map(withdraw_view).collect()))
}

pub async fn review_withdraw_request(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<WithdrawReview>, JsonRejection>,
) -> Result<Json<WithdrawRequestView>, ServerError> {
    let Json(payload) = payload?;
    require_kind(&account, AccountKind::Admin)?;

    let decision = match payload.decision {
        ApiWithdrawDecision::Accept => WithdrawDecision::Accept,
        ApiWithdrawDecision::Cancel => WithdrawDecision::Cancel,
    };
    let request = state
        .engine
        .review_withdraw_request(account.id, id, decision, Utc::now())
        .await?;

    Ok(Json(withdraw_view(request)))
}

pub async fn list_activation_requests(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Query(query): Query<ActivationListQuery>,
) -> Result<Json<Vec<ActivationRequestView>>, ServerError> {
    require_kind(&account, AccountKind::Admin)?;

    let requests = state
        .engine
        .wallet_activation_requests(query.status.map(wallets::activation_status_from_api))
        .await?;
    Ok(Json(requests.into_iter().map(activation_view).collect()))
}

pub async fn review_activation_request(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<ActivationReview>, JsonRejection>,
) -> Result<Json<ActivationRequestView>, ServerError> {
    let Json(payload) = payload?;
    require_kind(&account, AccountKind::Admin)?;

    let decision = match payload.decision {
        ApiActivationDecision::Accept => ActivationDecision::Accept,
        ApiActivationDecision::Reject => ActivationDecision::Reject,
    };
    let request = state
        .engine
        .review_wallet_activation(account.id, id, decision, Utc::now())
        .await?;

    Ok(Json(activation_view(request)))
}
