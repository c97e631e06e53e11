//! Donation requests API endpoints.

use api_types::donation::{
    DonationItemView, DonationListQuery, DonationRequestEdit, DonationRequestNew,
    DonationRequestView, ItemNew, ItemStatus as ApiItemStatus, ItemStatusChange, ItemsReplace,
    RequestStatus as ApiRequestStatus, UpdatedBy as ApiUpdatedBy,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::Utc;
use engine::{Account, AccountKind, Actor, ItemStatus, RequestStatus, UpdatedBy};
use uuid::Uuid;

use crate::{
    ServerError,
    server::{ServerState, require_kind},
};

fn map_item_status(status: ItemStatus) -> ApiItemStatus {
    match status {
        ItemStatus::Pending => ApiItemStatus::Pending,
        ItemStatus::Taken => ApiItemStatus::Taken,
        ItemStatus::Awaited => ApiItemStatus::Awaited,
        ItemStatus::Fulfilled => ApiItemStatus::Fulfilled,
        ItemStatus::Collected => ApiItemStatus::Collected,
    }
}

fn item_status_from_api(status: ApiItemStatus) -> ItemStatus {
    match status {
        ApiItemStatus::Pending => ItemStatus::Pending,
        ApiItemStatus::Taken => ItemStatus::Taken,
        ApiItemStatus::Awaited => ItemStatus::Awaited,
        ApiItemStatus::Fulfilled => ItemStatus::Fulfilled,
        ApiItemStatus::Collected => ItemStatus::Collected,
    }
}

fn map_request_status(status: RequestStatus) -> ApiRequestStatus {
    match status {
        RequestStatus::Open => ApiRequestStatus::Open,
        RequestStatus::Closed => ApiRequestStatus::Closed,
    }
}

fn request_status_from_api(status: ApiRequestStatus) -> RequestStatus {
    match status {
        ApiRequestStatus::Open => RequestStatus::Open,
        ApiRequestStatus::Closed => RequestStatus::Closed,
    }
}

fn map_updated_by(updated_by: UpdatedBy) -> ApiUpdatedBy {
    match updated_by {
        UpdatedBy::User => ApiUpdatedBy::User,
        UpdatedBy::Institute => ApiUpdatedBy::Institute,
    }
}

fn item_input(item: ItemNew) -> engine::ItemInput {
    engine::ItemInput {
        id: item.id,
        title: item.title,
        description: item.description,
        quantity: item.quantity,
        price: item.price,
    }
}

fn item_view(item: engine::DonationItem) -> DonationItemView {
    DonationItemView {
        id: item.id,
        title: item.title,
        description: item.description,
        quantity: item.quantity,
        price: item.price,
        total: item.total,
        status: map_item_status(item.status),
        updated_by: map_updated_by(item.updated_by),
        taken_by: item.taken_by,
        taken_at: item.taken_at,
    }
}

fn request_view(request: engine::DonationRequest) -> DonationRequestView {
    DonationRequestView {
        id: request.id,
        institute_id: request.institute_id,
        title: request.title,
        description: request.description,
        items: request.items.into_iter().map(item_view).collect(),
        total_price: request.total_price,
        amount_received: request.amount_received,
        status: map_request_status(request.status),
        version: request.version,
        created_at: request.created_at,
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<DonationListQuery>,
) -> Result<Json<Vec<DonationRequestView>>, ServerError> {
    let requests = state
        .engine
        .donation_requests(engine::DonationRequestFilter {
            status: query.status.map(request_status_from_api),
            institute_id: query.institute_id,
        })
        .await?;

    Ok(Json(requests.into_iter().map(request_view).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DonationRequestView>, ServerError> {
    let request = state.engine.donation_request(id).await?;
    Ok(Json(request_view(request)))
}

pub async fn create(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    payload: Result<Json<DonationRequestNew>, JsonRejection>,
) -> Result<(StatusCode, Json<DonationRequestView>), ServerError> {
    let Json(payload) = payload?;
    require_kind(&account, AccountKind::Institute)?;

    let cmd = engine::NewDonationRequest::new(
        account.id,
        payload.title,
        payload.description,
        Utc::now(),
    )
    .items(payload.items.into_iter().map(item_input).collect());
    let request = state.engine.create_donation_request(cmd).await?;

    Ok((StatusCode::CREATED, Json(request_view(request))))
}

pub async fn edit(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<DonationRequestEdit>, JsonRejection>,
) -> Result<Json<DonationRequestView>, ServerError> {
    let Json(payload) = payload?;
    require_kind(&account, AccountKind::Institute)?;

    let patch = engine::DonationRequestPatch {
        title: payload.title,
        description: payload.description,
        status: payload.status.map(request_status_from_api),
        items: payload
            .items
            .map(|items| items.into_iter().map(item_input).collect()),
    };
    let request = state
        .engine
        .edit_donation_request(id, account.id, patch)
        .await?;

    Ok(Json(request_view(request)))
}

pub async fn replace_items(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<ItemsReplace>, JsonRejection>,
) -> Result<Json<DonationRequestView>, ServerError> {
    let Json(payload) = payload?;
    require_kind(&account, AccountKind::Institute)?;

    let items = payload.items.into_iter().map(item_input).collect();
    let request = state.engine.edit_items(id, account.id, items).await?;

    Ok(Json(request_view(request)))
}

pub async fn change_item_status(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
    payload: Result<Json<ItemStatusChange>, JsonRejection>,
) -> Result<Json<DonationItemView>, ServerError> {
    let Json(payload) = payload?;
    let actor = Actor::try_from(&account)?;
    let item = state
        .engine
        .transition_item_status(
            id,
            item_id,
            actor,
            item_status_from_api(payload.status),
            Utc::now(),
        )
        .await?;

    Ok(Json(item_view(item)))
}
