//! Follow API endpoints.

use api_types::account::{
    AccountKind as ApiAccountKind, AccountView, InstituteType as ApiInstituteType,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{Account, AccountKind, InstituteType};
use uuid::Uuid;

use crate::{
    ServerError,
    server::{ServerState, require_kind},
};

fn map_account_kind(kind: AccountKind) -> ApiAccountKind {
    match kind {
        AccountKind::User => ApiAccountKind::User,
        AccountKind::Institute => ApiAccountKind::Institute,
        AccountKind::Admin => ApiAccountKind::Admin,
    }
}

fn map_institute_type(institute_type: InstituteType) -> ApiInstituteType {
    match institute_type {
        InstituteType::Masjid => ApiInstituteType::Masjid,
        InstituteType::Madrasa => ApiInstituteType::Madrasa,
        InstituteType::Khanqah => ApiInstituteType::Khanqah,
        InstituteType::Kabristan => ApiInstituteType::Kabristan,
    }
}

fn account_view(account: Account) -> AccountView {
    AccountView {
        id: account.id,
        username: account.username,
        kind: map_account_kind(account.kind),
        display_name: account.display_name,
        location: account.location,
        institute_type: account.institute_type.map(map_institute_type),
    }
}

pub async fn follow(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path(institute_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    require_kind(&account, AccountKind::User)?;
    state
        .engine
        .follow(account.id, institute_id, Utc::now())
        .await?;
    Ok(StatusCode::CREATED)
}

pub async fn unfollow(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path(institute_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    require_kind(&account, AccountKind::User)?;
    state.engine.unfollow(account.id, institute_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn following(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<AccountView>>, ServerError> {
    require_kind(&account, AccountKind::User)?;
    let institutes = state.engine.following(account.id).await?;
    Ok(Json(institutes.into_iter().map(account_view).collect()))
}

pub async fn followers(
    State(state): State<ServerState>,
    Path(institute_id): Path<Uuid>,
) -> Result<Json<Vec<AccountView>>, ServerError> {
    let users = state.engine.followers(institute_id).await?;
    Ok(Json(users.into_iter().map(account_view).collect()))
}

pub async fn remove_follower(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    require_kind(&account, AccountKind::Institute)?;
    state.engine.remove_follower(account.id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
