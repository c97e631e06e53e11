//! Posts API endpoints.

use api_types::post::{
    Author, AuthorRole, CommentNew, CommentView, LikeView, PostEdit, PostKind as ApiPostKind,
    PostListQuery, PostNew, PostStatus as ApiPostStatus, PostStatusChange, PostView, ReplyView,
    ShareNew, SharePlatform as ApiSharePlatform, ShareView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::Utc;
use engine::{
    Account, AccountKind, Actor, Comment, EngineError, Post, PostKind, PostStatus, Reply,
    SharePlatform,
};
use uuid::Uuid;

use crate::{
    ServerError,
    server::{ServerState, require_kind},
};

fn map_kind(kind: PostKind) -> ApiPostKind {
    match kind {
        PostKind::Quran => ApiPostKind::Quran,
        PostKind::Hadith => ApiPostKind::Hadith,
        PostKind::Notice => ApiPostKind::Notice,
    }
}

fn kind_from_api(kind: ApiPostKind) -> PostKind {
    match kind {
        ApiPostKind::Quran => PostKind::Quran,
        ApiPostKind::Hadith => PostKind::Hadith,
        ApiPostKind::Notice => PostKind::Notice,
    }
}

fn map_status(status: PostStatus) -> ApiPostStatus {
    match status {
        PostStatus::Active => ApiPostStatus::Active,
        PostStatus::Inactive => ApiPostStatus::Inactive,
    }
}

fn status_from_api(status: ApiPostStatus) -> PostStatus {
    match status {
        ApiPostStatus::Active => PostStatus::Active,
        ApiPostStatus::Inactive => PostStatus::Inactive,
    }
}

fn platform_from_api(platform: ApiSharePlatform) -> SharePlatform {
    match platform {
        ApiSharePlatform::Facebook => SharePlatform::Facebook,
        ApiSharePlatform::Twitter => SharePlatform::Twitter,
        ApiSharePlatform::Whatsapp => SharePlatform::Whatsapp,
        ApiSharePlatform::Instagram => SharePlatform::Instagram,
        ApiSharePlatform::CopyLink => SharePlatform::CopyLink,
    }
}

fn author(actor: Actor) -> Author {
    match actor {
        Actor::User(id) => Author {
            role: AuthorRole::User,
            id,
        },
        Actor::Institute(id) => Author {
            role: AuthorRole::Institute,
            id,
        },
    }
}

/// Users and institutes may write on posts; admins only moderate.
fn author_of(account: &Account) -> Result<Actor, ServerError> {
    match account.kind {
        AccountKind::User => Ok(Actor::User(account.id)),
        AccountKind::Institute => Ok(Actor::Institute(account.id)),
        AccountKind::Admin => Err(ServerError::Engine(EngineError::Forbidden(
            "admins cannot comment on posts".to_string(),
        ))),
    }
}

fn reply_view(reply: Reply) -> ReplyView {
    ReplyView {
        id: reply.id,
        author: author(reply.author),
        text: reply.text,
        created_at: reply.created_at,
    }
}

fn comment_view(comment: Comment) -> CommentView {
    CommentView {
        id: comment.id,
        author: author(comment.author),
        text: comment.text,
        created_at: comment.created_at,
        replies: comment.replies.into_iter().map(reply_view).collect(),
    }
}

fn post_view(post: Post) -> PostView {
    PostView {
        id: post.id,
        institute_id: post.institute_id,
        kind: map_kind(post.kind),
        title: post.title,
        description: post.description,
        location: post.location,
        status: map_status(post.status),
        likes: post.likes,
        shares: post.shares,
        comments: post.comments.into_iter().map(comment_view).collect(),
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<PostListQuery>,
) -> Result<Json<Vec<PostView>>, ServerError> {
    let posts = state
        .engine
        .posts(engine::PostFilter {
            institute_id: query.institute_id,
            viewer: None,
        })
        .await?;
    Ok(Json(posts.into_iter().map(post_view).collect()))
}

/// Active posts without the ones the caller blocked.
pub async fn feed(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Query(query): Query<PostListQuery>,
) -> Result<Json<Vec<PostView>>, ServerError> {
    require_kind(&account, AccountKind::User)?;
    let posts = state
        .engine
        .posts(engine::PostFilter {
            institute_id: query.institute_id,
            viewer: Some(account.id),
        })
        .await?;
    Ok(Json(posts.into_iter().map(post_view).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PostView>, ServerError> {
    let post = state.engine.post(id).await?;
    Ok(Json(post_view(post)))
}

pub async fn create(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    payload: Result<Json<PostNew>, JsonRejection>,
) -> Result<(StatusCode, Json<PostView>), ServerError> {
    let Json(payload) = payload?;
    require_kind(&account, AccountKind::Institute)?;

    let mut cmd = engine::NewPost::new(
        account.id,
        kind_from_api(payload.kind),
        payload.title,
        Utc::now(),
    );
    cmd.description = payload.description;
    cmd.location = payload.location;
    let post = state.engine.create_post(cmd).await?;

    Ok((StatusCode::CREATED, Json(post_view(post))))
}

pub async fn edit(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<PostEdit>, JsonRejection>,
) -> Result<Json<PostView>, ServerError> {
    let Json(payload) = payload?;
    require_kind(&account, AccountKind::Institute)?;

    let patch = engine::PostPatch {
        kind: payload.kind.map(kind_from_api),
        title: payload.title,
        description: payload.description,
        location: payload.location,
    };
    let post = state
        .engine
        .edit_post(id, account.id, patch, Utc::now())
        .await?;
    Ok(Json(post_view(post)))
}

pub async fn delete(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    require_kind(&account, AccountKind::Institute)?;
    state.engine.delete_post(id, account.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn change_status(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<PostStatusChange>, JsonRejection>,
) -> Result<Json<PostView>, ServerError> {
    let Json(payload) = payload?;
    require_kind(&account, AccountKind::Institute)?;

    let post = state
        .engine
        .set_post_status(id, account.id, status_from_api(payload.status), Utc::now())
        .await?;
    Ok(Json(post_view(post)))
}

pub async fn moderate(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<PostStatusChange>, JsonRejection>,
) -> Result<Json<PostView>, ServerError> {
    let Json(payload) = payload?;
    require_kind(&account, AccountKind::Admin)?;

    let post = state
        .engine
        .moderate_post(account.id, id, status_from_api(payload.status), Utc::now())
        .await?;
    Ok(Json(post_view(post)))
}

pub async fn like(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LikeView>, ServerError> {
    require_kind(&account, AccountKind::User)?;
    let outcome = state.engine.toggle_like(id, account.id, Utc::now()).await?;
    Ok(Json(LikeView {
        liked: outcome.liked,
        likes: outcome.likes,
    }))
}

pub async fn comment(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<CommentNew>, JsonRejection>,
) -> Result<(StatusCode, Json<CommentView>), ServerError> {
    let Json(payload) = payload?;
    let actor = author_of(&account)?;

    let comment = state
        .engine
        .comment_on_post(id, actor, &payload.text, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(comment_view(comment))))
}

pub async fn reply(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path((id, comment_id)): Path<(Uuid, Uuid)>,
    payload: Result<Json<CommentNew>, JsonRejection>,
) -> Result<(StatusCode, Json<ReplyView>), ServerError> {
    let Json(payload) = payload?;
    let actor = author_of(&account)?;

    let reply = state
        .engine
        .reply_to_comment(id, comment_id, actor, &payload.text, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(reply_view(reply))))
}

pub async fn share(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<ShareNew>, JsonRejection>,
) -> Result<(StatusCode, Json<ShareView>), ServerError> {
    let Json(payload) = payload?;
    require_kind(&account, AccountKind::User)?;

    let shares = state
        .engine
        .share_post(id, account.id, platform_from_api(payload.platform), Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(ShareView { shares })))
}

pub async fn block(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    require_kind(&account, AccountKind::User)?;
    state.engine.block_post(account.id, id, Utc::now()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unblock(
    Extension(account): Extension<Account>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    require_kind(&account, AccountKind::User)?;
    state.engine.unblock_post(account.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
