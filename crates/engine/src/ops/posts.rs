//! Institute posts and the reactions on them.
//!
//! Posts are loaded as a whole: the post row, its comments with their
//! replies, and the like and share counts.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    AccountKind, Actor, Comment, EngineError, LikeOutcome, NewPost, Post, PostFilter, PostPatch,
    PostStatus, Reply, ResultEngine, SharePlatform, post_comments,
    post_reactions::{blocks, likes, shares},
    post_replies, posts,
    util::{normalize_optional_text, normalize_required_text},
};

use super::{Engine, with_tx};

impl Engine {
    /// Publish a post for an institute.
    pub async fn create_post(&self, cmd: NewPost) -> ResultEngine<Post> {
        let title = normalize_required_text(&cmd.title, "title")?;
        let post = Post {
            id: Uuid::new_v4(),
            institute_id: cmd.institute_id,
            kind: cmd.kind,
            title,
            description: normalize_optional_text(cmd.description.as_deref()),
            location: normalize_optional_text(cmd.location.as_deref()),
            status: PostStatus::Active,
            likes: 0,
            shares: 0,
            comments: Vec::new(),
            created_at: cmd.created_at,
            updated_at: cmd.created_at,
        };

        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, cmd.institute_id, AccountKind::Institute)
                .await?;
            let model: posts::ActiveModel = (&post).into();
            model.insert(&db_tx).await?;

            tracing::info!(
                post_id = %post.id,
                institute_id = %post.institute_id,
                kind = post.kind.as_str(),
                "post created"
            );
            Ok(post)
        })
    }

    /// Active posts, newest first.
    pub async fn posts(&self, filter: PostFilter) -> ResultEngine<Vec<Post>> {
        with_tx!(self, |db_tx| {
            let mut query = posts::Entity::find()
                .filter(posts::Column::Status.eq(PostStatus::Active.as_str()));
            if let Some(institute_id) = filter.institute_id {
                query = query.filter(posts::Column::InstituteId.eq(institute_id.to_string()));
            }
            if let Some(viewer) = filter.viewer {
                let blocked: Vec<String> = blocks::Entity::find()
                    .select_only()
                    .column(blocks::Column::PostId)
                    .filter(blocks::Column::UserId.eq(viewer.to_string()))
                    .into_tuple()
                    .all(&db_tx)
                    .await?;
                if !blocked.is_empty() {
                    query = query.filter(posts::Column::Id.is_not_in(blocked));
                }
            }

            let models = query
                .order_by_desc(posts::Column::CreatedAt)
                .order_by_desc(posts::Column::Id)
                .all(&db_tx)
                .await?;
            load_posts(&db_tx, models).await
        })
    }

    /// One post with its comments, whatever its status.
    pub async fn post(&self, post_id: Uuid) -> ResultEngine<Post> {
        with_tx!(self, |db_tx| load_post(&db_tx, post_id).await)
    }

    /// Edit a post. Only the owning institute may edit.
    pub async fn edit_post(
        &self,
        post_id: Uuid,
        institute_id: Uuid,
        patch: PostPatch,
        now: DateTime<Utc>,
    ) -> ResultEngine<Post> {
        let title = patch
            .title
            .as_deref()
            .map(|title| normalize_required_text(title, "title"))
            .transpose()?;

        with_tx!(self, |db_tx| {
            let mut post = load_post(&db_tx, post_id).await?;
            require_post_owner(&post, institute_id)?;

            if let Some(kind) = patch.kind {
                post.kind = kind;
            }
            if let Some(title) = title {
                post.title = title;
            }
            if let Some(description) = patch.description.as_deref() {
                post.description = normalize_optional_text(Some(description));
            }
            if let Some(location) = patch.location.as_deref() {
                post.location = normalize_optional_text(Some(location));
            }
            post.updated_at = now;

            let model: posts::ActiveModel = (&post).into();
            model.update(&db_tx).await?;
            Ok(post)
        })
    }

    /// Delete a post with everything attached to it.
    pub async fn delete_post(&self, post_id: Uuid, institute_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let post = load_post(&db_tx, post_id).await?;
            require_post_owner(&post, institute_id)?;

            let id = post_id.to_string();
            blocks::Entity::delete_many()
                .filter(blocks::Column::PostId.eq(id.as_str()))
                .exec(&db_tx)
                .await?;
            shares::Entity::delete_many()
                .filter(shares::Column::PostId.eq(id.as_str()))
                .exec(&db_tx)
                .await?;
            likes::Entity::delete_many()
                .filter(likes::Column::PostId.eq(id.as_str()))
                .exec(&db_tx)
                .await?;
            post_replies::Entity::delete_many()
                .filter(post_replies::Column::PostId.eq(id.as_str()))
                .exec(&db_tx)
                .await?;
            post_comments::Entity::delete_many()
                .filter(post_comments::Column::PostId.eq(id.as_str()))
                .exec(&db_tx)
                .await?;
            posts::Entity::delete_by_id(id).exec(&db_tx).await?;

            tracing::info!(%post_id, %institute_id, "post deleted");
            Ok(())
        })
    }

    /// Activate or deactivate a post as its owner.
    pub async fn set_post_status(
        &self,
        post_id: Uuid,
        institute_id: Uuid,
        status: PostStatus,
        now: DateTime<Utc>,
    ) -> ResultEngine<Post> {
        with_tx!(self, |db_tx| {
            let mut post = load_post(&db_tx, post_id).await?;
            require_post_owner(&post, institute_id)?;
            update_status(&db_tx, &mut post, status, now).await?;
            Ok(post)
        })
    }

    /// Activate or deactivate any post as an admin.
    pub async fn moderate_post(
        &self,
        admin_id: Uuid,
        post_id: Uuid,
        status: PostStatus,
        now: DateTime<Utc>,
    ) -> ResultEngine<Post> {
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, admin_id, AccountKind::Admin)
                .await?;
            let mut post = load_post(&db_tx, post_id).await?;
            update_status(&db_tx, &mut post, status, now).await?;

            tracing::info!(
                %post_id,
                %admin_id,
                status = status.as_str(),
                "post moderated"
            );
            Ok(post)
        })
    }

    /// Like the post, or take the like back if the user already liked it.
    pub async fn toggle_like(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> ResultEngine<LikeOutcome> {
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, user_id, AccountKind::User)
                .await?;
            let post = load_post(&db_tx, post_id).await?;
            post.require_active()?;

            let existing = likes::Entity::find_by_id((post_id.to_string(), user_id.to_string()))
                .one(&db_tx)
                .await?;
            let liked = match existing {
                Some(like) => {
                    like.delete(&db_tx).await?;
                    false
                }
                None => {
                    likes::ActiveModel {
                        post_id: ActiveValue::Set(post_id.to_string()),
                        user_id: ActiveValue::Set(user_id.to_string()),
                        created_at: ActiveValue::Set(now),
                    }
                    .insert(&db_tx)
                    .await?;
                    true
                }
            };

            let count = likes::Entity::find()
                .filter(likes::Column::PostId.eq(post_id.to_string()))
                .count(&db_tx)
                .await?;
            Ok(LikeOutcome {
                liked,
                likes: count,
            })
        })
    }

    /// Add a comment at the end of the post's comments.
    pub async fn comment_on_post(
        &self,
        post_id: Uuid,
        author: Actor,
        text: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Comment> {
        let text = normalize_required_text(text, "comment")?;

        with_tx!(self, |db_tx| {
            self.require_author(&db_tx, author).await?;
            let post = load_post(&db_tx, post_id).await?;
            post.require_active()?;

            let comment = Comment {
                id: Uuid::new_v4(),
                author,
                text,
                created_at: now,
                replies: Vec::new(),
            };
            let position = post.comments.len() as u64;
            post_comments::ActiveModel::from_comment(post_id, position, &comment)
                .insert(&db_tx)
                .await?;

            tracing::debug!(%post_id, comment_id = %comment.id, "comment added");
            Ok(comment)
        })
    }

    /// Reply to one of the post's comments.
    pub async fn reply_to_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        author: Actor,
        text: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Reply> {
        let text = normalize_required_text(text, "reply")?;

        with_tx!(self, |db_tx| {
            self.require_author(&db_tx, author).await?;
            let post = load_post(&db_tx, post_id).await?;
            post.require_active()?;
            if !post.comments.iter().any(|comment| comment.id == comment_id) {
                return Err(EngineError::KeyNotFound("comment not exists".to_string()));
            }

            let reply = Reply {
                id: Uuid::new_v4(),
                author,
                text,
                created_at: now,
            };
            let position: usize = post
                .comments
                .iter()
                .map(|comment| comment.replies.len())
                .sum();
            post_replies::ActiveModel::from_reply(post_id, comment_id, position as u64, &reply)
                .insert(&db_tx)
                .await?;

            tracing::debug!(%post_id, %comment_id, reply_id = %reply.id, "reply added");
            Ok(reply)
        })
    }

    /// Record a share and return the post's share count.
    pub async fn share_post(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        platform: SharePlatform,
        now: DateTime<Utc>,
    ) -> ResultEngine<u64> {
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, user_id, AccountKind::User)
                .await?;
            let post = load_post(&db_tx, post_id).await?;
            post.require_active()?;

            shares::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                post_id: ActiveValue::Set(post_id.to_string()),
                user_id: ActiveValue::Set(user_id.to_string()),
                platform: ActiveValue::Set(platform.as_str().to_string()),
                created_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;

            let count = shares::Entity::find()
                .filter(shares::Column::PostId.eq(post_id.to_string()))
                .count(&db_tx)
                .await?;
            Ok(count)
        })
    }

    /// Hide a post from the user's feed. Blocking twice is a no-op.
    pub async fn block_post(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, user_id, AccountKind::User)
                .await?;
            find_post_model(&db_tx, post_id).await?;

            let existing = blocks::Entity::find_by_id((user_id.to_string(), post_id.to_string()))
                .one(&db_tx)
                .await?;
            if existing.is_none() {
                blocks::ActiveModel {
                    user_id: ActiveValue::Set(user_id.to_string()),
                    post_id: ActiveValue::Set(post_id.to_string()),
                    created_at: ActiveValue::Set(now),
                }
                .insert(&db_tx)
                .await?;
            }
            Ok(())
        })
    }

    /// Show a blocked post again. Unblocking a visible post is a no-op.
    pub async fn unblock_post(&self, user_id: Uuid, post_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            blocks::Entity::delete_many()
                .filter(blocks::Column::UserId.eq(user_id.to_string()))
                .filter(blocks::Column::PostId.eq(post_id.to_string()))
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    async fn require_author(&self, db: &DatabaseTransaction, author: Actor) -> ResultEngine<()> {
        match author {
            Actor::User(id) => self.require_account(db, id, AccountKind::User).await?,
            Actor::Institute(id) => self.require_account(db, id, AccountKind::Institute).await?,
        };
        Ok(())
    }
}

fn require_post_owner(post: &Post, institute_id: Uuid) -> ResultEngine<()> {
    if post.institute_id != institute_id {
        return Err(EngineError::Forbidden(
            "not the owner of this post".to_string(),
        ));
    }
    Ok(())
}

async fn update_status(
    db: &DatabaseTransaction,
    post: &mut Post,
    status: PostStatus,
    now: DateTime<Utc>,
) -> ResultEngine<()> {
    post.status = status;
    post.updated_at = now;
    posts::ActiveModel {
        id: ActiveValue::Unchanged(post.id.to_string()),
        status: ActiveValue::Set(status.as_str().to_string()),
        updated_at: ActiveValue::Set(now),
        ..Default::default()
    }
    .update(db)
    .await?;
    Ok(())
}

async fn find_post_model(db: &DatabaseTransaction, post_id: Uuid) -> ResultEngine<posts::Model> {
    posts::Entity::find_by_id(post_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("post not exists".to_string()))
}

async fn load_post(db: &DatabaseTransaction, post_id: Uuid) -> ResultEngine<Post> {
    let model = find_post_model(db, post_id).await?;
    let mut loaded = load_posts(db, vec![model]).await?;
    loaded
        .pop()
        .ok_or_else(|| EngineError::KeyNotFound("post not exists".to_string()))
}

/// Attach comments, replies and reaction counts to post rows, keeping the
/// order of `models`.
async fn load_posts(db: &DatabaseTransaction, models: Vec<posts::Model>) -> ResultEngine<Vec<Post>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<String> = models.iter().map(|model| model.id.clone()).collect();

    let mut comments: HashMap<String, Vec<post_comments::Model>> = HashMap::new();
    for row in post_comments::Entity::find()
        .filter(post_comments::Column::PostId.is_in(ids.clone()))
        .order_by_asc(post_comments::Column::Position)
        .all(db)
        .await?
    {
        comments.entry(row.post_id.clone()).or_default().push(row);
    }

    let mut replies: HashMap<String, Vec<post_replies::Model>> = HashMap::new();
    for row in post_replies::Entity::find()
        .filter(post_replies::Column::PostId.is_in(ids.clone()))
        .order_by_asc(post_replies::Column::Position)
        .all(db)
        .await?
    {
        replies.entry(row.post_id.clone()).or_default().push(row);
    }

    let mut like_counts: HashMap<String, u64> = HashMap::new();
    for row in likes::Entity::find()
        .filter(likes::Column::PostId.is_in(ids.clone()))
        .all(db)
        .await?
    {
        *like_counts.entry(row.post_id).or_default() += 1;
    }

    let mut share_counts: HashMap<String, u64> = HashMap::new();
    for row in shares::Entity::find()
        .filter(shares::Column::PostId.is_in(ids))
        .all(db)
        .await?
    {
        *share_counts.entry(row.post_id).or_default() += 1;
    }

    models
        .into_iter()
        .map(|model| {
            let likes = like_counts.get(&model.id).copied().unwrap_or(0);
            let shares = share_counts.get(&model.id).copied().unwrap_or(0);
            let own_comments = comments.remove(&model.id).unwrap_or_default();
            let own_replies = replies.remove(&model.id).unwrap_or_default();
            Post::assemble(model, own_comments, own_replies, likes, shares)
        })
        .collect()
}
