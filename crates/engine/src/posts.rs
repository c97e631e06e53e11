//! Institute posts.
//!
//! A [`Post`] is an announcement published by an institute. Comments and
//! replies are owned by the post (see [`post_comments`](crate::post_comments)
//! and [`post_replies`](crate::post_replies)); likes and shares are counted
//! from their own tables when the post is loaded.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Comment, EngineError, Reply, ResultEngine, post_comments, post_replies, util::parse_uuid,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostKind {
    Quran,
    Hadith,
    Notice,
}

impl PostKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quran => "quran",
            Self::Hadith => "hadith",
            Self::Notice => "notice",
        }
    }
}

impl TryFrom<&str> for PostKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "quran" => Ok(Self::Quran),
            "hadith" => Ok(Self::Hadith),
            "notice" => Ok(Self::Notice),
            other => Err(EngineError::Validation(format!("invalid post kind: {other}"))),
        }
    }
}

/// Inactive posts are hidden from listings and accept no reactions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    #[default]
    Active,
    Inactive,
}

impl PostStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl TryFrom<&str> for PostStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(EngineError::Validation(format!(
                "invalid post status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Post {
    pub id: Uuid,
    pub institute_id: Uuid,
    pub kind: PostKind,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub status: PostStatus,
    pub likes: u64,
    pub shares: u64,
    /// Comments in the order they were written, each with its replies.
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Build the aggregate from its rows. `comments` and `replies` must be
    /// ordered by position.
    pub(crate) fn assemble(
        model: Model,
        comments: Vec<post_comments::Model>,
        replies: Vec<post_replies::Model>,
        likes: u64,
        shares: u64,
    ) -> ResultEngine<Self> {
        let mut replies = replies
            .into_iter()
            .map(|reply| {
                let comment_id = parse_uuid(&reply.comment_id, "comment")?;
                Ok((comment_id, Reply::try_from(reply)?))
            })
            .collect::<ResultEngine<Vec<_>>>()?;

        let comments = comments
            .into_iter()
            .map(|row| {
                let mut comment = Comment::try_from(row)?;
                let (own, rest): (Vec<_>, Vec<_>) = replies
                    .drain(..)
                    .partition(|(comment_id, _)| *comment_id == comment.id);
                replies = rest;
                comment.replies = own.into_iter().map(|(_, reply)| reply).collect();
                Ok(comment)
            })
            .collect::<ResultEngine<Vec<_>>>()?;

        Ok(Self {
            id: parse_uuid(&model.id, "post")?,
            institute_id: parse_uuid(&model.institute_id, "institute")?,
            kind: PostKind::try_from(model.kind.as_str())?,
            status: PostStatus::try_from(model.status.as_str())?,
            title: model.title,
            description: model.description,
            location: model.location,
            likes,
            shares,
            comments,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }

    /// Reactions and comments are only taken on active posts.
    pub(crate) fn require_active(&self) -> ResultEngine<()> {
        if self.status != PostStatus::Active {
            return Err(EngineError::InvalidTransition(
                "post is inactive".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub institute_id: String,
    pub kind: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Post> for ActiveModel {
    fn from(post: &Post) -> Self {
        Self {
            id: ActiveValue::Set(post.id.to_string()),
            institute_id: ActiveValue::Set(post.institute_id.to_string()),
            kind: ActiveValue::Set(post.kind.as_str().to_string()),
            title: ActiveValue::Set(post.title.clone()),
            description: ActiveValue::Set(post.description.clone()),
            location: ActiveValue::Set(post.location.clone()),
            status: ActiveValue::Set(post.status.as_str().to_string()),
            created_at: ActiveValue::Set(post.created_at),
            updated_at: ActiveValue::Set(post.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: Uuid) -> Model {
        let now = Utc::now();
        Model {
            id: id.to_string(),
            institute_id: Uuid::new_v4().to_string(),
            kind: "notice".to_string(),
            title: "Jumuah timings".to_string(),
            description: None,
            location: Some("Main hall".to_string()),
            status: "active".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn comment(post_id: Uuid, id: Uuid, position: i32) -> post_comments::Model {
        post_comments::Model {
            post_id: post_id.to_string(),
            id: id.to_string(),
            position,
            author_kind: "user".to_string(),
            author_id: Uuid::new_v4().to_string(),
            text: format!("comment {position}"),
            created_at: Utc::now(),
        }
    }

    fn reply(post_id: Uuid, comment_id: Uuid, position: i32) -> post_replies::Model {
        post_replies::Model {
            post_id: post_id.to_string(),
            id: Uuid::new_v4().to_string(),
            comment_id: comment_id.to_string(),
            position,
            author_kind: "institute".to_string(),
            author_id: Uuid::new_v4().to_string(),
            text: format!("reply {position}"),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn replies_are_grouped_under_their_comment_in_order() {
        let post_id = Uuid::new_v4();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        let post = Post::assemble(
            row(post_id),
            vec![comment(post_id, first, 0), comment(post_id, second, 1)],
            vec![
                reply(post_id, second, 0),
                reply(post_id, first, 1),
                reply(post_id, second, 2),
            ],
            3,
            1,
        )
        .unwrap();

        assert_eq!(post.kind, PostKind::Notice);
        assert_eq!(post.likes, 3);
        assert_eq!(post.comments.len(), 2);
        assert_eq!(post.comments[0].id, first);
        assert_eq!(post.comments[0].replies.len(), 1);
        assert_eq!(post.comments[0].replies[0].text, "reply 1");
        let second_replies: Vec<_> = post.comments[1]
            .replies
            .iter()
            .map(|reply| reply.text.as_str())
            .collect();
        assert_eq!(second_replies, ["reply 0", "reply 2"]);
    }

    #[test]
    fn inactive_posts_take_no_reactions() {
        let mut post = Post::assemble(row(Uuid::new_v4()), Vec::new(), Vec::new(), 0, 0).unwrap();
        assert!(post.require_active().is_ok());
        post.status = PostStatus::Inactive;
        assert_eq!(
            post.require_active(),
            Err(EngineError::InvalidTransition("post is inactive".to_string()))
        );
    }
}
