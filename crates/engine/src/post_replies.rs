//! Replies to a comment.
//!
//! Replies are owned by the post like comments are, keyed by
//! `(post_id, id)`, and point at their comment through `comment_id`.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{Actor, EngineError, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub id: Uuid,
    pub author: Actor,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "post_replies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub post_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub comment_id: String,
    pub position: i32,
    pub author_kind: String,
    pub author_id: String,
    pub text: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn from_reply(
        post_id: Uuid,
        comment_id: Uuid,
        position: u64,
        reply: &Reply,
    ) -> Self {
        let (author_kind, author_id) = reply.author.to_columns();
        Self {
            post_id: ActiveValue::Set(post_id.to_string()),
            id: ActiveValue::Set(reply.id.to_string()),
            comment_id: ActiveValue::Set(comment_id.to_string()),
            position: ActiveValue::Set(i32::try_from(position).unwrap_or(i32::MAX)),
            author_kind: ActiveValue::Set(author_kind.to_string()),
            author_id: ActiveValue::Set(author_id),
            text: ActiveValue::Set(reply.text.clone()),
            created_at: ActiveValue::Set(reply.created_at),
        }
    }
}

impl TryFrom<Model> for Reply {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "reply")?,
            author: Actor::from_columns(&model.author_kind, &model.author_id)?,
            text: model.text,
            created_at: model.created_at,
        })
    }
}
