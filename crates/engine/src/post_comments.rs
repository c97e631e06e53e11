//! Comments on a post.
//!
//! Comments have no identity outside their post: rows are keyed by
//! `(post_id, id)` and `position` keeps the order they were written in.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{Actor, EngineError, Reply, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Comment {
    pub id: Uuid,
    pub author: Actor,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub replies: Vec<Reply>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "post_comments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub post_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
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
    pub(crate) fn from_comment(post_id: Uuid, position: u64, comment: &Comment) -> Self {
        let (author_kind, author_id) = comment.author.to_columns();
        Self {
            post_id: ActiveValue::Set(post_id.to_string()),
            id: ActiveValue::Set(comment.id.to_string()),
            position: ActiveValue::Set(i32::try_from(position).unwrap_or(i32::MAX)),
            author_kind: ActiveValue::Set(author_kind.to_string()),
            author_id: ActiveValue::Set(author_id),
            text: ActiveValue::Set(comment.text.clone()),
            created_at: ActiveValue::Set(comment.created_at),
        }
    }
}

impl TryFrom<Model> for Comment {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "comment")?,
            author: Actor::from_columns(&model.author_kind, &model.author_id)?,
            text: model.text,
            created_at: model.created_at,
            replies: Vec::new(),
        })
    }
}
