//! Follows table.
//!
//! A row means a user follows an institute. Rows are keyed by
//! `(user_id, institute_id)`, so a user follows an institute at most once.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "follows")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub institute_id: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn from_follow(user_id: Uuid, institute_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            user_id: ActiveValue::Set(user_id.to_string()),
            institute_id: ActiveValue::Set(institute_id.to_string()),
            created_at: ActiveValue::Set(now),
        }
    }
}
