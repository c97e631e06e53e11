//! Likes, shares and blocks on posts.
//!
//! Each reaction lives in its own table: `post_likes` and `post_blocks` are
//! keyed by post and user, `post_shares` keeps one row per share.

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Where a post was shared to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharePlatform {
    Facebook,
    Twitter,
    Whatsapp,
    Instagram,
    #[default]
    CopyLink,
}

impl SharePlatform {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Facebook => "facebook",
            Self::Twitter => "twitter",
            Self::Whatsapp => "whatsapp",
            Self::Instagram => "instagram",
            Self::CopyLink => "copy_link",
        }
    }
}

impl TryFrom<&str> for SharePlatform {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "facebook" => Ok(Self::Facebook),
            "twitter" => Ok(Self::Twitter),
            "whatsapp" => Ok(Self::Whatsapp),
            "instagram" => Ok(Self::Instagram),
            "copy_link" => Ok(Self::CopyLink),
            other => Err(EngineError::Validation(format!(
                "invalid share platform: {other}"
            ))),
        }
    }
}

/// Result of toggling a like.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LikeOutcome {
    /// Whether the user likes the post after the toggle.
    pub liked: bool,
    pub likes: u64,
}

pub mod likes {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "post_likes")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub post_id: String,
        #[sea_orm(primary_key, auto_increment = false)]
        pub user_id: String,
        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod shares {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "post_shares")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub post_id: String,
        pub user_id: String,
        pub platform: String,
        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod blocks {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "post_blocks")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub user_id: String,
        #[sea_orm(primary_key, auto_increment = false)]
        pub post_id: String,
        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}
