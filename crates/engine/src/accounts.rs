//! Accounts table.
//!
//! Users, institutes and admins share one table and are told apart by
//! `kind`. The engine only needs identities and roles; profile management
//! lives outside of it.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    User,
    Institute,
    Admin,
}

impl AccountKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Institute => "institute",
            Self::Admin => "admin",
        }
    }
}

impl TryFrom<&str> for AccountKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Self::User),
            "institute" => Ok(Self::Institute),
            "admin" => Ok(Self::Admin),
            other => Err(EngineError::Validation(format!(
                "invalid account kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstituteType {
    Masjid,
    Madrasa,
    Khanqah,
    Kabristan,
}

impl InstituteType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Masjid => "masjid",
            Self::Madrasa => "madrasa",
            Self::Khanqah => "khanqah",
            Self::Kabristan => "kabristan",
        }
    }
}

impl TryFrom<&str> for InstituteType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "masjid" => Ok(Self::Masjid),
            "madrasa" => Ok(Self::Madrasa),
            "khanqah" => Ok(Self::Khanqah),
            "kabristan" => Ok(Self::Kabristan),
            other => Err(EngineError::Validation(format!(
                "invalid institute type: {other}"
            ))),
        }
    }
}

/// An authenticated identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub kind: AccountKind,
    pub display_name: String,
    pub location: Option<String>,
    pub institute_type: Option<InstituteType>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub username: String,
    pub password: String,
    pub kind: String,
    pub display_name: String,
    pub location: Option<String>,
    pub institute_type: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn account_kind(&self) -> ResultEngine<AccountKind> {
        AccountKind::try_from(self.kind.as_str())
    }
}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "account")?,
            kind: AccountKind::try_from(model.kind.as_str())?,
            institute_type: model
                .institute_type
                .as_deref()
                .map(InstituteType::try_from)
                .transpose()?,
            username: model.username,
            display_name: model.display_name,
            location: model.location,
            created_at: model.created_at,
        })
    }
}

impl From<(&Account, &str)> for ActiveModel {
    fn from((account, password): (&Account, &str)) -> Self {
        Self {
            id: ActiveValue::Set(account.id.to_string()),
            username: ActiveValue::Set(account.username.clone()),
            password: ActiveValue::Set(password.to_string()),
            kind: ActiveValue::Set(account.kind.as_str().to_string()),
            display_name: ActiveValue::Set(account.display_name.clone()),
            location: ActiveValue::Set(account.location.clone()),
            institute_type: ActiveValue::Set(
                account.institute_type.map(|t| t.as_str().to_string()),
            ),
            created_at: ActiveValue::Set(account.created_at),
        }
    }
}
