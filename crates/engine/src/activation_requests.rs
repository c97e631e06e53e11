//! Wallet activation requests waiting for an admin.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    ActivationStatus, EngineError,
    util::{parse_optional_uuid, parse_uuid},
};

/// Admin verdict on a wallet activation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationDecision {
    Accept,
    Reject,
}

impl ActivationDecision {
    pub fn status(self) -> ActivationStatus {
        match self {
            Self::Accept => ActivationStatus::Accepted,
            Self::Reject => ActivationStatus::Rejected,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationRequest {
    pub id: Uuid,
    pub institute_id: Uuid,
    pub status: ActivationStatus,
    pub reviewed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "wallet_activation_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub institute_id: String,
    pub status: String,
    pub reviewed_by: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::InstituteId",
        to = "super::wallets::Column::InstituteId",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Wallets,
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ActivationRequest> for ActiveModel {
    fn from(request: &ActivationRequest) -> Self {
        Self {
            id: ActiveValue::Set(request.id.to_string()),
            institute_id: ActiveValue::Set(request.institute_id.to_string()),
            status: ActiveValue::Set(request.status.as_str().to_string()),
            reviewed_by: ActiveValue::Set(request.reviewed_by.map(|id| id.to_string())),
            created_at: ActiveValue::Set(request.created_at),
            updated_at: ActiveValue::Set(request.updated_at),
        }
    }
}

impl TryFrom<Model> for ActivationRequest {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "activation request")?,
            institute_id: parse_uuid(&model.institute_id, "institute")?,
            status: ActivationStatus::try_from(model.status.as_str())?,
            reviewed_by: parse_optional_uuid(model.reviewed_by.as_deref(), "admin")?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
