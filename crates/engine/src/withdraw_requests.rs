//! Withdraw requests waiting for an admin.
//!
//! Each request points at the pending `withdraw` ledger row it settles.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, TransactionStatus,
    util::{parse_optional_uuid, parse_uuid},
};

/// Admin verdict on a withdraw request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawDecision {
    Accept,
    Cancel,
}

impl WithdrawDecision {
    pub fn status(self) -> TransactionStatus {
        match self {
            Self::Accept => TransactionStatus::Accepted,
            Self::Cancel => TransactionStatus::Cancelled,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawRequest {
    pub id: Uuid,
    pub institute_id: Uuid,
    pub transaction_id: Uuid,
    pub amount_minor: i64,
    pub status: TransactionStatus,
    pub reviewed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "withdraw_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub institute_id: String,
    #[sea_orm(unique)]
    pub transaction_id: String,
    pub amount_minor: i64,
    pub status: String,
    pub reviewed_by: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ledger::Entity",
        from = "Column::TransactionId",
        to = "super::ledger::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Ledger,
}

impl Related<super::ledger::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ledger.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&WithdrawRequest> for ActiveModel {
    fn from(request: &WithdrawRequest) -> Self {
        Self {
            id: ActiveValue::Set(request.id.to_string()),
            institute_id: ActiveValue::Set(request.institute_id.to_string()),
            transaction_id: ActiveValue::Set(request.transaction_id.to_string()),
            amount_minor: ActiveValue::Set(request.amount_minor),
            status: ActiveValue::Set(request.status.as_str().to_string()),
            reviewed_by: ActiveValue::Set(request.reviewed_by.map(|id| id.to_string())),
            created_at: ActiveValue::Set(request.created_at),
            updated_at: ActiveValue::Set(request.updated_at),
        }
    }
}

impl TryFrom<Model> for WithdrawRequest {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "withdraw request")?,
            institute_id: parse_uuid(&model.institute_id, "institute")?,
            transaction_id: parse_uuid(&model.transaction_id, "transaction")?,
            status: TransactionStatus::try_from(model.status.as_str())?,
            reviewed_by: parse_optional_uuid(model.reviewed_by.as_deref(), "admin")?,
            amount_minor: model.amount_minor,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
