//! Ledger transactions.
//!
//! A ledger row records money moving between a user and an institute
//! wallet. Payments and donations are accepted on arrival; withdrawals
//! start `pending` and are settled by an admin review.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError,
    util::{parse_optional_uuid, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Payment,
    Donation,
    Withdraw,
    Zakat,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Payment => "payment",
            Self::Donation => "donation",
            Self::Withdraw => "withdraw",
            Self::Zakat => "zakat",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "payment" => Ok(Self::Payment),
            "donation" => Ok(Self::Donation),
            "withdraw" => Ok(Self::Withdraw),
            "zakat" => Ok(Self::Zakat),
            other => Err(EngineError::Validation(format!(
                "invalid transaction type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Accepted,
    Cancelled,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Cancelled => "cancelled",
        }
    }
}

impl TryFrom<&str> for TransactionStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EngineError::Validation(format!(
                "invalid transaction status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    /// Paying user; `None` for withdrawals.
    pub from_account_id: Option<Uuid>,
    pub institute_id: Uuid,
    pub amount_minor: i64,
    pub fee_minor: Option<i64>,
    /// Payment provider reference.
    pub external_id: Option<String>,
    pub donation_request_id: Option<Uuid>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ledger_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub kind: String,
    pub status: String,
    pub from_account_id: Option<String>,
    pub institute_id: String,
    pub amount_minor: i64,
    pub fee_minor: Option<i64>,
    pub external_id: Option<String>,
    pub donation_request_id: Option<String>,
    pub occurred_at: DateTimeUtc,
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

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            status: ActiveValue::Set(tx.status.as_str().to_string()),
            from_account_id: ActiveValue::Set(tx.from_account_id.map(|id| id.to_string())),
            institute_id: ActiveValue::Set(tx.institute_id.to_string()),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            fee_minor: ActiveValue::Set(tx.fee_minor),
            external_id: ActiveValue::Set(tx.external_id.clone()),
            donation_request_id: ActiveValue::Set(tx.donation_request_id.map(|id| id.to_string())),
            occurred_at: ActiveValue::Set(tx.occurred_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            status: TransactionStatus::try_from(model.status.as_str())?,
            from_account_id: parse_optional_uuid(model.from_account_id.as_deref(), "account")?,
            institute_id: parse_uuid(&model.institute_id, "institute")?,
            donation_request_id: parse_optional_uuid(
                model.donation_request_id.as_deref(),
                "donation request",
            )?,
            amount_minor: model.amount_minor,
            fee_minor: model.fee_minor,
            external_id: model.external_id,
            occurred_at: model.occurred_at,
        })
    }
}
