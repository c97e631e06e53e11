//! The module contains the `DonationRequest` aggregate and its table.
//!
//! A request owns its items; they are loaded and saved together. The
//! `version` column guards every save against concurrent writers.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{DonationItem, EngineError, util::parse_uuid};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Open,
    Closed,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl TryFrom<&str> for RequestStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            other => Err(EngineError::Validation(format!(
                "invalid request status: {other}"
            ))),
        }
    }
}

/// An institute's itemized need.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationRequest {
    pub id: Uuid,
    /// Owning institute, fixed at creation.
    pub institute_id: Uuid,
    pub title: String,
    pub description: String,
    pub items: Vec<DonationItem>,
    /// Sum of every item's `total` after the last item edit.
    pub total_price: i64,
    /// Cumulative credits, never negative.
    pub amount_received: i64,
    pub status: RequestStatus,
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

impl DonationRequest {
    pub fn new(
        institute_id: Uuid,
        title: String,
        description: String,
        items: Vec<DonationItem>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let mut request = Self {
            id: Uuid::new_v4(),
            institute_id,
            title,
            description,
            items,
            total_price: 0,
            amount_received: 0,
            status: RequestStatus::Open,
            version: 0,
            created_at,
        };
        request.recompute_total();
        request
    }

    pub fn item(&self, item_id: Uuid) -> Option<&DonationItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    pub(crate) fn item_mut(&mut self, item_id: Uuid) -> Option<&mut DonationItem> {
        self.items.iter_mut().find(|item| item.id == item_id)
    }

    pub(crate) fn recompute_total(&mut self) {
        self.total_price = self.items.iter().map(|item| item.total).sum();
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "donation_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub institute_id: String,
    pub title: String,
    pub description: String,
    pub total_price: i64,
    pub amount_received: i64,
    pub status: String,
    pub version: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::donation_items::Entity")]
    DonationItems,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::InstituteId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Accounts,
}

impl Related<super::donation_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DonationItems.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&DonationRequest> for ActiveModel {
    fn from(request: &DonationRequest) -> Self {
        Self {
            id: ActiveValue::Set(request.id.to_string()),
            institute_id: ActiveValue::Set(request.institute_id.to_string()),
            title: ActiveValue::Set(request.title.clone()),
            description: ActiveValue::Set(request.description.clone()),
            total_price: ActiveValue::Set(request.total_price),
            amount_received: ActiveValue::Set(request.amount_received),
            status: ActiveValue::Set(request.status.as_str().to_string()),
            version: ActiveValue::Set(request.version),
            created_at: ActiveValue::Set(request.created_at),
        }
    }
}

impl TryFrom<(Model, Vec<super::donation_items::Model>)> for DonationRequest {
    type Error = EngineError;

    fn try_from(
        (model, items): (Model, Vec<super::donation_items::Model>),
    ) -> Result<Self, Self::Error> {
        let items = items
            .into_iter()
            .map(DonationItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            id: parse_uuid(&model.id, "donation request")?,
            institute_id: parse_uuid(&model.institute_id, "institute")?,
            status: RequestStatus::try_from(model.status.as_str())?,
            title: model.title,
            description: model.description,
            items,
            total_price: model.total_price,
            amount_received: model.amount_received,
            version: model.version,
            created_at: model.created_at,
        })
    }
}
