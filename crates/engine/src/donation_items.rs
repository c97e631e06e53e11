//! Donation items.
//!
//! An item is a single line of a [`DonationRequest`](crate::DonationRequest).
//! Items have no identity outside their request: rows are keyed by
//! `(request_id, id)` and `position` keeps the insertion order.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    util::{parse_optional_uuid, parse_uuid},
};

/// Lifecycle status of an item.
///
/// `Collected` is derived by the allocation routine from the funds received
/// by the request; it cannot be requested by an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Pending,
    Taken,
    Awaited,
    Fulfilled,
    Collected,
}

impl ItemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Taken => "taken",
            Self::Awaited => "awaited",
            Self::Fulfilled => "fulfilled",
            Self::Collected => "collected",
        }
    }

    /// Whether a user currently holds the item.
    pub fn is_held(self) -> bool {
        matches!(self, Self::Taken | Self::Awaited)
    }
}

impl TryFrom<&str> for ItemStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "taken" => Ok(Self::Taken),
            "awaited" => Ok(Self::Awaited),
            "fulfilled" => Ok(Self::Fulfilled),
            "collected" => Ok(Self::Collected),
            other => Err(EngineError::Validation(format!(
                "invalid item status: {other}"
            ))),
        }
    }
}

/// Which side last changed an item's status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdatedBy {
    User,
    #[default]
    Institute,
}

impl UpdatedBy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Institute => "institute",
        }
    }
}

impl TryFrom<&str> for UpdatedBy {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Self::User),
            "institute" => Ok(Self::Institute),
            other => Err(EngineError::Validation(format!(
                "invalid item updater: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub quantity: i64,
    /// Unit price in minor units.
    pub price: i64,
    /// `price * quantity`, recomputed on every edit.
    pub total: i64,
    pub status: ItemStatus,
    pub updated_by: UpdatedBy,
    pub taken_by: Option<Uuid>,
    pub taken_at: Option<DateTime<Utc>>,
}

impl DonationItem {
    /// Build a fresh `pending` item, validating quantity and price.
    pub fn new(title: String, description: String, quantity: i64, price: i64) -> ResultEngine<Self> {
        let total = line_total(quantity, price)?;
        Ok(Self {
            id: Uuid::new_v4(),
            title,
            description,
            quantity,
            price,
            total,
            status: ItemStatus::Pending,
            updated_by: UpdatedBy::Institute,
            taken_by: None,
            taken_at: None,
        })
    }

    /// The user holding the item, if it is currently taken or awaited.
    pub fn holder(&self) -> Option<Uuid> {
        if self.status.is_held() {
            self.taken_by
        } else {
            None
        }
    }

    /// Back to `pending` with the hold cleared.
    pub(crate) fn release(&mut self) {
        self.status = ItemStatus::Pending;
        self.taken_by = None;
        self.taken_at = None;
    }
}

/// Compute an item total, rejecting non-positive inputs and overflow.
pub(crate) fn line_total(quantity: i64, price: i64) -> ResultEngine<i64> {
    if quantity <= 0 {
        return Err(EngineError::Validation(
            "item quantity must be >= 1".to_string(),
        ));
    }
    if price <= 0 {
        return Err(EngineError::InvalidAmount("item price must be > 0".to_string()));
    }
    quantity
        .checked_mul(price)
        .ok_or_else(|| EngineError::InvalidAmount("item total too large".to_string()))
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "donation_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub request_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub position: i32,
    pub title: String,
    pub description: String,
    pub quantity: i64,
    pub price: i64,
    pub total: i64,
    pub status: String,
    pub updated_by: String,
    pub taken_by: Option<String>,
    pub taken_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::donation_requests::Entity",
        from = "Column::RequestId",
        to = "super::donation_requests::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    DonationRequests,
}

impl Related<super::donation_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DonationRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn from_item(request_id: Uuid, position: usize, item: &DonationItem) -> Self {
        Self {
            request_id: ActiveValue::Set(request_id.to_string()),
            id: ActiveValue::Set(item.id.to_string()),
            position: ActiveValue::Set(i32::try_from(position).unwrap_or(i32::MAX)),
            title: ActiveValue::Set(item.title.clone()),
            description: ActiveValue::Set(item.description.clone()),
            quantity: ActiveValue::Set(item.quantity),
            price: ActiveValue::Set(item.price),
            total: ActiveValue::Set(item.total),
            status: ActiveValue::Set(item.status.as_str().to_string()),
            updated_by: ActiveValue::Set(item.updated_by.as_str().to_string()),
            taken_by: ActiveValue::Set(item.taken_by.map(|id| id.to_string())),
            taken_at: ActiveValue::Set(item.taken_at),
        }
    }
}

impl TryFrom<Model> for DonationItem {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "item")?,
            status: ItemStatus::try_from(model.status.as_str())?,
            updated_by: UpdatedBy::try_from(model.updated_by.as_str())?,
            taken_by: parse_optional_uuid(model.taken_by.as_deref(), "user")?,
            title: model.title,
            description: model.description,
            quantity: model.quantity,
            price: model.price,
            total: model.total,
            taken_at: model.taken_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_is_price_times_quantity() {
        let item = DonationItem::new("Rice".into(), "25kg bags".into(), 4, 1250).unwrap();
        assert_eq!(item.total, 5000);
        assert_eq!(item.status, ItemStatus::Pending);
        assert_eq!(item.updated_by, UpdatedBy::Institute);
    }

    #[test]
    fn rejects_empty_quantity_and_free_items() {
        assert!(matches!(
            DonationItem::new("Rice".into(), String::new(), 0, 100),
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(
            DonationItem::new("Rice".into(), String::new(), 1, 0),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn rejects_overflowing_total() {
        assert!(matches!(
            line_total(i64::MAX, 2),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn holder_only_while_held() {
        let mut item = DonationItem::new("Mats".into(), String::new(), 1, 10).unwrap();
        let user = Uuid::new_v4();
        item.taken_by = Some(user);
        item.status = ItemStatus::Awaited;
        assert_eq!(item.holder(), Some(user));

        item.status = ItemStatus::Fulfilled;
        assert_eq!(item.holder(), None);
    }
}
