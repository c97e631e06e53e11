//! Item lifecycle rules on the [`DonationRequest`] aggregate.
//!
//! Everything here is pure: operations in `ops` load the aggregate, call one
//! of these methods and save the result.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    Actor, DonationItem, DonationRequest, EngineError, ItemInput, ItemStatus, ResultEngine,
    UpdatedBy, allocation,
    donation_items::line_total,
    util::{normalize_optional_text, normalize_required_text, require_positive_amount},
};

impl DonationRequest {
    /// Apply a role-gated status change to one item.
    ///
    /// Users may take a pending item, then mark it awaited or hand it back.
    /// The owning institute may confirm (`fulfilled`) or reset (`pending`)
    /// any item; confirming credits the item total once and resetting a
    /// fulfilled item takes it back, never below zero.
    pub fn transition_item(
        &mut self,
        item_id: Uuid,
        actor: Actor,
        target: ItemStatus,
        now: DateTime<Utc>,
    ) -> ResultEngine<DonationItem> {
        let institute_id = self.institute_id;
        let mut amount_received = self.amount_received;

        let item = self
            .item_mut(item_id)
            .ok_or_else(|| EngineError::KeyNotFound("item not exists".to_string()))?;

        match actor {
            Actor::User(user_id) => match target {
                ItemStatus::Taken => {
                    if item.status != ItemStatus::Pending {
                        return Err(EngineError::InvalidTransition(
                            "item already taken".to_string(),
                        ));
                    }
                    item.status = ItemStatus::Taken;
                    item.taken_by = Some(user_id);
                    item.taken_at = Some(now);
                }
                ItemStatus::Awaited => {
                    require_holder(item, user_id)?;
                    item.status = ItemStatus::Awaited;
                }
                ItemStatus::Pending => {
                    require_holder(item, user_id)?;
                    item.release();
                }
                ItemStatus::Fulfilled | ItemStatus::Collected => {
                    return Err(EngineError::InvalidTransition(
                        "invalid status change for user".to_string(),
                    ));
                }
            },
            Actor::Institute(actor_id) => {
                if actor_id != institute_id {
                    return Err(EngineError::Forbidden(
                        "only the owning institute can change this item".to_string(),
                    ));
                }
                match target {
                    ItemStatus::Fulfilled => {
                        if item.status != ItemStatus::Fulfilled {
                            amount_received = amount_received.checked_add(item.total).ok_or_else(
                                || EngineError::InvalidAmount("amount received too large".to_string()),
                            )?;
                        }
                        item.status = ItemStatus::Fulfilled;
                        item.taken_at = None;
                    }
                    ItemStatus::Pending => {
                        if item.status == ItemStatus::Fulfilled {
                            amount_received = (amount_received - item.total).max(0);
                        }
                        item.release();
                    }
                    ItemStatus::Taken | ItemStatus::Awaited | ItemStatus::Collected => {
                        return Err(EngineError::InvalidTransition(
                            "institute can only set status to fulfilled or pending".to_string(),
                        ));
                    }
                }
            }
        }

        item.updated_by = match actor {
            Actor::User(_) => UpdatedBy::User,
            Actor::Institute(_) => UpdatedBy::Institute,
        };
        let item = item.clone();
        self.amount_received = amount_received;
        Ok(item)
    }

    /// Replace the item list, merging by item id.
    ///
    /// Inputs carrying the id of a stored item keep that item's status and
    /// hold; inputs without an id become new `pending` items; stored items
    /// not listed are removed. Totals are recomputed for every item; an
    /// empty list leaves the request with no items and a zero total.
    pub fn replace_items(&mut self, inputs: Vec<ItemInput>) -> ResultEngine<()> {
        let mut seen = HashSet::new();
        for id in inputs.iter().filter_map(|input| input.id) {
            if !seen.insert(id) {
                return Err(EngineError::Validation(format!("duplicate item id {id}")));
            }
        }

        let mut existing: HashMap<Uuid, DonationItem> = self
            .items
            .iter()
            .map(|item| (item.id, item.clone()))
            .collect();

        let mut items = Vec::with_capacity(inputs.len());
        for input in inputs {
            let title = normalize_required_text(&input.title, "item title")?;
            let description = normalize_optional_text(input.description.as_deref()).unwrap_or_default();
            let item = match input.id {
                Some(id) => {
                    let mut item = existing
                        .remove(&id)
                        .ok_or_else(|| EngineError::KeyNotFound("item not exists".to_string()))?;
                    item.total = line_total(input.quantity, input.price)?;
                    item.title = title;
                    item.description = description;
                    item.quantity = input.quantity;
                    item.price = input.price;
                    item.updated_by = UpdatedBy::Institute;
                    item
                }
                None => DonationItem::new(title, description, input.quantity, input.price)?,
            };
            items.push(item);
        }

        self.items = items;
        self.recompute_total();
        Ok(())
    }

    /// Add `amount` to the received funds and re-run allocation.
    pub fn credit(&mut self, amount: i64) -> ResultEngine<usize> {
        require_positive_amount(amount, "credit")?;
        self.amount_received = self
            .amount_received
            .checked_add(amount)
            .ok_or_else(|| EngineError::InvalidAmount("amount received too large".to_string()))?;
        if self.amount_received > self.total_price {
            tracing::warn!(
                request_id = %self.id,
                amount_received = self.amount_received,
                total_price = self.total_price,
                "donation request received more than its total price"
            );
        }
        Ok(allocation::allocate(&mut self.items, self.amount_received))
    }

    /// Release items held since `cutoff` or earlier. Returns how many were released.
    pub fn release_stale_items(&mut self, cutoff: DateTime<Utc>) -> usize {
        let mut released = 0;
        for item in &mut self.items {
            let stale = item.status.is_held() && item.taken_at.is_some_and(|at| at <= cutoff);
            if stale {
                item.release();
                released += 1;
            }
        }
        released
    }

    pub fn has_stale_items(&self, cutoff: DateTime<Utc>) -> bool {
        self.items
            .iter()
            .any(|item| item.status.is_held() && item.taken_at.is_some_and(|at| at <= cutoff))
    }
}

fn require_holder(item: &DonationItem, user_id: Uuid) -> ResultEngine<()> {
    if item.holder() != Some(user_id) {
        return Err(EngineError::Forbidden(
            "item is held by another user".to_string(),
        ));
    }
    Ok(())
}
