//! Funds allocation.
//!
//! Decides which items are covered by the money a request has received.
//! Items are visited cheapest first (stable on ties) and marked `collected`
//! while the running remainder covers them; the walk stops at the first item
//! it cannot cover. The stored item order is never changed.

use crate::{DonationItem, ItemStatus};

/// Recompute `collected` items for `amount_received`.
///
/// Returns the number of items collected by this pass. Re-running with the
/// same inputs yields the same statuses.
pub fn allocate(items: &mut [DonationItem], amount_received: i64) -> usize {
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by_key(|&index| items[index].total);

    let mut remaining = amount_received;
    let mut collected = 0;
    for index in order {
        let item = &mut items[index];
        if remaining >= item.total {
            item.status = ItemStatus::Collected;
            remaining -= item.total;
            collected += 1;
            continue;
        }
        if item.status != ItemStatus::Collected {
            item.release();
        }
        break;
    }
    collected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(totals: &[i64]) -> Vec<DonationItem> {
        totals
            .iter()
            .map(|&total| DonationItem::new(format!("item {total}"), String::new(), 1, total).unwrap())
            .collect()
    }

    fn statuses(items: &[DonationItem]) -> Vec<ItemStatus> {
        items.iter().map(|item| item.status).collect()
    }

    #[test]
    fn cheapest_items_are_collected_first() {
        let mut items = items(&[30, 10, 50]);
        assert_eq!(allocate(&mut items, 40), 2);
        assert_eq!(
            statuses(&items),
            vec![
                ItemStatus::Collected,
                ItemStatus::Collected,
                ItemStatus::Pending
            ]
        );
    }

    #[test]
    fn allocation_is_idempotent() {
        let mut items = items(&[30, 10, 50]);
        allocate(&mut items, 40);
        let first = statuses(&items);
        allocate(&mut items, 40);
        assert_eq!(statuses(&items), first);
    }

    #[test]
    fn nothing_received_collects_nothing() {
        let mut items = items(&[30, 10, 50]);
        assert_eq!(allocate(&mut items, 0), 0);
        assert!(items.iter().all(|item| item.status == ItemStatus::Pending));
    }

    #[test]
    fn full_funding_collects_everything() {
        let mut items = items(&[30, 10, 50]);
        assert_eq!(allocate(&mut items, 90), 3);
        assert!(items.iter().all(|item| item.status == ItemStatus::Collected));

        let mut items = self::items(&[30, 10, 50]);
        assert_eq!(allocate(&mut items, 500), 3);
    }

    #[test]
    fn ties_keep_stored_order() {
        let mut items = items(&[20, 20]);
        allocate(&mut items, 20);
        assert_eq!(
            statuses(&items),
            vec![ItemStatus::Collected, ItemStatus::Pending]
        );
    }

    #[test]
    fn uncovered_taken_item_is_released() {
        let mut items = items(&[10, 50]);
        items[1].status = ItemStatus::Taken;
        items[1].taken_by = Some(uuid::Uuid::new_v4());

        allocate(&mut items, 10);
        assert_eq!(items[1].status, ItemStatus::Pending);
        assert_eq!(items[1].taken_by, None);
    }

    #[test]
    fn previously_collected_item_stays_collected() {
        let mut items = items(&[10, 50]);
        items[1].status = ItemStatus::Collected;

        allocate(&mut items, 10);
        assert_eq!(items[1].status, ItemStatus::Collected);
    }

    #[test]
    fn items_after_the_first_uncovered_are_untouched() {
        let mut items = items(&[10, 40, 50]);
        items[2].status = ItemStatus::Awaited;

        allocate(&mut items, 20);
        assert_eq!(
            statuses(&items),
            vec![
                ItemStatus::Collected,
                ItemStatus::Pending,
                ItemStatus::Awaited
            ]
        );
    }
}
