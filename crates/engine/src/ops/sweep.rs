use chrono::{DateTime, Duration, Utc};
use sea_orm::{QueryFilter, QuerySelect, TransactionTrait, prelude::*};
use serde::Serialize;
use uuid::Uuid;

use crate::{ItemStatus, ResultEngine, donation_items, util::parse_uuid};

use super::{Engine, with_tx};

/// Outcome of a stale-item sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Requests that had at least one item released.
    pub requests: usize,
    /// Items put back to `pending`.
    pub items: usize,
}

impl Engine {
    /// Release items held for longer than `hold`.
    ///
    /// Every `taken`/`awaited` item with `taken_at <= now - hold` goes back to
    /// `pending` with its hold cleared. Requests are processed one by one,
    /// each in its own transaction; a failure stops the sweep and keeps the
    /// requests already saved. Running it again picks up the rest.
    pub async fn release_stale_items(
        &self,
        now: DateTime<Utc>,
        hold: Duration,
    ) -> ResultEngine<SweepReport> {
        let cutoff = now - hold;
        let request_ids: Vec<String> = donation_items::Entity::find()
            .select_only()
            .column(donation_items::Column::RequestId)
            .distinct()
            .filter(
                donation_items::Column::Status
                    .is_in([ItemStatus::Taken.as_str(), ItemStatus::Awaited.as_str()]),
            )
            .filter(donation_items::Column::TakenAt.lte(cutoff))
            .into_tuple()
            .all(&self.database)
            .await?;

        let mut report = SweepReport::default();
        for raw in request_ids {
            let request_id = parse_uuid(&raw, "donation request")?;
            let released = self.release_request_items(request_id, cutoff).await?;
            if released > 0 {
                report.requests += 1;
                report.items += released;
            }
        }

        tracing::info!(
            requests = report.requests,
            items = report.items,
            %cutoff,
            "stale item sweep finished"
        );
        Ok(report)
    }

    async fn release_request_items(
        &self,
        request_id: Uuid,
        cutoff: DateTime<Utc>,
    ) -> ResultEngine<usize> {
        with_tx!(self, |db_tx| {
            let mut request = self.load_request(&db_tx, request_id).await?;
            let released = request.release_stale_items(cutoff);
            if released > 0 {
                self.save_request(&db_tx, &mut request).await?;
                tracing::debug!(request_id = %request.id, released, "stale items released");
            }
            Ok(released)
        })
    }
}
