use sea_orm::{DatabaseTransaction, TransactionTrait};
use uuid::Uuid;

use crate::{DonationRequest, ResultEngine};

use super::{Engine, with_tx};

impl Engine {
    /// Credit `amount` to a donation request and recompute collected items.
    ///
    /// This is the entry point used by payment recording; it is public for
    /// callers that settle funds outside of [`Engine::record_payment`].
    pub async fn apply_credit(&self, request_id: Uuid, amount: i64) -> ResultEngine<DonationRequest> {
        with_tx!(self, |db_tx| self.credit_request(&db_tx, request_id, amount).await)
    }

    pub(super) async fn credit_request(
        &self,
        db: &DatabaseTransaction,
        request_id: Uuid,
        amount: i64,
    ) -> ResultEngine<DonationRequest> {
        let mut request = self.load_request(db, request_id).await?;
        let collected = request.credit(amount)?;
        self.save_request(db, &mut request).await?;

        tracing::info!(
            request_id = %request.id,
            amount,
            amount_received = request.amount_received,
            collected,
            "credit applied"
        );
        Ok(request)
    }
}
