use chrono::{DateTime, Utc};
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    AccountKind, Actor, DonationItem, DonationRequest, DonationRequestFilter,
    DonationRequestPatch, EngineError, ItemInput, ItemStatus, NewDonationRequest, ResultEngine,
    donation_items, donation_requests,
    util::normalize_required_text,
};

use super::{Engine, with_tx};

impl Engine {
    /// Publish a new donation request for an institute.
    pub async fn create_donation_request(
        &self,
        cmd: NewDonationRequest,
    ) -> ResultEngine<DonationRequest> {
        let title = normalize_required_text(&cmd.title, "title")?;
        let description = normalize_required_text(&cmd.description, "description")?;

        let mut request = DonationRequest::new(
            cmd.institute_id,
            title,
            description,
            Vec::new(),
            cmd.created_at,
        );
        request.replace_items(cmd.items)?;

        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, cmd.institute_id, AccountKind::Institute)
                .await?;

            let model: donation_requests::ActiveModel = (&request).into();
            model.insert(&db_tx).await?;
            self.insert_items(&db_tx, &request).await?;

            tracing::info!(
                request_id = %request.id,
                institute_id = %request.institute_id,
                items = request.items.len(),
                total_price = request.total_price,
                "donation request created"
            );
            Ok(request)
        })
    }

    /// List donation requests, newest first.
    pub async fn donation_requests(
        &self,
        filter: DonationRequestFilter,
    ) -> ResultEngine<Vec<DonationRequest>> {
        let mut query = donation_requests::Entity::find();
        if let Some(status) = filter.status {
            query = query.filter(donation_requests::Column::Status.eq(status.as_str()));
        }
        if let Some(institute_id) = filter.institute_id {
            query = query
                .filter(donation_requests::Column::InstituteId.eq(institute_id.to_string()));
        }

        let rows = query
            .find_with_related(donation_items::Entity)
            .order_by_desc(donation_requests::Column::CreatedAt)
            .order_by_desc(donation_requests::Column::Id)
            .order_by_asc(donation_items::Column::Position)
            .all(&self.database)
            .await?;

        rows.into_iter().map(DonationRequest::try_from).collect()
    }

    /// Return one donation request with its items.
    pub async fn donation_request(&self, request_id: Uuid) -> ResultEngine<DonationRequest> {
        with_tx!(self, |db_tx| self.load_request(&db_tx, request_id).await)
    }

    /// Patch title, description, status and optionally the item list.
    ///
    /// Only the owning institute may edit. A non-empty `items` list is
    /// applied like [`Engine::edit_items`]; an empty one is ignored.
    pub async fn edit_donation_request(
        &self,
        request_id: Uuid,
        institute_id: Uuid,
        patch: DonationRequestPatch,
    ) -> ResultEngine<DonationRequest> {
        let title = patch
            .title
            .as_deref()
            .map(|title| normalize_required_text(title, "title"))
            .transpose()?;
        let description = patch
            .description
            .as_deref()
            .map(|description| normalize_required_text(description, "description"))
            .transpose()?;

        with_tx!(self, |db_tx| {
            let mut request = self.load_request(&db_tx, request_id).await?;
            require_owner(&request, institute_id)?;

            if let Some(title) = title {
                request.title = title;
            }
            if let Some(description) = description {
                request.description = description;
            }
            if let Some(status) = patch.status {
                request.status = status;
            }
            if let Some(items) = patch.items.filter(|items| !items.is_empty()) {
                request.replace_items(items)?;
            }

            self.save_request(&db_tx, &mut request).await?;
            Ok(request)
        })
    }

    /// Replace the item list of a request, merging by item id.
    pub async fn edit_items(
        &self,
        request_id: Uuid,
        institute_id: Uuid,
        items: Vec<ItemInput>,
    ) -> ResultEngine<DonationRequest> {
        with_tx!(self, |db_tx| {
            let mut request = self.load_request(&db_tx, request_id).await?;
            require_owner(&request, institute_id)?;
            request.replace_items(items)?;
            self.save_request(&db_tx, &mut request).await?;

            tracing::debug!(
                request_id = %request.id,
                items = request.items.len(),
                total_price = request.total_price,
                "donation items replaced"
            );
            Ok(request)
        })
    }

    /// Change one item's status on behalf of a user or institute.
    pub async fn transition_item_status(
        &self,
        request_id: Uuid,
        item_id: Uuid,
        actor: Actor,
        target: ItemStatus,
        now: DateTime<Utc>,
    ) -> ResultEngine<DonationItem> {
        with_tx!(self, |db_tx| {
            let mut request = self.load_request(&db_tx, request_id).await?;
            let item = request.transition_item(item_id, actor, target, now)?;
            self.save_request(&db_tx, &mut request).await?;

            tracing::debug!(
                request_id = %request.id,
                item_id = %item.id,
                status = item.status.as_str(),
                amount_received = request.amount_received,
                "item status changed"
            );
            Ok(item)
        })
    }
}

fn require_owner(request: &DonationRequest, institute_id: Uuid) -> ResultEngine<()> {
    if request.institute_id != institute_id {
        return Err(EngineError::Forbidden(
            "only the owning institute can edit this request".to_string(),
        ));
    }
    Ok(())
}

