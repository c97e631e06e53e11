use sea_orm::{
    ActiveValue, DatabaseConnection, DatabaseTransaction, QueryFilter, QueryOrder, prelude::*,
};
use uuid::Uuid;

use crate::{DonationRequest, EngineError, ResultEngine, donation_items, donation_requests};

mod access;
mod accounts;
mod approvals;
mod credits;
mod donations;
mod follows;
mod payments;
mod posts;
mod sweep;

pub use payments::WalletView;
pub use sweep::SweepReport;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Load a donation request with its items in stored order.
    pub(super) async fn load_request(
        &self,
        db: &DatabaseTransaction,
        request_id: Uuid,
    ) -> ResultEngine<DonationRequest> {
        let model = donation_requests::Entity::find_by_id(request_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("donation request not exists".to_string()))?;
        let items = donation_items::Entity::find()
            .filter(donation_items::Column::RequestId.eq(request_id.to_string()))
            .order_by_asc(donation_items::Column::Position)
            .all(db)
            .await?;
        DonationRequest::try_from((model, items))
    }

    /// Save the whole aggregate.
    ///
    /// The row is only updated if its `version` still matches the loaded
    /// one; otherwise another writer saved first and `Conflict` is returned.
    /// On success the in-memory version is bumped.
    pub(super) async fn save_request(
        &self,
        db: &DatabaseTransaction,
        request: &mut DonationRequest,
    ) -> ResultEngine<()> {
        let expected = request.version;
        let mut model: donation_requests::ActiveModel = (&*request).into();
        model.id = ActiveValue::NotSet;
        model.institute_id = ActiveValue::NotSet;
        model.created_at = ActiveValue::NotSet;
        model.version = ActiveValue::Set(expected + 1);

        let result = donation_requests::Entity::update_many()
            .set(model)
            .filter(donation_requests::Column::Id.eq(request.id.to_string()))
            .filter(donation_requests::Column::Version.eq(expected))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::Conflict(format!(
                "donation request {} was modified concurrently",
                request.id
            )));
        }
        request.version = expected + 1;

        donation_items::Entity::delete_many()
            .filter(donation_items::Column::RequestId.eq(request.id.to_string()))
            .exec(db)
            .await?;
        self.insert_items(db, request).await
    }

    pub(super) async fn insert_items(
        &self,
        db: &DatabaseTransaction,
        request: &DonationRequest,
    ) -> ResultEngine<()> {
        if request.items.is_empty() {
            return Ok(());
        }
        let models = request
            .items
            .iter()
            .enumerate()
            .map(|(position, item)| {
                donation_items::ActiveModel::from_item(request.id, position, item)
            });
        donation_items::Entity::insert_many(models)
            .exec_without_returning(db)
            .await?;
        Ok(())
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use migration::MigratorTrait;
    use sea_orm::{Database, TransactionTrait};

    use super::*;
    use crate::{AccountKind, InstituteType, ItemInput, NewAccount, NewDonationRequest};

    async fn engine() -> Engine {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        Engine::builder().database(db).build().await.unwrap()
    }

    #[tokio::test]
    async fn stale_version_is_a_conflict_and_leaves_the_row_intact() {
        let engine = engine().await;
        let masjid = engine
            .create_account(
                NewAccount::new("masjid", "password", AccountKind::Institute)
                    .institute_type(InstituteType::Masjid),
                Utc::now(),
            )
            .await
            .unwrap();
        let created = engine
            .create_donation_request(
                NewDonationRequest::new(masjid.id, "Winter drive", "Blankets", Utc::now())
                    .item(ItemInput::new("Blanket", 2, 300))
                    .item(ItemInput::new("Rice", 1, 150)),
            )
            .await
            .unwrap();

        let db_tx = engine.database.begin().await.unwrap();
        let mut request = engine.load_request(&db_tx, created.id).await.unwrap();
        request.version = 5;
        request.amount_received = 450;
        request.items.clear();

        let err = engine.save_request(&db_tx, &mut request).await.unwrap_err();
        assert_eq!(
            err,
            EngineError::Conflict(format!(
                "donation request {} was modified concurrently",
                created.id
            ))
        );
        assert_eq!(request.version, 5);
        db_tx.rollback().await.unwrap();

        let stored = engine.donation_request(created.id).await.unwrap();
        assert_eq!(stored.version, created.version);
        assert_eq!(stored.amount_received, 0);
        assert_eq!(stored.items, created.items);
        assert_eq!(stored.total_price, 750);
    }
}
