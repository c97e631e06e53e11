//! Users following institutes.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{Account, AccountKind, EngineError, ResultEngine, accounts, follows};

use super::{Engine, with_tx};

impl Engine {
    /// Follow an institute. Following twice is an `ExistingKey` error.
    pub async fn follow(
        &self,
        user_id: Uuid,
        institute_id: Uuid,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, user_id, AccountKind::User)
                .await?;
            self.require_account(&db_tx, institute_id, AccountKind::Institute)
                .await?;
            if find_follow(&db_tx, user_id, institute_id).await?.is_some() {
                return Err(EngineError::ExistingKey(
                    "already following this institute".to_string(),
                ));
            }

            follows::ActiveModel::from_follow(user_id, institute_id, now)
                .insert(&db_tx)
                .await?;
            tracing::debug!(%user_id, %institute_id, "institute followed");
            Ok(())
        })
    }

    /// Stop following an institute. Not following it already is fine.
    pub async fn unfollow(&self, user_id: Uuid, institute_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, institute_id, AccountKind::Institute)
                .await?;
            follows::Entity::delete_many()
                .filter(follows::Column::UserId.eq(user_id.to_string()))
                .filter(follows::Column::InstituteId.eq(institute_id.to_string()))
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Institutes the user follows, in the order they were followed.
    pub async fn following(&self, user_id: Uuid) -> ResultEngine<Vec<Account>> {
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, user_id, AccountKind::User)
                .await?;
            let rows = follows::Entity::find()
                .filter(follows::Column::UserId.eq(user_id.to_string()))
                .order_by_asc(follows::Column::CreatedAt)
                .order_by_asc(follows::Column::InstituteId)
                .all(&db_tx)
                .await?;
            let ids = rows.into_iter().map(|row| row.institute_id).collect();
            accounts_in_order(&db_tx, ids).await
        })
    }

    /// Users following the institute, in the order they followed.
    pub async fn followers(&self, institute_id: Uuid) -> ResultEngine<Vec<Account>> {
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, institute_id, AccountKind::Institute)
                .await?;
            let rows = follows::Entity::find()
                .filter(follows::Column::InstituteId.eq(institute_id.to_string()))
                .order_by_asc(follows::Column::CreatedAt)
                .order_by_asc(follows::Column::UserId)
                .all(&db_tx)
                .await?;
            let ids = rows.into_iter().map(|row| row.user_id).collect();
            accounts_in_order(&db_tx, ids).await
        })
    }

    /// Drop a user from the institute's followers.
    pub async fn remove_follower(&self, institute_id: Uuid, user_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, institute_id, AccountKind::Institute)
                .await?;
            self.require_account(&db_tx, user_id, AccountKind::User)
                .await?;
            let follow = find_follow(&db_tx, user_id, institute_id)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("follower not exists".to_string()))?;
            follow.delete(&db_tx).await?;

            tracing::info!(%institute_id, %user_id, "follower removed");
            Ok(())
        })
    }
}

async fn find_follow(
    db: &DatabaseTransaction,
    user_id: Uuid,
    institute_id: Uuid,
) -> ResultEngine<Option<follows::Model>> {
    Ok(
        follows::Entity::find_by_id((user_id.to_string(), institute_id.to_string()))
            .one(db)
            .await?,
    )
}

/// Load accounts by id, keeping the order of `ids`.
async fn accounts_in_order(
    db: &DatabaseTransaction,
    ids: Vec<String>,
) -> ResultEngine<Vec<Account>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut by_id: HashMap<String, accounts::Model> = accounts::Entity::find()
        .filter(accounts::Column::Id.is_in(ids.clone()))
        .all(db)
        .await?
        .into_iter()
        .map(|model| (model.id.clone(), model))
        .collect();

    ids.into_iter()
        .filter_map(|id| by_id.remove(&id))
        .map(Account::try_from)
        .collect()
}
