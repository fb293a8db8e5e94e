//! # Favorites
//!
//! Membership state per (user, restaurant) pair, mirrored from the
//! `favorites` relation. Toggling inserts or deletes the row; the relation
//! itself is the source of truth and every screen re-derives membership on
//! load.
//!
//! Toggles are serialized per pair: a toggle holds the pair's lock across
//! the membership probe and the mutation, so two rapid taps settle as two
//! sequential transitions instead of racing inserts.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{FavoriteWithRestaurant, Identity},
    store::TableStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteStatus {
    NotFavorited,
    Favorited,
}

impl FavoriteStatus {
    pub fn is_favorited(self) -> bool {
        self == Self::Favorited
    }
}

pub struct Favorites<S> {
    store: Arc<S>,
    locks: DashMap<(Uuid, Uuid), Arc<Mutex<()>>>,
}

impl<S: TableStore> Favorites<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            locks: DashMap::new(),
        }
    }

    fn pair_lock(&self, user_id: Uuid, restaurant_id: Uuid) -> Arc<Mutex<()>> {
        self.locks
            .entry((user_id, restaurant_id))
            .or_default()
            .clone()
    }

    /// Membership probe for the detail screen. Anonymous short-circuits to
    /// `NotFavorited` without a remote call.
    pub async fn status(
        &self,
        identity: Option<&Identity>,
        restaurant_id: Uuid,
    ) -> Result<FavoriteStatus, AppError> {
        let Some(identity) = identity else {
            return Ok(FavoriteStatus::NotFavorited);
        };

        let row = self.store.favorite_for(identity.id, restaurant_id).await?;

        Ok(match row {
            Some(_) => FavoriteStatus::Favorited,
            None => FavoriteStatus::NotFavorited,
        })
    }

    /// Flips membership and returns the new state. Fails fast when signed
    /// out; on a remote failure the relation and the returned error leave
    /// the previous state intact.
    pub async fn toggle(
        &self,
        identity: Option<&Identity>,
        restaurant_id: Uuid,
    ) -> Result<FavoriteStatus, AppError> {
        let identity = identity.ok_or(AppError::SignedOut)?;

        let lock = self.pair_lock(identity.id, restaurant_id);
        let _guard = lock.lock().await;

        match self.store.favorite_for(identity.id, restaurant_id).await? {
            Some(_) => {
                self.store
                    .delete_favorite(identity.id, restaurant_id)
                    .await?;
                Ok(FavoriteStatus::NotFavorited)
            }
            None => {
                self.store
                    .insert_favorite(identity.id, restaurant_id)
                    .await?;
                Ok(FavoriteStatus::Favorited)
            }
        }
    }

    /// Favorites screen listing, restaurant rows embedded. Anonymous users
    /// have none.
    pub async fn list(
        &self,
        identity: Option<&Identity>,
    ) -> Result<Vec<FavoriteWithRestaurant>, AppError> {
        let Some(identity) = identity else {
            return Ok(Vec::new());
        };

        self.store.favorites_of(identity.id).await
    }

    /// Removal from the favorites list, scoped by row id. One delete call
    /// per invocation.
    pub async fn remove(&self, favorite_id: Uuid) -> Result<(), AppError> {
        self.store.delete_favorite_by_id(favorite_id).await
    }
}
