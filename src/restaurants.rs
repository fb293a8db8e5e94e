use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::AppError,
    models::Restaurant,
    store::{RestaurantFilter, TableStore},
};

/// Row cap for the unfiltered home listing.
pub const HOME_LIMIT: usize = 50;
/// Row cap for the search screen. Re-queried on every filter change.
pub const SEARCH_LIMIT: usize = 20;

/// Translates filter state into remote queries. Ordering is whatever the
/// backend returns; no client-side sort.
pub struct Restaurants<S> {
    store: Arc<S>,
}

impl<S: TableStore> Restaurants<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn home(&self) -> Result<Vec<Restaurant>, AppError> {
        self.store
            .list_restaurants(&RestaurantFilter::default(), HOME_LIMIT)
            .await
    }

    pub async fn search(&self, filter: &RestaurantFilter) -> Result<Vec<Restaurant>, AppError> {
        self.store.list_restaurants(filter, SEARCH_LIMIT).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Restaurant>, AppError> {
        self.store.restaurant_by_id(id).await
    }
}
