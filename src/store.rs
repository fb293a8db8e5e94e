//! # Tabular store
//!
//! Client for the backend's row store. Four relations are in play:
//!
//! - `restaurants`: read-only, filtered/limited listing plus single-row fetch
//! - `favorites`: per-user rows, insert/delete, optionally embedding the
//!   restaurant row
//! - `profiles`: single-row fetch keyed by the identity id
//! - `reviews`: declared in the schema, unused by any screen
//!
//! All filtering happens on the backend through its query operators:
//! `ilike` for the case-insensitive name fragment, `cs` (contains) for the
//! cuisine tag, `limit` for the row cap. The client never sorts or caches;
//! every screen refetches on focus.
//!
//! [`TableStore`] is the seam. [`PostgrestStore`] speaks the real wire
//! protocol; [`MemoryStore`] mirrors the same filter semantics in-process
//! for tests and offline use.

use std::sync::{
    RwLock,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::sync::watch;
use uuid::Uuid;

use crate::{
    config::Config,
    error::AppError,
    models::{Favorite, FavoriteWithRestaurant, Profile, Restaurant, Session},
};

/// Filter state of the search screen. Empty strings count as "no filter",
/// matching the screens' falsy checks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestaurantFilter {
    pub text: Option<String>,
    pub cuisine: Option<String>,
}

impl RestaurantFilter {
    fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    fn cuisine(&self) -> Option<&str> {
        self.cuisine.as_deref().filter(|c| !c.is_empty())
    }
}

#[async_trait]
pub trait TableStore: Send + Sync {
    async fn list_restaurants(
        &self,
        filter: &RestaurantFilter,
        limit: usize,
    ) -> Result<Vec<Restaurant>, AppError>;

    async fn restaurant_by_id(&self, id: Uuid) -> Result<Option<Restaurant>, AppError>;

    async fn favorite_for(
        &self,
        user_id: Uuid,
        restaurant_id: Uuid,
    ) -> Result<Option<Favorite>, AppError>;

    async fn favorites_of(&self, user_id: Uuid) -> Result<Vec<FavoriteWithRestaurant>, AppError>;

    async fn insert_favorite(
        &self,
        user_id: Uuid,
        restaurant_id: Uuid,
    ) -> Result<Favorite, AppError>;

    async fn delete_favorite(&self, user_id: Uuid, restaurant_id: Uuid) -> Result<(), AppError>;

    async fn delete_favorite_by_id(&self, favorite_id: Uuid) -> Result<(), AppError>;

    async fn profile_by_id(&self, user_id: Uuid) -> Result<Option<Profile>, AppError>;
}

fn filter_query(filter: &RestaurantFilter, limit: usize) -> Vec<(String, String)> {
    let mut query = vec![("select".to_string(), "*".to_string())];

    if let Some(text) = filter.text() {
        query.push(("name".to_string(), format!("ilike.*{text}*")));
    }

    if let Some(cuisine) = filter.cuisine() {
        query.push(("cuisine_type".to_string(), format!("cs.{{{cuisine}}}")));
    }

    query.push(("limit".to_string(), limit.to_string()));
    query
}

/// Store backed by the hosted backend's REST endpoint.
pub struct PostgrestStore {
    client: Client,
    base: String,
    anon_key: String,
    sessions: watch::Receiver<Option<Session>>,
}

impl PostgrestStore {
    pub fn new(config: &Config, sessions: watch::Receiver<Option<Session>>) -> Self {
        Self {
            client: Client::new(),
            base: config.backend_url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            sessions,
        }
    }

    fn relation_url(&self, relation: &str) -> String {
        format!("{}/rest/v1/{relation}", self.base)
    }

    // Row-level security scopes favorites/profiles to the signed-in user,
    // so requests carry the session token when one exists.
    fn bearer(&self) -> String {
        match self.sessions.borrow().as_ref() {
            Some(session) => session.access_token.clone(),
            None => self.anon_key.clone(),
        }
    }

    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        relation: &str,
        query: &[(String, String)],
    ) -> Result<Vec<T>, AppError> {
        #[cfg(feature = "verbose")]
        println!("GET {} {:?}", self.relation_url(relation), query);

        let response = self
            .client
            .get(self.relation_url(relation))
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
            .query(query)
            .send()
            .await?;

        Ok(checked(response).await?.json().await?)
    }

    // Single-object requests answer 406 when no row matches; that is
    // not-found, not a failure.
    async fn fetch_row<T: DeserializeOwned>(
        &self,
        relation: &str,
        query: &[(String, String)],
    ) -> Result<Option<T>, AppError> {
        let response = self
            .client
            .get(self.relation_url(relation))
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
            .header("Accept", "application/vnd.pgrst.object+json")
            .query(query)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_ACCEPTABLE {
            return Ok(None);
        }

        Ok(Some(checked(response).await?.json().await?))
    }

    async fn delete_rows(&self, relation: &str, query: &[(String, String)]) -> Result<(), AppError> {
        let response = self
            .client
            .delete(self.relation_url(relation))
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
            .query(query)
            .send()
            .await?;

        checked(response).await?;
        Ok(())
    }
}

async fn checked(response: Response) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(AppError::Remote(format!("{status}: {body}")))
}

fn eq(column: &str, value: impl ToString) -> (String, String) {
    (column.to_string(), format!("eq.{}", value.to_string()))
}

#[async_trait]
impl TableStore for PostgrestStore {
    async fn list_restaurants(
        &self,
        filter: &RestaurantFilter,
        limit: usize,
    ) -> Result<Vec<Restaurant>, AppError> {
        self.fetch_rows("restaurants", &filter_query(filter, limit))
            .await
    }

    async fn restaurant_by_id(&self, id: Uuid) -> Result<Option<Restaurant>, AppError> {
        self.fetch_row("restaurants", &[("select".to_string(), "*".to_string()), eq("id", id)])
            .await
    }

    async fn favorite_for(
        &self,
        user_id: Uuid,
        restaurant_id: Uuid,
    ) -> Result<Option<Favorite>, AppError> {
        self.fetch_row(
            "favorites",
            &[
                ("select".to_string(), "*".to_string()),
                eq("user_id", user_id),
                eq("restaurant_id", restaurant_id),
            ],
        )
        .await
    }

    async fn favorites_of(&self, user_id: Uuid) -> Result<Vec<FavoriteWithRestaurant>, AppError> {
        self.fetch_rows(
            "favorites",
            &[
                ("select".to_string(), "id,restaurant:restaurants(*)".to_string()),
                eq("user_id", user_id),
            ],
        )
        .await
    }

    async fn insert_favorite(
        &self,
        user_id: Uuid,
        restaurant_id: Uuid,
    ) -> Result<Favorite, AppError> {
        let response = self
            .client
            .post(self.relation_url("favorites"))
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
            .header("Prefer", "return=representation")
            .json(&json!({ "user_id": user_id, "restaurant_id": restaurant_id }))
            .send()
            .await?;

        let mut rows: Vec<Favorite> = checked(response).await?.json().await?;
        rows.pop()
            .ok_or_else(|| AppError::Remote("insert returned no row".to_string()))
    }

    async fn delete_favorite(&self, user_id: Uuid, restaurant_id: Uuid) -> Result<(), AppError> {
        self.delete_rows(
            "favorites",
            &[eq("user_id", user_id), eq("restaurant_id", restaurant_id)],
        )
        .await
    }

    async fn delete_favorite_by_id(&self, favorite_id: Uuid) -> Result<(), AppError> {
        self.delete_rows("favorites", &[eq("id", favorite_id)]).await
    }

    async fn profile_by_id(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        self.fetch_row("profiles", &[("select".to_string(), "*".to_string()), eq("id", user_id)])
            .await
    }
}

/// Call counters used by tests to pin down how many remote calls a flow
/// issues.
#[derive(Debug, Default)]
pub struct StoreCalls {
    pub favorite_probes: AtomicUsize,
    pub favorite_inserts: AtomicUsize,
    pub favorite_deletes: AtomicUsize,
}

/// In-process store with the same filter semantics as the backend.
#[derive(Default)]
pub struct MemoryStore {
    restaurants: RwLock<Vec<Restaurant>>,
    favorites: RwLock<Vec<Favorite>>,
    profiles: RwLock<Vec<Profile>>,
    pub calls: StoreCalls,
}

impl MemoryStore {
    pub fn with_restaurants(restaurants: Vec<Restaurant>) -> Self {
        Self {
            restaurants: RwLock::new(restaurants),
            ..Self::default()
        }
    }

    pub fn add_profile(&self, profile: Profile) {
        self.profiles.write().expect("profiles lock").push(profile);
    }

    pub fn favorite_rows(&self) -> Vec<Favorite> {
        self.favorites.read().expect("favorites lock").clone()
    }
}

fn matches(restaurant: &Restaurant, filter: &RestaurantFilter) -> bool {
    if let Some(text) = filter.text() {
        if !restaurant.name.to_lowercase().contains(&text.to_lowercase()) {
            return false;
        }
    }

    if let Some(cuisine) = filter.cuisine() {
        if !restaurant.cuisine_type.iter().any(|tag| tag == cuisine) {
            return false;
        }
    }

    true
}

#[async_trait]
impl TableStore for MemoryStore {
    async fn list_restaurants(
        &self,
        filter: &RestaurantFilter,
        limit: usize,
    ) -> Result<Vec<Restaurant>, AppError> {
        let restaurants = self.restaurants.read().expect("restaurants lock");

        Ok(restaurants
            .iter()
            .filter(|restaurant| matches(restaurant, filter))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn restaurant_by_id(&self, id: Uuid) -> Result<Option<Restaurant>, AppError> {
        let restaurants = self.restaurants.read().expect("restaurants lock");

        Ok(restaurants.iter().find(|r| r.id == id).cloned())
    }

    async fn favorite_for(
        &self,
        user_id: Uuid,
        restaurant_id: Uuid,
    ) -> Result<Option<Favorite>, AppError> {
        self.calls.favorite_probes.fetch_add(1, Ordering::SeqCst);
        let favorites = self.favorites.read().expect("favorites lock");

        Ok(favorites
            .iter()
            .find(|f| f.user_id == user_id && f.restaurant_id == restaurant_id)
            .cloned())
    }

    async fn favorites_of(&self, user_id: Uuid) -> Result<Vec<FavoriteWithRestaurant>, AppError> {
        let favorites = self.favorites.read().expect("favorites lock");
        let restaurants = self.restaurants.read().expect("restaurants lock");

        Ok(favorites
            .iter()
            .filter(|f| f.user_id == user_id)
            .filter_map(|f| {
                restaurants
                    .iter()
                    .find(|r| r.id == f.restaurant_id)
                    .map(|r| FavoriteWithRestaurant {
                        id: f.id,
                        restaurant: r.clone(),
                    })
            })
            .collect())
    }

    async fn insert_favorite(
        &self,
        user_id: Uuid,
        restaurant_id: Uuid,
    ) -> Result<Favorite, AppError> {
        self.calls.favorite_inserts.fetch_add(1, Ordering::SeqCst);
        let mut favorites = self.favorites.write().expect("favorites lock");

        if favorites
            .iter()
            .any(|f| f.user_id == user_id && f.restaurant_id == restaurant_id)
        {
            return Err(AppError::Remote(
                "duplicate key value violates unique constraint \"favorites_user_id_restaurant_id_key\"".to_string(),
            ));
        }

        let favorite = Favorite {
            id: Uuid::new_v4(),
            user_id,
            restaurant_id,
            created_at: Utc::now(),
        };
        favorites.push(favorite.clone());

        Ok(favorite)
    }

    async fn delete_favorite(&self, user_id: Uuid, restaurant_id: Uuid) -> Result<(), AppError> {
        self.calls.favorite_deletes.fetch_add(1, Ordering::SeqCst);
        let mut favorites = self.favorites.write().expect("favorites lock");
        favorites.retain(|f| !(f.user_id == user_id && f.restaurant_id == restaurant_id));

        Ok(())
    }

    async fn delete_favorite_by_id(&self, favorite_id: Uuid) -> Result<(), AppError> {
        self.calls.favorite_deletes.fetch_add(1, Ordering::SeqCst);
        let mut favorites = self.favorites.write().expect("favorites lock");
        favorites.retain(|f| f.id != favorite_id);

        Ok(())
    }

    async fn profile_by_id(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        let profiles = self.profiles.read().expect("profiles lock");

        Ok(profiles.iter().find(|p| p.id == user_id).cloned())
    }
}
