use std::sync::Arc;

use tracing::{error, warn};
use uuid::Uuid;

use crate::{
    config::Config,
    error::AppError,
    favorites::{FavoriteStatus, Favorites},
    location::{LocationSource, Region, ResolvedRegion, resolve_region},
    map::RestaurantLinks,
    models::{FavoriteWithRestaurant, Profile, Restaurant},
    profile::Profiles,
    restaurants::Restaurants,
    session::{AuthClient, SessionGate},
    store::{PostgrestStore, RestaurantFilter, TableStore},
};

pub struct App<S> {
    pub config: Config,
    pub sessions: SessionGate,
    pub restaurants: Restaurants<S>,
    pub favorites: Favorites<S>,
    pub profiles: Profiles<S>,
    pub store: Arc<S>,
}

impl App<PostgrestStore> {
    pub async fn new() -> Arc<Self> {
        Self::with_config(Config::load()).await
    }

    pub async fn with_config(config: Config) -> Arc<Self> {
        let sessions = SessionGate::new(AuthClient::new(&config));

        if let Some(token) = config.access_token.clone() {
            sessions.restore(&token).await;
        }

        let store = Arc::new(PostgrestStore::new(&config, sessions.subscribe()));
        Self::assemble(config, sessions, store)
    }
}

impl<S: TableStore> App<S> {
    /// Wires the app over any store implementation, memory included.
    pub fn with_store(config: Config, store: Arc<S>) -> Arc<Self> {
        let sessions = SessionGate::new(AuthClient::new(&config));
        Self::assemble(config, sessions, store)
    }

    fn assemble(config: Config, sessions: SessionGate, store: Arc<S>) -> Arc<Self> {
        Arc::new(Self {
            restaurants: Restaurants::new(store.clone()),
            favorites: Favorites::new(store.clone()),
            profiles: Profiles::new(store.clone()),
            config,
            sessions,
            store,
        })
    }
}

/// Everything the home screen renders: the resolved viewport and the
/// unfiltered listing. The two fetches are independent and only converge
/// here.
pub struct HomeView {
    pub resolution: ResolvedRegion,
    pub restaurants: Vec<Restaurant>,
}

/// Everything the detail screen renders.
pub struct RestaurantDetail {
    pub restaurant: Restaurant,
    pub favorite: FavoriteStatus,
    pub region: Region,
    pub links: RestaurantLinks,
}

// Screen-shaped helpers. Remote failures are logged and degrade to the
// empty state; nothing propagates past the screen boundary.
impl<S: TableStore> App<S> {
    pub async fn home_view(&self, location: &dyn LocationSource) -> HomeView {
        let (resolution, restaurants) =
            tokio::join!(resolve_region(location), self.restaurants.home());

        let restaurants = restaurants.unwrap_or_else(|e| {
            error!("Error fetching restaurants: {e}");
            Vec::new()
        });

        HomeView {
            resolution,
            restaurants,
        }
    }

    pub async fn search_view(&self, filter: &RestaurantFilter) -> Vec<Restaurant> {
        self.restaurants.search(filter).await.unwrap_or_else(|e| {
            error!("Error searching restaurants: {e}");
            Vec::new()
        })
    }

    /// Detail fetch and favorite probe run concurrently; each lands in its
    /// own slot. A missing row is `None`, distinct from the loading state.
    pub async fn restaurant_detail(&self, id: Uuid) -> Option<RestaurantDetail> {
        let identity = self.sessions.current_identity();
        let (restaurant, status) = tokio::join!(
            self.restaurants.get(id),
            self.favorites.status(identity.as_ref(), id),
        );

        let restaurant = match restaurant {
            Ok(Some(restaurant)) => restaurant,
            Ok(None) => return None,
            Err(e) => {
                error!("Error fetching restaurant: {e}");
                return None;
            }
        };

        let favorite = status.unwrap_or_else(|e| {
            warn!("Favorite lookup failed: {e}");
            FavoriteStatus::NotFavorited
        });

        Some(RestaurantDetail {
            region: Region::pinpoint(restaurant.latitude, restaurant.longitude),
            links: RestaurantLinks::for_restaurant(&restaurant),
            restaurant,
            favorite,
        })
    }

    pub async fn toggle_favorite(&self, restaurant_id: Uuid) -> Result<FavoriteStatus, AppError> {
        let identity = self.sessions.current_identity();
        self.favorites.toggle(identity.as_ref(), restaurant_id).await
    }

    pub async fn favorites_view(&self) -> Vec<FavoriteWithRestaurant> {
        let identity = self.sessions.current_identity();

        self.favorites.list(identity.as_ref()).await.unwrap_or_else(|e| {
            error!("Error fetching favorites: {e}");
            Vec::new()
        })
    }

    pub async fn profile_view(&self) -> Option<Profile> {
        let identity = self.sessions.current_identity();

        match self.profiles.current(identity.as_ref()).await {
            Ok(profile) => profile,
            Err(e) => {
                error!("Error fetching profile: {e}");
                None
            }
        }
    }
}
