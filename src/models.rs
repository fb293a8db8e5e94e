use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Row in the `restaurants` relation.
///
/// Latitude/longitude are always present so every row can be placed on the
/// map. `price_range` is a repetition count for the price glyphs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub price_range: u8,
    pub cuisine_type: Vec<String>,
    pub opening_hours: Option<Value>,
    pub image_url: Option<String>,
    pub rating: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row in the `profiles` relation. Created by a backend trigger at
/// registration, keyed by the identity id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row in the `favorites` relation. The backend enforces at most one row
/// per (user_id, restaurant_id); the client treats any row as "favorited".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: Uuid,
    pub user_id: Uuid,
    pub restaurant_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Favorite row with its restaurant embedded, as the favorites screen
/// fetches it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteWithRestaurant {
    pub id: Uuid,
    pub restaurant: Restaurant,
}

/// Row in the `reviews` relation. Declared in the schema but not read or
/// written by any screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub restaurant_id: Uuid,
    pub rating: f64,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The authenticated user record controlling row-level access to favorites
/// and profile data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: Option<String>,
}

/// An access token paired with the identity it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub user: Identity,
}
