//! # GeoResto
//!
//! Client core for a restaurant discovery app: browse nearby restaurants on
//! a map or list, search and filter by cuisine, open a detail view, keep
//! favorites. Everything stateful lives in a hosted backend; this crate is
//! the application side of it.
//!
//!
//!
//! # General Infrastructure
//! - The hosted backend exposes an auth endpoint (`/auth/v1`) and a row
//!   endpoint (`/rest/v1`) over four relations: restaurants, profiles,
//!   favorites, reviews
//! - Filtering, row caps and row-level security all happen on the backend;
//!   the client sends operators (`ilike`, `cs`, `limit`) and renders what
//!   comes back
//! - The client holds no authoritative state: screens refetch on focus and
//!   on every filter change, nothing is cached
//! - Reads work anonymously; favorite mutations and profile reads require a
//!   session and fail fast without one
//!
//!
//!
//! # Screens
//!
//! | Screen | Reads | Writes |
//! |---|---|---|
//! | Home | viewport resolution + unfiltered listing (cap 50) | — |
//! | Search | filtered listing (cap 20), re-run per keystroke | — |
//! | Detail | restaurant by id + favorite probe, concurrently | favorite toggle |
//! | Favorites | favorites of user with embedded restaurants | removal by row id |
//! | Profile | profile row of the identity | — (menu stubs) |
//!
//!
//!
//! # Notes
//!
//! ## Favorite toggles
//! Toggles are serialized per (user, restaurant) pair with an async lock,
//! so rapid double-taps settle as two sequential transitions and the
//! relation never ends up with a duplicate or orphan row on our account.
//! Cross-device duplicates stay the backend unique constraint's job.
//!
//! ## Location
//! One position sample at startup, no tracking. Permission denial and a
//! failed sample both degrade to the default Paris viewport with a
//! non-blocking notice; the listing fetch is independent and populates
//! either way.

pub mod config;
pub mod error;
pub mod favorites;
pub mod location;
pub mod map;
pub mod models;
pub mod profile;
pub mod render;
pub mod restaurants;
pub mod session;
pub mod state;
pub mod store;

pub use error::AppError;
pub use state::App;
