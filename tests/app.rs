use std::sync::{Arc, atomic::Ordering};

use chrono::Utc;
use uuid::Uuid;

use georesto::{
    App,
    config::Config,
    error::AppError,
    favorites::FavoriteStatus,
    location::{DEFAULT_REGION, NoLocation},
    models::{Identity, Restaurant},
    store::{MemoryStore, RestaurantFilter},
};

fn config() -> Config {
    Config {
        backend_url: "http://localhost:54321".to_string(),
        anon_key: "anon".to_string(),
        access_token: None,
    }
}

fn restaurant(name: &str, cuisines: &[&str], price_range: u8) -> Restaurant {
    Restaurant {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: None,
        address: "12 rue des Martyrs, Paris".to_string(),
        latitude: 48.878,
        longitude: 2.34,
        phone: None,
        website: None,
        price_range,
        cuisine_type: cuisines.iter().map(|c| c.to_string()).collect(),
        opening_hours: None,
        image_url: None,
        rating: Some(4.0),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn many_restaurants(count: usize) -> Vec<Restaurant> {
    let cuisines = ["Français", "Italien", "Japonais"];

    (0..count)
        .map(|i| {
            restaurant(
                &format!("Restaurant {i}"),
                &[cuisines[i % cuisines.len()]],
                (i % 4) as u8,
            )
        })
        .collect()
}

fn identity() -> Identity {
    Identity {
        id: Uuid::new_v4(),
        email: Some("jean@example.com".to_string()),
    }
}

#[tokio::test]
async fn test_home_caps_at_50_and_search_at_20() {
    let store = Arc::new(MemoryStore::with_restaurants(many_restaurants(60)));
    let app = App::with_store(config(), store);

    let home = app.restaurants.home().await.unwrap();
    assert_eq!(home.len(), 50);

    // An empty filter is the unfiltered listing under the search cap.
    let search = app
        .restaurants
        .search(&RestaurantFilter::default())
        .await
        .unwrap();
    assert_eq!(search.len(), 20);
    assert_eq!(search, home[..20].to_vec());
}

#[tokio::test]
async fn test_filters_are_conjunctive_and_case_insensitive() {
    let store = Arc::new(MemoryStore::with_restaurants(vec![
        restaurant("Chez Marcel", &["Français"], 2),
        restaurant("Trattoria Bella", &["Italien"], 3),
        restaurant("Marcel's Pizza", &["Italien"], 1),
    ]));
    let app = App::with_store(config(), store);

    let filter = RestaurantFilter {
        text: Some("MARCEL".to_string()),
        cuisine: Some("Italien".to_string()),
    };
    let hits = app.restaurants.search(&filter).await.unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Marcel's Pizza");
}

#[tokio::test]
async fn test_unmatched_cuisine_is_empty_not_error() {
    let store = Arc::new(MemoryStore::with_restaurants(many_restaurants(10)));
    let app = App::with_store(config(), store);

    let filter = RestaurantFilter {
        text: None,
        cuisine: Some("Mexicain".to_string()),
    };

    assert!(app.search_view(&filter).await.is_empty());
}

#[tokio::test]
async fn test_denied_location_still_populates_list() {
    let store = Arc::new(MemoryStore::with_restaurants(many_restaurants(5)));
    let app = App::with_store(config(), store);

    let view = app.home_view(&NoLocation).await;

    assert_eq!(view.resolution.region, DEFAULT_REGION);
    assert!(view.resolution.notice.is_some());
    assert_eq!(view.restaurants.len(), 5);
}

#[tokio::test]
async fn test_unknown_restaurant_is_not_found() {
    let store = Arc::new(MemoryStore::with_restaurants(many_restaurants(5)));
    let app = App::with_store(config(), store);

    assert!(app.restaurant_detail(Uuid::new_v4()).await.is_none());
}

#[tokio::test]
async fn test_double_toggle_nets_zero_rows() {
    let rows = many_restaurants(3);
    let target = rows[0].id;
    let store = Arc::new(MemoryStore::with_restaurants(rows));
    let app = App::with_store(config(), store.clone());
    let user = identity();

    let first = app.favorites.toggle(Some(&user), target).await.unwrap();
    assert_eq!(first, FavoriteStatus::Favorited);
    assert_eq!(store.favorite_rows().len(), 1);

    let second = app.favorites.toggle(Some(&user), target).await.unwrap();
    assert_eq!(second, FavoriteStatus::NotFavorited);
    assert!(store.favorite_rows().is_empty());
}

#[tokio::test]
async fn test_concurrent_toggles_serialize() {
    let rows = many_restaurants(1);
    let target = rows[0].id;
    let store = Arc::new(MemoryStore::with_restaurants(rows));
    let app = App::with_store(config(), store.clone());
    let user = identity();

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let app = app.clone();
            let user = user.clone();
            tokio::spawn(async move { app.favorites.toggle(Some(&user), target).await })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    // Four serialized flips land back on "absent"; no duplicate or orphan
    // rows survive.
    assert!(store.favorite_rows().is_empty());
    assert_eq!(store.calls.favorite_inserts.load(Ordering::SeqCst), 2);
    assert_eq!(store.calls.favorite_deletes.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_favorites_list_embeds_restaurants() {
    let rows = many_restaurants(3);
    let (first, second) = (rows[0].clone(), rows[2].clone());
    let store = Arc::new(MemoryStore::with_restaurants(rows));
    let app = App::with_store(config(), store);
    let user = identity();

    app.favorites.toggle(Some(&user), first.id).await.unwrap();
    app.favorites.toggle(Some(&user), second.id).await.unwrap();

    let favorites = app.favorites.list(Some(&user)).await.unwrap();
    let names: Vec<_> = favorites.iter().map(|f| f.restaurant.name.as_str()).collect();

    assert_eq!(favorites.len(), 2);
    assert!(names.contains(&first.name.as_str()));
    assert!(names.contains(&second.name.as_str()));
}

#[tokio::test]
async fn test_remove_by_id_issues_one_delete() {
    let rows = many_restaurants(2);
    let target = rows[0].id;
    let store = Arc::new(MemoryStore::with_restaurants(rows));
    let app = App::with_store(config(), store.clone());
    let user = identity();

    app.favorites.toggle(Some(&user), target).await.unwrap();
    let favorite_id = store.favorite_rows()[0].id;

    app.favorites.remove(favorite_id).await.unwrap();

    assert!(store.favorite_rows().is_empty());
    assert_eq!(store.calls.favorite_deletes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_anonymous_status_makes_no_remote_call() {
    let rows = many_restaurants(1);
    let target = rows[0].id;
    let store = Arc::new(MemoryStore::with_restaurants(rows));
    let app = App::with_store(config(), store.clone());

    let status = app.favorites.status(None, target).await.unwrap();

    assert_eq!(status, FavoriteStatus::NotFavorited);
    assert_eq!(store.calls.favorite_probes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_anonymous_toggle_fails_fast() {
    let rows = many_restaurants(1);
    let target = rows[0].id;
    let store = Arc::new(MemoryStore::with_restaurants(rows));
    let app = App::with_store(config(), store.clone());

    let error = app.toggle_favorite(target).await.unwrap_err();

    assert!(matches!(error, AppError::SignedOut));
    assert_eq!(store.calls.favorite_probes.load(Ordering::SeqCst), 0);
    assert_eq!(store.calls.favorite_inserts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_membership_rederived_after_toggle() {
    let rows = many_restaurants(1);
    let target = rows[0].id;
    let store = Arc::new(MemoryStore::with_restaurants(rows));
    let app = App::with_store(config(), store);
    let user = identity();

    assert_eq!(
        app.favorites.status(Some(&user), target).await.unwrap(),
        FavoriteStatus::NotFavorited
    );

    app.favorites.toggle(Some(&user), target).await.unwrap();

    assert_eq!(
        app.favorites.status(Some(&user), target).await.unwrap(),
        FavoriteStatus::Favorited
    );
}

#[tokio::test]
async fn test_profile_fetch_tolerates_missing_row() {
    let store = Arc::new(MemoryStore::default());
    let app = App::with_store(config(), store.clone());
    let user = identity();

    assert!(app.profiles.current(None).await.unwrap().is_none());
    assert!(app.profiles.current(Some(&user)).await.unwrap().is_none());

    store.add_profile(georesto::models::Profile {
        id: user.id,
        email: "jean@example.com".to_string(),
        full_name: Some("Jean Dupont".to_string()),
        avatar_url: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    });

    let profile = app.profiles.current(Some(&user)).await.unwrap().unwrap();
    assert_eq!(profile.full_name.as_deref(), Some("Jean Dupont"));
}
