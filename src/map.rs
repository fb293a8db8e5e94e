//! # Map presentation
//!
//! One presenter seam with a per-platform implementation instead of
//! scattered target conditionals. Native targets get an interactive surface
//! (region + markers with callouts); web targets get a static panel with an
//! external-maps link. Deep links for directions, phone and website live
//! here too.

use uuid::Uuid;

use crate::{location::Region, models::Restaurant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Native,
    Web,
}

/// Point marker with its callout text.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub title: String,
    pub description: String,
}

impl Marker {
    pub fn for_restaurant(restaurant: &Restaurant) -> Self {
        Self {
            id: restaurant.id,
            latitude: restaurant.latitude,
            longitude: restaurant.longitude,
            title: restaurant.name.clone(),
            description: restaurant.cuisine_type.join(", "),
        }
    }
}

/// What the map area of a screen renders.
#[derive(Debug, Clone, PartialEq)]
pub enum MapSurface {
    /// Region and tappable markers, rendered by the native map widget.
    Interactive { region: Region, markers: Vec<Marker> },
    /// Informational panel shown where no map widget exists: a restaurant
    /// count and a link out to an external maps application.
    Panel { count: usize, maps_link: String },
}

pub trait MapPresenter: Send + Sync {
    fn present(&self, region: Region, restaurants: &[Restaurant]) -> MapSurface;
}

pub struct NativeMapPresenter;

impl MapPresenter for NativeMapPresenter {
    fn present(&self, region: Region, restaurants: &[Restaurant]) -> MapSurface {
        MapSurface::Interactive {
            region,
            markers: restaurants.iter().map(Marker::for_restaurant).collect(),
        }
    }
}

pub struct WebPanelPresenter;

impl MapPresenter for WebPanelPresenter {
    fn present(&self, region: Region, restaurants: &[Restaurant]) -> MapSurface {
        MapSurface::Panel {
            count: restaurants.len(),
            maps_link: directions_url(region.latitude, region.longitude),
        }
    }
}

pub fn presenter_for(platform: Platform) -> Box<dyn MapPresenter> {
    match platform {
        Platform::Native => Box::new(NativeMapPresenter),
        Platform::Web => Box::new(WebPanelPresenter),
    }
}

pub fn directions_url(latitude: f64, longitude: f64) -> String {
    format!("https://www.google.com/maps/dir/?api=1&destination={latitude},{longitude}")
}

pub fn phone_url(phone: &str) -> String {
    format!("tel:{phone}")
}

/// Action links for the detail screen's info rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RestaurantLinks {
    pub directions: String,
    pub phone: Option<String>,
    pub website: Option<String>,
}

impl RestaurantLinks {
    pub fn for_restaurant(restaurant: &Restaurant) -> Self {
        Self {
            directions: directions_url(restaurant.latitude, restaurant.longitude),
            phone: restaurant.phone.as_deref().map(phone_url),
            website: restaurant.website.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::location::DEFAULT_REGION;

    fn restaurant(name: &str, phone: Option<&str>) -> Restaurant {
        Restaurant {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            address: "1 rue de Rivoli, Paris".to_string(),
            latitude: 48.8606,
            longitude: 2.3376,
            phone: phone.map(str::to_string),
            website: None,
            price_range: 2,
            cuisine_type: vec!["Français".to_string(), "Italien".to_string()],
            opening_hours: None,
            image_url: None,
            rating: Some(4.2),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_native_surface_carries_markers() {
        let rows = vec![restaurant("Chez Paul", None)];
        let surface = presenter_for(Platform::Native).present(DEFAULT_REGION, &rows);

        let MapSurface::Interactive { region, markers } = surface else {
            panic!("expected interactive surface");
        };
        assert_eq!(region, DEFAULT_REGION);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].title, "Chez Paul");
        assert_eq!(markers[0].description, "Français, Italien");
    }

    #[test]
    fn test_web_surface_is_a_panel_with_link() {
        let rows = vec![restaurant("Chez Paul", None), restaurant("Osteria", None)];
        let surface = presenter_for(Platform::Web).present(DEFAULT_REGION, &rows);

        let MapSurface::Panel { count, maps_link } = surface else {
            panic!("expected panel surface");
        };
        assert_eq!(count, 2);
        assert_eq!(
            maps_link,
            "https://www.google.com/maps/dir/?api=1&destination=48.8566,2.3522"
        );
    }

    #[test]
    fn test_detail_links() {
        let links = RestaurantLinks::for_restaurant(&restaurant("Chez Paul", Some("+33 1 42 60 38 30")));

        assert_eq!(
            links.directions,
            "https://www.google.com/maps/dir/?api=1&destination=48.8606,2.3376"
        );
        assert_eq!(links.phone.as_deref(), Some("tel:+33 1 42 60 38 30"));
        assert!(links.website.is_none());
    }
}
