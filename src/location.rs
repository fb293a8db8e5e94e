//! # Location
//!
//! One-shot device position feeding the initial map viewport. No tracking,
//! no recomputation on movement. Every failure path degrades to the default
//! region with a non-blocking notice so the map and list always render.

use async_trait::async_trait;
use thiserror::Error;

/// Map viewport: center coordinate plus zoom deltas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Center of Paris, shown whenever no device position is available.
pub const DEFAULT_REGION: Region = Region {
    latitude: 48.8566,
    longitude: 2.3522,
    latitude_delta: 0.0922,
    longitude_delta: 0.0421,
};

impl Region {
    /// Home-screen viewport around a device position.
    pub fn around(coordinate: Coordinate) -> Self {
        Self {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            latitude_delta: 0.0922,
            longitude_delta: 0.0421,
        }
    }

    /// Tight viewport for the detail screen's single-restaurant map.
    pub fn pinpoint(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            latitude_delta: 0.01,
            longitude_delta: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

#[derive(Error, Debug)]
#[error("current position unavailable")]
pub struct PositionUnavailable;

/// Seam for the platform location service: foreground permission request
/// plus a single current-position sample.
#[async_trait]
pub trait LocationSource: Send + Sync {
    async fn request_permission(&self) -> Permission;
    async fn current_position(&self) -> Result<Coordinate, PositionUnavailable>;
}

/// Cause behind a degraded viewport. Both render the same way today; the
/// split is kept so a UI could word them apart without an API change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationNotice {
    PermissionDenied,
    PositionUnavailable,
}

impl LocationNotice {
    pub fn message(self) -> &'static str {
        match self {
            Self::PermissionDenied => "Location permission denied",
            Self::PositionUnavailable => "Current position unavailable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedRegion {
    pub region: Region,
    pub notice: Option<LocationNotice>,
}

/// Resolves the initial viewport. Denial and a failed sample after grant
/// both fall back to [`DEFAULT_REGION`]; neither is an error.
pub async fn resolve_region(source: &dyn LocationSource) -> ResolvedRegion {
    match source.request_permission().await {
        Permission::Denied => ResolvedRegion {
            region: DEFAULT_REGION,
            notice: Some(LocationNotice::PermissionDenied),
        },
        Permission::Granted => match source.current_position().await {
            Ok(coordinate) => ResolvedRegion {
                region: Region::around(coordinate),
                notice: None,
            },
            Err(PositionUnavailable) => ResolvedRegion {
                region: DEFAULT_REGION,
                notice: Some(LocationNotice::PositionUnavailable),
            },
        },
    }
}

/// Source with a known position, for targets without a device service.
pub struct StaticPosition(pub Coordinate);

#[async_trait]
impl LocationSource for StaticPosition {
    async fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    async fn current_position(&self) -> Result<Coordinate, PositionUnavailable> {
        Ok(self.0)
    }
}

/// Source that always denies, for targets without location access.
pub struct NoLocation;

#[async_trait]
impl LocationSource for NoLocation {
    async fn request_permission(&self) -> Permission {
        Permission::Denied
    }

    async fn current_position(&self) -> Result<Coordinate, PositionUnavailable> {
        Err(PositionUnavailable)
    }
}
