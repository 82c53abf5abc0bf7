//! # Report Hotspots
//!
//! Geospatial aggregation for citizen report dashboards.
//!
//! This library provides:
//! - Great-circle distance between report coordinates (Haversine, spherical Earth)
//! - Greedy proximity clustering of reports into ranked, labeled zones
//! - Windowed report counts (today / this week / this month / by day)
//! - Heatmap intensity aggregation by exact coordinate or grid cell
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel clustering with rayon
//! - **`serde`** - Derive `Serialize`/`Deserialize` on result types
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use report_hotspots::{ReportPoint, ZoneConfig, top_zones};
//!
//! let reports = vec![
//!     ReportPoint::new(19.4326, -99.1332),
//!     ReportPoint::new(19.4327, -99.1333),
//!     ReportPoint::new(19.5000, -99.2000),
//! ];
//!
//! let zones = top_zones(&reports, &ZoneConfig::default());
//! assert_eq!(zones.len(), 2);
//! assert_eq!(zones[0].count, 2);
//! assert_eq!(zones[0].label.as_deref(), Some("Zone A"));
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// Distance and bounding-box helpers
pub mod geo_utils;
pub use geo_utils::{haversine_km, point_distance_km, EARTH_RADIUS_KM};

// Greedy proximity clustering and zone ranking
pub mod zones;
pub use zones::{cluster, cluster_indexed, label_top_n, rank_zones, top_zones, zone_label};

#[cfg(feature = "parallel")]
pub use zones::cluster_parallel;

// Windowed counts and dashboard assembly
pub mod stats;
pub use stats::{count_by_day, count_since, DashboardStats, DayCount, StatsConfig, TimedReport};

// Heatmap intensity module
pub mod heatmap;
pub use heatmap::{generate_heatmap, query_heatmap_cell, HeatmapCell, HeatmapConfig, HeatmapResult};

// ============================================================================
// Core Types
// ============================================================================

/// The location of a single report.
///
/// Coordinates are WGS84 degrees. Range checking is the caller's job; see
/// [`ReportPoint::is_valid`].
///
/// # Example
/// ```
/// use report_hotspots::ReportPoint;
/// let point = ReportPoint::with_id("r-1", 19.4326, -99.1332); // Mexico City
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReportPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Opaque report identifier, when the data layer supplies one
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub id: Option<String>,
}

impl ReportPoint {
    /// Create an anonymous report point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude, id: None }
    }

    /// Create a report point carrying its report id.
    pub fn with_id(id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude, id: Some(id.into()) }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

impl From<&ReportPoint> for geo::Point<f64> {
    fn from(p: &ReportPoint) -> Self {
        geo::Point::new(p.longitude, p.latitude)
    }
}

/// Bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Check whether a coordinate lies inside (inclusive).
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lng >= self.min_lng && lng <= self.max_lng
    }
}

/// A group of nearby reports.
///
/// `latitude`/`longitude` are the arithmetic mean of the member coordinates,
/// which is adequate for the small radii zones are built with.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Zone {
    /// Centroid latitude
    pub latitude: f64,
    /// Centroid longitude
    pub longitude: f64,
    /// Number of reports in the zone (always >= 1)
    pub count: u32,
    /// Human-readable label, assigned by [`label_top_n`]
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub label: Option<String>,
    /// Ids of member reports that carried one
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub report_ids: Vec<String>,
}

impl Zone {
    /// True if the zone holds a single, isolated report.
    pub fn is_isolated(&self) -> bool {
        self.count == 1
    }
}

/// Configuration for zone ranking.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ZoneConfig {
    /// Grouping radius around each seed report, in kilometers.
    /// Default: 1.5 km
    pub radius_km: f64,

    /// Number of top zones to keep and label.
    /// Default: 10
    pub max_zones: usize,

    /// Prefix for zone labels ("Zone A", "Zone B", ...).
    /// Default: "Zone"
    pub label_prefix: String,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            radius_km: 1.5,
            max_zones: 10,
            label_prefix: "Zone".to_string(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_point_validation() {
        assert!(ReportPoint::new(19.4326, -99.1332).is_valid());
        assert!(ReportPoint::new(-90.0, 180.0).is_valid());
        assert!(!ReportPoint::new(91.0, 0.0).is_valid());
        assert!(!ReportPoint::new(0.0, -181.0).is_valid());
        assert!(!ReportPoint::new(f64::NAN, 0.0).is_valid());
        assert!(!ReportPoint::new(0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_report_point_with_id() {
        let p = ReportPoint::with_id("abc", 1.0, 2.0);
        assert_eq!(p.id.as_deref(), Some("abc"));
        assert_eq!(ReportPoint::new(1.0, 2.0).id, None);
    }

    #[test]
    fn test_geo_point_axis_order() {
        let p = ReportPoint::new(19.4, -99.1);
        let g: geo::Point<f64> = (&p).into();
        assert_eq!(g.x(), -99.1);
        assert_eq!(g.y(), 19.4);
    }

    #[test]
    fn test_default_zone_config() {
        let config = ZoneConfig::default();
        assert_eq!(config.radius_km, 1.5);
        assert_eq!(config.max_zones, 10);
        assert_eq!(config.label_prefix, "Zone");
    }

    #[test]
    fn test_bounds_contains() {
        let b = Bounds { min_lat: 19.0, max_lat: 20.0, min_lng: -100.0, max_lng: -99.0 };
        assert!(b.contains(19.5, -99.5));
        assert!(b.contains(19.0, -100.0));
        assert!(!b.contains(20.5, -99.5));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_zone_json_shape() {
        let zone = Zone {
            latitude: 19.43,
            longitude: -99.13,
            count: 2,
            label: Some("Zone A".to_string()),
            report_ids: vec![],
        };
        let json = serde_json::to_value(&zone).unwrap();
        assert_eq!(json["count"], 2);
        assert_eq!(json["label"], "Zone A");
        assert!(json.get("report_ids").is_none());
    }
}
