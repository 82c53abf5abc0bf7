//! # Geographic Utilities
//!
//! Distance and bounding-box computations for report coordinates.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_km`] | Great-circle distance between two lat/lon pairs, in kilometers |
//! | [`point_distance_km`] | Same, for two [`ReportPoint`]s |
//! | [`compute_bounds`] | Bounding box of a set of reports |
//! | [`search_envelope`] | Lon/lat box containing every point within a radius |
//!
//! ## Example
//!
//! ```rust
//! use report_hotspots::{ReportPoint, geo_utils};
//!
//! let reports = vec![
//!     ReportPoint::new(19.4326, -99.1332),
//!     ReportPoint::new(19.4327, -99.1333),
//!     ReportPoint::new(19.5000, -99.2000),
//! ];
//!
//! let near = geo_utils::point_distance_km(&reports[0], &reports[1]);
//! assert!(near < 0.02); // ~15 m
//!
//! let bounds = geo_utils::compute_bounds(&reports).unwrap();
//! assert_eq!(bounds.max_lat, 19.5000);
//! ```
//!
//! ## Algorithm Notes
//!
//! ### Haversine Formula
//!
//! Distances assume a spherical Earth of radius [`EARTH_RADIUS_KM`]. Over the
//! kilometer-scale radii used for zone grouping the error against the WGS84
//! ellipsoid is well under 0.5%.
//!
//! Reference: [Haversine formula (Wikipedia)](https://en.wikipedia.org/wiki/Haversine_formula)
//!
//! ### Coordinate System
//!
//! All functions take WGS84 latitude/longitude in degrees. Inputs are assumed to
//! be finite and in range; for NaN or infinite inputs the results are undefined.

use geo::{BoundingRect, MultiPoint, Point};

use crate::{Bounds, ReportPoint};

/// Mean Earth radius used for all distance computations.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// =============================================================================
// Distance Functions
// =============================================================================

/// Calculate the great-circle distance between two coordinates using the Haversine formula.
///
/// Returns the distance in kilometers along the surface of a sphere with radius
/// [`EARTH_RADIUS_KM`]. The result is non-negative, symmetric in its two points,
/// and exactly `0.0` for identical coordinates.
///
/// # Example
///
/// ```rust
/// use report_hotspots::haversine_km;
///
/// // A quarter of the equator
/// let d = haversine_km(0.0, 0.0, 0.0, 90.0);
/// assert!((d - 10_007.5).abs() < 0.1);
/// ```
#[inline]
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Haversine distance between two report points, in kilometers.
#[inline]
pub fn point_distance_km(p1: &ReportPoint, p2: &ReportPoint) -> f64 {
    haversine_km(p1.latitude, p1.longitude, p2.latitude, p2.longitude)
}

// =============================================================================
// Bounding Box Functions
// =============================================================================

/// Compute the bounding box of a set of reports.
///
/// Returns `None` for empty input.
pub fn compute_bounds<'a>(points: impl IntoIterator<Item = &'a ReportPoint>) -> Option<Bounds> {
    let multi: MultiPoint<f64> = MultiPoint::new(points.into_iter().map(Point::from).collect());
    let rect = multi.bounding_rect()?;

    Some(Bounds {
        min_lat: rect.min().y,
        max_lat: rect.max().y,
        min_lng: rect.min().x,
        max_lng: rect.max().x,
    })
}

/// Lon/lat box (`[min_lng, min_lat]`, `[max_lng, max_lat]`) that contains every
/// coordinate within `radius_km` great-circle distance of `point`.
///
/// The box is conservative: it may contain points farther than the radius, but
/// never excludes one that is within it. Longitude spans the whole range when
/// the circle reaches a pole or crosses the antimeridian.
///
/// Negative radii are treated as zero.
pub fn search_envelope(point: &ReportPoint, radius_km: f64) -> ([f64; 2], [f64; 2]) {
    // Small slack so rounding never drops a point sitting exactly on the radius
    const SLACK_DEG: f64 = 1e-9;

    let angular = radius_km.max(0.0) / EARTH_RADIUS_KM;
    let lat_pad = angular.to_degrees() * (1.0 + 1e-9) + SLACK_DEG;

    let min_lat = (point.latitude - lat_pad).max(-90.0);
    let max_lat = (point.latitude + lat_pad).min(90.0);

    let full_lng = ([-180.0, min_lat], [180.0, max_lat]);

    if min_lat <= -90.0 || max_lat >= 90.0 {
        return full_lng;
    }

    let cos_lat = point.latitude.to_radians().cos();
    let sin_angular = angular.sin();
    if angular >= std::f64::consts::FRAC_PI_2 || sin_angular >= cos_lat {
        return full_lng;
    }

    let lng_pad = (sin_angular / cos_lat).asin().to_degrees() * (1.0 + 1e-9) + SLACK_DEG;
    let min_lng = point.longitude - lng_pad;
    let max_lng = point.longitude + lng_pad;

    if min_lng < -180.0 || max_lng > 180.0 {
        return full_lng;
    }

    ([min_lng, min_lat], [max_lng, max_lat])
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_haversine_same_point() {
        assert_eq!(haversine_km(19.4326, -99.1332, 19.4326, -99.1332), 0.0);
        assert_eq!(haversine_km(0.0, 0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_haversine_symmetric() {
        let pairs = [
            ((19.4326, -99.1332), (19.5000, -99.2000)),
            ((51.5074, -0.1278), (48.8566, 2.3522)),
            ((-33.8688, 151.2093), (40.7128, -74.0060)),
            ((0.0, 179.9), (0.0, -179.9)),
        ];
        for ((lat1, lon1), (lat2, lon2)) in pairs {
            let forward = haversine_km(lat1, lon1, lat2, lon2);
            let backward = haversine_km(lat2, lon2, lat1, lon1);
            assert!(approx_eq(forward, backward, 1e-9));
        }
    }

    #[test]
    fn test_haversine_quarter_circle() {
        let d = haversine_km(0.0, 0.0, 0.0, 90.0);
        let expected = EARTH_RADIUS_KM * std::f64::consts::FRAC_PI_2;
        assert!(approx_eq(d, expected, 1e-6));
        assert!(approx_eq(d, 10_007.5, 0.1));
    }

    #[test]
    fn test_haversine_hundredth_degree_latitude() {
        let d = haversine_km(19.0, -99.0, 19.01, -99.0);
        assert!(approx_eq(d, 1.11, 0.01));
    }

    #[test]
    fn test_haversine_known_value() {
        // London to Paris is approximately 344 km
        let d = haversine_km(51.5074, -0.1278, 48.8566, 2.3522);
        assert!(approx_eq(d, 343.5, 5.0));
    }

    #[test]
    fn test_haversine_antimeridian() {
        // 0.2 degrees of longitude at the equator, across the dateline
        let d = haversine_km(0.0, 179.9, 0.0, -179.9);
        assert!(approx_eq(d, 22.24, 0.05));
    }

    #[test]
    fn test_point_distance_matches_raw() {
        let a = ReportPoint::new(19.4326, -99.1332);
        let b = ReportPoint::new(19.4327, -99.1333);
        assert_eq!(point_distance_km(&a, &b), haversine_km(19.4326, -99.1332, 19.4327, -99.1333));
        assert!(point_distance_km(&a, &b) < 0.02);
    }

    #[test]
    fn test_compute_bounds() {
        let points = vec![
            ReportPoint::new(19.50, -99.13),
            ReportPoint::new(19.51, -99.12),
            ReportPoint::new(19.505, -99.125),
        ];
        let bounds = compute_bounds(&points).unwrap();
        assert_eq!(bounds.min_lat, 19.50);
        assert_eq!(bounds.max_lat, 19.51);
        assert_eq!(bounds.min_lng, -99.13);
        assert_eq!(bounds.max_lng, -99.12);
    }

    #[test]
    fn test_compute_bounds_empty() {
        let empty: Vec<ReportPoint> = vec![];
        assert!(compute_bounds(&empty).is_none());
    }

    #[test]
    fn test_search_envelope_contains_radius() {
        let center = ReportPoint::new(19.4326, -99.1332);
        let (min, max) = search_envelope(&center, 1.5);

        // Points exactly 1.5 km north and east (approximately) must be inside
        let north_deg = (1.5 / EARTH_RADIUS_KM).to_degrees();
        assert!(center.latitude + north_deg <= max[1]);
        assert!(center.latitude - north_deg >= min[1]);
        assert!(min[0] < center.longitude && max[0] > center.longitude);

        // The box is wider in longitude than latitude away from the equator
        assert!(max[0] - min[0] > max[1] - min[1]);
    }

    #[test]
    fn test_search_envelope_near_pole_spans_all_longitudes() {
        let (min, max) = search_envelope(&ReportPoint::new(89.999, 10.0), 1.5);
        assert_eq!(min[0], -180.0);
        assert_eq!(max[0], 180.0);
        assert_eq!(max[1], 90.0);
    }

    #[test]
    fn test_search_envelope_antimeridian_spans_all_longitudes() {
        let (min, max) = search_envelope(&ReportPoint::new(0.0, 179.999), 1.5);
        assert_eq!(min[0], -180.0);
        assert_eq!(max[0], 180.0);
    }

    #[test]
    fn test_search_envelope_negative_radius() {
        let p = ReportPoint::new(10.0, 20.0);
        let (min, max) = search_envelope(&p, -5.0);
        assert!(min[0] <= p.longitude && max[0] >= p.longitude);
        assert!(min[1] <= p.latitude && max[1] >= p.latitude);
    }
}
