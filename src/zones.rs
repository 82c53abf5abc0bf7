//! Greedy proximity clustering of reports into ranked zones.
//!
//! Each unvisited report, taken in input order, seeds a new zone and claims every
//! other unvisited report within `radius_km` of the seed. Membership is decided by
//! distance to the seed alone, never to other members or to the running centroid,
//! so the result depends on input order and a zone may hold two reports that are
//! farther than `radius_km` from each other. Dashboards rely on this exact
//! grouping, so all variants here reproduce it.
//!
//! | Function | Strategy |
//! |----------|----------|
//! | [`cluster`] | Full scan per seed, O(n²) worst case |
//! | [`cluster_indexed`] | R-tree pre-filter per seed, same output |
//! | `cluster_parallel` | Parallel scan per seed (feature `parallel`), same output |

use log::{debug, warn};
use rstar::primitives::GeomWithData;
use rstar::{RTree, AABB};

use crate::geo_utils::{point_distance_km, search_envelope};
use crate::{ReportPoint, Zone, ZoneConfig};

/// Default label prefix used by [`label_top_n`].
const DEFAULT_LABEL_PREFIX: &str = "Zone";

// Running accumulator for a zone under construction
#[derive(Debug)]
struct ZoneBuilder {
    count: u32,
    sum_lat: f64,
    sum_lng: f64,
    report_ids: Vec<String>,
}

impl ZoneBuilder {
    fn seed(point: &ReportPoint) -> Self {
        let mut builder = Self {
            count: 0,
            sum_lat: 0.0,
            sum_lng: 0.0,
            report_ids: Vec::new(),
        };
        builder.add(point);
        builder
    }

    fn add(&mut self, point: &ReportPoint) {
        self.count += 1;
        self.sum_lat += point.latitude;
        self.sum_lng += point.longitude;
        if let Some(id) = &point.id {
            self.report_ids.push(id.clone());
        }
    }

    fn build(self) -> Zone {
        let n = self.count as f64;
        Zone {
            latitude: self.sum_lat / n,
            longitude: self.sum_lng / n,
            count: self.count,
            label: None,
            report_ids: self.report_ids,
        }
    }
}

fn warn_on_invalid(points: &[ReportPoint]) {
    let invalid = points.iter().filter(|p| !p.is_valid()).count();
    if invalid > 0 {
        warn!(
            "{} of {} report points have invalid coordinates; zone output is undefined for them",
            invalid,
            points.len()
        );
    }
}

/// Group reports into zones of nearby activity.
///
/// Zones are returned in creation order (the order their seed reports appear in
/// `points`), unranked and unlabeled. Every input point lands in exactly one zone,
/// so the zone counts always sum to `points.len()`.
///
/// A negative `radius_km` makes every report its own zone.
///
/// # Example
/// ```
/// use report_hotspots::{cluster, ReportPoint};
///
/// let points = vec![
///     ReportPoint::new(19.4326, -99.1332),
///     ReportPoint::new(19.4327, -99.1333),
///     ReportPoint::new(19.5000, -99.2000),
/// ];
///
/// let zones = cluster(&points, 1.5);
/// assert_eq!(zones.len(), 2);
/// assert_eq!(zones[0].count, 2);
/// assert_eq!(zones[1].count, 1);
/// ```
pub fn cluster(points: &[ReportPoint], radius_km: f64) -> Vec<Zone> {
    if points.is_empty() {
        return vec![];
    }
    warn_on_invalid(points);

    let mut visited = vec![false; points.len()];
    let mut zones = Vec::new();

    for (i, seed) in points.iter().enumerate() {
        if visited[i] {
            continue;
        }
        visited[i] = true;
        let mut zone = ZoneBuilder::seed(seed);

        for (j, other) in points.iter().enumerate() {
            if visited[j] {
                continue;
            }
            if point_distance_km(seed, other) <= radius_km {
                zone.add(other);
                visited[j] = true;
            }
        }

        zones.push(zone.build());
    }

    zones
}

/// Same grouping as [`cluster`], using an R-tree to skip reports that cannot be
/// within `radius_km` of the seed.
///
/// Candidates are still checked with the exact haversine distance and absorbed in
/// input order, so the result (centroids included) is identical to [`cluster`].
/// Worth it for snapshots of several thousand reports.
pub fn cluster_indexed(points: &[ReportPoint], radius_km: f64) -> Vec<Zone> {
    if points.is_empty() {
        return vec![];
    }
    warn_on_invalid(points);

    let entries: Vec<GeomWithData<[f64; 2], usize>> = points
        .iter()
        .enumerate()
        .map(|(i, p)| GeomWithData::new([p.longitude, p.latitude], i))
        .collect();
    let rtree = RTree::bulk_load(entries);

    let mut visited = vec![false; points.len()];
    let mut zones = Vec::new();

    for (i, seed) in points.iter().enumerate() {
        if visited[i] {
            continue;
        }
        visited[i] = true;
        let mut zone = ZoneBuilder::seed(seed);

        let (min, max) = search_envelope(seed, radius_km);
        let envelope = AABB::from_corners(min, max);
        let mut candidates: Vec<usize> = rtree
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.data)
            .filter(|&j| !visited[j])
            .collect();
        candidates.sort_unstable();

        for j in candidates {
            let other = &points[j];
            if point_distance_km(seed, other) <= radius_km {
                zone.add(other);
                visited[j] = true;
            }
        }

        zones.push(zone.build());
    }

    zones
}

/// Same grouping as [`cluster`], with each seed's membership scan run in parallel.
///
/// Marking stays sequential, so the result is identical to [`cluster`].
#[cfg(feature = "parallel")]
pub fn cluster_parallel(points: &[ReportPoint], radius_km: f64) -> Vec<Zone> {
    use rayon::prelude::*;

    if points.is_empty() {
        return vec![];
    }
    warn_on_invalid(points);

    let mut visited = vec![false; points.len()];
    let mut zones = Vec::new();

    for (i, seed) in points.iter().enumerate() {
        if visited[i] {
            continue;
        }
        visited[i] = true;
        let mut zone = ZoneBuilder::seed(seed);

        // Every index below i is already visited (claimed or seeded)
        let members: Vec<usize> = (i + 1..points.len())
            .into_par_iter()
            .filter(|&j| !visited[j] && point_distance_km(seed, &points[j]) <= radius_km)
            .collect();

        for j in members {
            zone.add(&points[j]);
            visited[j] = true;
        }

        zones.push(zone.build());
    }

    zones
}

/// Sort zones by report count, largest first.
///
/// The relative order of zones with equal counts is not part of the contract.
pub fn rank_zones(mut zones: Vec<Zone>) -> Vec<Zone> {
    zones.sort_by(|a, b| b.count.cmp(&a.count));
    zones
}

/// Label for the zone at `rank` (0-based): `"<prefix> A"`, `"<prefix> B"`, ...
///
/// After `Z` the letters continue as `AA`, `AB`, ... like spreadsheet columns.
///
/// # Example
/// ```
/// use report_hotspots::zone_label;
///
/// assert_eq!(zone_label("Zone", 0), "Zone A");
/// assert_eq!(zone_label("Zone", 25), "Zone Z");
/// assert_eq!(zone_label("Zone", 26), "Zone AA");
/// ```
pub fn zone_label(prefix: &str, rank: usize) -> String {
    let mut letters = Vec::new();
    let mut index = rank;
    loop {
        letters.push(char::from(b'A' + (index % 26) as u8));
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    let suffix: String = letters.iter().rev().collect();
    format!("{} {}", prefix, suffix)
}

fn label_top_n_with_prefix(zones: Vec<Zone>, n: usize, prefix: &str) -> Vec<Zone> {
    let mut ranked = rank_zones(zones);
    ranked.truncate(n);
    for (rank, zone) in ranked.iter_mut().enumerate() {
        zone.label = Some(zone_label(prefix, rank));
    }
    ranked
}

/// Rank zones by count, keep the top `n`, and label them "Zone A", "Zone B", ...
///
/// Returns `min(n, zones.len())` zones in non-increasing count order.
pub fn label_top_n(zones: Vec<Zone>, n: usize) -> Vec<Zone> {
    label_top_n_with_prefix(zones, n, DEFAULT_LABEL_PREFIX)
}

/// Cluster, rank and label in one call, using `config` for the radius, the number
/// of zones kept and the label prefix.
pub fn top_zones(points: &[ReportPoint], config: &ZoneConfig) -> Vec<Zone> {
    let start = std::time::Instant::now();

    let zones = cluster_indexed(points, config.radius_km);
    let formed = zones.len();
    let top = label_top_n_with_prefix(zones, config.max_zones, &config.label_prefix);

    debug!(
        "Clustered {} reports into {} zones ({} kept, radius {} km) in {:?}",
        points.len(),
        formed,
        top.len(),
        config.radius_km,
        start.elapsed()
    );

    top
}
