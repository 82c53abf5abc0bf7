//! Heatmap intensity for report locations.
//!
//! Builds a sparse list of cells from report points, tracking:
//! - Report count per cell (intensity) and its share of the busiest cell (density)
//! - Report ids for drill-down
//!
//! Two cell modes:
//! - exact coordinates (default): one cell per distinct lat/lng
//! - grid: points snapped to square cells of `cell_size_meters`

use std::collections::HashMap;

use log::debug;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geo_utils::compute_bounds;
use crate::{Bounds, ReportPoint};

const METERS_PER_DEG_LAT: f64 = 111_320.0;

/// Configuration for heatmap generation
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HeatmapConfig {
    /// Grid cell size in meters; `None` groups by exact coordinate (default)
    pub cell_size_meters: Option<f64>,
    /// Optional bounds to limit computation
    pub bounds: Option<Bounds>,
}

/// A single heatmap cell
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HeatmapCell {
    /// Grid row index (grid mode only)
    pub row: Option<i32>,
    /// Grid column index (grid mode only)
    pub col: Option<i32>,
    /// Cell center for rendering (the exact coordinate in exact mode)
    pub center_lat: f64,
    pub center_lng: f64,
    /// Number of reports in the cell
    pub intensity: u32,
    /// Intensity relative to the busiest cell (0.0-1.0)
    pub density: f32,
    /// Ids of reports in the cell that carried one
    pub report_ids: Vec<String>,
}

/// Complete heatmap result
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HeatmapResult {
    /// Non-empty cells, most intense first
    pub cells: Vec<HeatmapCell>,
    /// Bounds of the reports that were binned
    pub bounds: Option<Bounds>,
    /// Cell size used, `None` in exact mode
    pub cell_size_meters: Option<f64>,
    /// Latitude the grid rows are anchored at
    pub ref_lat: f64,
    pub max_intensity: u32,
    pub total_reports: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CellKey {
    // Bit patterns of the normalized coordinates
    Exact(u64, u64),
    Grid(i32, i32),
}

// Internal cell data during construction
#[derive(Debug)]
struct CellBuilder {
    key: CellKey,
    center_lat: f64,
    center_lng: f64,
    intensity: u32,
    report_ids: Vec<String>,
}

fn lng_meters_per_deg(ref_lat: f64) -> f64 {
    METERS_PER_DEG_LAT * ref_lat.to_radians().cos().max(0.1)
}

/// Convert lat/lng to grid coordinates
fn to_grid_coords(lat: f64, lng: f64, ref_lat: f64, cell_size_meters: f64) -> (i32, i32) {
    let row = ((lat - ref_lat) * METERS_PER_DEG_LAT / cell_size_meters).floor() as i32;
    let col = (lng * lng_meters_per_deg(ref_lat) / cell_size_meters).floor() as i32;
    (row, col)
}

/// Get cell center coordinates
fn cell_center(row: i32, col: i32, ref_lat: f64, cell_size_meters: f64) -> (f64, f64) {
    let center_lat = ref_lat + (row as f64 + 0.5) * cell_size_meters / METERS_PER_DEG_LAT;
    let center_lng = (col as f64 + 0.5) * cell_size_meters / lng_meters_per_deg(ref_lat);
    (center_lat, center_lng)
}

// Adding 0.0 folds -0.0 into 0.0 so both land in the same cell
fn exact_key(lat: f64, lng: f64) -> CellKey {
    CellKey::Exact((lat + 0.0).to_bits(), (lng + 0.0).to_bits())
}

/// Heatmap grid builder
struct HeatmapGrid {
    cell_size_meters: Option<f64>,
    ref_lat: Option<f64>,
    cells: Vec<CellBuilder>,
    index: HashMap<CellKey, usize>,
}

impl HeatmapGrid {
    fn new(cell_size_meters: Option<f64>) -> Self {
        Self {
            // Non-positive sizes fall back to exact mode
            cell_size_meters: cell_size_meters.filter(|size| *size > 0.0),
            ref_lat: None,
            cells: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Add a point to the grid
    fn add_point(&mut self, point: &ReportPoint) {
        let (key, center_lat, center_lng) = match self.cell_size_meters {
            None => (exact_key(point.latitude, point.longitude), point.latitude, point.longitude),
            Some(size) => {
                let ref_lat = *self.ref_lat.get_or_insert(point.latitude);
                let (row, col) = to_grid_coords(point.latitude, point.longitude, ref_lat, size);
                let (center_lat, center_lng) = cell_center(row, col, ref_lat, size);
                (CellKey::Grid(row, col), center_lat, center_lng)
            }
        };

        let slot = match self.index.get(&key).copied() {
            Some(slot) => slot,
            None => {
                self.cells.push(CellBuilder {
                    key,
                    center_lat,
                    center_lng,
                    intensity: 0,
                    report_ids: Vec::new(),
                });
                self.index.insert(key, self.cells.len() - 1);
                self.cells.len() - 1
            }
        };

        let cell = &mut self.cells[slot];
        cell.intensity += 1;
        if let Some(id) = &point.id {
            cell.report_ids.push(id.clone());
        }
    }

    /// Build the final heatmap result
    fn build(self, bounds: Option<Bounds>) -> HeatmapResult {
        let max_intensity = self.cells.iter().map(|c| c.intensity).max().unwrap_or(0);
        let total_reports = self.cells.iter().map(|c| c.intensity).sum();

        let mut cells: Vec<HeatmapCell> = self
            .cells
            .into_iter()
            .map(|builder| {
                let (row, col) = match builder.key {
                    CellKey::Grid(row, col) => (Some(row), Some(col)),
                    CellKey::Exact(..) => (None, None),
                };
                HeatmapCell {
                    row,
                    col,
                    center_lat: builder.center_lat,
                    center_lng: builder.center_lng,
                    intensity: builder.intensity,
                    density: builder.intensity as f32 / max_intensity.max(1) as f32,
                    report_ids: builder.report_ids,
                }
            })
            .collect();

        // Stable: ties keep first-appearance order
        cells.sort_by(|a, b| b.intensity.cmp(&a.intensity));

        HeatmapResult {
            cells,
            bounds,
            cell_size_meters: self.cell_size_meters,
            ref_lat: self.ref_lat.unwrap_or(0.0),
            max_intensity,
            total_reports,
        }
    }
}

/// Generate a heatmap from report points.
///
/// # Example
/// ```
/// use report_hotspots::{generate_heatmap, HeatmapConfig, ReportPoint};
///
/// let points = vec![
///     ReportPoint::new(19.4326, -99.1332),
///     ReportPoint::new(19.4326, -99.1332),
///     ReportPoint::new(19.5000, -99.2000),
/// ];
///
/// let heatmap = generate_heatmap(&points, &HeatmapConfig::default());
/// assert_eq!(heatmap.cells.len(), 2);
/// assert_eq!(heatmap.cells[0].intensity, 2);
/// ```
pub fn generate_heatmap(points: &[ReportPoint], config: &HeatmapConfig) -> HeatmapResult {
    let included: Vec<&ReportPoint> = points
        .iter()
        .filter(|p| {
            config
                .bounds
                .as_ref()
                .map_or(true, |b| b.contains(p.latitude, p.longitude))
        })
        .collect();

    let mut grid = HeatmapGrid::new(config.cell_size_meters);
    for point in &included {
        grid.add_point(point);
    }

    let result = grid.build(compute_bounds(included.iter().copied()));

    debug!(
        "Heatmap: {} of {} reports in {} cells (max intensity {})",
        result.total_reports,
        points.len(),
        result.cells.len(),
        result.max_intensity
    );

    result
}

/// Find the heatmap cell covering a location.
///
/// In exact mode only a cell at exactly `(lat, lng)` matches.
pub fn query_heatmap_cell(heatmap: &HeatmapResult, lat: f64, lng: f64) -> Option<&HeatmapCell> {
    match heatmap.cell_size_meters {
        None => heatmap
            .cells
            .iter()
            .find(|c| c.center_lat == lat && c.center_lng == lng),
        Some(size) => {
            let (row, col) = to_grid_coords(lat, lng, heatmap.ref_lat, size);
            heatmap
                .cells
                .iter()
                .find(|c| c.row == Some(row) && c.col == Some(col))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo_utils::point_distance_km;

    fn grid_config(cell_size_meters: f64) -> HeatmapConfig {
        HeatmapConfig {
            cell_size_meters: Some(cell_size_meters),
            bounds: None,
        }
    }

    #[test]
    fn test_empty_heatmap() {
        let result = generate_heatmap(&[], &HeatmapConfig::default());
        assert!(result.cells.is_empty());
        assert!(result.bounds.is_none());
        assert_eq!(result.total_reports, 0);
        assert_eq!(result.max_intensity, 0);
    }

    #[test]
    fn test_exact_mode_groups_identical_coordinates() {
        let points = vec![
            ReportPoint::with_id("a", 19.5000, -99.2000),
            ReportPoint::with_id("b", 19.4326, -99.1332),
            ReportPoint::with_id("c", 19.4326, -99.1332),
            ReportPoint::with_id("d", 19.4327, -99.1333),
        ];
        let result = generate_heatmap(&points, &HeatmapConfig::default());

        assert_eq!(result.cells.len(), 3);
        assert_eq!(result.total_reports, 4);
        assert_eq!(result.max_intensity, 2);

        let top = &result.cells[0];
        assert_eq!(top.intensity, 2);
        assert_eq!(top.density, 1.0);
        assert_eq!(top.report_ids, vec!["b".to_string(), "c".to_string()]);
        assert_eq!(top.row, None);

        // Ties keep first-appearance order
        assert_eq!(result.cells[1].report_ids, vec!["a".to_string()]);
        assert_eq!(result.cells[1].density, 0.5);
        assert_eq!(result.cells[2].report_ids, vec!["d".to_string()]);
    }

    #[test]
    fn test_exact_mode_signed_zero() {
        let points = vec![ReportPoint::new(0.0, 0.0), ReportPoint::new(-0.0, -0.0)];
        let result = generate_heatmap(&points, &HeatmapConfig::default());
        assert_eq!(result.cells.len(), 1);
        assert_eq!(result.cells[0].intensity, 2);
    }

    #[test]
    fn test_bounds_filter() {
        let points = vec![
            ReportPoint::new(19.4326, -99.1332),
            ReportPoint::new(25.6866, -100.3161),
        ];
        let config = HeatmapConfig {
            cell_size_meters: None,
            bounds: Some(Bounds { min_lat: 19.0, max_lat: 20.0, min_lng: -100.0, max_lng: -99.0 }),
        };
        let result = generate_heatmap(&points, &config);
        assert_eq!(result.total_reports, 1);
        let bounds = result.bounds.unwrap();
        assert_eq!(bounds.max_lat, 19.4326);
    }

    #[test]
    fn test_grid_mode_merges_identical_points() {
        let points = vec![
            ReportPoint::new(19.4326, -99.1332),
            ReportPoint::new(19.4326, -99.1332),
            ReportPoint::new(19.4426, -99.1332),
        ];
        let result = generate_heatmap(&points, &grid_config(100.0));

        assert_eq!(result.cells.len(), 2);
        assert_eq!(result.cells[0].intensity, 2);
        assert_eq!(result.ref_lat, 19.4326);
        assert!(result.cells.iter().all(|c| c.row.is_some() && c.col.is_some()));
    }

    #[test]
    fn test_grid_cell_center_near_points() {
        let points: Vec<ReportPoint> = (0..20)
            .map(|i| ReportPoint::new(19.40 + i as f64 * 0.0013, -99.15 + i as f64 * 0.0007))
            .collect();
        let result = generate_heatmap(&points, &grid_config(100.0));
        assert_eq!(result.total_reports, 20);

        for point in &points {
            let cell = query_heatmap_cell(&result, point.latitude, point.longitude).unwrap();
            let center = ReportPoint::new(cell.center_lat, cell.center_lng);
            // Half the cell diagonal is ~71 m
            assert!(point_distance_km(point, &center) < 0.1);
        }
    }

    #[test]
    fn test_query_exact_mode() {
        let points = vec![ReportPoint::with_id("a", 19.4326, -99.1332)];
        let result = generate_heatmap(&points, &HeatmapConfig::default());

        let cell = query_heatmap_cell(&result, 19.4326, -99.1332).unwrap();
        assert_eq!(cell.report_ids, vec!["a".to_string()]);
        assert!(query_heatmap_cell(&result, 19.4327, -99.1332).is_none());
    }

    #[test]
    fn test_query_grid_mode_miss() {
        let points = vec![ReportPoint::new(19.4326, -99.1332)];
        let result = generate_heatmap(&points, &grid_config(100.0));
        assert!(query_heatmap_cell(&result, 19.4326, -99.1332).is_some());
        assert!(query_heatmap_cell(&result, 19.5326, -99.1332).is_none());
    }

    #[test]
    fn test_non_positive_cell_size_uses_exact_mode() {
        let points = vec![ReportPoint::new(19.4326, -99.1332)];
        let result = generate_heatmap(&points, &grid_config(0.0));
        assert_eq!(result.cell_size_meters, None);
        assert_eq!(result.cells[0].center_lat, 19.4326);
    }
}
