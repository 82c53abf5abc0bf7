//! Example of computing dashboard stats from a report snapshot.
//!
//! Run with: RUST_LOG=debug cargo run --example dashboard_stats

use chrono::{Duration, TimeZone, Utc};
use report_hotspots::{
    generate_heatmap, DashboardStats, HeatmapConfig, ReportPoint, StatsConfig, TimedReport,
};

fn main() {
    env_logger::init();

    let now = Utc.with_ymd_and_hms(2024, 5, 15, 18, 0, 0).unwrap();

    // Clusters of reports around Mexico City
    let hotspots = [
        (19.4326, -99.1332, 6), // Centro
        (19.3910, -99.1710, 4), // Del Valle
        (19.4978, -99.1269, 2), // Lindavista
        (19.3000, -99.2000, 1),
    ];

    let mut reports = Vec::new();
    for (h, &(lat, lng, n)) in hotspots.iter().enumerate() {
        for i in 0..n {
            let point = ReportPoint::with_id(
                format!("report-{}-{}", h, i),
                lat + i as f64 * 0.0004,
                lng - i as f64 * 0.0003,
            );
            let created_at = now - Duration::hours((h * 30 + i * 7) as i64);
            reports.push(TimedReport::new(point, created_at));
        }
    }

    println!("Dashboard Stats Example\n");
    println!("{} reports in snapshot\n", reports.len());

    let stats = DashboardStats::compute(&reports, &now, &StatsConfig::default());

    println!("Total:      {}", stats.total_reports);
    println!("Today:      {}", stats.today);
    println!("This week:  {}", stats.this_week);
    println!("This month: {}\n", stats.this_month);

    println!("By day:");
    for day in &stats.by_day {
        println!("  {}  {}", day.date, day.count);
    }

    println!("\nTop zones:");
    for zone in &stats.top_zones {
        println!(
            "  {:<8} {:>2} reports  ({:.4}, {:.4})",
            zone.label.as_deref().unwrap_or("-"),
            zone.count,
            zone.latitude,
            zone.longitude
        );
    }

    let points: Vec<ReportPoint> = reports.iter().map(|r| r.point.clone()).collect();
    let heatmap = generate_heatmap(
        &points,
        &HeatmapConfig {
            cell_size_meters: Some(250.0),
            bounds: None,
        },
    );
    println!(
        "\nHeatmap: {} cells of 250m, busiest has {} reports",
        heatmap.cells.len(),
        heatmap.max_intensity
    );
}
