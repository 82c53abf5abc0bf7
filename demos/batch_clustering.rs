//! Example of clustering a large report snapshot with each strategy.
//!
//! Run with: cargo run --release --example batch_clustering --features parallel

use report_hotspots::{cluster, cluster_indexed, cluster_parallel, label_top_n, ReportPoint};
use std::time::Instant;

fn main() {
    println!("Batch Clustering Example\n");

    let points = synthetic_reports(5_000);
    let radius_km = 1.5;

    println!("Created {} reports\n", points.len());

    let start = Instant::now();
    let naive = cluster(&points, radius_km);
    println!("Full scan:  {} zones in {:?}", naive.len(), start.elapsed());

    let start = Instant::now();
    let indexed = cluster_indexed(&points, radius_km);
    println!("R-tree:     {} zones in {:?}", indexed.len(), start.elapsed());

    let start = Instant::now();
    let parallel = cluster_parallel(&points, radius_km);
    println!("Parallel:   {} zones in {:?}", parallel.len(), start.elapsed());

    println!("\nAll strategies agree: {}", naive == indexed && naive == parallel);

    // Stats
    let singletons = naive.iter().filter(|z| z.count == 1).count();
    let largest = naive.iter().map(|z| z.count).max().unwrap_or(0);

    println!("\nStats:");
    println!("  Zones: {}", naive.len());
    println!("  Largest zone: {} reports", largest);
    println!("  Isolated reports: {}", singletons);

    println!("\nTop 10:");
    for zone in label_top_n(naive, 10) {
        println!(
            "  {}: {} reports at ({:.4}, {:.4})",
            zone.label.unwrap_or_default(),
            zone.count,
            zone.latitude,
            zone.longitude
        );
    }
}

/// Scatter reports over a ~30 km square, denser towards the middle
fn synthetic_reports(n: usize) -> Vec<ReportPoint> {
    let mut state: u64 = 42;
    let mut next = || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 11) as f64 / (1u64 << 53) as f64
    };

    (0..n)
        .map(|i| {
            let spread = if i % 3 == 0 { 0.05 } else { 0.25 };
            ReportPoint::with_id(
                format!("r-{}", i),
                19.43 + (next() - 0.5) * spread,
                -99.13 + (next() - 0.5) * spread,
            )
        })
        .collect()
}
