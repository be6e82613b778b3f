//! ChannelLens: customer segmentation and marketing channel efficiency CLI
//!
//! Loads the customer dataset, segments it with K-Means, profiles personas,
//! and reports per-channel efficiency and attribution.

use anyhow::Result;
use channellens::profile::researcher_highlight;
use channellens::{viz, Args, DatasetCache};
use clap::Parser;
use std::time::Instant;

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.verbose {
        println!("ChannelLens - Customer Segmentation & Channel Efficiency");
        println!("========================================================\n");
    }

    let start_time = Instant::now();

    // Step 1: Load and scale (memoized per source)
    if args.verbose {
        println!("Step 1: Loading dataset");
        println!("  Source: {}", args.source);
    }

    let load_start = Instant::now();
    let mut cache = DatasetCache::new();
    let prepared = cache.get_or_load(&args.source)?;
    let load_time = load_start.elapsed();

    println!("✓ Data loaded: {} customers", prepared.data.len());
    if args.verbose {
        println!("  Loading time: {:.2}s", load_time.as_secs_f64());
        println!("  Features shape: {:?}", prepared.scaled.shape());
    }

    if args.show_raw {
        println!("\nDataset preview:");
        println!("{}", prepared.data.preview(5));
    }

    // Step 2: Cluster, profile, project, aggregate
    if args.verbose {
        println!("\nStep 2: Running segmentation");
        println!("  Clusters: {}", args.clusters);
        println!("  Seed: {}", args.seed);
    }

    let run_start = Instant::now();
    let report = channellens::run_segmentation(
        &prepared,
        args.clusters,
        args.segmentation_options(),
    )?;
    let run_time = run_start.elapsed();

    println!("✓ Segmentation complete");
    if args.verbose {
        println!("  Run time: {:.2}s", run_time.as_secs_f64());
        println!("  Inertia: {:.2}", report.model.inertia);
        let silhouette = report
            .model
            .silhouette_sample(&prepared.scaled, 100.min(prepared.data.len()));
        println!("  Silhouette score (sample): {:.3}", silhouette);
    }

    // Step 3: Tables and charts
    viz::render_report(&report, &args.output)?;

    // Persona-specific action note; absent persona is a no-op
    if let Some(note) = researcher_highlight(&report.profiles) {
        println!("\nAction plan: {note}");
    }

    println!("\n=== Pipeline Complete ===");
    println!("Total processing time: {:.2}s", start_time.elapsed().as_secs_f64());
    println!("Persona map saved to: {}", args.output);
    println!(
        "Channel traffic chart saved to: {}",
        args.output.replace(".png", "_traffic.png")
    );
    println!(
        "Channel conversion chart saved to: {}",
        args.output.replace(".png", "_conversion.png")
    );

    Ok(())
}
