//! Presentation output: Plotters charts and console tables

use plotters::prelude::*;

use crate::channel::{AttributionTable, ChannelSummary};
use crate::pipeline::SegmentationReport;
use crate::profile::ClusterProfile;
use crate::project::Projection;

/// Color palette, one entry per possible cluster id
static CLUSTER_COLORS: [RGBColor; 6] = [RED, BLUE, GREEN, MAGENTA, CYAN, YELLOW];

fn cluster_color(cluster: usize) -> &'static RGBColor {
    CLUSTER_COLORS.get(cluster).unwrap_or(&BLACK)
}

/// Scatter plot of the 2D projection, colored by cluster and labeled with
/// each cluster's persona
pub fn render_persona_map(
    projection: &Projection,
    labels: &ndarray::Array1<usize>,
    profiles: &[ClusterProfile],
    output_path: &str,
) -> crate::Result<()> {
    let xs: Vec<f64> = projection.coords.column(0).to_vec();
    let ys: Vec<f64> = projection.coords.column(1).to_vec();

    let x_min = xs.iter().fold(f64::INFINITY, |a, &b| a.min(b)) - 0.5;
    let x_max = xs.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)) + 0.5;
    let y_min = ys.iter().fold(f64::INFINITY, |a, &b| a.min(b)) - 0.5;
    let y_max = ys.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)) + 0.5;

    let root = BitMapBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Customer Personas (PCA 2D)", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("PC1")
        .y_desc("PC2")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for profile in profiles {
        let cluster = profile.cluster;
        let color = cluster_color(cluster);
        let points: Vec<(f64, f64)> = labels
            .iter()
            .enumerate()
            .filter(|(_, &c)| c == cluster)
            .map(|(i, _)| (xs[i], ys[i]))
            .collect();

        chart
            .draw_series(
                points
                    .into_iter()
                    .map(|(x, y)| Circle::new((x, y), 4, color.filled())),
            )?
            .label(format!("Cluster {}: {}", cluster, profile.persona))
            .legend(move |(x, y)| Circle::new((x + 5, y), 4, color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    log::info!("persona map saved to {output_path}");

    Ok(())
}

/// Bar chart of traffic volume per channel
pub fn render_channel_traffic(
    summaries: &[ChannelSummary],
    output_path: &str,
) -> crate::Result<()> {
    let max_volume = summaries
        .iter()
        .map(|s| s.traffic_volume)
        .max()
        .unwrap_or(1) as f64;
    let names: Vec<String> = summaries.iter().map(|s| s.channel.clone()).collect();

    let root = BitMapBackend::new(output_path, (600, 400)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Traffic Volume per Channel", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..(summaries.len() as f64), 0f64..(max_volume * 1.1))?;

    chart
        .configure_mesh()
        .x_desc("Channel")
        .y_desc("Users")
        .x_label_formatter(&|x| {
            names
                .get(*x as usize)
                .cloned()
                .unwrap_or_default()
        })
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for (i, summary) in summaries.iter().enumerate() {
        chart.draw_series(std::iter::once(Rectangle::new(
            [
                (i as f64 + 0.1, 0.0),
                (i as f64 + 0.9, summary.traffic_volume as f64),
            ],
            cluster_color(i).filled(),
        )))?;
    }

    root.present()?;
    log::info!("channel traffic chart saved to {output_path}");

    Ok(())
}

/// Bar chart of conversion rate per channel
pub fn render_channel_conversion(
    summaries: &[ChannelSummary],
    output_path: &str,
) -> crate::Result<()> {
    let max_rate = summaries
        .iter()
        .map(|s| s.conversion_rate)
        .fold(0.0, f64::max);
    let y_max = (max_rate * 1.2).clamp(1.0, 100.0);
    let names: Vec<String> = summaries.iter().map(|s| s.channel.clone()).collect();

    let root = BitMapBackend::new(output_path, (600, 400)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Conversion Rate per Channel (%)", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..(summaries.len() as f64), 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Channel")
        .y_desc("Conversion Rate (%)")
        .x_label_formatter(&|x| {
            names
                .get(*x as usize)
                .cloned()
                .unwrap_or_default()
        })
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for (i, summary) in summaries.iter().enumerate() {
        chart.draw_series(std::iter::once(Rectangle::new(
            [
                (i as f64 + 0.1, 0.0),
                (i as f64 + 0.9, summary.conversion_rate),
            ],
            cluster_color(i).filled(),
        )))?;
    }

    root.present()?;
    log::info!("channel conversion chart saved to {output_path}");

    Ok(())
}

/// Print cluster profiles as a console table
pub fn print_profiles(profiles: &[ClusterProfile]) {
    println!("\n=== Cluster Personas ===");
    println!("  Cluster | Persona         | Members | Conv.% | Clicks | Views | Time(s) | Cart");
    println!("  --------|-----------------|---------|--------|--------|-------|---------|------");
    for p in profiles {
        println!(
            "  {:7} | {:15} | {:7} | {:6.1} | {:6.1} | {:5.1} | {:7.0} | {:.2}",
            p.cluster,
            p.persona.label(),
            p.member_count,
            p.conversion_rate,
            p.means.clicks,
            p.means.page_views,
            p.means.time_spent,
            p.means.add_to_cart,
        );
    }
}

/// Print per-channel efficiency as a console table
pub fn print_channel_summary(summaries: &[ChannelSummary]) {
    println!("\n=== Channel Efficiency ===");
    println!("  Channel      | Conv.% | Avg Time(s) | Traffic");
    println!("  -------------|--------|-------------|--------");
    for s in summaries {
        println!(
            "  {:12} | {:6.1} | {:11.0} | {:7}",
            s.channel, s.conversion_rate, s.avg_time_spent, s.traffic_volume
        );
    }
}

/// Print the channel x persona attribution table (rows sum to 100%)
pub fn print_attribution(table: &AttributionTable) {
    println!("\n=== Persona Attribution per Channel (%) ===");
    print!("  {:12}", "Channel");
    for persona in &table.persona_columns {
        print!(" | {:15}", persona);
    }
    println!();
    for row in &table.rows {
        print!("  {:12}", row.channel);
        for share in &row.shares {
            print!(" | {:15.1}", share);
        }
        println!();
    }
}

/// Print all tables and write both charts for one segmentation run
pub fn render_report(report: &SegmentationReport, plot_path: &str) -> crate::Result<()> {
    print_profiles(&report.profiles);
    print_channel_summary(&report.channels);
    print_attribution(&report.attribution);

    render_persona_map(
        &report.projection,
        &report.model.labels,
        &report.profiles,
        plot_path,
    )?;

    let traffic_path = plot_path.replace(".png", "_traffic.png");
    render_channel_traffic(&report.channels, &traffic_path)?;

    let conversion_path = plot_path.replace(".png", "_conversion.png");
    render_channel_conversion(&report.channels, &conversion_path)?;

    Ok(())
}
