use anyhow::{anyhow, Result};
use plotters::prelude::*;
use std::path::Path;

use crate::metrics::AnalyzedPr;

const PLOT_WIDTH: u32 = 1024;
const PLOT_HEIGHT: u32 = 768;
const POINT_SIZE: u32 = 4;

/// Render the triage scatter plot to a PNG file.
///
/// Axis mapping: x = days open, y = changed files, z = commits behind main.
/// Point color grades with lines changed; merged PRs are filled, open ones
/// hollow. Rendering goes straight to a file, so headless runs are fine.
pub fn render_scatter(path: &Path, repo: &str, prs: &[AnalyzedPr]) -> Result<()> {
    if prs.is_empty() {
        return Err(anyhow!("Nothing to plot: no pull requests fetched."));
    }

    let x_max = axis_max(prs.iter().map(|pr| pr.time_open_days()));
    let y_max = axis_max(prs.iter().map(|pr| pr.record.changed_files as f64));
    let z_max = axis_max(prs.iter().map(|pr| pr.record.commits_behind as f64));
    let max_lines = prs
        .iter()
        .map(|pr| pr.metrics.lines_changed)
        .max()
        .unwrap_or(1)
        .max(1) as f64;

    let root = BitMapBackend::new(path, (PLOT_WIDTH, PLOT_HEIGHT)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| anyhow!("Failed to prepare plot canvas: {}", e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Pull request complexity: {}", repo),
            ("sans-serif", 28),
        )
        .margin(20)
        .build_cartesian_3d(0.0..x_max, 0.0..y_max, 0.0..z_max)
        .map_err(|e| anyhow!("Failed to build chart: {}", e))?;

    chart.with_projection(|mut pb| {
        pb.pitch = 0.3;
        pb.yaw = 0.8;
        pb.scale = 0.85;
        pb.into_matrix()
    });

    chart
        .configure_axes()
        .light_grid_style(BLACK.mix(0.1))
        .max_light_lines(3)
        .draw()
        .map_err(|e| anyhow!("Failed to draw axes: {}", e))?;

    chart
        .draw_series(prs.iter().map(|pr| {
            let color = churn_color(pr.metrics.lines_changed as f64 / max_lines);
            let coord = (
                pr.time_open_days(),
                pr.record.changed_files as f64,
                pr.record.commits_behind as f64,
            );
            let style = if pr.metrics.is_merged {
                color.filled()
            } else {
                color.stroke_width(2)
            };
            Circle::new(coord, POINT_SIZE, style)
        }))
        .map_err(|e| anyhow!("Failed to draw scatter points: {}", e))?;

    root.draw(&Text::new(
        "x: days open   y: changed files   z: commits behind main   color: lines changed (blue low, red high)   filled: merged",
        (20, (PLOT_HEIGHT - 24) as i32),
        ("sans-serif", 15).into_font().color(&BLACK.mix(0.7)),
    ))
    .map_err(|e| anyhow!("Failed to draw legend: {}", e))?;

    root.present()
        .map_err(|e| anyhow!("Failed to write plot to {}: {}", path.display(), e))?;

    Ok(())
}

/// Axis upper bound with 5% headroom; never collapses to a zero-width range.
fn axis_max(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(1.0_f64, f64::max) * 1.05
}

/// Blue-to-red gradient over normalized churn.
fn churn_color(t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    RGBColor((255.0 * t) as u8, 60, (255.0 * (1.0 - t)) as u8)
}
