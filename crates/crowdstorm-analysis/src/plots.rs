//! Chart panel rendering
//!
//! Renders the six fixed charts into one 1800x1200 PNG laid out as a 2x3
//! grid. Uses the bitmap backend so rendering works headless; the output
//! file handle lives only for the duration of [`render_panel`].

use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;

use crate::data::{Dataset, SkinToneCategory};
use crate::explore::Exploration;

/// Errors that can occur during plot generation
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

type Result<T> = std::result::Result<T, PlotError>;

const PANEL_SIZE: (u32, u32) = (1800, 1200);
const HISTOGRAM_BINS: usize = 20;

/// Render the 2x3 chart panel and save it as a PNG
pub fn render_panel(dataset: &Dataset, exploration: &Exploration, output: &Path) -> Result<()> {
    if dataset.is_empty() {
        return Err(PlotError::InvalidData(
            "Cannot plot an empty dataset".to_string(),
        ));
    }

    let root = BitMapBackend::new(output, PANEL_SIZE).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let areas = root.split_evenly((2, 3));

    skin_tone_histogram(&areas[0], dataset, exploration)?;
    category_mean_bars(&areas[1], exploration)?;
    red_card_boxplot(&areas[2], dataset)?;
    scatter_with_trend(&areas[3], dataset)?;
    share_with_red_bars(&areas[4], exploration)?;
    per_game_rate_bars(&areas[5], exploration)?;

    root.present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}

/// Histogram of the averaged skin-tone score with mean and median lines
fn skin_tone_histogram<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    dataset: &Dataset,
    exploration: &Exploration,
) -> Result<()> {
    let mut counts = vec![0usize; HISTOGRAM_BINS];
    for tone in dataset.skin_tones() {
        let bin = ((tone * HISTOGRAM_BINS as f64) as usize).min(HISTOGRAM_BINS - 1);
        counts[bin] += 1;
    }
    let y_max = counts.iter().copied().max().unwrap_or(1) as f64 * 1.1;

    let mut chart = ChartBuilder::on(area)
        .caption("Skin Tone Distribution", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..1.0f64, 0.0..y_max)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc("Skin tone")
        .y_desc("Observations")
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    let bin_width = 1.0 / HISTOGRAM_BINS as f64;
    chart
        .draw_series(counts.iter().enumerate().map(|(i, &count)| {
            let x0 = i as f64 * bin_width;
            Rectangle::new(
                [(x0, 0.0), (x0 + bin_width, count as f64)],
                BLUE.mix(0.5).filled(),
            )
        }))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    for (value, color) in [
        (exploration.skin_tone.mean, RED),
        (exploration.skin_tone.median, GREEN),
    ] {
        chart
            .draw_series(LineSeries::new(
                [(value, 0.0), (value, y_max)],
                color.stroke_width(2),
            ))
            .map_err(|e| PlotError::Drawing(e.to_string()))?;
    }

    Ok(())
}

/// Mean red cards per 4-level skin-tone category
fn category_mean_bars<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    exploration: &Exploration,
) -> Result<()> {
    let means: Vec<f64> = exploration
        .categories
        .iter()
        .map(|c| if c.mean_red_cards.is_nan() { 0.0 } else { c.mean_red_cards })
        .collect();
    let y_max = (means.iter().copied().fold(0.0, f64::max) * 1.2).max(0.01);

    let mut chart = ChartBuilder::on(area)
        .caption("Mean Red Cards by Category", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..4.0f64, 0.0..y_max)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(4)
        .x_label_formatter(&|x| {
            SkinToneCategory::ALL
                .get(*x as usize)
                .map(|c| c.label().to_string())
                .unwrap_or_default()
        })
        .y_desc("Mean red cards")
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    chart
        .draw_series(means.iter().enumerate().map(|(i, &mean)| {
            Rectangle::new(
                [(i as f64 + 0.1, 0.0), (i as f64 + 0.9, mean)],
                BLUE.mix(0.6).filled(),
            )
        }))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}

/// Box plot of red cards, light vs dark
fn red_card_boxplot<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    dataset: &Dataset,
) -> Result<()> {
    let (light, dark) = dataset.red_cards_by_group();
    if light.is_empty() || dark.is_empty() {
        return Err(PlotError::InvalidData(
            "Box plot requires observations in both groups".to_string(),
        ));
    }

    let light_q = Quartiles::new(&light);
    let dark_q = Quartiles::new(&dark);
    let y_max = light_q
        .values()
        .iter()
        .chain(dark_q.values().iter())
        .copied()
        .fold(0.0f32, f32::max)
        * 1.2
        + 0.1;

    let labels = ["Light", "Dark"];
    let mut chart = ChartBuilder::on(area)
        .caption("Red Cards by Group", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(50)
        .build_cartesian_2d(labels[..].into_segmented(), 0.0f32..y_max)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .y_desc("Red cards")
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    chart
        .draw_series([
            Boxplot::new_vertical(SegmentValue::CenterOf(&"Light"), &light_q),
            Boxplot::new_vertical(SegmentValue::CenterOf(&"Dark"), &dark_q),
        ])
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}

/// Scatter of skin tone against red cards with a least-squares trend line
fn scatter_with_trend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    dataset: &Dataset,
) -> Result<()> {
    let points: Vec<(f64, f64)> = dataset
        .observations
        .iter()
        .map(|o| (o.skin_tone, o.red_cards as f64))
        .collect();
    let y_max = points.iter().map(|(_, y)| *y).fold(0.0, f64::max) * 1.2 + 0.5;

    let mut chart = ChartBuilder::on(area)
        .caption("Skin Tone vs Red Cards", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.05..1.05f64, 0.0..y_max)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc("Skin tone")
        .y_desc("Red cards")
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    chart
        .draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 3, BLUE.mix(0.3).filled())),
        )
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    if let Some((slope, intercept)) = least_squares(&points) {
        chart
            .draw_series(LineSeries::new(
                [(0.0, intercept), (1.0, slope + intercept)],
                RED.stroke_width(2),
            ))
            .map_err(|e| PlotError::Drawing(e.to_string()))?;
    }

    Ok(())
}

/// Share of observations with at least one red card, light vs dark
fn share_with_red_bars<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    exploration: &Exploration,
) -> Result<()> {
    let values = [
        exploration.light.share_with_red * 100.0,
        exploration.dark.share_with_red * 100.0,
    ];
    group_bars(
        area,
        "Share With a Red Card",
        "% of observations",
        values,
    )
}

/// Red cards per 100 games, light vs dark
fn per_game_rate_bars<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    exploration: &Exploration,
) -> Result<()> {
    let values = [
        exploration.light.red_cards_per_game * 100.0,
        exploration.dark.red_cards_per_game * 100.0,
    ];
    group_bars(
        area,
        "Red Cards per 100 Games",
        "Red cards / 100 games",
        values,
    )
}

/// Two-bar light/dark comparison chart; NaN rates draw as zero-height bars
fn group_bars<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    y_label: &str,
    values: [f64; 2],
) -> Result<()> {
    let clean: Vec<f64> = values
        .iter()
        .map(|v| if v.is_nan() { 0.0 } else { *v })
        .collect();
    let y_max = (clean.iter().copied().fold(0.0, f64::max) * 1.2).max(0.01);

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..2.0f64, 0.0..y_max)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(2)
        .x_label_formatter(&|x| {
            ["Light", "Dark"]
                .get(*x as usize)
                .map(|s| s.to_string())
                .unwrap_or_default()
        })
        .y_desc(y_label)
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    chart
        .draw_series(clean.iter().enumerate().map(|(i, &value)| {
            let color = if i == 0 { BLUE.mix(0.6) } else { RED.mix(0.6) };
            Rectangle::new([(i as f64 + 0.2, 0.0), (i as f64 + 0.8, value)], color.filled())
        }))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}

/// Ordinary least squares slope and intercept; None for degenerate input
fn least_squares(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    let n = points.len() as f64;
    if points.len() < 2 {
        return None;
    }
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;
    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for &(x, y) in points {
        sxx += (x - mean_x) * (x - mean_x);
        sxy += (x - mean_x) * (y - mean_y);
    }
    if sxx == 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    Some((slope, mean_y - slope * mean_x))
}
