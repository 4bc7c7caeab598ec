// src/figures/render.rs

use anyhow::{Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::{fs, path::Path};
use tracing::{info, instrument};

use super::derive::{ClosureDistribution, Figures, NationalTrend, OperatorBars, VolumeVsEfficiency};
use super::format::{format_count, format_pct};
use super::theme::Theme;
use crate::labels::Labels;

type Panel<'a> = DrawingArea<SVGBackend<'a>, Shift>;

const TITLE: &str = "Delay compensation claims";
const TREND_CAPTION: &str = "Claims received, Great Britain";
const BARS_CAPTION: &str = "Claims received by operator";
const BOX_CAPTION: &str = "Claims closed within 20 days, by period";
const SCATTER_CAPTION: &str = "Volume vs closure rate";

fn rgb(c: [u8; 3]) -> RGBColor {
    RGBColor(c[0], c[1], c[2])
}

fn text_style(theme: &Theme, size: u32) -> TextStyle<'_> {
    (theme.font_family.as_str(), size)
        .into_font()
        .color(&rgb(theme.text))
}

/// Upper axis bound with some headroom; never a zero-width range.
fn headroom(max: f64) -> f64 {
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

/// Draw the four derived tables as a 2×2 composite SVG at `path`.
#[instrument(level = "info", skip(figures, theme, labels, path), fields(path = %path.as_ref().display()))]
pub fn render<P: AsRef<Path>>(
    figures: &Figures,
    theme: &Theme,
    labels: &Labels,
    path: P,
) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }

    let root = SVGBackend::new(path, (theme.width, theme.height)).into_drawing_area();
    root.fill(&rgb(theme.background))?;
    let body = root.titled(TITLE, text_style(theme, theme.title_size))?;
    let panels = body.split_evenly((2, 2));

    draw_trend(&panels[0], &figures.trend, theme)?;
    draw_bars(&panels[1], &figures.bars, theme, labels)?;
    draw_distribution(&panels[2], &figures.distribution, theme, labels)?;
    draw_scatter(&panels[3], &figures.scatter, theme, labels)?;

    root.present()
        .with_context(|| format!("writing {:?}", path))?;
    info!("figure written");
    Ok(())
}

fn draw_empty(area: &Panel, caption: &str, theme: &Theme) -> Result<()> {
    let (w, h) = area.dim_in_pixel();
    let centred = text_style(theme, theme.caption_size).pos(Pos::new(HPos::Center, VPos::Center));
    area.draw(&Text::new(
        format!("{}: no data", caption),
        ((w / 2) as i32, (h / 2) as i32),
        centred,
    ))?;
    Ok(())
}

fn draw_trend(area: &Panel, trend: &NationalTrend, theme: &Theme) -> Result<()> {
    if trend.points.is_empty() {
        return draw_empty(area, TREND_CAPTION, theme);
    }

    let n = trend.points.len() as u32;
    let ticks: Vec<String> = trend.points.iter().map(|(p, _)| p.to_string()).collect();
    let max = trend.points.iter().map(|p| p.1).fold(0.0, f64::max);
    let colour = rgb(theme.colour(0));

    let mut chart = ChartBuilder::on(area)
        .caption(TREND_CAPTION, text_style(theme, theme.caption_size))
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((0u32..n).into_segmented(), 0f64..headroom(max))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(ticks.len())
        .x_label_formatter(&|x| match x {
            SegmentValue::CenterOf(i) => ticks.get(*i as usize).cloned().unwrap_or_default(),
            _ => String::new(),
        })
        .y_label_formatter(&|y| format_count(*y))
        .y_desc("Claims")
        .label_style(text_style(theme, theme.label_size))
        .draw()?;

    let at = |i: usize, v: f64| (SegmentValue::CenterOf(i as u32), v);
    chart.draw_series(LineSeries::new(
        trend.points.iter().enumerate().map(|(i, p)| at(i, p.1)),
        colour.stroke_width(3),
    ))?;
    chart.draw_series(
        trend
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| Circle::new(at(i, p.1), 4, colour.filled())),
    )?;
    Ok(())
}

fn draw_bars(area: &Panel, bars: &OperatorBars, theme: &Theme, labels: &Labels) -> Result<()> {
    let caption = match &bars.period {
        Some(p) => format!("{}, {}", BARS_CAPTION, p),
        None => BARS_CAPTION.to_string(),
    };
    if bars.bars.is_empty() {
        return draw_empty(area, &caption, theme);
    }

    // largest bar first, drawn at the top
    let n = bars.bars.len() as u32;
    let names: Vec<&str> = bars.bars.iter().map(|b| labels.get(&b.operator)).collect();
    let max = bars.bars.iter().map(|b| b.value).fold(0.0, f64::max);
    let slot = |k: usize| n - 1 - k as u32;

    let mut chart = ChartBuilder::on(area)
        .caption(&caption, text_style(theme, theme.caption_size))
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(150)
        .build_cartesian_2d(0f64..headroom(max), (0u32..n).into_segmented())?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(names.len())
        .y_label_formatter(&|y| match y {
            SegmentValue::CenterOf(i) if *i < n => names[(n - 1 - *i) as usize].to_string(),
            _ => String::new(),
        })
        .x_label_formatter(&|x| format_count(*x))
        .label_style(text_style(theme, theme.label_size))
        .draw()?;

    let colour = rgb(theme.colour(0));
    chart.draw_series(bars.bars.iter().enumerate().map(|(k, b)| {
        let mut bar = Rectangle::new(
            [
                (0.0, SegmentValue::Exact(slot(k))),
                (b.value, SegmentValue::Exact(slot(k) + 1)),
            ],
            colour.filled(),
        );
        bar.set_margin(3, 3, 0, 0);
        bar
    }))?;
    Ok(())
}

fn draw_distribution(
    area: &Panel,
    dist: &ClosureDistribution,
    theme: &Theme,
    labels: &Labels,
) -> Result<()> {
    if dist.groups.is_empty() {
        return draw_empty(area, BOX_CAPTION, theme);
    }

    let n = dist.groups.len() as u32;
    let names: Vec<&str> = dist.groups.iter().map(|g| labels.get(&g.operator)).collect();
    let all = dist.groups.iter().flat_map(|g| g.values.iter().copied());
    let (lo, hi) = all.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let (lo, hi) = ((lo - 5.0).max(0.0) as f32, (hi + 5.0) as f32);
    let colour = rgb(theme.colour(2));

    let mut chart = ChartBuilder::on(area)
        .caption(BOX_CAPTION, text_style(theme, theme.caption_size))
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(150)
        .build_cartesian_2d(lo..hi, (0u32..n).into_segmented())?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(names.len())
        .y_label_formatter(&|y| match y {
            SegmentValue::CenterOf(i) if *i < n => names[(n - 1 - *i) as usize].to_string(),
            _ => String::new(),
        })
        .x_label_formatter(&|x| format_pct(*x as f64))
        .label_style(text_style(theme, theme.label_size))
        .draw()?;

    chart.draw_series(dist.groups.iter().enumerate().map(|(k, g)| {
        Boxplot::new_horizontal(
            SegmentValue::CenterOf(n - 1 - k as u32),
            &Quartiles::new(&g.values),
        )
        .width(14)
        .whisker_width(0.6)
        .style(colour.stroke_width(2))
    }))?;
    Ok(())
}

fn draw_scatter(
    area: &Panel,
    scatter: &VolumeVsEfficiency,
    theme: &Theme,
    labels: &Labels,
) -> Result<()> {
    // records without a closure rate have nowhere to go on this chart
    let points: Vec<_> = scatter
        .records
        .iter()
        .filter_map(|r| match (r.claims, r.closed_pct) {
            (Some(x), Some(y)) => Some((r, x, y)),
            _ => None,
        })
        .collect();
    if points.is_empty() {
        return draw_empty(area, SCATTER_CAPTION, theme);
    }

    let mut periods: Vec<_> = points.iter().map(|(r, _, _)| &r.period).collect();
    periods.sort();
    periods.dedup();
    let latest = periods.last().copied();

    let xmax = points.iter().map(|p| p.1).fold(0.0, f64::max);
    let ymax = points.iter().map(|p| p.2).fold(0.0, f64::max).max(100.0);

    let mut chart = ChartBuilder::on(area)
        .caption(SCATTER_CAPTION, text_style(theme, theme.caption_size))
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..headroom(xmax), 0f64..ymax)?;

    chart
        .configure_mesh()
        .x_desc("Claims received")
        .y_desc("Closed within 20 days")
        .x_label_formatter(&|x| format_count(*x))
        .y_label_formatter(&|y| format_pct(*y))
        .label_style(text_style(theme, theme.label_size))
        .draw()?;

    for (pi, period) in periods.iter().enumerate() {
        let colour = rgb(theme.colour(pi));
        let label_style = text_style(theme, theme.label_size);
        chart
            .draw_series(points.iter().filter(|(r, _, _)| &r.period == *period).map(
                |(r, x, y)| {
                    // only the most recent period is annotated, to keep it legible
                    let name = if Some(*period) == latest {
                        labels.get(&r.operator).to_string()
                    } else {
                        String::new()
                    };
                    EmptyElement::at((*x, *y))
                        + Circle::new((0, 0), 5, colour.filled())
                        + Text::new(name, (7, -7), label_style.clone())
                },
            ))?
            .label(period.to_string())
            .legend(move |(x, y)| Circle::new((x, y), 5, colour.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(&rgb(theme.background).mix(0.8))
        .border_style(&rgb(theme.text))
        .label_font(text_style(theme, theme.label_size))
        .draw()?;
    Ok(())
}
