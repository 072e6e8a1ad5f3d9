use crate::chart_config::{ChartConfig, DatasetValues};
use crate::palette;
use crate::series::{ChartKind, ScatterPoint};
use crate::{OutputFormat, RenderOptions};
use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use std::collections::HashMap;
use std::ops::Range;
use tracing::debug;

/// Identifies a chart held by a [`ChartBackend`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChartHandle(u64);

impl ChartHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

/// The rendering collaborator.
///
/// A chart acquired with `create` stays alive until `destroy` is called
/// with its handle.
pub trait ChartBackend {
    fn create(&mut self, config: &ChartConfig) -> Result<ChartHandle>;
    fn destroy(&mut self, handle: ChartHandle);
}

/// Encoded output of one chart
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedChart {
    pub format: OutputFormat,
    pub bytes: Vec<u8>,
}

/// Renders charts with plotters and keeps the encoded bytes per handle
#[derive(Debug, Default)]
pub struct PlottersBackend {
    options: RenderOptions,
    next_id: u64,
    charts: HashMap<ChartHandle, RenderedChart>,
}

impl PlottersBackend {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            next_id: 0,
            charts: HashMap::new(),
        }
    }

    pub fn output(&self, handle: ChartHandle) -> Option<&RenderedChart> {
        self.charts.get(&handle)
    }

    /// Number of charts created and not yet destroyed
    pub fn live_charts(&self) -> usize {
        self.charts.len()
    }
}

impl ChartBackend for PlottersBackend {
    fn create(&mut self, config: &ChartConfig) -> Result<ChartHandle> {
        let bytes = render_chart(config, &self.options)?;
        let handle = ChartHandle(self.next_id);
        self.next_id += 1;
        debug!(handle = handle.0, bytes = bytes.len(), kind = %config.kind, "chart created");
        self.charts.insert(
            handle,
            RenderedChart {
                format: self.options.format,
                bytes,
            },
        );
        Ok(handle)
    }

    fn destroy(&mut self, handle: ChartHandle) {
        if self.charts.remove(&handle).is_some() {
            debug!(handle = handle.0, "chart destroyed");
        }
    }
}

/// Render a chart configuration to PNG or SVG bytes
pub fn render_chart(config: &ChartConfig, options: &RenderOptions) -> Result<Vec<u8>> {
    if options.width == 0 || options.height == 0 {
        anyhow::bail!(
            "Chart dimensions must be non-zero (width: {}, height: {})",
            options.width,
            options.height
        );
    }
    let size = (options.width, options.height);

    match options.format {
        OutputFormat::Png => {
            let mut buffer = vec![0u8; options.width as usize * options.height as usize * 3];
            {
                let root = BitMapBackend::with_buffer(&mut buffer, size).into_drawing_area();
                draw_chart(&root, config)?;
            }
            encode_png(&buffer, options.width, options.height)
        }
        OutputFormat::Svg => {
            let mut svg = String::new();
            {
                let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
                draw_chart(&root, config)?;
            }
            Ok(svg.into_bytes())
        }
    }
}

fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(buffer, width, height, image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
    }
    Ok(png_bytes)
}

fn draw_chart<DB>(root: &DrawingArea<DB, Shift>, config: &ChartConfig) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).context("Failed to fill background")?;

    let Some(dataset) = config.dataset() else {
        anyhow::bail!("Chart configuration has no dataset");
    };
    let caption = dataset.label.as_str();
    let labels = config.data.labels.as_deref().unwrap_or(&[]);

    match (&dataset.data, config.kind) {
        (DatasetValues::Points(points), _) => draw_scatter(root, caption, points, config)?,
        (DatasetValues::Values(values), ChartKind::Pie) => {
            draw_radial(root, caption, labels, values, false)?
        }
        (DatasetValues::Values(values), ChartKind::Doughnut) => {
            draw_radial(root, caption, labels, values, true)?
        }
        (DatasetValues::Values(values), kind) => {
            draw_categorical(root, caption, labels, values, kind == ChartKind::Line, config)?
        }
    }

    root.present().context("Failed to present drawing")?;
    Ok(())
}

/// Bar or line chart over a category axis. Invalid values leave a gap.
fn draw_categorical<DB>(
    root: &DrawingArea<DB, Shift>,
    caption: &str,
    labels: &[String],
    values: &[Option<f64>],
    as_line: bool,
    config: &ChartConfig,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let num_categories = labels.len().max(values.len());
    let x_range = 0.0..(num_categories.max(1) as f64);
    let y_range = value_range(values.iter().flatten().copied(), true)?;

    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .caption(caption, ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, y_range)
        .context("Failed to build chart")?;

    chart
        .configure_mesh()
        .x_labels(num_categories.max(1))
        .x_label_formatter(&|x| category_label(labels, *x))
        .x_desc(config.x_title().unwrap_or(""))
        .y_desc(config.y_title().unwrap_or(""))
        .draw()
        .context("Failed to draw mesh")?;

    let (color, alpha) = palette::rgb(0);

    if as_line {
        for run in valid_runs(values) {
            chart
                .draw_series(LineSeries::new(run.iter().copied(), color.stroke_width(2)))
                .context("Failed to draw line series")?;
            chart
                .draw_series(run.iter().map(|&(x, y)| Circle::new((x, y), 3, color.filled())))
                .context("Failed to draw line markers")?;
        }
    } else {
        chart
            .draw_series(values.iter().enumerate().filter_map(|(idx, v)| {
                let y = v.filter(|y| y.is_finite())?;
                let x_center = idx as f64 + 0.5;
                Some(Rectangle::new(
                    [(x_center - 0.4, 0.0), (x_center + 0.4, y)],
                    color.mix(alpha).filled(),
                ))
            }))
            .context("Failed to draw bars")?;
    }

    Ok(())
}

/// Scatter plot on linear axes. Points with a non-numeric x are skipped.
fn draw_scatter<DB>(
    root: &DrawingArea<DB, Shift>,
    caption: &str,
    points: &[ScatterPoint],
    config: &ChartConfig,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let drawable: Vec<(f64, f64)> = points
        .iter()
        .filter_map(|p| {
            let x = p.x.filter(|x| x.is_finite())?;
            p.y.is_finite().then_some((x, p.y))
        })
        .collect();

    let x_range = value_range(drawable.iter().map(|p| p.0), false)?;
    let y_range = value_range(drawable.iter().map(|p| p.1), true)?;

    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .caption(caption, ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, y_range)
        .context("Failed to build chart")?;

    chart
        .configure_mesh()
        .x_desc(config.x_title().unwrap_or(""))
        .y_desc(config.y_title().unwrap_or(""))
        .draw()
        .context("Failed to draw mesh")?;

    let (color, alpha) = palette::rgb(0);
    chart
        .draw_series(
            drawable
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 4, color.mix(alpha).filled())),
        )
        .context("Failed to draw point series")?;

    Ok(())
}

/// Pie or doughnut chart. Only positive values form slices.
fn draw_radial<DB>(
    root: &DrawingArea<DB, Shift>,
    caption: &str,
    labels: &[String],
    values: &[Option<f64>],
    donut: bool,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let area = root
        .titled(caption, ("sans-serif", 20))
        .context("Failed to draw caption")?;

    let (names, sizes): (Vec<String>, Vec<f64>) = values
        .iter()
        .enumerate()
        .filter_map(|(idx, v)| {
            let size = v.filter(|s| s.is_finite() && *s > 0.0)?;
            let name = labels.get(idx).cloned().unwrap_or_default();
            Some((name, size))
        })
        .unzip();

    if sizes.is_empty() {
        return Ok(());
    }

    let colors: Vec<RGBColor> = (0..sizes.len()).map(|i| palette::rgb(i).0).collect();
    let (width, height) = area.dim_in_pixel();
    let center = ((width / 2) as i32, (height / 2) as i32);
    let radius = f64::from(width.min(height)) * 0.4;

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &names);
    if donut {
        pie.donut_hole(radius * 0.5);
    }
    area.draw(&pie).context("Failed to draw pie")?;

    Ok(())
}

/// Split values into runs of consecutive valid entries, positioned at
/// category centres.
fn valid_runs(values: &[Option<f64>]) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (idx, v) in values.iter().enumerate() {
        match v.filter(|y| y.is_finite()) {
            Some(y) => current.push((idx as f64 + 0.5, y)),
            None => {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

fn category_label(labels: &[String], x: f64) -> String {
    if x < 0.0 {
        return String::new();
    }
    labels.get(x as usize).cloned().unwrap_or_default()
}

/// Axis range over the finite values with 5% padding.
/// `from_zero` pins the lower bound at zero for non-negative data.
/// Fails when the padded span does not fit in an `f64`.
fn value_range(values: impl Iterator<Item = f64>, from_zero: bool) -> Result<Range<f64>> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if min > max {
        return Ok(0.0..1.0);
    }

    let (min, max) = if from_zero {
        (min.min(0.0), max.max(0.0))
    } else {
        (min, max)
    };

    let range = if min == max {
        let padding = (min.abs() * 0.05).max(1.0);
        (min - padding)..(max + padding)
    } else {
        let padding = (max - min) * 0.05;
        let lower = if from_zero && min >= 0.0 {
            0.0
        } else {
            min - padding
        };
        lower..(max + padding)
    };

    anyhow::ensure!(
        (range.end - range.start).is_finite(),
        "Values between {} and {} span too wide a range to plot",
        min,
        max
    );
    Ok(range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{ChartSpec, SeriesData};

    fn config_for(kind: ChartKind, values: Vec<Option<f64>>) -> ChartConfig {
        let labels = (0..values.len()).map(|i| format!("c{}", i)).collect();
        let series = SeriesData::Categorical { labels, values };
        ChartConfig::from_series(&series, &ChartSpec::new(kind, "cat", "val"))
    }

    fn is_valid_png(bytes: &[u8]) -> bool {
        bytes.len() > 8 && bytes[0..8] == [137, 80, 78, 71, 13, 10, 26, 10]
    }

    #[test]
    fn test_value_range_pads_and_includes_zero() {
        assert_eq!(value_range([10.0, 20.0].into_iter(), true).unwrap(), 0.0..21.0);
        let r = value_range([-10.0, 10.0].into_iter(), false).unwrap();
        assert_eq!(r, -11.0..11.0);
    }

    #[test]
    fn test_value_range_degenerate() {
        assert_eq!(value_range(std::iter::empty(), true).unwrap(), 0.0..1.0);
        assert_eq!(value_range([3.0].into_iter(), false).unwrap(), 2.0..4.0);
        assert_eq!(value_range([f64::NAN].into_iter(), false).unwrap(), 0.0..1.0);
    }

    #[test]
    fn test_value_range_rejects_overflowing_span() {
        assert!(value_range([1.7e308, -1.7e308].into_iter(), false).is_err());
        assert!(value_range([1.75e308].into_iter(), true).is_err());
        let single = value_range([1e300].into_iter(), false).unwrap();
        assert!(single.start < single.end);
        let r = value_range([1e307, -1e307].into_iter(), false).unwrap();
        assert!((r.end - r.start).is_finite());
    }

    #[test]
    fn test_render_rejects_overflowing_axis_range() {
        for kind in [ChartKind::Bar, ChartKind::Line] {
            let config = config_for(kind, vec![Some(1.7e308), Some(-1.7e308)]);
            assert!(render_chart(&config, &RenderOptions::default()).is_err());
        }

        let series = SeriesData::Scatter {
            points: vec![
                ScatterPoint { x: Some(1.7e308), y: 1.7e308 },
                ScatterPoint { x: Some(-1.7e308), y: -1.7e308 },
            ],
        };
        let config =
            ChartConfig::from_series(&series, &ChartSpec::new(ChartKind::Scatter, "x", "y"));
        let mut backend = PlottersBackend::new(RenderOptions::default());
        assert!(backend.create(&config).is_err());
        assert_eq!(backend.live_charts(), 0);
    }

    #[test]
    fn test_valid_runs_break_on_invalid() {
        let runs = valid_runs(&[Some(1.0), Some(2.0), None, Some(4.0)]);
        assert_eq!(runs, vec![vec![(0.5, 1.0), (1.5, 2.0)], vec![(3.5, 4.0)]]);
        assert!(valid_runs(&[None, None]).is_empty());
    }

    #[test]
    fn test_category_label() {
        let labels = vec!["A".to_string(), "B".to_string()];
        assert_eq!(category_label(&labels, 1.5), "B");
        assert_eq!(category_label(&labels, 2.0), "");
        assert_eq!(category_label(&labels, -0.5), "");
    }

    #[test]
    fn test_render_bar_png() {
        let config = config_for(ChartKind::Bar, vec![Some(10.0), None, Some(30.0)]);
        let bytes = render_chart(&config, &RenderOptions::default()).unwrap();
        assert!(is_valid_png(&bytes));
    }

    #[test]
    fn test_render_line_svg() {
        let config = config_for(ChartKind::Line, vec![Some(1.0), Some(2.0), None, Some(3.0)]);
        let options = RenderOptions {
            format: OutputFormat::Svg,
            ..RenderOptions::default()
        };
        let bytes = render_chart(&config, &options).unwrap();
        let svg = String::from_utf8(bytes).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn test_render_scatter_with_invalid_x() {
        let series = SeriesData::Scatter {
            points: vec![
                ScatterPoint { x: Some(1.0), y: 2.0 },
                ScatterPoint { x: None, y: 3.0 },
            ],
        };
        let config =
            ChartConfig::from_series(&series, &ChartSpec::new(ChartKind::Scatter, "x", "y"));
        let bytes = render_chart(&config, &RenderOptions::default()).unwrap();
        assert!(is_valid_png(&bytes));
    }

    #[test]
    fn test_render_pie_and_doughnut() {
        for kind in [ChartKind::Pie, ChartKind::Doughnut] {
            let config = config_for(kind, vec![Some(1.0), Some(-2.0), None, Some(3.0)]);
            let bytes = render_chart(&config, &RenderOptions::default()).unwrap();
            assert!(is_valid_png(&bytes));
        }
    }

    #[test]
    fn test_render_empty_series() {
        for kind in [ChartKind::Bar, ChartKind::Pie] {
            let config = config_for(kind, vec![]);
            assert!(render_chart(&config, &RenderOptions::default()).is_ok());
        }
    }

    #[test]
    fn test_render_zero_size_fails() {
        let config = config_for(ChartKind::Bar, vec![Some(1.0)]);
        let options = RenderOptions {
            width: 0,
            ..RenderOptions::default()
        };
        assert!(render_chart(&config, &options).is_err());
    }

    #[test]
    fn test_backend_create_and_destroy() {
        let mut backend = PlottersBackend::new(RenderOptions::default());
        let config = config_for(ChartKind::Bar, vec![Some(5.0)]);

        let first = backend.create(&config).unwrap();
        let second = backend.create(&config).unwrap();
        assert_ne!(first, second);
        assert_eq!(backend.live_charts(), 2);

        backend.destroy(first);
        assert_eq!(backend.live_charts(), 1);
        assert!(backend.output(first).is_none());
        let rendered = backend.output(second).unwrap();
        assert_eq!(rendered.format, OutputFormat::Png);
        assert!(is_valid_png(&rendered.bytes));

        backend.destroy(first);
        assert_eq!(backend.live_charts(), 1);
    }
}
