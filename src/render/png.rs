use std::fmt::Display;
use std::ops::Range;

use base64::Engine;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use log::debug;
use plotters::coord::Shift;
use plotters::prelude::*;

use super::{PlotArtifact, RenderError, Renderer, Result};
use crate::figure::{Figure, Layout, LineDash, NamedColor, Scatter, Scatter3d, Surface, Trace};

/// Number of light grid divisions drawn along each axis.
const GRID_DIVISIONS: usize = 10;
/// Dashes per reference-line segment.
const DASHES: usize = 24;
/// Largest width or height the image backend rasterises.
pub const MAX_RASTER_DIMENSION: u32 = 4096;
const GRID_COLOR: RGBColor = RGBColor(225, 225, 225);
const FRAME_COLOR: RGBColor = RGBColor(68, 68, 68);

type Canvas<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Draws the figure into an in-memory RGB buffer and returns it as a base64
/// PNG.
///
/// Every call owns its pixel buffer and drawing area; both are released when
/// the call returns, on success or on error. Canvases wider or taller than
/// [`MAX_RASTER_DIMENSION`] are refused before any allocation. Text is not
/// rasterised, titles and axis labels only appear in the interactive output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PngRenderer;

impl Renderer for PngRenderer {
    fn render(&self, figure: &Figure) -> Result<PlotArtifact> {
        figure.check_compatible()?;
        let (width, height) = (figure.layout.width, figure.layout.height);
        if width > MAX_RASTER_DIMENSION || height > MAX_RASTER_DIMENSION {
            return Err(RenderError::CanvasTooLarge {
                width,
                height,
                max: MAX_RASTER_DIMENSION,
            });
        }

        let mut pixels = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(backend)?;
            if figure.layout.scene.is_some() {
                draw_scene(&root, figure)?;
            } else {
                draw_cartesian(&root, figure)?;
            }
            root.present().map_err(backend)?;
        }

        let mut png = Vec::new();
        PngEncoder::new(&mut png)
            .write_image(&pixels, width, height, ColorType::Rgb8)
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        debug!("encoded {}x{} png of {} bytes", width, height, png.len());

        Ok(PlotArtifact::ImageBase64(
            base64::engine::general_purpose::STANDARD.encode(png),
        ))
    }
}

fn draw_cartesian(root: &Canvas, figure: &Figure) -> Result<()> {
    let scatters = figure
        .traces
        .iter()
        .map(|trace| match trace {
            Trace::Scatter(s) => Ok(s),
            other => Err(RenderError::IncompatibleTrace {
                trace: other.kind(),
                layout: "cartesian",
            }),
        })
        .collect::<Result<Vec<&Scatter>>>()?;

    let x_range = padded(extent(scatters.iter().flat_map(|s| s.x.iter().copied()))?);
    let y_range = padded(extent(scatters.iter().flat_map(|s| s.y.iter().copied()))?);

    let mut builder = ChartBuilder::on(root);
    set_margins(&mut builder, &figure.layout);
    let mut chart = builder
        .build_cartesian_2d(x_range.clone(), y_range.clone())
        .map_err(backend)?;

    let grid_style = GRID_COLOR.stroke_width(1);
    chart
        .draw_series(divisions(&x_range).map(|x| {
            PathElement::new(vec![(x, y_range.start), (x, y_range.end)], grid_style)
        }))
        .map_err(backend)?;
    chart
        .draw_series(divisions(&y_range).map(|y| {
            PathElement::new(vec![(x_range.start, y), (x_range.end, y)], grid_style)
        }))
        .map_err(backend)?;

    for scatter in scatters {
        if let Some(line) = &scatter.line {
            let style = color(line.color).stroke_width(line.width.unwrap_or(2.).round() as u32);
            let points: Vec<(f64, f64)> = scatter
                .x
                .iter()
                .copied()
                .zip(scatter.y.iter().copied())
                .collect();
            match line.dash {
                Some(LineDash::Dash) => {
                    chart
                        .draw_series(dashes(&points).map(|seg| PathElement::new(seg, style)))
                        .map_err(backend)?;
                }
                _ => {
                    chart
                        .draw_series(std::iter::once(PathElement::new(points, style)))
                        .map_err(backend)?;
                }
            }
        }
        if let Some(marker) = &scatter.marker {
            let fill = color(marker.color)
                .mix(marker.opacity.unwrap_or(1.))
                .filled();
            let radius = radius(marker.size);
            chart
                .draw_series(
                    scatter
                        .x
                        .iter()
                        .zip(scatter.y.iter())
                        .map(|(&x, &y)| Circle::new((x, y), radius, fill)),
                )
                .map_err(backend)?;
        }
    }

    let frame = FRAME_COLOR.stroke_width(1);
    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![
                (x_range.start, y_range.end),
                (x_range.start, y_range.start),
                (x_range.end, y_range.start),
            ],
            frame,
        )))
        .map_err(backend)?;
    Ok(())
}

fn draw_scene(root: &Canvas, figure: &Figure) -> Result<()> {
    let mut points: Vec<&Scatter3d> = Vec::new();
    let mut surfaces: Vec<&Surface> = Vec::new();
    for trace in &figure.traces {
        match trace {
            Trace::Scatter3d(s) => points.push(s),
            Trace::Surface(s) => surfaces.push(s),
            Trace::Scatter(_) => {
                return Err(RenderError::IncompatibleTrace {
                    trace: trace.kind(),
                    layout: "scene",
                })
            }
        }
    }

    // The vertical axis of a plotters 3D chart is its y axis: the target goes
    // there, the second feature runs along the depth axis.
    let feature1 = extent(
        points
            .iter()
            .flat_map(|p| p.x.iter().copied())
            .chain(surfaces.iter().flat_map(|s| s.x.iter().flatten().copied())),
    )?;
    let feature2 = extent(
        points
            .iter()
            .flat_map(|p| p.y.iter().copied())
            .chain(surfaces.iter().flat_map(|s| s.y.iter().flatten().copied())),
    )?;
    let target = extent(
        points
            .iter()
            .flat_map(|p| p.z.iter().copied())
            .chain(surfaces.iter().flat_map(|s| s.z.iter().flatten().copied())),
    )?;
    let (x_range, y_range, z_range) = (padded(feature1), padded(target), padded(feature2));

    let mut builder = ChartBuilder::on(root);
    set_margins(&mut builder, &figure.layout);
    let mut chart = builder
        .build_cartesian_3d(x_range.clone(), y_range.clone(), z_range.clone())
        .map_err(backend)?;
    chart.with_projection(|mut pb| {
        pb.yaw = 0.6;
        pb.pitch = 0.35;
        pb.scale = 0.85;
        pb.into_matrix()
    });

    let frame = FRAME_COLOR.stroke_width(1);
    chart
        .draw_series(
            box_edges(&x_range, &y_range, &z_range)
                .into_iter()
                .map(|edge| PathElement::new(edge.to_vec(), frame)),
        )
        .map_err(backend)?;

    for surface in surfaces {
        let (lo, hi) = extent(surface.z.iter().flatten().copied())?;
        let span = if hi > lo { hi - lo } else { 1. };
        let rows = surface.z.len();
        let cols = surface.z.first().map_or(0, Vec::len);
        let at = |i: usize, j: usize| (surface.x[i][j], surface.z[i][j], surface.y[i][j]);

        let mut cells = Vec::with_capacity(rows.saturating_sub(1) * cols.saturating_sub(1));
        for i in 0..rows.saturating_sub(1) {
            for j in 0..cols.saturating_sub(1) {
                let corners = vec![at(i, j), at(i, j + 1), at(i + 1, j + 1), at(i + 1, j)];
                let mean = corners.iter().map(|c| c.1).sum::<f64>() / 4.;
                let fill = reds((mean - lo) / span).mix(surface.opacity).filled();
                cells.push(Polygon::new(corners, fill));
            }
        }
        chart.draw_series(cells).map_err(backend)?;
    }

    for scatter in points {
        let fill = color(scatter.marker.color)
            .mix(scatter.marker.opacity.unwrap_or(1.))
            .filled();
        let radius = radius(scatter.marker.size);
        chart
            .draw_series(
                scatter
                    .x
                    .iter()
                    .zip(scatter.y.iter())
                    .zip(scatter.z.iter())
                    .map(|((&x, &y), &z)| Circle::new((x, z, y), radius, fill)),
            )
            .map_err(backend)?;
    }
    Ok(())
}

fn set_margins<DB: DrawingBackend>(builder: &mut ChartBuilder<'_, '_, DB>, layout: &Layout) {
    // Keep at least a third of each dimension for the plotting area.
    let horizontal = layout.width / 3;
    let vertical = layout.height / 3;
    let m = layout.margin;
    builder
        .margin_left(m.l.min(horizontal))
        .margin_right(m.r.min(horizontal))
        .margin_top(m.t.min(vertical))
        .margin_bottom(m.b.min(vertical));
}

fn backend<E: Display>(e: E) -> RenderError {
    RenderError::Backend(e.to_string())
}

fn color(c: NamedColor) -> RGBColor {
    match c {
        NamedColor::Blue => BLUE,
        NamedColor::Red => RED,
        NamedColor::Green => RGBColor(0, 128, 0),
        NamedColor::Black => BLACK,
    }
}

/// Marker sizes are diameters in pixels.
fn radius(size: f64) -> i32 {
    (size / 2.).round().max(1.) as i32
}

/// Piecewise linear "Reds" color scale, `t` in `[0, 1]`.
fn reds(t: f64) -> RGBColor {
    const STOPS: [(f64, (f64, f64, f64)); 4] = [
        (0.0, (220., 220., 220.)),
        (0.2, (245., 195., 157.)),
        (0.4, (245., 160., 105.)),
        (1.0, (178., 10., 28.)),
    ];
    let t = t.clamp(0., 1.);
    let upper = STOPS.iter().position(|&(s, _)| s >= t).unwrap_or(STOPS.len() - 1).max(1);
    let (s0, c0) = STOPS[upper - 1];
    let (s1, c1) = STOPS[upper];
    let w = if s1 > s0 { (t - s0) / (s1 - s0) } else { 0. };
    let lerp = |a: f64, b: f64| (a + (b - a) * w).round() as u8;
    RGBColor(lerp(c0.0, c1.0), lerp(c0.1, c1.1), lerp(c0.2, c1.2))
}

fn extent(values: impl Iterator<Item = f64>) -> Result<(f64, f64)> {
    values
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .ok_or(RenderError::EmptyFigure)
}

/// Widens `[lo, hi]` by 5% on each side; a single value gets a unit window.
fn padded((lo, hi): (f64, f64)) -> Range<f64> {
    if hi > lo {
        let pad = (hi - lo) * 0.05;
        (lo - pad)..(hi + pad)
    } else {
        (lo - 0.5)..(hi + 0.5)
    }
}

fn divisions(range: &Range<f64>) -> impl Iterator<Item = f64> {
    let (start, step) = (range.start, (range.end - range.start) / GRID_DIVISIONS as f64);
    (1..GRID_DIVISIONS).map(move |k| start + step * k as f64)
}

/// Splits a polyline into alternating drawn segments.
fn dashes(points: &[(f64, f64)]) -> impl Iterator<Item = Vec<(f64, f64)>> + '_ {
    points.windows(2).flat_map(|w| {
        let ((x0, y0), (x1, y1)) = (w[0], w[1]);
        let n = 2 * DASHES;
        (0..n).step_by(2).map(move |k| {
            let at = |t: f64| (x0 + (x1 - x0) * t, y0 + (y1 - y0) * t);
            vec![at(k as f64 / n as f64), at((k + 1) as f64 / n as f64)]
        })
    })
}

fn box_edges(
    x: &Range<f64>,
    y: &Range<f64>,
    z: &Range<f64>,
) -> Vec<[(f64, f64, f64); 2]> {
    let corner = |i: u8| {
        (
            if i & 1 == 0 { x.start } else { x.end },
            if i & 2 == 0 { y.start } else { y.end },
            if i & 4 == 0 { z.start } else { z.end },
        )
    };
    let mut edges = Vec::with_capacity(12);
    for a in 0u8..8 {
        for bit in [1u8, 2, 4] {
            if a & bit == 0 {
                edges.push([corner(a), corner(a | bit)]);
            }
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reds_scale_end_points() {
        assert_eq!(reds(0.), RGBColor(220, 220, 220));
        assert_eq!(reds(1.), RGBColor(178, 10, 28));
        assert_eq!(reds(-3.), reds(0.));
        assert_eq!(reds(0.2), RGBColor(245, 195, 157));
    }

    #[test]
    fn padded_handles_degenerate_ranges() {
        assert_eq!(padded((2., 2.)), 1.5..2.5);
        assert_eq!(padded((0., 10.)), -0.5..10.5);
    }

    #[test]
    fn dashes_cover_half_of_each_segment() {
        let segments: Vec<_> = dashes(&[(0., 0.), (1., 1.)]).collect();
        assert_eq!(segments.len(), DASHES);
        assert_eq!(segments[0][0], (0., 0.));
    }

    #[test]
    fn cube_has_twelve_edges() {
        assert_eq!(box_edges(&(0.0..1.0), &(0.0..1.0), &(0.0..1.0)).len(), 12);
    }
}
