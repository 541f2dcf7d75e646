use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{BandScale, Point};
use crate::error::{ChartError, ChartResult};

/// Closed polygon rings in surface space.
///
/// Most shapes have a single ring, so rings are stored inline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPath {
    pub rings: SmallVec<[Vec<Point>; 1]>,
}

impl ScreenPath {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_ring(ring: Vec<Point>) -> Self {
        let mut path = Self::new();
        path.push_ring(ring);
        path
    }

    /// Appends a ring, ignoring rings with fewer than three vertices.
    pub fn push_ring(&mut self, ring: Vec<Point>) {
        if ring.len() >= 3 {
            self.rings.push(ring);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.rings.iter().map(Vec::len).sum()
    }

    /// Even-odd containment test across all rings.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        let mut inside = false;
        for ring in &self.rings {
            let Some(&last) = ring.last() else {
                continue;
            };
            let mut previous = last;
            for &current in ring {
                if (current.y > point.y) != (previous.y > point.y) {
                    let crossing_x = previous.x
                        + (point.y - previous.y) / (current.y - previous.y)
                            * (current.x - previous.x);
                    if point.x < crossing_x {
                        inside = !inside;
                    }
                }
                previous = current;
            }
        }
        inside
    }

    /// Axis-aligned bounds as `(min, max)`.
    #[must_use]
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let mut points = self.rings.iter().flatten();
        let first = *points.next()?;
        Some(points.fold((first, first), |(min, max), point| {
            (
                Point::new(min.x.min(point.x), min.y.min(point.y)),
                Point::new(max.x.max(point.x), max.y.max(point.y)),
            )
        }))
    }

    /// SVG path data (`M x,y L x,y … Z` per ring).
    #[must_use]
    pub fn to_svg_path_data(&self) -> String {
        let mut out = String::new();
        for ring in &self.rings {
            for (index, point) in ring.iter().enumerate() {
                let command = if index == 0 { 'M' } else { 'L' };
                let _ = write!(out, "{command}{},{}", fmt_coord(point.x), fmt_coord(point.y));
            }
            out.push('Z');
        }
        out
    }

    pub fn validate(&self) -> ChartResult<()> {
        let finite = self
            .rings
            .iter()
            .flatten()
            .all(|point| point.x.is_finite() && point.y.is_finite());
        if !finite {
            return Err(ChartError::InvalidData(
                "path coordinates must be finite".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Formats a coordinate with at most three decimals and no trailing zeros.
#[must_use]
pub fn fmt_coord(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let mut text = format!("{rounded:.3}");
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    text
}

/// Heat-map cell in surface space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Resolves the grid cell for `(x_category, y_category)`.
///
/// Fails with `UnknownCategory` when either band scale lacks the category.
pub fn cell_rect(
    x_category: &str,
    y_category: &str,
    x_band: &BandScale,
    y_band: &BandScale,
) -> ChartResult<CellRect> {
    let column = x_band.band(x_category)?;
    let row = y_band.band(y_category)?;
    Ok(CellRect {
        x: column.start,
        y: row.start,
        width: column.size,
        height: row.size,
    })
}

/// Closed polygon approximating a pie wedge (or a full disc).
///
/// Angles are radians measured clockwise from 12 o'clock.
#[must_use]
pub fn wedge_path(
    center: Point,
    radius: f64,
    start_angle: f64,
    end_angle: f64,
    segments_per_turn: usize,
) -> ScreenPath {
    let sweep = (end_angle - start_angle).max(0.0);
    let turns = sweep / std::f64::consts::TAU;
    let full_circle = sweep >= std::f64::consts::TAU - 1e-9;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let segments = ((turns * segments_per_turn as f64).ceil() as usize)
        .max(if full_circle { 3 } else { 1 });
    let mut ring = Vec::with_capacity(segments + 2);
    if !full_circle {
        ring.push(center);
    }
    for step in 0..=segments {
        if full_circle && step == segments {
            break;
        }
        let angle = start_angle + sweep * step as f64 / segments as f64;
        ring.push(Point::new(
            center.x + radius * angle.sin(),
            center.y - radius * angle.cos(),
        ));
    }
    ScreenPath::from_ring(ring)
}
