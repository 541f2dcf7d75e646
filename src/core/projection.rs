use std::f64::consts::FRAC_PI_4;

use serde::{Deserialize, Serialize};

use crate::core::{GeoShape, Point, ScreenPath, ShapeCollection, Viewport};
use crate::error::{ChartError, ChartResult};

const MERCATOR_MAX_LAT_DEG: f64 = 85.051_128_78;

/// Conic equal-area (Albers) parameters, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConicEqualArea {
    pub parallels: (f64, f64),
    /// Added to every longitude before projecting.
    pub rotate_lon: f64,
}

impl ConicEqualArea {
    /// Lower-48 United States preset.
    #[must_use]
    pub const fn albers_usa() -> Self {
        Self {
            parallels: (29.5, 45.5),
            rotate_lon: 96.0,
        }
    }

    fn raw(self, lambda: f64, phi: f64) -> (f64, f64) {
        let phi0 = self.parallels.0.to_radians();
        let phi1 = self.parallels.1.to_radians();
        let sy0 = phi0.sin();
        let n = (sy0 + phi1.sin()) / 2.0;
        if n.abs() < 1e-9 {
            // Symmetric parallels degenerate to cylindrical equal-area.
            let cos_phi0 = phi0.cos();
            return (lambda * cos_phi0, phi.sin() / cos_phi0);
        }
        let c = 1.0 + sy0 * (2.0 * n - sy0);
        let r0 = c.sqrt() / n;
        let r = (c - 2.0 * n * phi.sin()).max(0.0).sqrt() / n;
        let theta = lambda * n;
        (r * theta.sin(), r0 - r * theta.cos())
    }
}

impl Default for ConicEqualArea {
    fn default() -> Self {
        Self::albers_usa()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProjectionKind {
    Equirectangular,
    Mercator,
    ConicEqualArea(ConicEqualArea),
}

impl ProjectionKind {
    /// Unscaled projection with y pointing up.
    fn raw(self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        match self {
            Self::Equirectangular => (lon_deg.to_radians(), lat_deg.to_radians()),
            Self::Mercator => {
                let phi = lat_deg
                    .clamp(-MERCATOR_MAX_LAT_DEG, MERCATOR_MAX_LAT_DEG)
                    .to_radians();
                (lon_deg.to_radians(), (FRAC_PI_4 + phi / 2.0).tan().ln())
            }
            Self::ConicEqualArea(params) => {
                let lambda = wrap_lon_deg(lon_deg + params.rotate_lon).to_radians();
                params.raw(lambda, lat_deg.to_radians())
            }
        }
    }
}

impl Default for ProjectionKind {
    fn default() -> Self {
        Self::ConicEqualArea(ConicEqualArea::albers_usa())
    }
}

fn wrap_lon_deg(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    // Keep +180 on the eastern edge rather than folding it to -180.
    if wrapped == -180.0 && lon > 0.0 {
        180.0
    } else {
        wrapped
    }
}

/// A projection fitted to a viewport: `screen = translate + scale * (x, -y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    kind: ProjectionKind,
    scale: f64,
    translate: (f64, f64),
}

impl Projection {
    /// Fits `shapes` into `[0, width] x [0, height]`.
    pub fn fit_size(
        kind: ProjectionKind,
        viewport: Viewport,
        shapes: &ShapeCollection,
    ) -> ChartResult<Self> {
        viewport.ensure_mountable()?;
        Self::fit_extent(
            kind,
            Point::new(0.0, 0.0),
            Point::new(viewport.width_f64(), viewport.height_f64()),
            shapes,
        )
    }

    /// Uniformly scales and centers the projected bounds of `shapes` inside
    /// the extent spanned by `top_left` and `bottom_right`.
    pub fn fit_extent(
        kind: ProjectionKind,
        top_left: Point,
        bottom_right: Point,
        shapes: &ShapeCollection,
    ) -> ChartResult<Self> {
        let mut vertices = shapes
            .iter()
            .flat_map(GeoShape::vertices)
            .map(|(lon, lat)| kind.raw(lon, lat))
            .map(|(x, y)| (x, -y));
        // An empty collection has no extent to fit.
        let Some(first) = vertices.next() else {
            return Err(ChartError::InvalidDomain { min: 0.0, max: 0.0 });
        };
        let (min, max) = vertices.fold((first, first), |(min, max), (x, y)| {
            ((min.0.min(x), min.1.min(y)), (max.0.max(x), max.1.max(y)))
        });

        let width = bottom_right.x - top_left.x;
        let height = bottom_right.y - top_left.y;
        let dx = max.0 - min.0;
        let dy = max.1 - min.1;
        let scale = match (dx > 0.0, dy > 0.0) {
            (true, true) => (width / dx).min(height / dy),
            (true, false) => width / dx,
            (false, true) => height / dy,
            (false, false) => {
                return Err(ChartError::InvalidDomain {
                    min: min.0,
                    max: max.0,
                });
            }
        };
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ChartError::InvalidData(
                "projection extent must have a positive size".to_owned(),
            ));
        }

        let translate = (
            top_left.x + (width - scale * (min.0 + max.0)) / 2.0,
            top_left.y + (height - scale * (min.1 + max.1)) / 2.0,
        );
        Ok(Self {
            kind,
            scale,
            translate,
        })
    }

    #[must_use]
    pub fn kind(self) -> ProjectionKind {
        self.kind
    }

    #[must_use]
    pub fn scale(self) -> f64 {
        self.scale
    }

    #[must_use]
    pub fn translate(self) -> (f64, f64) {
        self.translate
    }

    #[must_use]
    pub fn project_point(self, lon_deg: f64, lat_deg: f64) -> Point {
        let (x, y) = self.kind.raw(lon_deg, lat_deg);
        Point::new(
            self.translate.0 + self.scale * x,
            self.translate.1 - self.scale * y,
        )
    }
}

/// Projects every polygon ring of `shape` into surface space.
#[must_use]
pub fn project(shape: &GeoShape, projection: Projection) -> ScreenPath {
    let mut path = ScreenPath::new();
    for polygon in &shape.polygons {
        for ring in &polygon.rings {
            let mut screen: Vec<Point> = ring
                .iter()
                .map(|&(lon, lat)| projection.project_point(lon, lat))
                .collect();
            // GeoJSON rings repeat the first vertex; the path closes itself.
            if screen.len() > 1 && screen.first() == screen.last() {
                screen.pop();
            }
            path.push_ring(screen);
        }
    }
    path
}
