pub mod color;
pub mod color_scale;
pub mod geometry;
pub mod projection;
pub mod scale;
pub mod series;
pub mod shapes;
pub mod types;

pub use color::Color;
pub use color_scale::{DEFAULT_SEQUENTIAL_DOMAIN, SequentialColorScale};
pub use geometry::{CellRect, ScreenPath, cell_rect, wedge_path};
pub use projection::{ConicEqualArea, Projection, ProjectionKind, project};
pub use scale::{Band, BandScale, DomainFallback, LinearScale};
pub use series::{DataPoint, FieldKind, FieldValue, Series};
pub use shapes::{GeoPolygon, GeoShape, ShapeCollection};
pub use types::{ChartId, Margins, Point, Viewport};
