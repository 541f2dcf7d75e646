use indexmap::IndexMap;
use geojson::feature::Id;
use geojson::{GeoJson, Position, Value as GeoJsonValue};
use smallvec::SmallVec;

use crate::error::{ChartError, ChartResult};

/// One polygon in geographic degrees: an outer ring followed by holes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeoPolygon {
    pub rings: SmallVec<[Vec<(f64, f64)>; 1]>,
}

impl GeoPolygon {
    /// Single-ring polygon from `(longitude, latitude)` vertices.
    #[must_use]
    pub fn from_ring(ring: Vec<(f64, f64)>) -> Self {
        let mut rings = SmallVec::new();
        rings.push(ring);
        Self { rings }
    }

    pub fn vertices(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.rings.iter().flatten().copied()
    }
}

/// Named region drawn by a choropleth.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoShape {
    pub id: String,
    pub name: String,
    pub polygons: Vec<GeoPolygon>,
}

impl GeoShape {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, polygons: Vec<GeoPolygon>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            polygons,
        }
    }

    pub fn vertices(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.polygons.iter().flat_map(GeoPolygon::vertices)
    }
}

/// Shapes keyed by identifier, kept in insertion (paint) order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShapeCollection {
    shapes: IndexMap<String, GeoShape>,
}

impl ShapeCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_shapes(shapes: impl IntoIterator<Item = GeoShape>) -> ChartResult<Self> {
        let mut collection = Self::new();
        for shape in shapes {
            collection.insert(shape)?;
        }
        Ok(collection)
    }

    /// Adds a shape; identifiers must be unique and non-empty.
    pub fn insert(&mut self, shape: GeoShape) -> ChartResult<()> {
        if shape.id.is_empty() {
            return Err(ChartError::InvalidData(
                "shape id must not be empty".to_owned(),
            ));
        }
        if self.shapes.contains_key(&shape.id) {
            return Err(ChartError::InvalidData(format!(
                "shape with id `{}` is already defined",
                shape.id
            )));
        }
        self.shapes.insert(shape.id.clone(), shape);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&GeoShape> {
        self.shapes.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeoShape> {
        self.shapes.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Parses a GeoJSON `FeatureCollection` of `Polygon` / `MultiPolygon` features.
    ///
    /// The feature `id` (string or number) is required; the display name is
    /// read from `properties.name` and defaults to the id. Features with other
    /// geometry types are skipped.
    pub fn from_geojson_str(input: &str) -> ChartResult<Self> {
        let root: GeoJson = input
            .parse()
            .map_err(|e| ChartError::InvalidData(format!("failed to parse geojson: {e}")))?;
        let GeoJson::FeatureCollection(features) = root else {
            return Err(ChartError::InvalidData(
                "geojson root must be a FeatureCollection".to_owned(),
            ));
        };

        let mut collection = Self::new();
        for (index, feature) in features.features.into_iter().enumerate() {
            let id = match &feature.id {
                Some(Id::String(id)) => id.clone(),
                Some(Id::Number(id)) => id.to_string(),
                None => {
                    return Err(ChartError::InvalidData(format!(
                        "feature {index} has no id"
                    )));
                }
            };
            let name = feature
                .property("name")
                .and_then(|name| name.as_str())
                .map_or_else(|| id.clone(), str::to_owned);
            let Some(geometry) = feature.geometry else {
                continue;
            };
            let polygons = match geometry.value {
                GeoJsonValue::Polygon(rings) => vec![convert_polygon(rings)?],
                GeoJsonValue::MultiPolygon(polygons) => polygons
                    .into_iter()
                    .map(convert_polygon)
                    .collect::<ChartResult<Vec<_>>>()?,
                _ => continue,
            };
            collection.insert(GeoShape::new(id, name, polygons))?;
        }
        Ok(collection)
    }
}

fn convert_polygon(rings: Vec<Vec<Position>>) -> ChartResult<GeoPolygon> {
    let mut polygon = GeoPolygon::default();
    for ring in rings {
        let ring = ring
            .iter()
            .map(|position| convert_position(position))
            .collect::<ChartResult<Vec<_>>>()?;
        polygon.rings.push(ring);
    }
    Ok(polygon)
}

fn convert_position(position: &[f64]) -> ChartResult<(f64, f64)> {
    match position {
        [lon, lat, ..] if lon.is_finite() && lat.is_finite() => Ok((*lon, *lat)),
        [_, _, ..] => Err(ChartError::InvalidData(
            "position must contain finite numbers".to_owned(),
        )),
        _ => Err(ChartError::InvalidData(
            "position must be [longitude, latitude]".to_owned(),
        )),
    }
}
