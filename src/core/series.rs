use std::fmt;

use indexmap::{IndexMap, IndexSet};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// One field value stored in a data point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Number(f64),
    Category(String),
    Id(String),
}

impl FieldValue {
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Number(_) => FieldKind::Number,
            Self::Category(_) => FieldKind::Category,
            Self::Id(_) => FieldKind::Id,
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Category(_) | Self::Id(_) => None,
        }
    }

    /// Text view of categorical and identifier values.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Category(text) | Self::Id(text) => Some(text),
            Self::Number(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Category(text) | Self::Id(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    Number,
    Category,
    Id,
}

/// Named fields of one datum, in insertion order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataPoint {
    fields: IndexMap<String, FieldValue>,
}

impl DataPoint {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_number(self, name: impl Into<String>, value: f64) -> Self {
        self.with_field(name, FieldValue::Number(value))
    }

    #[must_use]
    pub fn with_category(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_field(name, FieldValue::Category(value.into()))
    }

    #[must_use]
    pub fn with_id(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_field(name, FieldValue::Id(value.into()))
    }

    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    #[must_use]
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(FieldValue::as_number)
    }

    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_text)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn schema(&self) -> IndexMap<String, FieldKind> {
        self.fields
            .iter()
            .map(|(name, value)| (name.clone(), value.kind()))
            .collect()
    }
}

/// Ordered data for one render pass.
///
/// Every point carries the same field names with the same kinds; the schema
/// is taken from the first point.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<DataPoint>", into = "Vec<DataPoint>")]
pub struct Series {
    points: Vec<DataPoint>,
    schema: IndexMap<String, FieldKind>,
}

impl Series {
    pub fn new(points: Vec<DataPoint>) -> ChartResult<Self> {
        let Some(first) = points.first() else {
            return Ok(Self::empty());
        };
        let schema = first.schema();
        for (index, point) in points.iter().enumerate().skip(1) {
            if point.len() != schema.len() {
                return Err(ChartError::InvalidData(format!(
                    "point {index} has {} fields, expected {}",
                    point.len(),
                    schema.len()
                )));
            }
            for (name, value) in point.fields() {
                match schema.get(name) {
                    Some(kind) if *kind == value.kind() => {}
                    Some(kind) => {
                        return Err(ChartError::InvalidData(format!(
                            "point {index} field `{name}` is {:?}, expected {kind:?}",
                            value.kind()
                        )));
                    }
                    None => {
                        return Err(ChartError::InvalidData(format!(
                            "point {index} has unexpected field `{name}`"
                        )));
                    }
                }
            }
        }
        Ok(Self { points, schema })
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&DataPoint> {
        self.points.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn field_kind(&self, name: &str) -> Option<FieldKind> {
        self.schema.get(name).copied()
    }

    /// Fails unless `name` is present with `kind` (empty series accept any field).
    pub fn require_field(&self, name: &str, kind: FieldKind) -> ChartResult<()> {
        if self.is_empty() {
            return Ok(());
        }
        match self.field_kind(name) {
            Some(found) if found == kind => Ok(()),
            Some(found) => Err(ChartError::InvalidData(format!(
                "field `{name}` is {found:?}, expected {kind:?}"
            ))),
            None => Err(ChartError::InvalidData(format!(
                "series has no field `{name}`"
            ))),
        }
    }

    /// Maximum finite value of a numeric field.
    #[must_use]
    pub fn max_number(&self, name: &str) -> Option<f64> {
        self.points
            .iter()
            .filter_map(|point| point.number(name))
            .filter(|value| value.is_finite())
            .map(OrderedFloat)
            .max()
            .map(OrderedFloat::into_inner)
    }

    /// Sum of finite values of a numeric field.
    #[must_use]
    pub fn sum_number(&self, name: &str) -> f64 {
        self.points
            .iter()
            .filter_map(|point| point.number(name))
            .filter(|value| value.is_finite())
            .sum()
    }

    /// Distinct text values of a field in first-appearance order.
    #[must_use]
    pub fn distinct_text(&self, name: &str) -> Vec<String> {
        let values: IndexSet<&str> = self
            .points
            .iter()
            .filter_map(|point| point.text(name))
            .collect();
        values.into_iter().map(str::to_owned).collect()
    }
}

impl TryFrom<Vec<DataPoint>> for Series {
    type Error = ChartError;

    fn try_from(points: Vec<DataPoint>) -> ChartResult<Self> {
        Self::new(points)
    }
}

impl From<Series> for Vec<DataPoint> {
    fn from(series: Series) -> Self {
        series.points
    }
}
