//! Chart series types

use serde::{Deserialize, Serialize};

/// One point on the temperature chart
///
/// Field names follow the shape charting libraries expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// ISO-8601 timestamp, e.g. `2024-01-01T12:00:00.000Z`
    pub x: String,
    /// Temperature in Fahrenheit, formatted to one decimal
    pub y: String,
}

/// Ordered, append-only sequence of chart points
///
/// Grows for the lifetime of the client; nothing is evicted.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ChartSeries {
    points: Vec<ChartPoint>,
}

impl ChartSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, point: ChartPoint) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[ChartPoint] {
        &self.points
    }

    pub fn last(&self) -> Option<&ChartPoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
