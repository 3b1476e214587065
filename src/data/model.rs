use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Raw input – what a record/file parser hands to the core
// ---------------------------------------------------------------------------

/// One reading with its confidence band: `[low, mid, high]`.
///
/// `mid` may be NaN to denote "center unknown but band known".
pub type Triple = [f64; 3];

/// A single channel cell: `None` when there is no reading at this timestamp.
pub type RawCell = Option<Triple>;

/// One timestamp and one cell per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub timestamp: f64,
    pub cells: Vec<RawCell>,
}

impl RawRow {
    pub fn new(timestamp: f64, cells: Vec<RawCell>) -> Self {
        Self { timestamp, cells }
    }

    /// Cell for `channel`, treating a missing trailing cell as no reading.
    pub fn cell(&self, channel: usize) -> RawCell {
        self.cells.get(channel).copied().flatten()
    }
}

/// Row-major matrix of raw readings.
///
/// Timestamps are expected to be strictly increasing; this is not
/// re-validated here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMatrix {
    channel_count: usize,
    rows: Vec<RawRow>,
}

impl RawMatrix {
    pub fn new(channel_count: usize) -> Self {
        Self {
            channel_count,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(channel_count: usize, rows: Vec<RawRow>) -> Self {
        Self {
            channel_count,
            rows,
        }
    }

    pub fn push(&mut self, row: RawRow) {
        self.rows.push(row);
    }

    /// Number of plotted channels (columns after the timestamp).
    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `(first, last)` timestamp, if any rows exist.
    pub fn time_span(&self) -> Option<(f64, f64)> {
        Some((self.rows.first()?.timestamp, self.rows.last()?.timestamp))
    }
}

// ---------------------------------------------------------------------------
// Extracted / aggregated records
// ---------------------------------------------------------------------------

/// Lower and upper edge of a band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub low: f64,
    pub high: f64,
}

impl Band {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Zero-width band sitting on `value`.
    pub fn degenerate(value: f64) -> Self {
        Self {
            low: value,
            high: value,
        }
    }
}

/// `(timestamp, center, band)` for one row of one channel.
///
/// A `None` center always pairs with a `None` band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    pub timestamp: f64,
    pub center: Option<f64>,
    pub band: Option<Band>,
}

/// Same shape as [`ExtractedRecord`]; center and band are window means.
pub type AggregatedRecord = ExtractedRecord;

impl ExtractedRecord {
    pub fn new(timestamp: f64, center: f64, band: Band) -> Self {
        Self {
            timestamp,
            center: Some(center),
            band: Some(band),
        }
    }

    /// A gap: no usable data at this timestamp.
    pub fn null(timestamp: f64) -> Self {
        Self {
            timestamp,
            center: None,
            band: None,
        }
    }

    pub fn is_null(&self) -> bool {
        self.center.is_none()
    }

    /// The center when it counts towards a window mean: present and not NaN.
    pub fn valid_center(&self) -> Option<f64> {
        self.center.filter(|c| !c.is_nan())
    }
}

impl fmt::Display for ExtractedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.center, self.band) {
            (Some(c), Some(b)) => write!(f, "({}, {c}, [{}, {}])", self.timestamp, b.low, b.high),
            (Some(c), None) => write!(f, "({}, {c}, [null, null])", self.timestamp),
            (None, _) => write!(f, "({}, null, [null, null])", self.timestamp),
        }
    }
}

// ---------------------------------------------------------------------------
// Caller-supplied parameters
// ---------------------------------------------------------------------------

/// Value axis scale in effect for the plot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisMode {
    #[default]
    Linear,
    /// Non-positive readings cannot be drawn and become gaps.
    Logarithmic,
}

impl AxisMode {
    pub fn label(&self) -> &'static str {
        match self {
            AxisMode::Linear => "Linear",
            AxisMode::Logarithmic => "Log",
        }
    }
}

/// How a cell whose middle component is NaN is represented after extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnreadableCenter {
    /// Emit a full null record, same as a missing cell.
    #[default]
    Null,
    /// Keep the slot with center NaN and band `[NaN, NaN]`.
    Degenerate,
}

// ---------------------------------------------------------------------------
// Recording – a loaded file
// ---------------------------------------------------------------------------

/// A parsed recording: channel labels plus the raw matrix.
#[derive(Debug, Clone)]
pub struct Recording {
    /// File name (or other source identifier) for display.
    pub name: String,
    /// One label per channel, same order as the matrix cells.
    pub channel_labels: Vec<String>,
    pub matrix: RawMatrix,
}

impl Recording {
    pub fn new(name: impl Into<String>, channel_labels: Vec<String>, matrix: RawMatrix) -> Self {
        Self {
            name: name.into(),
            channel_labels,
            matrix,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channel_labels.len()
    }

    /// Number of rows (timestamps).
    pub fn len(&self) -> usize {
        self.matrix.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }

    /// Count of present cells and their `(min low, max high)` for one channel.
    pub fn channel_summary(&self, channel: usize) -> (usize, Option<(f64, f64)>) {
        let mut count = 0;
        let mut range: Option<(f64, f64)> = None;
        for row in self.matrix.rows() {
            let Some([low, _, high]) = row.cell(channel) else {
                continue;
            };
            count += 1;
            if low.is_nan() || high.is_nan() {
                continue;
            }
            range = Some(match range {
                Some((lo, hi)) => (lo.min(low), hi.max(high)),
                None => (low, high),
            });
        }
        (count, range)
    }
}
