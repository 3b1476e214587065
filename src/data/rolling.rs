use super::error::SeriesError;
use super::extract::{extract_with, ExtractOptions};
use super::model::{AggregatedRecord, Band, ExtractedRecord, RawMatrix};

// ---------------------------------------------------------------------------
// Running window sums
// ---------------------------------------------------------------------------

/// Neumaier-compensated running sum.
///
/// Removing a value adds its negation, so a large sample leaving the window
/// does not swallow the small ones that stay.
#[derive(Debug, Default, Clone, Copy)]
struct CompensatedSum {
    sum: f64,
    compensation: f64,
}

impl CompensatedSum {
    fn add(&mut self, value: f64) {
        let t = self.sum + value;
        if self.sum.abs() >= value.abs() {
            self.compensation += (self.sum - t) + value;
        } else {
            self.compensation += (value - t) + self.sum;
        }
        self.sum = t;
    }

    fn value(&self) -> f64 {
        self.sum + self.compensation
    }
}

/// Sums of the valid records currently inside the window.
#[derive(Debug, Default)]
struct WindowSums {
    low: CompensatedSum,
    mid: CompensatedSum,
    high: CompensatedSum,
    count: usize,
}

impl WindowSums {
    fn add(&mut self, record: &ExtractedRecord) {
        if let Some((mid, band)) = valid_parts(record) {
            self.low.add(band.low);
            self.mid.add(mid);
            self.high.add(band.high);
            self.count += 1;
        }
    }

    fn remove(&mut self, record: &ExtractedRecord) {
        if let Some((mid, band)) = valid_parts(record) {
            self.count -= 1;
            if self.count == 0 {
                // Nothing left: drop any rounding residue.
                *self = Self::default();
                return;
            }
            self.low.add(-band.low);
            self.mid.add(-mid);
            self.high.add(-band.high);
        }
    }

    fn mean_at(&self, timestamp: f64) -> AggregatedRecord {
        if self.count == 0 {
            return ExtractedRecord::null(timestamp);
        }
        let n = self.count as f64;
        ExtractedRecord::new(
            timestamp,
            self.mid.value() / n,
            Band::new(self.low.value() / n, self.high.value() / n),
        )
    }
}

/// Center and band of a record that counts towards the mean.
///
/// Validity is decided on the center alone.
fn valid_parts(record: &ExtractedRecord) -> Option<(f64, Band)> {
    let mid = record.valid_center()?;
    Some((mid, record.band.unwrap_or(Band::degenerate(mid))))
}

// ---------------------------------------------------------------------------
// Rolling aggregation
// ---------------------------------------------------------------------------

/// Trailing-window mean of centers and band edges, one output per input.
///
/// Output `i` averages the valid records in `[i - window + 1, i]`; a window
/// without valid records yields a null record. `window` is clamped to the
/// series length. Runs in O(n) regardless of `window`.
pub fn aggregate(
    records: &[ExtractedRecord],
    window: usize,
) -> Result<Vec<AggregatedRecord>, SeriesError> {
    if window == 0 {
        return Err(SeriesError::ZeroWindow);
    }
    if window > records.len() {
        log::debug!("window {window} clamped to series length {}", records.len());
    }
    let window = window.min(records.len());

    let mut sums = WindowSums::default();
    let mut out = Vec::with_capacity(records.len());

    for (i, record) in records.iter().enumerate() {
        sums.add(record);
        if i >= window {
            sums.remove(&records[i - window]);
        }
        out.push(sums.mean_at(record.timestamp));
    }

    Ok(out)
}

/// Extract `channel` from `matrix` and aggregate it over `window` records.
///
/// This is the series handed to rendering.
pub fn downsample(
    matrix: &RawMatrix,
    channel: usize,
    options: &ExtractOptions,
    window: usize,
) -> Result<Vec<AggregatedRecord>, SeriesError> {
    if window == 0 {
        return Err(SeriesError::ZeroWindow);
    }
    let extracted = extract_with(matrix, channel, options)?;
    aggregate(&extracted, window)
}
