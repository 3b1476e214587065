use super::error::SeriesError;
use super::model::{
    AxisMode, Band, ExtractedRecord, RawCell, RawMatrix, UnreadableCenter,
};

// ---------------------------------------------------------------------------
// Extraction options
// ---------------------------------------------------------------------------

/// How raw cells are turned into center + band records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    pub axis: AxisMode,
    pub unreadable_center: UnreadableCenter,
}

impl ExtractOptions {
    pub fn new(axis: AxisMode) -> Self {
        Self {
            axis,
            ..Default::default()
        }
    }

    pub fn with_unreadable_center(mut self, policy: UnreadableCenter) -> Self {
        self.unreadable_center = policy;
        self
    }
}

// ---------------------------------------------------------------------------
// Series extraction
// ---------------------------------------------------------------------------

/// Extract one channel of `matrix` as `(timestamp, center, band)` records.
///
/// Uses the default [`UnreadableCenter::Null`] policy. See [`extract_with`].
pub fn extract(
    matrix: &RawMatrix,
    channel: usize,
    axis: AxisMode,
) -> Result<Vec<ExtractedRecord>, SeriesError> {
    extract_with(matrix, channel, &ExtractOptions::new(axis))
}

/// Extract one channel of `matrix`, one record per row and in row order.
///
/// * missing cell → null record
/// * logarithmic axis and any component `<= 0` → null record (a gap)
/// * numeric mid → `(t, mid, [low, high])`
/// * NaN mid → null record, or `(t, NaN, [NaN, NaN])` under
///   [`UnreadableCenter::Degenerate`]
///
/// The only error is a `channel` outside the matrix's channel range.
pub fn extract_with(
    matrix: &RawMatrix,
    channel: usize,
    options: &ExtractOptions,
) -> Result<Vec<ExtractedRecord>, SeriesError> {
    if channel >= matrix.channel_count() {
        return Err(SeriesError::ChannelOutOfRange {
            channel,
            channels: matrix.channel_count(),
        });
    }

    Ok(matrix
        .rows()
        .iter()
        .map(|row| extract_cell(row.timestamp, row.cell(channel), options))
        .collect())
}

fn extract_cell(timestamp: f64, cell: RawCell, options: &ExtractOptions) -> ExtractedRecord {
    let Some([low, mid, high]) = cell else {
        return ExtractedRecord::null(timestamp);
    };

    if options.axis == AxisMode::Logarithmic && (low <= 0.0 || mid <= 0.0 || high <= 0.0) {
        return ExtractedRecord::null(timestamp);
    }

    if !mid.is_nan() {
        return ExtractedRecord::new(timestamp, mid, Band::new(low, high));
    }

    match options.unreadable_center {
        UnreadableCenter::Null => ExtractedRecord::null(timestamp),
        UnreadableCenter::Degenerate => {
            ExtractedRecord::new(timestamp, mid, Band::degenerate(mid))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::RawRow;

    fn matrix(cells: &[RawCell]) -> RawMatrix {
        RawMatrix::from_rows(
            1,
            cells
                .iter()
                .enumerate()
                .map(|(i, c)| RawRow::new(i as f64, vec![*c]))
                .collect(),
        )
    }

    #[test]
    fn missing_cell_yields_null_record() {
        let out = extract(&matrix(&[None]), 0, AxisMode::Linear).unwrap();
        assert_eq!(out, vec![ExtractedRecord::null(0.0)]);
    }

    #[test]
    fn band_edges_come_from_first_and_third_component() {
        let out = extract(&matrix(&[Some([1.0, 2.0, 3.0])]), 0, AxisMode::Linear).unwrap();
        assert_eq!(out[0], ExtractedRecord::new(0.0, 2.0, Band::new(1.0, 3.0)));
    }

    #[test]
    fn log_axis_drops_non_positive_components() {
        let cells = [
            Some([0.0, 2.0, 3.0]),
            Some([1.0, -2.0, 3.0]),
            Some([1.0, 2.0, 0.0]),
            Some([0.5, 2.0, 3.0]),
        ];
        let linear = extract(&matrix(&cells), 0, AxisMode::Linear).unwrap();
        assert!(linear.iter().all(|r| !r.is_null()));

        let log = extract(&matrix(&cells), 0, AxisMode::Logarithmic).unwrap();
        assert!(log[..3].iter().all(ExtractedRecord::is_null));
        assert_eq!(log[3], ExtractedRecord::new(3.0, 2.0, Band::new(0.5, 3.0)));
    }

    #[test]
    fn nan_center_defaults_to_null_record() {
        let out = extract(&matrix(&[Some([1.0, f64::NAN, 3.0])]), 0, AxisMode::Linear).unwrap();
        assert_eq!(out[0], ExtractedRecord::null(0.0));
    }

    // Degenerate mode keeps the slot with NaN edges instead of nulls. The two
    // policies diverge here on purpose.
    #[test]
    fn nan_center_degenerate_keeps_nan_band() {
        let opts = ExtractOptions::new(AxisMode::Linear)
            .with_unreadable_center(UnreadableCenter::Degenerate);
        let out = extract_with(&matrix(&[Some([1.0, f64::NAN, 3.0])]), 0, &opts).unwrap();
        let rec = out[0];
        assert!(rec.center.unwrap().is_nan());
        let band = rec.band.unwrap();
        assert!(band.low.is_nan() && band.high.is_nan());
        assert_eq!(rec.valid_center(), None);
    }

    #[test]
    fn nan_center_passes_log_filter() {
        let opts = ExtractOptions::new(AxisMode::Logarithmic)
            .with_unreadable_center(UnreadableCenter::Degenerate);
        let out = extract_with(&matrix(&[Some([1.0, f64::NAN, 3.0])]), 0, &opts).unwrap();
        assert!(!out[0].is_null());
    }

    #[test]
    fn ragged_row_reads_as_gap() {
        let m = RawMatrix::from_rows(
            2,
            vec![
                RawRow::new(0.0, vec![Some([1.0, 2.0, 3.0]), Some([4.0, 5.0, 6.0])]),
                RawRow::new(1.0, vec![Some([1.0, 2.0, 3.0])]),
            ],
        );
        let out = extract(&m, 1, AxisMode::Linear).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].center, Some(5.0));
        assert!(out[1].is_null());
    }

    #[test]
    fn channel_out_of_range_is_rejected() {
        let err = extract(&matrix(&[None]), 1, AxisMode::Linear).unwrap_err();
        assert_eq!(err, SeriesError::ChannelOutOfRange { channel: 1, channels: 1 });
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn empty_matrix_extracts_to_empty_series() {
        let out = extract(&RawMatrix::new(3), 2, AxisMode::Logarithmic).unwrap();
        assert!(out.is_empty());
    }
}
