use rusty_trace::data::{
    aggregate, downsample, extract, AxisMode, Band, ExtractOptions, ExtractedRecord, RawMatrix,
    RawRow, SeriesError,
};

fn rec(t: f64, mid: f64, low: f64, high: f64) -> ExtractedRecord {
    ExtractedRecord::new(t, mid, Band::new(low, high))
}

/// `[(0,[1,2,3]), (1,null), (2,[2,3,4]), (3,[0,0,0])]`
fn four_rows() -> RawMatrix {
    RawMatrix::from_rows(
        1,
        vec![
            RawRow::new(0.0, vec![Some([1.0, 2.0, 3.0])]),
            RawRow::new(1.0, vec![None]),
            RawRow::new(2.0, vec![Some([2.0, 3.0, 4.0])]),
            RawRow::new(3.0, vec![Some([0.0, 0.0, 0.0])]),
        ],
    )
}

#[test]
fn linear_scenario() {
    let extracted = extract(&four_rows(), 0, AxisMode::Linear).unwrap();
    assert_eq!(
        extracted,
        vec![
            rec(0.0, 2.0, 1.0, 3.0),
            ExtractedRecord::null(1.0),
            rec(2.0, 3.0, 2.0, 4.0),
            rec(3.0, 0.0, 0.0, 0.0),
        ]
    );

    let aggregated = aggregate(&extracted, 2).unwrap();
    assert_eq!(
        aggregated,
        vec![
            rec(0.0, 2.0, 1.0, 3.0),
            rec(1.0, 2.0, 1.0, 3.0),
            rec(2.0, 3.0, 2.0, 4.0),
            rec(3.0, 1.5, 1.0, 2.0),
        ]
    );
}

#[test]
fn logarithmic_scenario() {
    let extracted = extract(&four_rows(), 0, AxisMode::Logarithmic).unwrap();
    assert_eq!(extracted[3], ExtractedRecord::null(3.0));

    let aggregated = aggregate(&extracted, 2).unwrap();
    assert_eq!(aggregated[3], rec(3.0, 3.0, 2.0, 4.0));
}

#[test]
fn lengths_are_preserved() {
    let matrix = four_rows();
    for axis in [AxisMode::Linear, AxisMode::Logarithmic] {
        let extracted = extract(&matrix, 0, axis).unwrap();
        assert_eq!(extracted.len(), matrix.len());
        for window in 1..=6 {
            assert_eq!(aggregate(&extracted, window).unwrap().len(), extracted.len());
        }
    }
}

#[test]
fn downsample_chains_both_stages() {
    let opts = ExtractOptions::new(AxisMode::Linear);
    let direct = downsample(&four_rows(), 0, &opts, 2).unwrap();
    let staged = aggregate(&extract(&four_rows(), 0, AxisMode::Linear).unwrap(), 2).unwrap();
    assert_eq!(direct, staged);
}

#[test]
fn shape_violations_are_invalid_arguments() {
    let opts = ExtractOptions::default();
    let err = downsample(&four_rows(), 1, &opts, 2).unwrap_err();
    assert!(matches!(err, SeriesError::ChannelOutOfRange { channel: 1, channels: 1 }));
    assert!(err.is_invalid_argument());

    let err = downsample(&four_rows(), 0, &opts, 0).unwrap_err();
    assert_eq!(err, SeriesError::ZeroWindow);
    assert!(err.to_string().starts_with("invalid argument"));
}
