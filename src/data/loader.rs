use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, Float32Array, Float64Array, Int64Array, LargeListArray, ListArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{RawCell, RawMatrix, RawRow, Recording, Triple};

const TIME_COLUMN: &str = "time";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a recording from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – `time` column plus one list column per channel (recommended)
/// * `.json`    – `{ "channels": [...], "rows": [[t, [l, m, h] | null, ...], ...] }`
/// * `.csv`     – `time` column plus one `low;mid;high` column per channel
pub fn load_file(path: &Path) -> Result<Recording> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let (labels, matrix) = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path)?,
        "json" => load_json(path)?,
        "csv" => load_csv(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    log::info!(
        "Loaded {name}: {} rows, {} channels {:?}",
        matrix.len(),
        labels.len(),
        labels
    );
    Ok(Recording::new(name, labels, matrix))
}

/// Check a parsed cell: three values, finite edges, a finite or NaN mid.
fn to_triple(values: &[f64]) -> Result<Triple> {
    let [low, mid, high] = values else {
        bail!("expected 3 values, got {}", values.len());
    };
    if !low.is_finite() || !high.is_finite() {
        bail!("band edges must be finite, got [{low}, {high}]");
    }
    if mid.is_infinite() {
        bail!("center must be finite or NaN, got {mid}");
    }
    Ok([*low, *mid, *high])
}

/// Tally of cells that could not be read and were kept as gaps.
#[derive(Default)]
struct SkippedCells(usize);

impl SkippedCells {
    fn note(&mut self, row: usize, channel: &str, reason: impl std::fmt::Display) {
        if self.0 == 0 {
            log::warn!("Row {row}, channel '{channel}': {reason}; treating as missing");
        }
        self.0 += 1;
    }

    fn report(&self) {
        if self.0 > 1 {
            log::warn!("{} unreadable cells treated as missing", self.0);
        }
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema:
///
/// ```json
/// {
///   "channels": ["Fp1", "Fp2"],
///   "rows": [
///     [0.000, [1.0, 2.0, 3.0], null],
///     [0.004, [1.1, null, 3.2], [0.5, 0.7, 0.9]]
///   ]
/// }
/// ```
///
/// A `null` inside a triple is read as NaN (value unknown).
fn load_json(path: &Path) -> Result<(Vec<String>, RawMatrix)> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let labels: Vec<String> = root
        .get("channels")
        .and_then(|v| v.as_array())
        .context("Expected a 'channels' array")?
        .iter()
        .enumerate()
        .map(|(i, v)| {
            v.as_str()
                .map(str::to_owned)
                .with_context(|| format!("channels[{i}] is not a string"))
        })
        .collect::<Result<_>>()?;

    let rows = root
        .get("rows")
        .and_then(|v| v.as_array())
        .context("Expected a 'rows' array")?;

    let mut matrix = RawMatrix::new(labels.len());
    let mut skipped = SkippedCells::default();

    for (i, row) in rows.iter().enumerate() {
        let values = row
            .as_array()
            .with_context(|| format!("Row {i} is not a JSON array"))?;
        let timestamp = values
            .first()
            .and_then(JsonValue::as_f64)
            .with_context(|| format!("Row {i}: missing or invalid timestamp"))?;

        let cells = labels
            .iter()
            .enumerate()
            .map(|(ch, label)| match values.get(ch + 1) {
                None | Some(JsonValue::Null) => None,
                Some(v) => match json_to_triple(v) {
                    Ok(t) => Some(t),
                    Err(e) => {
                        skipped.note(i, label, e);
                        None
                    }
                },
            })
            .collect();

        matrix.push(RawRow::new(timestamp, cells));
    }

    skipped.report();
    Ok((labels, matrix))
}

fn json_to_triple(val: &JsonValue) -> Result<Triple> {
    let arr = val.as_array().context("expected [low, mid, high]")?;
    let values: Vec<f64> = arr
        .iter()
        .map(|v| match v {
            JsonValue::Null => Ok(f64::NAN),
            other => other
                .as_f64()
                .with_context(|| format!("'{other}' is not a number")),
        })
        .collect::<Result<_>>()?;
    to_triple(&values)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout:  header row `time,<channel>,<channel>,...`.
/// Channel cells are empty (no reading) or semicolon-separated triples:
///   `"1.0;2.0;3.0"`
/// `nan` is accepted for an unknown mid value; infinities are not.
fn load_csv(path: &Path) -> Result<(Vec<String>, RawMatrix)> {
    // Rows may drop trailing empty cells.
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let time_idx = headers
        .iter()
        .position(|h| h == TIME_COLUMN)
        .context("CSV missing 'time' column")?;

    let channels: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != time_idx)
        .map(|(i, h)| (i, h.clone()))
        .collect();

    let labels: Vec<String> = channels.iter().map(|(_, h)| h.clone()).collect();
    let mut matrix = RawMatrix::new(labels.len());
    let mut skipped = SkippedCells::default();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let time_str = record.get(time_idx).unwrap_or("").trim();
        let timestamp: f64 = time_str
            .parse()
            .with_context(|| format!("CSV row {row_no}: time '{time_str}' is not a number"))?;

        let cells = channels
            .iter()
            .map(|(col_idx, label)| {
                let raw = record.get(*col_idx).unwrap_or("").trim();
                if raw.is_empty() {
                    return None;
                }
                match parse_semicolon_triple(raw) {
                    Ok(t) => Some(t),
                    Err(e) => {
                        skipped.note(row_no, label, e);
                        None
                    }
                }
            })
            .collect();

        matrix.push(RawRow::new(timestamp, cells));
    }

    skipped.report();
    Ok((labels, matrix))
}

fn parse_semicolon_triple(s: &str) -> Result<Triple> {
    let values: Vec<f64> = s
        .split(';')
        .enumerate()
        .map(|(j, tok)| {
            tok.trim()
                .parse::<f64>()
                .with_context(|| format!("[{j}]: '{tok}' is not a number"))
        })
        .collect::<Result<_>>()?;

    to_triple(&values)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file containing a recording.
///
/// Expected schema:
/// - `time`: Float64, Float32 or Int64 – one timestamp per row
/// - every other column: List<Float64> or LargeList<Float64> holding
///   `[low, mid, high]`, or null when there is no reading
///
/// Inner null values are read as NaN.
fn load_parquet(path: &Path) -> Result<(Vec<String>, RawMatrix)> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;

    let schema = builder.schema().clone();
    let time_idx = schema
        .index_of(TIME_COLUMN)
        .map_err(|_| anyhow::anyhow!("Parquet file missing 'time' column"))?;
    let channels: Vec<(usize, String)> = schema
        .fields()
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != time_idx)
        .map(|(i, f)| (i, f.name().clone()))
        .collect();
    let labels: Vec<String> = channels.iter().map(|(_, name)| name.clone()).collect();

    let reader = builder.build().context("building parquet reader")?;
    let mut matrix = RawMatrix::new(labels.len());
    let mut skipped = SkippedCells::default();
    let mut row_offset = 0;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let n_rows = batch.num_rows();
        let time_col = batch.column(time_idx);

        for row in 0..n_rows {
            let timestamp = extract_time(time_col, row)
                .with_context(|| format!("Row {}: failed to read 'time'", row_offset + row))?;

            let cells = channels
                .iter()
                .map(|(col_idx, label)| {
                    match extract_triple(batch.column(*col_idx), row) {
                        Ok(cell) => cell,
                        Err(e) => {
                            skipped.note(row_offset + row, label, format!("{e:#}"));
                            None
                        }
                    }
                })
                .collect();

            matrix.push(RawRow::new(timestamp, cells));
        }
        row_offset += n_rows;
    }

    skipped.report();
    Ok((labels, matrix))
}

// -- Parquet / Arrow helpers --

fn extract_time(col: &Arc<dyn Array>, row: usize) -> Result<f64> {
    if col.is_null(row) {
        bail!("null timestamp");
    }
    if let Some(arr) = col.as_any().downcast_ref::<Float64Array>() {
        Ok(arr.value(row))
    } else if let Some(arr) = col.as_any().downcast_ref::<Float32Array>() {
        Ok(arr.value(row) as f64)
    } else if let Some(arr) = col.as_any().downcast_ref::<Int64Array>() {
        Ok(arr.value(row) as f64)
    } else {
        bail!("time column has type {:?}, expected a number", col.data_type())
    }
}

/// Read the `[low, mid, high]` list at `row`; a null list is a missing cell.
fn extract_triple(col: &Arc<dyn Array>, row: usize) -> Result<RawCell> {
    if col.is_null(row) {
        return Ok(None);
    }

    let values_array = match col.data_type() {
        DataType::List(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<ListArray>()
                .context("expected ListArray")?;
            list_arr.value(row)
        }
        DataType::LargeList(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<LargeListArray>()
                .context("expected LargeListArray")?;
            list_arr.value(row)
        }
        other => bail!("Expected List or LargeList column, got {other:?}"),
    };

    // The inner array can be Float64 or Float32
    let values: Vec<f64> =
        if let Some(f64_arr) = values_array.as_any().downcast_ref::<Float64Array>() {
            f64_arr.iter().map(|v| v.unwrap_or(f64::NAN)).collect()
        } else if let Some(f32_arr) = values_array.as_any().downcast_ref::<Float32Array>() {
            f32_arr.iter().map(|v| v.unwrap_or(f32::NAN) as f64).collect()
        } else {
            bail!(
                "List inner type is {:?}, expected Float64 or Float32",
                values_array.data_type()
            )
        };

    to_triple(&values).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::data::{aggregate, extract, AxisMode, Band, ExtractedRecord};
    use arrow::array::{Float64Builder, ListBuilder};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("rusty-trace-{}-{name}", std::process::id()))
    }

    #[test]
    fn csv_cells_become_triples_or_gaps() {
        let path = temp_path("cells.csv");
        std::fs::write(
            &path,
            "time,Fp1,Fp2\n0,1;2;3,\n1,,4;5;6\n2,bad,nan;1;2\n",
        )
        .unwrap();

        let rec = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(rec.channel_labels, vec!["Fp1", "Fp2"]);
        assert_eq!(rec.len(), 3);
        let rows = rec.matrix.rows();
        assert_eq!(rows[0].cells, vec![Some([1.0, 2.0, 3.0]), None]);
        assert_eq!(rows[1].cells, vec![None, Some([4.0, 5.0, 6.0])]);
        assert_eq!(rows[2].cell(0), None);
        assert!(rows[2].cell(1).unwrap()[0].is_nan());
        assert_eq!(rows[2].timestamp, 2.0);
    }

    #[test]
    fn csv_short_rows_read_as_gaps() {
        let path = temp_path("short.csv");
        std::fs::write(&path, "time,Fp1,Fp2\n0,1;2;3,4;5;6\n1,1;2;3\n2\n").unwrap();

        let rec = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(rec.len(), 3);
        assert_eq!(rec.matrix.rows()[1].cells, vec![Some([1.0, 2.0, 3.0]), None]);
        assert_eq!(rec.matrix.rows()[2].cells, vec![None, None]);
    }

    #[test]
    fn infinite_values_become_gaps() {
        let path = temp_path("inf.csv");
        std::fs::write(
            &path,
            "time,Fp1\n0,1;2;3\n1,inf;inf;inf\n2,1;2;3\n3,1;-inf;3\n4,1;2;3\n",
        )
        .unwrap();

        let rec = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let rows = rec.matrix.rows();
        assert_eq!(rows[1].cell(0), None);
        assert_eq!(rows[3].cell(0), None);

        let extracted = extract(&rec.matrix, 0, AxisMode::Linear).unwrap();
        assert_eq!(aggregate(&extracted, 1).unwrap(), extracted);
        let out = aggregate(&extracted, 2).unwrap();
        assert_eq!(out[4], ExtractedRecord::new(4.0, 2.0, Band::new(1.0, 3.0)));
    }

    #[test]
    fn triple_check_keeps_nan_center_only() {
        assert!(to_triple(&[1.0, f64::NAN, 3.0]).is_ok());
        assert!(to_triple(&[f64::NAN, 2.0, 3.0]).is_err());
        assert!(to_triple(&[1.0, 2.0, f64::NEG_INFINITY]).is_err());
        assert!(to_triple(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn csv_without_time_column_fails() {
        let path = temp_path("notime.csv");
        std::fs::write(&path, "t,Fp1\n0,1;2;3\n").unwrap();
        let err = load_file(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(format!("{err:#}").contains("time"));
    }

    #[test]
    fn json_null_mid_reads_as_nan() {
        let path = temp_path("rows.json");
        std::fs::write(
            &path,
            r#"{"channels":["C3","C4"],"rows":[[0.0,[1,null,3],null],[0.5,[1,2,3]]]}"#,
        )
        .unwrap();

        let rec = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(rec.channel_count(), 2);
        let first = rec.matrix.rows()[0].cell(0).unwrap();
        assert!(first[1].is_nan());
        assert_eq!(rec.matrix.rows()[0].cell(1), None);
        // short row: missing trailing cell
        assert_eq!(rec.matrix.rows()[1].cell(1), None);
        assert_eq!(rec.matrix.time_span(), Some((0.0, 0.5)));
    }

    #[test]
    fn parquet_list_columns_are_channels() {
        let path = temp_path("rec.parquet");

        let mut builder = ListBuilder::new(Float64Builder::new());
        builder.values().append_slice(&[1.0, 2.0, 3.0]);
        builder.append(true);
        builder.append(false);
        let channel = builder.finish();
        let time = Float64Array::from(vec![0.0, 0.25]);

        let item = Arc::new(Field::new("item", DataType::Float64, true));
        let schema = Arc::new(Schema::new(vec![
            Field::new("time", DataType::Float64, false),
            Field::new("O1", DataType::List(item), true),
        ]));
        let batch =
            RecordBatch::try_new(schema.clone(), vec![Arc::new(time), Arc::new(channel)]).unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let rec = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(rec.channel_labels, vec!["O1"]);
        assert_eq!(rec.matrix.rows()[0].cell(0), Some([1.0, 2.0, 3.0]));
        assert_eq!(rec.matrix.rows()[1].cell(0), None);
        assert_eq!(rec.matrix.rows()[1].timestamp, 0.25);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        assert!(load_file(Path::new("recording.edf")).is_err());
    }
}
