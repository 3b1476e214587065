use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Float64Builder, ListBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const SAMPLE_RATE_HZ: f64 = 256.0;
const DURATION_S: f64 = 60.0;
const CHANNELS: [(&str, f64, f64); 4] = [
    // label, rhythm (Hz), amplitude
    ("Fp1", 10.0, 40.0),
    ("Fp2", 10.5, 35.0),
    ("C3", 6.0, 60.0),
    ("O1", 12.0, 25.0),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// One `[low, mid, high]` reading, or `None` for a dropout.
///
/// Readings sit on a positive baseline so that the log axis has data to
/// show; occasional spikes and dips below zero exercise the band and the
/// log-scale gaps.
fn reading(t: f64, rhythm_hz: f64, amplitude: f64, rng: &mut SimpleRng) -> Option<[f64; 3]> {
    let roll = rng.next_f64();
    if roll < 0.01 {
        return None;
    }

    let baseline = amplitude * 1.5;
    let mut mid = baseline
        + amplitude * (2.0 * std::f64::consts::PI * rhythm_hz * t).sin()
        + rng.gauss(0.0, amplitude * 0.1);
    if roll > 0.999 {
        mid += amplitude * 6.0;
    } else if roll > 0.998 {
        mid = -amplitude;
    }
    let spread = rng.gauss(0.0, amplitude * 0.05).abs() + amplitude * 0.05;
    Some([mid - spread, mid, mid + spread])
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let n_rows = (SAMPLE_RATE_HZ * DURATION_S) as usize;

    let time: Vec<f64> = (0..n_rows).map(|i| i as f64 / SAMPLE_RATE_HZ).collect();
    let columns: Vec<Vec<Option<[f64; 3]>>> = CHANNELS
        .iter()
        .map(|&(_, rhythm, amp)| {
            time.iter()
                .map(|&t| reading(t, rhythm, amp, &mut rng))
                .collect()
        })
        .collect();

    write_parquet("sample_recording.parquet", &time, &columns)?;
    write_csv("sample_recording.csv", &time, &columns)?;

    println!(
        "Wrote {n_rows} rows × {} channels to sample_recording.parquet and sample_recording.csv",
        CHANNELS.len()
    );
    Ok(())
}

fn write_parquet(path: &str, time: &[f64], columns: &[Vec<Option<[f64; 3]>>]) -> Result<()> {
    let item = Arc::new(Field::new("item", DataType::Float64, true));
    let mut fields = vec![Field::new("time", DataType::Float64, false)];
    let mut arrays: Vec<ArrayRef> = vec![Arc::new(Float64Array::from(time.to_vec()))];

    for ((label, _, _), cells) in CHANNELS.iter().zip(columns) {
        let mut builder = ListBuilder::new(Float64Builder::new());
        for cell in cells {
            match cell {
                Some(triple) => {
                    builder.values().append_slice(triple);
                    builder.append(true);
                }
                None => builder.append(false),
            }
        }
        fields.push(Field::new(*label, DataType::List(item.clone()), true));
        arrays.push(Arc::new(builder.finish()));
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn write_csv(path: &str, time: &[f64], columns: &[Vec<Option<[f64; 3]>>]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;

    let header = std::iter::once("time").chain(CHANNELS.iter().map(|(label, _, _)| *label));
    writer.write_record(header).context("writing CSV header")?;

    for (i, t) in time.iter().enumerate() {
        let cells = columns.iter().map(|col| match col[i] {
            Some([low, mid, high]) => format!("{low:.4};{mid:.4};{high:.4}"),
            None => String::new(),
        });
        let record: Vec<String> = std::iter::once(format!("{t:.6}")).chain(cells).collect();
        writer.write_record(&record).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}
