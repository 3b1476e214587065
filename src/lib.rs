//! Multi-channel recording viewer core.
//!
//! [`data`] turns raw `[low, mid, high]` readings into plot-ready series: one
//! center and band per row, averaged over a trailing window in linear time.

pub mod color;
pub mod data;
