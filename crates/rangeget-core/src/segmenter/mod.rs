//! Range math and partition planning.
//!
//! Splits `[0, total_size)` into contiguous, inclusive byte ranges, one per
//! worker, and renders them for HTTP Range headers.

mod range;

pub use range::{effective_workers, plan_ranges, ByteRange};
