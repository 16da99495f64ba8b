//! Host-level failures (construction-time only; see spec.md §7.5).
//!
//! Everything that can happen *during* emulation (illegal instructions,
//! unmapped accesses, DMA address errors, malformed VDP1 commands) is
//! non-fatal by design and is reported through `log` instead of `Result`.
//! `CoreError` only covers the handful of failures that can stop a
//! `Machine` from being constructed at all.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to spawn VDP worker thread: {0}")]
    WorkerSpawn(#[from] std::io::Error),

    #[error("boot ROM image is {actual} bytes, expected exactly {expected} bytes")]
    BadBootRomSize { actual: usize, expected: usize },

    #[error("VDP worker failed to start; core refuses to accept Advance() calls")]
    WorkerNotStarted,
}

pub type CoreResult<T> = Result<T, CoreError>;
