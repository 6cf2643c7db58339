//! Chart preparation for climate-model diagnostics.
//!
//! Turns metric values returned by the diagnostics API into box plots,
//! grouping keys, labels, palette choices and axis tick labels.

pub mod data;
pub mod error;
pub mod processing;
pub mod report;
pub mod state;

pub use error::{DiagplotError, Result};
