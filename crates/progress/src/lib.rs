//! Transfer progress tracking
//!
//! Turns the cumulative byte counts reported by a download or upload into
//! rolling throughput, percentage and ETA figures, decides when a status
//! message may be edited again, and renders the human-readable status block.
//! Nothing in this crate performs I/O or returns errors.

pub mod format;
pub mod render;
pub mod session;

pub use format::{format_duration, format_eta, format_size, format_speed};
pub use render::{progress_bar, render_text};
pub use session::{Direction, Metrics, ProgressPolicy, TransferSession, SPEED_WINDOW};
