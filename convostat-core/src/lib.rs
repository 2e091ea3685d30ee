//! # convostat-core
//!
//! Core library for convostat - compares message activity between the
//! participants of a conversation.
//!
//! This library provides:
//! - Record enrichment (word/char counts, time-bucket keys)
//! - Per-sender aggregation by hour-of-day, week, month or day
//! - Alignment of sparse per-sender series onto one shared domain
//! - Comparative views: counts, share, pairwise difference
//! - Loading of chat export JSON files
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Pipeline
//!
//! ```text
//! RawMessage -> enrich -> aggregate -> align -> compare -> ChartData
//! ```
//!
//! Every stage takes its input by reference and returns a new value.
//!
//! ## Example
//!
//! ```rust
//! use convostat_core::{Analyzer, BucketKind, ChartRequest, Metric, RawMessage, ViewKind};
//!
//! let raw = vec![
//!     RawMessage::new("A", 1_614_600_000_000, Some("hello there")),
//!     RawMessage::new("B", 1_614_603_600_000, None),
//! ];
//! let report = Analyzer::new(chrono_tz::UTC)
//!     .analyze(
//!         &raw,
//!         &[ChartRequest::new(BucketKind::Hour, Metric::Messages, ViewKind::Share)],
//!     )
//!     .expect("analysis failed");
//! assert_eq!(report.charts[0].domain, vec!["12", "13"]);
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use participants::ParticipantSet;
pub use report::{Analyzer, ChartData, ChartRequest, Dataset, RecordIssue, Report};
pub use types::*;

// Public modules
pub mod aggregate;
pub mod align;
pub mod buckets;
pub mod compare;
pub mod config;
pub mod enrich;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod participants;
pub mod report;
pub mod types;
