//! Core domain types for convostat
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Sender** | The identity string a message is attributed to |
//! | **Participant** | A distinct sender within one conversation |
//! | **Bucket kind** | A time granularity: hour-of-day, week, month or day |
//! | **Bucket key** | The value a timestamp maps to under one bucket kind |
//! | **Metric** | What gets summed per bucket: messages, words or characters |
//! | **View** | How aligned series are compared: counts, share or difference |
//!
//! Records move through three shapes:
//! - [`RawMessage`]: decoded input, any field may be missing
//! - [`MessageRecord`]: validated sender + timestamp, optional content
//! - [`EnrichedMessage`]: record plus word/char counts and all bucket keys

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Error;

// ============================================
// Input records
// ============================================

/// A message as decoded from an export file, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMessage {
    /// Display name of the sender
    #[serde(default)]
    pub sender_name: Option<String>,
    /// Epoch milliseconds. Kept as a JSON number so floats can be accepted.
    #[serde(default)]
    pub timestamp_ms: Option<serde_json::Number>,
    /// Message text; absent for photos, stickers, calls, etc.
    #[serde(default)]
    pub content: Option<String>,
}

impl RawMessage {
    /// Convenience constructor used by callers that already hold typed values.
    pub fn new(sender: &str, timestamp_ms: i64, content: Option<&str>) -> Self {
        Self {
            sender_name: Some(sender.to_string()),
            timestamp_ms: Some(timestamp_ms.into()),
            content: content.map(str::to_string),
        }
    }
}

/// A validated message: sender and timestamp are guaranteed present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    pub sender: String,
    /// Non-negative epoch milliseconds
    pub timestamp_ms: i64,
    pub content: Option<String>,
}

/// A message with its derived features and bucket keys.
///
/// Produced only by [`crate::enrich::enrich`]; read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedMessage {
    pub record: MessageRecord,
    /// Whitespace-boundary word estimate (0 when content is absent)
    pub word_count: u64,
    /// Unicode scalar count of the content (0 when absent)
    pub char_count: u64,
    pub keys: BucketKeys,
}

impl EnrichedMessage {
    pub fn sender(&self) -> &str {
        &self.record.sender
    }

    /// Key of this message under the given bucket kind.
    pub fn key(&self, kind: BucketKind) -> BucketKey {
        match kind {
            BucketKind::Hour => BucketKey::Hour(self.keys.hour),
            BucketKind::Week => BucketKey::Week(self.keys.week),
            BucketKind::Month => BucketKey::Month(self.keys.month.clone()),
            BucketKind::Day => BucketKey::Day(self.keys.day.clone()),
        }
    }

    /// Contribution of this message to the given metric.
    pub fn metric_value(&self, metric: Metric) -> u64 {
        match metric {
            Metric::Messages => 1,
            Metric::Words => self.word_count,
            Metric::Chars => self.char_count,
        }
    }
}

/// All four bucket keys of one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketKeys {
    /// Local hour of day, 0-23
    pub hour: u32,
    /// Weeks since the earliest week of the dataset
    pub week: u32,
    /// `YYYY-MM`
    pub month: String,
    /// `YYYY-MM-DD`
    pub day: String,
}

// ============================================
// Bucket keys
// ============================================

/// Granularity for aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketKind {
    Hour,
    Week,
    Month,
    Day,
}

impl BucketKind {
    pub const ALL: [BucketKind; 4] = [
        BucketKind::Hour,
        BucketKind::Week,
        BucketKind::Month,
        BucketKind::Day,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BucketKind::Hour => "hour",
            BucketKind::Week => "week",
            BucketKind::Month => "month",
            BucketKind::Day => "day",
        }
    }
}

impl std::str::FromStr for BucketKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hour" => Ok(BucketKind::Hour),
            "week" => Ok(BucketKind::Week),
            "month" => Ok(BucketKind::Month),
            "day" => Ok(BucketKind::Day),
            _ => Err(Error::UnknownVariant {
                kind: "bucket kind",
                value: s.to_string(),
            }),
        }
    }
}

/// Value of a timestamp under one bucket kind.
///
/// Keys of the same kind order chronologically: numerically for hour and
/// week, lexically for the zero-padded month and day tokens. Enrichment
/// rejects local years past 9999 so those tokens keep four-digit years.
/// Keys of different kinds are never mixed in one series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BucketKey {
    Hour(u32),
    Week(u32),
    Month(String),
    Day(String),
}

impl BucketKey {
    pub fn kind(&self) -> BucketKind {
        match self {
            BucketKey::Hour(_) => BucketKind::Hour,
            BucketKey::Week(_) => BucketKind::Week,
            BucketKey::Month(_) => BucketKind::Month,
            BucketKey::Day(_) => BucketKind::Day,
        }
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketKey::Hour(h) => write!(f, "{:02}", h),
            BucketKey::Week(w) => write!(f, "{}", w),
            BucketKey::Month(m) => f.write_str(m),
            BucketKey::Day(d) => f.write_str(d),
        }
    }
}

// ============================================
// Metrics and views
// ============================================

/// What gets summed per (sender, bucket).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Every record counts as 1
    Messages,
    Words,
    Chars,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Messages => "messages",
            Metric::Words => "words",
            Metric::Chars => "chars",
        }
    }

    /// Axis label for renderers.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Messages => "Number of Messages",
            Metric::Words => "Number of Words",
            Metric::Chars => "Number of Characters",
        }
    }
}

impl std::str::FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "messages" => Ok(Metric::Messages),
            "words" => Ok(Metric::Words),
            "chars" => Ok(Metric::Chars),
            _ => Err(Error::UnknownVariant {
                kind: "metric",
                value: s.to_string(),
            }),
        }
    }
}

/// Comparative view over aligned series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    /// Aligned values as-is
    Counts,
    /// Fraction of the cross-sender total per bucket
    Share,
    /// Signed percentage difference between exactly two participants
    Difference,
}

impl ViewKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewKind::Counts => "counts",
            ViewKind::Share => "share",
            ViewKind::Difference => "difference",
        }
    }
}

impl std::str::FromStr for ViewKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "counts" => Ok(ViewKind::Counts),
            "share" => Ok(ViewKind::Share),
            "difference" => Ok(ViewKind::Difference),
            _ => Err(Error::UnknownVariant {
                kind: "view",
                value: s.to_string(),
            }),
        }
    }
}

/// What share and difference views emit where the denominator is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZeroDenominatorPolicy {
    /// Emit `Some(0.0)`
    #[default]
    Zero,
    /// Emit `None`
    Missing,
}

impl ZeroDenominatorPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZeroDenominatorPolicy::Zero => "zero",
            ZeroDenominatorPolicy::Missing => "missing",
        }
    }

    /// Value to emit at a position whose denominator is zero.
    pub fn fill(&self) -> Option<f64> {
        match self {
            ZeroDenominatorPolicy::Zero => Some(0.0),
            ZeroDenominatorPolicy::Missing => None,
        }
    }
}

impl std::str::FromStr for ZeroDenominatorPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zero" => Ok(ZeroDenominatorPolicy::Zero),
            "missing" => Ok(ZeroDenominatorPolicy::Missing),
            _ => Err(Error::UnknownVariant {
                kind: "zero-denominator policy",
                value: s.to_string(),
            }),
        }
    }
}
