//! Aggregation engine
//!
//! Groups enriched messages by (sender, bucket key) and sums one metric.
//! Output series are sparse: a bucket appears only if the sender touched it.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::types::{BucketKey, BucketKind, EnrichedMessage, Metric};

/// Per-sender sums for one (bucket kind, metric) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedSeries {
    pub sender: String,
    pub bucket: BucketKind,
    pub metric: Metric,
    /// Sorted by key; only touched buckets are present
    pub values: BTreeMap<BucketKey, u64>,
}

impl AggregatedSeries {
    pub fn total(&self) -> u64 {
        self.values.values().sum()
    }

    pub fn get(&self, key: &BucketKey) -> u64 {
        self.values.get(key).copied().unwrap_or(0)
    }
}

/// Sum `metric` per sender per `bucket` key.
///
/// Returns one series per distinct sender, ordered lexically by sender.
pub fn aggregate(
    messages: &[EnrichedMessage],
    bucket: BucketKind,
    metric: Metric,
) -> Result<Vec<AggregatedSeries>> {
    if messages.is_empty() {
        return Err(Error::EmptyDataset);
    }

    let mut by_sender: BTreeMap<&str, BTreeMap<BucketKey, u64>> = BTreeMap::new();
    for message in messages {
        *by_sender
            .entry(message.sender())
            .or_default()
            .entry(message.key(bucket))
            .or_insert(0) += message.metric_value(metric);
    }

    tracing::debug!(
        bucket = bucket.as_str(),
        metric = metric.as_str(),
        senders = by_sender.len(),
        "Aggregated series"
    );

    Ok(by_sender
        .into_iter()
        .map(|(sender, values)| AggregatedSeries {
            sender: sender.to_string(),
            bucket,
            metric,
            values,
        })
        .collect())
}
