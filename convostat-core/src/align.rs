//! Domain alignment
//!
//! Puts every participant's sparse series on one shared, sorted x-axis.
//!
//! ```text
//!   domain   [w0, w1, w2, w3]
//!   sparse A {w0: 2,     w2: 5}      ->  A [2, 0, 5, 0]
//!   sparse B {     w1: 1,     w3: 4} ->  B [0, 1, 0, 4]
//! ```
//!
//! Zeros are inserted by walking the domain and the sparse entries together,
//! both in sorted order, so index `i` of every dense series always refers to
//! `domain[i]`.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::aggregate::AggregatedSeries;
use crate::participants::ParticipantSet;
use crate::types::{BucketKey, BucketKind, Metric};

/// Sorted union of bucket keys observed across all senders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseDomain {
    pub bucket: BucketKind,
    keys: Vec<BucketKey>,
}

impl DenseDomain {
    /// Union of every key in `series`.
    pub fn from_series<'a>(
        bucket: BucketKind,
        series: impl IntoIterator<Item = &'a AggregatedSeries>,
    ) -> Self {
        let keys: BTreeSet<&BucketKey> = series
            .into_iter()
            .flat_map(|s| s.values.keys())
            .collect();
        Self {
            bucket,
            keys: keys.into_iter().cloned().collect(),
        }
    }

    pub fn keys(&self) -> &[BucketKey] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Display labels in domain order.
    pub fn labels(&self) -> Vec<String> {
        self.keys.iter().map(ToString::to_string).collect()
    }
}

/// One participant's values at every domain position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DenseSeries {
    pub sender: String,
    pub values: Vec<u64>,
}

impl DenseSeries {
    pub fn total(&self) -> u64 {
        self.values.iter().sum()
    }
}

/// All participants' dense series over a shared domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedSeries {
    pub metric: Metric,
    pub domain: DenseDomain,
    /// In participant order; each has `domain.len()` values
    pub series: Vec<DenseSeries>,
}

impl AlignedSeries {
    /// Sum across participants at domain position `index`.
    pub fn column_total(&self, index: usize) -> u64 {
        self.series.iter().map(|s| s.values[index]).sum()
    }
}

/// Reindex one sparse series onto `domain`, filling gaps with zero.
///
/// Sparse keys not present in the domain are dropped; that cannot happen
/// when the domain was built from the same series.
pub fn densify(domain: &DenseDomain, sparse: &AggregatedSeries) -> Vec<u64> {
    let mut dense = Vec::with_capacity(domain.len());
    let mut entries = sparse.values.iter().peekable();

    for key in domain.keys() {
        // Skip sparse keys that sort before the current domain key
        while entries.next_if(|(k, _)| *k < key).is_some() {}

        match entries.next_if(|(k, _)| *k == key) {
            Some((_, value)) => dense.push(*value),
            None => dense.push(0),
        }
    }

    dense
}

/// Align per-sender series onto their shared domain, in participant order.
///
/// Participants without a series get all zeros. Series from senders outside
/// `participants` are skipped and contribute no domain keys.
pub fn align(
    bucket: BucketKind,
    metric: Metric,
    series: &[AggregatedSeries],
    participants: &ParticipantSet,
) -> AlignedSeries {
    let mut by_sender: HashMap<&str, &AggregatedSeries> = HashMap::with_capacity(series.len());
    for s in series {
        if participants.contains(&s.sender) {
            by_sender.insert(s.sender.as_str(), s);
        } else {
            tracing::warn!(sender = %s.sender, "Series sender not in participant set");
        }
    }

    let domain = DenseDomain::from_series(bucket, by_sender.values().copied());

    let dense = participants
        .iter()
        .map(|name| DenseSeries {
            sender: name.to_string(),
            values: match by_sender.get(name) {
                Some(sparse) => densify(&domain, sparse),
                None => vec![0; domain.len()],
            },
        })
        .collect();

    tracing::debug!(
        bucket = bucket.as_str(),
        domain_len = domain.len(),
        participants = participants.len(),
        "Aligned series"
    );

    AlignedSeries {
        metric,
        domain,
        series: dense,
    }
}
