//! Comparative views over aligned series
//!
//! - **counts**: aligned values unchanged
//! - **share**: value / cross-sender total at the same position
//! - **difference**: `(a - b) / ((a + b) / 2) * 100` for exactly two
//!   participants, `a` being the first in participant order
//!
//! Positions whose denominator is zero follow a [`ZeroDenominatorPolicy`]
//! instead of producing NaN.

use serde::Serialize;

use crate::align::AlignedSeries;
use crate::error::{Error, Result};
use crate::types::{ViewKind, ZeroDenominatorPolicy};

/// One participant's values under a view. `None` marks a position left
/// undefined by [`ZeroDenominatorPolicy::Missing`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewSeries {
    pub sender: String,
    pub values: Vec<Option<f64>>,
}

/// Result of applying a view to an [`AlignedSeries`].
#[derive(Debug, Clone, PartialEq)]
pub struct ViewTable {
    pub view: ViewKind,
    /// One entry per output series. The difference view has a single
    /// series named `"<a> vs <b>"`.
    pub series: Vec<ViewSeries>,
}

impl ViewTable {
    /// For the difference view: which side leads at each position.
    ///
    /// `Some(0)` when the first participant is ahead, `Some(1)` when the
    /// second is, `None` for ties and undefined positions.
    pub fn leaders(&self) -> Vec<Option<usize>> {
        let Some(first) = self.series.first() else {
            return Vec::new();
        };
        first
            .values
            .iter()
            .map(|v| match v {
                Some(x) if *x > 0.0 => Some(0),
                Some(x) if *x < 0.0 => Some(1),
                _ => None,
            })
            .collect()
    }
}

/// Apply `view` to `aligned`.
pub fn apply(
    view: ViewKind,
    aligned: &AlignedSeries,
    policy: ZeroDenominatorPolicy,
) -> Result<ViewTable> {
    match view {
        ViewKind::Counts => Ok(counts(aligned)),
        ViewKind::Share => Ok(share(aligned, policy)),
        ViewKind::Difference => difference(aligned, policy),
    }
}

/// Identity view.
pub fn counts(aligned: &AlignedSeries) -> ViewTable {
    let series = aligned
        .series
        .iter()
        .map(|s| ViewSeries {
            sender: s.sender.clone(),
            values: s.values.iter().map(|&v| Some(v as f64)).collect(),
        })
        .collect();

    ViewTable {
        view: ViewKind::Counts,
        series,
    }
}

/// Each participant's fraction of the column total.
pub fn share(aligned: &AlignedSeries, policy: ZeroDenominatorPolicy) -> ViewTable {
    let totals: Vec<u64> = (0..aligned.domain.len())
        .map(|i| aligned.column_total(i))
        .collect();

    let series = aligned
        .series
        .iter()
        .map(|s| ViewSeries {
            sender: s.sender.clone(),
            values: s
                .values
                .iter()
                .zip(&totals)
                .map(|(&v, &total)| {
                    if total == 0 {
                        policy.fill()
                    } else {
                        Some(v as f64 / total as f64)
                    }
                })
                .collect(),
        })
        .collect();

    ViewTable {
        view: ViewKind::Share,
        series,
    }
}

/// Signed percentage difference of the two participants.
pub fn difference(aligned: &AlignedSeries, policy: ZeroDenominatorPolicy) -> Result<ViewTable> {
    let [a, b] = aligned.series.as_slice() else {
        return Err(Error::UnsupportedParticipantCount {
            expected: 2,
            actual: aligned.series.len(),
        });
    };

    Ok(ViewTable {
        view: ViewKind::Difference,
        series: vec![ViewSeries {
            sender: format!("{} vs {}", a.sender, b.sender),
            values: pairwise_difference(&a.values, &b.values, policy),
        }],
    })
}

/// `(a - b) / ((a + b) / 2) * 100` per position.
///
/// Bounded to [-200, 200] for non-negative inputs. Slices are walked in
/// lockstep; callers pass series aligned on the same domain.
pub fn pairwise_difference(a: &[u64], b: &[u64], policy: ZeroDenominatorPolicy) -> Vec<Option<f64>> {
    a.iter()
        .zip(b)
        .map(|(&a, &b)| {
            if a + b == 0 {
                return policy.fill();
            }
            let (a, b) = (a as f64, b as f64);
            Some((a - b) / ((a + b) / 2.0) * 100.0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::{DenseDomain, DenseSeries};
    use crate::types::{BucketKey, BucketKind, Metric};

    fn aligned(rows: &[(&str, &[u64])]) -> AlignedSeries {
        let width = rows.first().map_or(0, |(_, v)| v.len());
        let series: Vec<_> = rows
            .iter()
            .map(|(name, _)| crate::aggregate::AggregatedSeries {
                sender: name.to_string(),
                bucket: BucketKind::Hour,
                metric: Metric::Messages,
                values: (0..width as u32).map(|h| (BucketKey::Hour(h), 1)).collect(),
            })
            .collect();
        AlignedSeries {
            metric: Metric::Messages,
            domain: DenseDomain::from_series(BucketKind::Hour, &series),
            series: rows
                .iter()
                .map(|(name, values)| DenseSeries {
                    sender: name.to_string(),
                    values: values.to_vec(),
                })
                .collect(),
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_counts_is_identity() {
        let table = counts(&aligned(&[("A", &[2, 0]), ("B", &[1, 1])]));
        assert_eq!(table.series[0].values, vec![Some(2.0), Some(0.0)]);
        assert_eq!(table.series[1].values, vec![Some(1.0), Some(1.0)]);
    }

    #[test]
    fn test_share_three_participants() {
        let table = share(
            &aligned(&[("A", &[3]), ("B", &[1]), ("C", &[0])]),
            ZeroDenominatorPolicy::Zero,
        );
        let shares: Vec<f64> = table.series.iter().map(|s| s.values[0].unwrap()).collect();
        assert_eq!(shares, vec![0.75, 0.25, 0.0]);
        assert!(approx(shares.iter().sum(), 1.0));
    }

    #[test]
    fn test_share_sums_to_one_per_position() {
        let table = share(
            &aligned(&[("A", &[7, 1, 0]), ("B", &[3, 0, 5]), ("C", &[11, 2, 9])]),
            ZeroDenominatorPolicy::Zero,
        );
        for i in 0..3 {
            let sum: f64 = table.series.iter().map(|s| s.values[i].unwrap()).sum();
            assert!(approx(sum, 1.0));
        }
    }

    #[test]
    fn test_share_zero_total_policy() {
        let input = aligned(&[("A", &[0, 2]), ("B", &[0, 2])]);
        let zero = share(&input, ZeroDenominatorPolicy::Zero);
        assert_eq!(zero.series[0].values, vec![Some(0.0), Some(0.5)]);

        let missing = share(&input, ZeroDenominatorPolicy::Missing);
        assert_eq!(missing.series[0].values, vec![None, Some(0.5)]);
    }

    #[test]
    fn test_difference_two_weeks() {
        let table = difference(
            &aligned(&[("A", &[2, 0]), ("B", &[1, 1])]),
            ZeroDenominatorPolicy::Zero,
        )
        .unwrap();
        let values = &table.series[0].values;
        assert!(approx(values[0].unwrap(), 200.0 / 3.0));
        assert!(approx(values[1].unwrap(), -200.0));
        assert_eq!(table.series[0].sender, "A vs B");
        assert_eq!(table.leaders(), vec![Some(0), Some(1)]);
    }

    #[test]
    fn test_difference_swap_negates() {
        let a = [5, 0, 3, 10, 1];
        let b = [1, 4, 3, 0, 9];
        let ab = pairwise_difference(&a, &b, ZeroDenominatorPolicy::Zero);
        let ba = pairwise_difference(&b, &a, ZeroDenominatorPolicy::Zero);
        for (x, y) in ab.iter().zip(&ba) {
            assert!(approx(x.unwrap(), -y.unwrap()));
            assert!(x.unwrap().abs() <= 200.0);
        }
    }

    #[test]
    fn test_difference_zero_denominator() {
        assert_eq!(
            pairwise_difference(&[0, 1], &[0, 1], ZeroDenominatorPolicy::Zero),
            vec![Some(0.0), Some(0.0)]
        );
        assert_eq!(
            pairwise_difference(&[0], &[0], ZeroDenominatorPolicy::Missing),
            vec![None]
        );
    }

    #[test]
    fn test_difference_requires_two_participants() {
        let three = aligned(&[("A", &[1]), ("B", &[1]), ("C", &[1])]);
        assert!(matches!(
            difference(&three, ZeroDenominatorPolicy::Zero),
            Err(Error::UnsupportedParticipantCount {
                expected: 2,
                actual: 3
            })
        ));
        let one = aligned(&[("A", &[1])]);
        assert!(apply(ViewKind::Difference, &one, ZeroDenominatorPolicy::Zero).is_err());
    }
}
