//! Record enrichment
//!
//! Validates raw records and attaches word/char counts and bucket keys.
//! Invalid records are skipped and collected as [`RecordIssue`]s (the index
//! and reason of each [`Error::MalformedRecord`]); the rest of the batch is
//! still enriched.

use chrono::Datelike;
use chrono_tz::Tz;
use serde::Serialize;

use crate::buckets;
use crate::error::{Error, Result};
use crate::types::{BucketKeys, EnrichedMessage, MessageRecord, RawMessage};

const PROGRESS_INTERVAL: usize = 1000;

/// A rejected input record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordIssue {
    pub index: usize,
    pub reason: String,
}

/// Result of enriching a batch of raw records.
#[derive(Debug)]
pub struct Enrichment {
    /// Valid records sorted by timestamp (stable for ties)
    pub messages: Vec<EnrichedMessage>,
    /// One issue per rejected input record, in input order
    pub issues: Vec<RecordIssue>,
}

/// Whitespace-boundary word estimate.
///
/// Counts space, newline and tab separators, subtracts doubled separators,
/// and adds one. This is an approximation, not a tokenizer: leading or
/// trailing whitespace and longer runs skew the result, and other Unicode
/// whitespace is ignored. Comparisons built on it are relative, so the
/// approximation is kept stable.
pub fn word_count(content: Option<&str>) -> u64 {
    let Some(text) = content else {
        return 0;
    };
    let count = |pat: &str| text.matches(pat).count() as u64;
    let separators = count(" ") + count("\n") + count("\t");
    let doubled = count("  ") + count("\n\n") + count("\t\t");
    // Each doubled pair contains two separators, so this never underflows
    separators - doubled + 1
}

/// Number of Unicode scalar values in the content, 0 when absent.
pub fn char_count(content: Option<&str>) -> u64 {
    content.map_or(0, |text| text.chars().count() as u64)
}

/// Validate one raw record.
pub fn validate(index: usize, raw: &RawMessage) -> Result<MessageRecord> {
    let sender = raw
        .sender_name
        .clone()
        .ok_or_else(|| Error::malformed(index, "missing sender_name"))?;

    let number = raw
        .timestamp_ms
        .as_ref()
        .ok_or_else(|| Error::malformed(index, "missing timestamp_ms"))?;

    let timestamp_ms = match number.as_i64() {
        Some(ms) if ms < 0 => {
            return Err(Error::malformed(
                index,
                format!("negative timestamp_ms: {}", ms),
            ))
        }
        Some(ms) => ms,
        None => match number.as_f64() {
            // Sign is checked before truncation so -0.5 is not read as 0
            Some(ms) if ms.is_sign_negative() => {
                return Err(Error::malformed(
                    index,
                    format!("negative timestamp_ms: {}", number),
                ))
            }
            Some(ms) if ms.is_finite() && ms < i64::MAX as f64 => ms.trunc() as i64,
            _ => {
                return Err(Error::malformed(
                    index,
                    format!("timestamp_ms out of range: {}", number),
                ))
            }
        },
    };

    Ok(MessageRecord {
        sender,
        timestamp_ms,
        content: raw.content.clone(),
    })
}

/// Enrich a batch of raw records in time zone `tz`.
///
/// Fails with [`Error::EmptyDataset`] if no record survives validation.
pub fn enrich(raw: &[RawMessage], tz: Tz) -> Result<Enrichment> {
    let mut issues = Vec::new();
    let mut staged = Vec::with_capacity(raw.len());

    for (index, message) in raw.iter().enumerate() {
        match stage(index, message, tz) {
            Ok(item) => staged.push(item),
            Err(Error::MalformedRecord { index, reason }) => {
                tracing::warn!(index, reason = %reason, "Skipping malformed record");
                issues.push(RecordIssue { index, reason });
            }
            Err(e) => return Err(e),
        }

        if (index + 1) % PROGRESS_INTERVAL == 0 {
            tracing::debug!(processed = index + 1, "Enrichment progress");
        }
    }

    if staged.is_empty() {
        return Err(Error::EmptyDataset);
    }

    staged.sort_by_key(|s| s.record.timestamp_ms);

    let raw_weeks: Vec<i64> = staged.iter().map(|s| s.raw_week).collect();
    let weeks = buckets::normalize_weeks(&raw_weeks);

    let messages: Vec<EnrichedMessage> = staged
        .into_iter()
        .zip(weeks)
        .map(|(s, week)| EnrichedMessage {
            word_count: word_count(s.record.content.as_deref()),
            char_count: char_count(s.record.content.as_deref()),
            keys: BucketKeys {
                hour: s.hour,
                week,
                month: s.month,
                day: s.day,
            },
            record: s.record,
        })
        .collect();

    tracing::info!(
        valid = messages.len(),
        rejected = issues.len(),
        timezone = %tz,
        "Enriched records"
    );

    Ok(Enrichment { messages, issues })
}

/// A validated record with its keys, before week normalization.
struct Staged {
    record: MessageRecord,
    hour: u32,
    raw_week: i64,
    month: String,
    day: String,
}

fn stage(index: usize, raw: &RawMessage, tz: Tz) -> Result<Staged> {
    let record = validate(index, raw)?;
    let local = buckets::local_datetime(record.timestamp_ms, tz).ok_or_else(|| {
        Error::malformed(
            index,
            format!("timestamp_ms not representable: {}", record.timestamp_ms),
        )
    })?;
    if local.year() > buckets::MAX_KEY_YEAR {
        return Err(Error::malformed(
            index,
            format!("local year {} is past {}", local.year(), buckets::MAX_KEY_YEAR),
        ));
    }

    Ok(Staged {
        hour: buckets::hour_key(&local),
        raw_week: buckets::raw_week_key(&local),
        month: buckets::month_key(&local),
        day: buckets::day_key(&local),
        record,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const UTC: Tz = chrono_tz::UTC;
    const DAY_MS: i64 = 86_400_000;
    // 2021-03-01T12:00:00Z, a Monday
    const MONDAY_NOON: i64 = 1_614_600_000_000;

    fn utc_ms(year: i32, month: u32, day: u32, hour: u32) -> i64 {
        chrono::NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .unwrap()
            .and_utc()
            .timestamp_millis()
    }

    #[test]
    fn test_word_count_absent() {
        assert_eq!(word_count(None), 0);
        assert_eq!(char_count(None), 0);
    }

    #[test]
    fn test_word_count_boundaries() {
        assert_eq!(word_count(Some("hello")), 1);
        assert_eq!(word_count(Some("hello world")), 2);
        assert_eq!(word_count(Some("one\ntwo\tthree")), 3);
        assert_eq!(word_count(Some("a  b")), 2);
        assert_eq!(word_count(Some("a\n\nb")), 2);
    }

    #[test]
    fn test_word_count_keeps_approximation() {
        // Empty text still counts as one word
        assert_eq!(word_count(Some("")), 1);
        // Trailing space adds a phantom word
        assert_eq!(word_count(Some("hi ")), 2);
        // Three spaces: 3 separators, 1 doubled pair
        assert_eq!(word_count(Some("a   b")), 3);
        // Non-breaking space is not a separator
        assert_eq!(word_count(Some("a\u{a0}b")), 1);
    }

    #[test]
    fn test_word_count_at_least_one() {
        for text in ["", " ", "  ", "\n\n\n", "\t \n", "x y z", "    "] {
            assert!(word_count(Some(text)) >= 1, "{:?}", text);
        }
    }

    #[test]
    fn test_char_count_uses_code_points() {
        assert_eq!(char_count(Some("héllo")), 5);
        assert_eq!(char_count(Some("👋🏽")), 2);
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        let no_sender = RawMessage {
            timestamp_ms: Some(1.into()),
            ..Default::default()
        };
        let no_time = RawMessage {
            sender_name: Some("A".into()),
            ..Default::default()
        };
        assert!(matches!(
            validate(0, &no_sender),
            Err(Error::MalformedRecord { index: 0, .. })
        ));
        assert!(matches!(
            validate(4, &no_time),
            Err(Error::MalformedRecord { index: 4, .. })
        ));
        assert!(validate(1, &RawMessage::new("A", -5, None)).is_err());
    }

    #[test]
    fn test_validate_truncates_float_timestamp() {
        let raw: RawMessage =
            serde_json::from_str(r#"{"sender_name":"A","timestamp_ms":1500.9}"#).unwrap();
        assert_eq!(validate(0, &raw).unwrap().timestamp_ms, 1500);
    }

    #[test]
    fn test_validate_rejects_negative_float_timestamp() {
        let raw: RawMessage =
            serde_json::from_str(r#"{"sender_name":"A","timestamp_ms":-0.5}"#).unwrap();
        let err = validate(2, &raw).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { index: 2, .. }));
        assert!(err.to_string().contains("negative"));
    }

    #[test]
    fn test_enrich_rejects_five_digit_years() {
        let last_key_year = utc_ms(9999, 12, 31, 23);
        let first_past = utc_ms(10000, 1, 1, 0);
        let raw = vec![
            RawMessage::new("A", last_key_year, None),
            RawMessage::new("B", first_past, None),
        ];
        let out = enrich(&raw, UTC).unwrap();
        assert_eq!(out.messages.len(), 1);
        assert_eq!(out.messages[0].keys.month, "9999-12");
        assert_eq!(out.issues[0].index, 1);
        assert!(out.issues[0].reason.contains("10000"));
    }

    #[test]
    fn test_year_bound_uses_local_time() {
        // Still 9999 in Chicago when UTC has rolled over to 10000
        let raw = vec![RawMessage::new("A", utc_ms(10000, 1, 1, 3), None)];
        let out = enrich(&raw, chrono_tz::America::Chicago).unwrap();
        assert_eq!(out.messages[0].keys.day, "9999-12-31");
        assert!(enrich(&raw, UTC).is_err());
    }

    #[test]
    fn test_enrich_null_content_still_counts() {
        let out = enrich(&[RawMessage::new("A", MONDAY_NOON, None)], UTC).unwrap();
        let msg = &out.messages[0];
        assert_eq!(msg.word_count, 0);
        assert_eq!(msg.char_count, 0);
        assert_eq!(msg.metric_value(crate::types::Metric::Messages), 1);
        assert_eq!(msg.keys.week, 0);
        assert_eq!(msg.keys.hour, 12);
        assert_eq!(msg.keys.day, "2021-03-01");
    }

    #[test]
    fn test_enrich_partial_failure() {
        let raw = vec![
            RawMessage::new("A", MONDAY_NOON, Some("hi there")),
            RawMessage::default(),
            RawMessage::new("B", MONDAY_NOON + DAY_MS, Some("yo")),
        ];
        let out = enrich(&raw, UTC).unwrap();
        assert_eq!(out.messages.len(), 2);
        assert_eq!(
            out.issues,
            vec![RecordIssue {
                index: 1,
                reason: "missing sender_name".to_string(),
            }]
        );
    }

    #[test]
    fn test_enrich_all_invalid_is_empty_dataset() {
        assert!(matches!(
            enrich(&[RawMessage::default()], UTC),
            Err(Error::EmptyDataset)
        ));
        assert!(matches!(enrich(&[], UTC), Err(Error::EmptyDataset)));
    }

    #[test]
    fn test_enrich_sorts_and_normalizes_weeks() {
        let raw = vec![
            RawMessage::new("A", MONDAY_NOON + 15 * DAY_MS, None),
            RawMessage::new("B", MONDAY_NOON, None),
            RawMessage::new("A", MONDAY_NOON + 7 * DAY_MS, None),
        ];
        let out = enrich(&raw, UTC).unwrap();
        let weeks: Vec<u32> = out.messages.iter().map(|m| m.keys.week).collect();
        assert_eq!(weeks, vec![0, 1, 2]);
        assert_eq!(out.messages[0].sender(), "B");
    }
}
