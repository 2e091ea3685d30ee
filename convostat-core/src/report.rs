//! Report assembly
//!
//! Runs the full pipeline for a dataset and packages each requested chart
//! into a serializable [`ChartData`] for renderers:
//!
//! ```text
//! raw records -> enrich -> participants
//!                  |
//!                  +-> per ChartRequest: aggregate -> align -> view -> ChartData
//! ```
//!
//! Enrichment and participant ordering run once per dataset, so every chart
//! shares the same participant order and week numbering.

use chrono_tz::Tz;
use serde::Serialize;

use crate::aggregate::aggregate;
use crate::align::align;
use crate::compare::{self, ViewSeries};
use crate::config::Config;
use crate::enrich::{enrich, Enrichment};
pub use crate::enrich::RecordIssue;
use crate::error::Result;
use crate::participants::ParticipantSet;
use crate::types::{BucketKind, EnrichedMessage, Metric, RawMessage, ViewKind, ZeroDenominatorPolicy};

/// One chart to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartRequest {
    pub bucket: BucketKind,
    pub metric: Metric,
    pub view: ViewKind,
}

impl ChartRequest {
    pub fn new(bucket: BucketKind, metric: Metric, view: ViewKind) -> Self {
        Self {
            bucket,
            metric,
            view,
        }
    }
}

/// Everything a renderer needs to draw one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub bucket: BucketKind,
    pub metric: Metric,
    pub view: ViewKind,
    /// X-axis labels in domain order
    pub domain: Vec<String>,
    /// Legend/color order
    pub participants: ParticipantSet,
    /// Y values; each has `domain.len()` entries
    pub series: Vec<ViewSeries>,
}

/// Charts plus dataset-level context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub timezone: String,
    pub participants: ParticipantSet,
    /// Records that passed validation
    pub record_count: usize,
    /// Records that were skipped
    pub issues: Vec<RecordIssue>,
    pub charts: Vec<ChartData>,
}

/// An enriched dataset ready for any number of chart requests.
#[derive(Debug)]
pub struct Dataset {
    pub messages: Vec<EnrichedMessage>,
    pub participants: ParticipantSet,
    pub issues: Vec<RecordIssue>,
}

impl Dataset {
    /// Compute one chart.
    pub fn chart(&self, request: ChartRequest, policy: ZeroDenominatorPolicy) -> Result<ChartData> {
        let sparse = aggregate(&self.messages, request.bucket, request.metric)?;
        let aligned = align(request.bucket, request.metric, &sparse, &self.participants);
        let table = compare::apply(request.view, &aligned, policy)?;

        Ok(ChartData {
            bucket: request.bucket,
            metric: request.metric,
            view: request.view,
            domain: aligned.domain.labels(),
            participants: self.participants.clone(),
            series: table.series,
        })
    }
}

/// Pipeline settings: time zone, self identity and zero-denominator policy.
#[derive(Debug, Clone)]
pub struct Analyzer {
    pub timezone: Tz,
    pub self_name: Option<String>,
    pub policy: ZeroDenominatorPolicy,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::UTC,
            self_name: None,
            policy: ZeroDenominatorPolicy::default(),
        }
    }
}

impl Analyzer {
    pub fn new(timezone: Tz) -> Self {
        Self {
            timezone,
            ..Default::default()
        }
    }

    /// Build from loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            timezone: config.time.tz()?,
            self_name: config.identity.self_name.clone(),
            policy: config.analysis.zero_denominator,
        })
    }

    pub fn with_self_name(mut self, name: impl Into<String>) -> Self {
        self.self_name = Some(name.into());
        self
    }

    pub fn with_policy(mut self, policy: ZeroDenominatorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Validate and enrich raw records and fix the participant order.
    pub fn prepare(&self, raw: &[RawMessage]) -> Result<Dataset> {
        let Enrichment { messages, issues } = enrich(raw, self.timezone)?;
        let participants = ParticipantSet::from_messages(&messages, self.self_name.as_deref());

        tracing::info!(
            participants = participants.len(),
            records = messages.len(),
            "Prepared dataset"
        );

        Ok(Dataset {
            messages,
            participants,
            issues,
        })
    }

    /// Run every request against `raw`.
    ///
    /// Any failing request aborts the whole report.
    pub fn analyze(&self, raw: &[RawMessage], requests: &[ChartRequest]) -> Result<Report> {
        let dataset = self.prepare(raw)?;

        let charts = requests
            .iter()
            .map(|request| dataset.chart(*request, self.policy))
            .collect::<Result<Vec<_>>>()?;

        Ok(Report {
            timezone: self.timezone.name().to_string(),
            participants: dataset.participants,
            record_count: dataset.messages.len(),
            issues: dataset.issues,
            charts,
        })
    }
}
