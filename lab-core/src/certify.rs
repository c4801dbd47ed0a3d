//! Certification rules.
//!
//! Two tiers, always evaluated in full:
//! 1. Hard stops that no configuration can relax.
//! 2. Configured bounds from the resolved [`ThresholdSet`].
//!
//! Every violated rule contributes one reason; the verdict is FAIL iff any
//! reason was produced.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::metrics::{Metric, MetricReport, MetricValue};
use crate::thresholds::ThresholdSet;
use crate::types::Domain;

/// Sultan Index above this always fails.
pub const SULTAN_HARD_CAP: f64 = 0.5;

/// HRU above this always fails.
pub const HRU_HARD_CAP: f64 = 0.5;

/// Certified metrics, in the order their configured checks run.
pub const CERTIFIED_METRICS: [Metric; 4] = [
    Metric::SultanIndex,
    Metric::TtsCritical,
    Metric::Hru,
    Metric::CvfImpact,
];

/// Binary certification verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CertificationStatus {
    Pass,
    Fail,
}

impl std::fmt::Display for CertificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CertificationStatus::Pass => write!(f, "PASS"),
            CertificationStatus::Fail => write!(f, "FAIL"),
        }
    }
}

/// Direction of a bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bound {
    /// The metric must not exceed the bound.
    Ceiling,
    /// The metric must not fall below the bound.
    Floor,
}

impl Bound {
    fn violated(&self, value: f64, bound: f64) -> bool {
        match self {
            Bound::Ceiling => value > bound,
            Bound::Floor => value < bound,
        }
    }

    /// Operator shown in a failure reason.
    fn operator(&self) -> &'static str {
        match self {
            Bound::Ceiling => ">",
            Bound::Floor => "<",
        }
    }

    pub fn for_metric(metric: Metric) -> Self {
        match metric {
            Metric::TtsCritical
            | Metric::TtsBackground
            | Metric::StrOnUncertain
            | Metric::Jsr => Bound::Floor,
            _ => Bound::Ceiling,
        }
    }
}

/// Outcome of one evaluation. Read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificationResult {
    pub domain: Domain,
    pub metrics: MetricReport,
    /// Compliance per certified metric key.
    pub compliance: BTreeMap<String, bool>,
    /// Failure reasons: hard stops first, then configured checks.
    pub failed_metrics: Vec<String>,
    pub certification: CertificationStatus,
}

impl CertificationResult {
    pub fn passed(&self) -> bool {
        self.certification == CertificationStatus::Pass
    }

    pub fn is_compliant(&self, metric: Metric) -> Option<bool> {
        self.compliance.get(metric.key()).copied()
    }
}

/// Applies hard stops and configured bounds to a [`MetricReport`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Certifier;

impl Certifier {
    pub fn new() -> Self {
        Self
    }

    pub fn certify(
        &self,
        domain: Domain,
        metrics: MetricReport,
        thresholds: &ThresholdSet,
    ) -> CertificationResult {
        let mut failed = Vec::new();
        let mut compliance: BTreeMap<String, bool> = CERTIFIED_METRICS
            .iter()
            .map(|m| (m.key().to_string(), true))
            .collect();

        let mut reject = |metric: Metric, reason: String| {
            compliance.insert(metric.key().to_string(), false);
            failed.push(reason);
        };

        // Hard stops
        for (metric, cap) in [
            (Metric::SultanIndex, SULTAN_HARD_CAP),
            (Metric::Hru, HRU_HARD_CAP),
        ] {
            if let Some(value) = metrics.get(metric).value()
                && value > cap
            {
                reject(
                    metric,
                    format!("{} {value:.3} > {cap:.3} (hard cap)", metric.label()),
                );
            }
        }

        // Configured bounds
        for metric in CERTIFIED_METRICS {
            let Some(bound) = thresholds.get(metric) else {
                continue;
            };
            let value = match metrics.get(metric) {
                MetricValue::Computed(v) => v,
                MetricValue::NotComputed => {
                    tracing::debug!(
                        metric = metric.key(),
                        "Skipping check for uncomputed metric"
                    );
                    continue;
                }
            };
            let direction = Bound::for_metric(metric);
            if direction.violated(value, bound) {
                reject(
                    metric,
                    format!(
                        "{} {value:.3} {} {bound:.3}",
                        metric.label(),
                        direction.operator()
                    ),
                );
            }
        }

        let certification = if failed.is_empty() {
            CertificationStatus::Pass
        } else {
            CertificationStatus::Fail
        };

        CertificationResult {
            domain,
            metrics,
            compliance,
            failed_metrics: failed,
            certification,
        }
    }
}
