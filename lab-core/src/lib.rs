//! # lab-core: LUYS AntiBenchmark (LAB)
//!
//! Certifies whether a conversational model's behavior under uncertainty
//! meets domain-specific safety thresholds.
//!
//! Data flows one way:
//! dataset + responses → [`MetricEngine`] → [`MetricReport`] → [`Certifier`]
//! → [`CertificationResult`].
//!
//! The co-thinking scorer ([`co_thinking`]) and the REN2 composite
//! ([`resonance`]) are independent conversational-quality utilities.

pub mod certify;
pub mod co_thinking;
pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluator;
pub mod metrics;
pub mod models;
pub mod resonance;
pub mod thresholds;
pub mod types;

// Re-exports
pub use certify::{CertificationResult, CertificationStatus, Certifier};
pub use co_thinking::{CtmSessionMetrics, SessionStep, score_session};
pub use config::{LabConfig, load_config};
pub use dataset::Dataset;
pub use error::{ConfigError, LabError};
pub use evaluator::LabEvaluator;
pub use metrics::{CaseCounts, Metric, MetricEngine, MetricReport, MetricValue};
pub use models::{HonestModel, ResponseModel, SultanModel};
pub use resonance::{Ren2Components, ren2_composite};
pub use thresholds::{ThresholdResolver, ThresholdSet};
pub use types::{Case, Domain, Response};
