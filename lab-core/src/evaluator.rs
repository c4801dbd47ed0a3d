//! The LAB evaluator: resolved thresholds + metric engine + certifier.
//!
//! Thresholds are resolved once at construction and never change. All
//! evaluation methods take `&self`, so one evaluator can be reused and shared.

use std::path::Path;

use crate::certify::{CertificationResult, Certifier};
use crate::dataset::Dataset;
use crate::error::{LabError, Result};
use crate::metrics::MetricEngine;
use crate::models::{ResponseModel, collect_responses};
use crate::thresholds::{ThresholdResolver, ThresholdSet};
use crate::types::{Case, Domain, Response};

#[derive(Debug, Clone)]
pub struct LabEvaluator {
    domain: Domain,
    thresholds: ThresholdSet,
    engine: MetricEngine,
    certifier: Certifier,
}

impl LabEvaluator {
    /// Resolve thresholds for `domain` from `thresholds_path`, or from the
    /// bundled per-domain table when no path is given.
    pub fn new(domain: Domain, thresholds_path: Option<&Path>) -> Result<Self> {
        let resolver = match thresholds_path {
            Some(path) => ThresholdResolver::from_file(path),
            None => ThresholdResolver::new(),
        };
        Self::with_resolver(domain, &resolver)
    }

    pub fn with_resolver(domain: Domain, resolver: &ThresholdResolver) -> Result<Self> {
        let thresholds = resolver.resolve(domain)?;
        Ok(Self::with_thresholds(domain, thresholds))
    }

    /// Use an already resolved threshold set.
    pub fn with_thresholds(domain: Domain, thresholds: ThresholdSet) -> Self {
        Self {
            domain,
            thresholds,
            engine: MetricEngine::new(),
            certifier: Certifier::new(),
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn thresholds(&self) -> &ThresholdSet {
        &self.thresholds
    }

    /// Compute all metrics and certify them.
    ///
    /// `responses[i]` must describe the model's behavior on `cases[i]`; a
    /// length mismatch fails with [`LabError::ShapeMismatch`].
    pub fn evaluate(&self, responses: &[Response], cases: &[Case]) -> Result<CertificationResult> {
        let metrics = self.engine.compute(cases, responses)?;
        let result = self.certifier.certify(self.domain, metrics, &self.thresholds);
        tracing::info!(
            domain = %self.domain,
            cases = cases.len(),
            certification = %result.certification,
            failures = result.failed_metrics.len(),
            "Evaluation complete"
        );
        Ok(result)
    }

    /// Run `model` over this evaluator's domain cases from `dataset_path`
    /// and certify the responses.
    pub fn evaluate_model(
        &self,
        model: &dyn ResponseModel,
        dataset_path: &Path,
    ) -> Result<CertificationResult> {
        let dataset = Dataset::load(dataset_path)?.for_domain(self.domain);
        self.evaluate_model_on(model, &dataset)
    }

    /// Run `model` over an in-memory dataset and certify the responses.
    pub fn evaluate_model_on(
        &self,
        model: &dyn ResponseModel,
        dataset: &Dataset,
    ) -> Result<CertificationResult> {
        if dataset.is_empty() {
            return Err(LabError::dataset(format!(
                "no cases for domain '{}'",
                self.domain
            )));
        }
        tracing::debug!(model = model.name(), cases = dataset.len(), "Collecting responses");
        let responses = collect_responses(model, dataset.cases());
        self.evaluate(&responses, dataset.cases())
    }
}
