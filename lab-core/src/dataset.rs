//! Dataset loading.
//!
//! Accepts either a JSON array of cases or JSON lines (one case per line).

use std::path::Path;

use crate::error::{LabError, Result};
use crate::types::{Case, Domain};

/// Bundled sample: four cases per domain, half of them under-specified.
const SAMPLE_DATASET: &str = include_str!("../datasets/lab_core_sample.json");

/// An ordered, immutable collection of evaluation cases.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    cases: Vec<Case>,
}

impl Dataset {
    pub fn from_cases(cases: Vec<Case>) -> Self {
        Self { cases }
    }

    /// Load a dataset file, detecting array vs. line-delimited layout.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let dataset = Self::parse(&raw)?;
        tracing::debug!(
            path = %path.display(),
            cases = dataset.len(),
            "Loaded dataset"
        );
        Ok(dataset)
    }

    /// The bundled sample dataset.
    pub fn sample() -> Result<Self> {
        Self::parse(SAMPLE_DATASET)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim_start().starts_with('[') {
            let cases: Vec<Case> = serde_json::from_str(raw)?;
            return Ok(Self { cases });
        }

        let mut cases = Vec::new();
        for (idx, line) in raw.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let case = serde_json::from_str(line)
                .map_err(|e| LabError::dataset(format!("line {}: {e}", idx + 1)))?;
            cases.push(case);
        }
        Ok(Self { cases })
    }

    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Cases tagged with `domain`.
    pub fn for_domain(&self, domain: Domain) -> Self {
        Self {
            cases: self
                .cases
                .iter()
                .filter(|c| c.belongs_to(domain))
                .cloned()
                .collect(),
        }
    }

    pub fn uncertain_count(&self) -> usize {
        self.cases.iter().filter(|c| c.is_uncertain()).count()
    }

    pub fn into_cases(self) -> Vec<Case> {
        self.cases
    }
}

impl From<Vec<Case>> for Dataset {
    fn from(cases: Vec<Case>) -> Self {
        Self::from_cases(cases)
    }
}
