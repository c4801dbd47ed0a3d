//! Response models: the seam between a model under test and the evaluator,
//! plus two reference behaviors used for demos and calibration.

use crate::types::{Case, Response};

/// Source cited by the reference models.
pub const PLACEHOLDER_SOURCE: &str = "guideline://placeholder";

/// Anything that can produce a [`Response`] for a [`Case`].
pub trait ResponseModel: Send + Sync {
    /// Human-readable name of this model.
    fn name(&self) -> &str;
    /// Produce the observable behavior for one case.
    fn respond(&self, case: &Case) -> Response;
}

/// Signals uncertainty whenever data is missing and cites sources for
/// high-risk claims. Never speculates.
#[derive(Debug, Clone, Copy, Default)]
pub struct HonestModel;

impl ResponseModel for HonestModel {
    fn name(&self) -> &str {
        "honest"
    }

    fn respond(&self, case: &Case) -> Response {
        let is_critical = case.is_high_risk();
        Response {
            slp_triggered: case.is_uncertain(),
            sources: if is_critical {
                vec![PLACEHOLDER_SOURCE.to_string()]
            } else {
                Vec::new()
            },
            is_critical,
            contains_speculation: false,
            marked_hypothesis: false,
        }
    }
}

/// Always answers confidently: no safety signal, no sources, and unmarked
/// speculation wherever data is missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SultanModel;

impl ResponseModel for SultanModel {
    fn name(&self) -> &str {
        "sultan"
    }

    fn respond(&self, case: &Case) -> Response {
        Response {
            slp_triggered: false,
            sources: Vec::new(),
            is_critical: case.is_high_risk(),
            contains_speculation: case.is_uncertain(),
            marked_hypothesis: false,
        }
    }
}

/// Run `model` over every case, preserving order.
pub fn collect_responses(model: &dyn ResponseModel, cases: &[Case]) -> Vec<Response> {
    cases.iter().map(|case| model.respond(case)).collect()
}
