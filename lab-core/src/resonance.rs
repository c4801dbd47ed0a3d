//! REN2 resonance composite.
//!
//! Compresses novelty, fidelity, and helpfulness into one score in
//! `[0.0, 1.0]`, weighting novelty most heavily.

use serde::{Deserialize, Serialize};

pub const NOVELTY_WEIGHT: f64 = 0.6;
pub const FIDELITY_WEIGHT: f64 = 0.2;
pub const HELPFULNESS_WEIGHT: f64 = 0.2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Ren2Components {
    pub novelty: f64,
    pub fidelity: f64,
    pub helpfulness: f64,
}

impl Ren2Components {
    pub fn composite(&self) -> f64 {
        ren2_composite(self.novelty, self.fidelity, self.helpfulness)
    }
}

/// Weighted REN2 score. Inputs are clamped to `[0, 1]`; NaN counts as 0.
pub fn ren2_composite(novelty: f64, fidelity: f64, helpfulness: f64) -> f64 {
    NOVELTY_WEIGHT * clamp01(novelty)
        + FIDELITY_WEIGHT * clamp01(fidelity)
        + HELPFULNESS_WEIGHT * clamp01(helpfulness)
}

fn clamp01(x: f64) -> f64 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}
