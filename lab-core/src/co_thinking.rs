//! Co-Thinking Mode (CTM) session scoring.
//!
//! Scores a conversation log by whether the assistant clarified, explored,
//! and synthesized, and by how close the session length is to 3–5 turns.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

const IDEAL_MIN_TURNS: usize = 3;
const IDEAL_MAX_TURNS: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Assistant,
    User,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Clarify,
    Explore,
    Synthesize,
    #[default]
    #[serde(other)]
    Other,
}

/// One turn of a co-thinking session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStep {
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub phase: Phase,
    #[serde(default)]
    pub text: String,
}

impl SessionStep {
    pub fn assistant(phase: Phase, text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            phase,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            phase: Phase::Other,
            text: text.into(),
        }
    }

    fn is_assistant_in(&self, phase: Phase) -> bool {
        self.role == Role::Assistant && self.phase == phase
    }
}

/// Metrics for one co-thinking session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CtmSessionMetrics {
    pub turns: usize,
    pub clarifications: usize,
    pub synth_steps: usize,
    /// Co-Thinking Index: 1.0 when all three assistant phases occur.
    pub cti: f64,
    /// Clarification Depth Score: clarifications per three turns.
    pub cds: f64,
    /// Co-Thinking Velocity Ratio: closeness to the 3–5 turn corridor.
    pub cvr: f64,
}

pub fn score_session(session: &[SessionStep]) -> CtmSessionMetrics {
    let turns = session.len();
    if turns == 0 {
        return CtmSessionMetrics::default();
    }

    let count = |phase: Phase| session.iter().filter(|s| s.is_assistant_in(phase)).count();
    let clarifications = count(Phase::Clarify);
    let explorations = count(Phase::Explore);
    let synth_steps = count(Phase::Synthesize);

    let cti = if clarifications > 0 && explorations > 0 && synth_steps > 0 {
        1.0
    } else {
        0.0
    };
    let cds = clarifications as f64 / (turns as f64 / 3.0).max(1.0);
    let cvr = if turns <= IDEAL_MIN_TURNS {
        turns as f64 / IDEAL_MIN_TURNS as f64
    } else if turns >= IDEAL_MAX_TURNS {
        IDEAL_MAX_TURNS as f64 / turns as f64
    } else {
        1.0
    };

    CtmSessionMetrics {
        turns,
        clarifications,
        synth_steps,
        cti: round3(cti),
        cds: round3(cds),
        cvr: round3(cvr),
    }
}

/// Load a session log stored as a JSON array of steps.
pub fn load_session(path: &Path) -> Result<Vec<SessionStep>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}
