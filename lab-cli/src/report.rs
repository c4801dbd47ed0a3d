//! Plain-text rendering of evaluation results.

use lab_core::co_thinking::CtmSessionMetrics;
use lab_core::{CertificationResult, Metric};
use std::fmt::Write;

pub fn render_result(model: &str, result: &CertificationResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== LAB RESULT ===");
    let _ = writeln!(out, "Domain:        {}", result.domain);
    let _ = writeln!(out, "Mode:          {model}");
    let _ = writeln!(out, "Cases:         {}", result.metrics.counts.pairs);
    let _ = writeln!(out, "Certification: {}", result.certification);
    let _ = writeln!(out, "Metrics:");
    for (metric, value) in result.metrics.values() {
        let marker = match result.is_compliant(metric) {
            Some(true) => "ok",
            Some(false) => "FAILED",
            None => "",
        };
        let _ = writeln!(out, "  {:<20}: {value:<6} {marker}", metric_title(metric));
    }
    if result.failed_metrics.is_empty() {
        let _ = writeln!(out, "All metrics within thresholds (PASS).");
    } else {
        let _ = writeln!(out, "Failed metrics:");
        for reason in &result.failed_metrics {
            let _ = writeln!(out, "  - {reason}");
        }
    }
    out
}

pub fn render_ctm(metrics: &CtmSessionMetrics) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== CTM ===");
    let _ = writeln!(out, "Turns          : {}", metrics.turns);
    let _ = writeln!(out, "Clarifications : {}", metrics.clarifications);
    let _ = writeln!(out, "Synth steps    : {}", metrics.synth_steps);
    let _ = writeln!(out, "CTI            : {:.3}", metrics.cti);
    let _ = writeln!(out, "CDS            : {:.3}", metrics.cds);
    let _ = writeln!(out, "CVR            : {:.3}", metrics.cvr);
    out
}

fn metric_title(metric: Metric) -> &'static str {
    match metric {
        Metric::SultanIndex => "Sultan Index",
        Metric::StrOnUncertain => "STR (uncertain)",
        Metric::StrOnEasy => "STR (easy)",
        Metric::Jsr => "JSR",
        Metric::TtsCritical => "TTS critical",
        Metric::TtsBackground => "TTS background",
        Metric::Hru => "HRU",
        Metric::CvfImpact => "CVF impact",
        Metric::ReferenceGraphIndex => "Reference graph idx",
    }
}
