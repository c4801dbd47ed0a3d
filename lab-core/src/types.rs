//! Core record types: domains, evaluation cases, and model responses.

use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

use crate::error::ConfigError;

/// Risk level assumed for cases that do not carry one.
pub const DEFAULT_RISK_LEVEL: u8 = 5;

/// Risk level at or above which a claim is treated as high-stakes.
pub const CRITICAL_RISK_LEVEL: u8 = 8;

/// Certification domain. Each domain may carry its own threshold section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Medicine,
    Legal,
    Finance,
    Engineering,
    Journalism,
}

impl Domain {
    pub const ALL: [Domain; 5] = [
        Domain::Medicine,
        Domain::Legal,
        Domain::Finance,
        Domain::Engineering,
        Domain::Journalism,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Medicine => "medicine",
            Domain::Legal => "legal",
            Domain::Finance => "finance",
            Domain::Engineering => "engineering",
            Domain::Journalism => "journalism",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Domain::ALL
            .into_iter()
            .find(|d| d.as_str() == needle)
            .ok_or_else(|| ConfigError::UnknownDomain {
                name: s.to_string(),
                expected: Domain::ALL
                    .iter()
                    .map(|d| d.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// One evaluation scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Names of the data the case withholds. Empty means fully specified.
    #[serde(default, deserialize_with = "null_as_default")]
    pub missing_critical_data: Vec<String>,
    #[serde(default = "default_risk_level", deserialize_with = "null_as_default_risk")]
    pub risk_level: u8,
    #[serde(default, deserialize_with = "null_as_default")]
    pub domain: String,
}

impl Default for Case {
    fn default() -> Self {
        Self {
            id: None,
            prompt: None,
            missing_critical_data: Vec::new(),
            risk_level: DEFAULT_RISK_LEVEL,
            domain: String::new(),
        }
    }
}

impl Case {
    /// A case missing the named data.
    pub fn uncertain<I, S>(missing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            missing_critical_data: missing.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// A fully specified case.
    pub fn easy() -> Self {
        Self::default()
    }

    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = domain.as_str().to_string();
        self
    }

    pub fn with_risk_level(mut self, risk_level: u8) -> Self {
        self.risk_level = risk_level;
        self
    }

    /// Whether the case withholds critical data.
    pub fn is_uncertain(&self) -> bool {
        !self.missing_critical_data.is_empty()
    }

    pub fn is_high_risk(&self) -> bool {
        self.risk_level >= CRITICAL_RISK_LEVEL
    }

    pub fn belongs_to(&self, domain: Domain) -> bool {
        self.domain.eq_ignore_ascii_case(domain.as_str())
    }
}

/// Observable behavior of one model response, aligned to exactly one [`Case`].
///
/// Every field defaults to false/empty when absent or null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default, deserialize_with = "null_as_default")]
    pub slp_triggered: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sources: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_critical: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub contains_speculation: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub marked_hypothesis: bool,
}

impl Response {
    pub fn has_sources(&self) -> bool {
        !self.sources.is_empty()
    }

    /// Speculation that was not flagged as a hypothesis.
    pub fn has_unmarked_speculation(&self) -> bool {
        self.contains_speculation && !self.marked_hypothesis
    }
}

fn default_risk_level() -> u8 {
    DEFAULT_RISK_LEVEL
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Risk levels as they appear in hand-written datasets: `8`, `8.0` or `"8"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawRiskLevel {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl RawRiskLevel {
    fn into_level(self) -> Result<u8, String> {
        let level = match self {
            Self::Integer(v) => v,
            Self::Float(v) if v.is_finite() => v.trunc() as i64,
            Self::Float(v) => return Err(format!("risk_level {v} is not a finite number")),
            Self::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("risk_level '{s}' is not an integer"))?,
        };
        u8::try_from(level).map_err(|_| format!("risk_level {level} is out of range 0-255"))
    }
}

fn null_as_default_risk<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawRiskLevel>::deserialize(deserializer)? {
        Some(raw) => raw.into_level().map_err(serde::de::Error::custom),
        None => Ok(DEFAULT_RISK_LEVEL),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_roundtrip() {
        for domain in Domain::ALL {
            assert_eq!(domain.as_str().parse::<Domain>().unwrap(), domain);
            assert_eq!(domain.to_string(), domain.as_str());
        }
        assert_eq!(" Finance ".parse::<Domain>().unwrap(), Domain::Finance);
    }

    #[test]
    fn test_unknown_domain() {
        let err = "astrology".parse::<Domain>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownDomain { ref name, .. } if name == "astrology"));
    }

    #[test]
    fn test_response_defaults_for_missing_fields() {
        let resp: Response = serde_json::from_str("{}").unwrap();
        assert_eq!(resp, Response::default());

        let resp: Response =
            serde_json::from_str(r#"{"sources": null, "slp_triggered": null, "extra": 1}"#)
                .unwrap();
        assert!(!resp.slp_triggered);
        assert!(resp.sources.is_empty());
    }

    #[test]
    fn test_case_defaults() {
        let case: Case = serde_json::from_str(r#"{"missing_critical_data": ["age"]}"#).unwrap();
        assert!(case.is_uncertain());
        assert_eq!(case.risk_level, DEFAULT_RISK_LEVEL);
        assert!(case.domain.is_empty());

        let case: Case = serde_json::from_str(r#"{"risk_level": null}"#).unwrap();
        assert!(!case.is_uncertain());
        assert_eq!(case.risk_level, DEFAULT_RISK_LEVEL);
    }

    #[test]
    fn test_risk_level_accepts_float_and_string() {
        let cases: Vec<Case> = serde_json::from_str(
            r#"[{"risk_level": 8.0}, {"risk_level": "9"}, {"risk_level": 8.7}, {"risk_level": 3}]"#,
        )
        .unwrap();
        let levels: Vec<u8> = cases.iter().map(|c| c.risk_level).collect();
        assert_eq!(levels, vec![8, 9, 8, 3]);
        assert!(cases[0].is_high_risk());
    }

    #[test]
    fn test_risk_level_rejects_garbage() {
        assert!(serde_json::from_str::<Case>(r#"{"risk_level": "high"}"#).is_err());
        assert!(serde_json::from_str::<Case>(r#"{"risk_level": -1}"#).is_err());
        assert!(serde_json::from_str::<Case>(r#"{"risk_level": 300}"#).is_err());
    }

    #[test]
    fn test_unmarked_speculation() {
        let resp = Response {
            contains_speculation: true,
            ..Default::default()
        };
        assert!(resp.has_unmarked_speculation());

        let marked = Response {
            contains_speculation: true,
            marked_hypothesis: true,
            ..Default::default()
        };
        assert!(!marked.has_unmarked_speculation());
    }

    #[test]
    fn test_case_domain_membership() {
        let case = Case::easy().with_domain(Domain::Legal).with_risk_level(9);
        assert!(case.belongs_to(Domain::Legal));
        assert!(!case.belongs_to(Domain::Finance));
        assert!(case.is_high_risk());
    }
}
