//! Threshold resolution.
//!
//! Uses `figment` to layer bounds: built-in defaults -> `[defaults]` section ->
//! `[<domain>]` section -> optional environment overrides. Sections come from
//! a user file when one is configured, otherwise from the bundled
//! `thresholds.toml`. The result always covers every metric the certifier
//! consults.

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::metrics::Metric;
use crate::types::Domain;

/// Name of the fallback section in a thresholds file.
pub const DEFAULTS_SECTION: &str = "defaults";

/// Environment prefix for per-metric overrides, e.g. `LAB_THRESHOLD_HRU=0.05`.
pub const ENV_PREFIX: &str = "LAB_THRESHOLD_";

/// Resolved bounds for one domain. Immutable once resolved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSet {
    /// Ceiling for the Sultan Index.
    pub sultan_index: f64,
    /// Recorded for reporting; not certified.
    pub jsr: f64,
    /// Floor for critical-claim traceability.
    pub tts_critical: f64,
    /// Recorded for reporting; not certified.
    pub tts_background: f64,
    /// Ceiling for the hallucination rate under uncertainty.
    pub hru: f64,
    /// Ceiling for cost per validated fact.
    pub cvf_impact: f64,
}

impl Default for ThresholdSet {
    fn default() -> Self {
        Self {
            sultan_index: 0.15,
            jsr: 15.0,
            tts_critical: 0.99,
            tts_background: 0.80,
            hru: 0.03,
            cvf_impact: 0.05,
        }
    }
}

impl ThresholdSet {
    /// Bound configured for `metric`, if the metric is configurable.
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::SultanIndex => Some(self.sultan_index),
            Metric::Jsr => Some(self.jsr),
            Metric::TtsCritical => Some(self.tts_critical),
            Metric::TtsBackground => Some(self.tts_background),
            Metric::Hru => Some(self.hru),
            Metric::CvfImpact => Some(self.cvf_impact),
            Metric::StrOnUncertain | Metric::StrOnEasy | Metric::ReferenceGraphIndex => None,
        }
    }

    /// All configured bounds as `(key, bound)` pairs in declaration order.
    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        Metric::ALL
            .iter()
            .filter_map(|m| self.get(*m).map(|v| (m.key(), v)))
            .collect()
    }
}

/// Per-domain bounds shipped with the crate.
const BUNDLED_THRESHOLDS: &str = include_str!("../thresholds.toml");

/// Where a resolver reads its threshold sections from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum ThresholdSource {
    /// Built-in table only.
    Builtin,
    /// The `thresholds.toml` compiled into the crate.
    #[default]
    Bundled,
    File(PathBuf),
}

/// Resolves a [`ThresholdSet`] for a domain.
///
/// By default the bundled per-domain table is consulted; [`from_file`]
/// points the resolver at a user-supplied file instead.
///
/// [`from_file`]: ThresholdResolver::from_file
#[derive(Debug, Clone, Default)]
pub struct ThresholdResolver {
    source: ThresholdSource,
    env_overrides: bool,
}

impl ThresholdResolver {
    /// Resolver backed by the bundled per-domain thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver that only knows the built-in defaults.
    pub fn builtin() -> Self {
        Self {
            source: ThresholdSource::Builtin,
            env_overrides: false,
        }
    }

    /// Resolver backed by a thresholds file. The file need not exist.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            source: ThresholdSource::File(path.into()),
            env_overrides: false,
        }
    }

    /// Also honor `LAB_THRESHOLD_<METRIC>` environment variables.
    pub fn with_env_overrides(mut self, enabled: bool) -> Self {
        self.env_overrides = enabled;
        self
    }

    /// Thresholds file, when one was configured.
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            ThresholdSource::File(path) => Some(path),
            ThresholdSource::Builtin | ThresholdSource::Bundled => None,
        }
    }

    /// Resolve by domain name. Unknown names fail before any lookup.
    pub fn resolve_named(&self, domain: &str) -> Result<ThresholdSet, ConfigError> {
        let domain: Domain = domain.parse()?;
        self.resolve(domain)
    }

    pub fn resolve(&self, domain: Domain) -> Result<ThresholdSet, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(ThresholdSet::default()));

        if let Some((origin, table)) = self.read_table()? {
            if let Some(defaults) = section_bounds(&table, DEFAULTS_SECTION, &origin)? {
                figment = figment.merge(Serialized::defaults(defaults));
            }
            match section_bounds(&table, domain.as_str(), &origin)? {
                Some(section) => figment = figment.merge(Serialized::defaults(section)),
                None => tracing::info!(
                    domain = %domain,
                    "No domain section in thresholds file, using defaults"
                ),
            }
        }

        if self.env_overrides {
            figment = figment.merge(Env::prefixed(ENV_PREFIX));
        }

        let thresholds: ThresholdSet = figment.extract().map_err(Box::new)?;
        tracing::info!(domain = %domain, ?thresholds, "Resolved thresholds");
        Ok(thresholds)
    }

    /// Parse the configured source into a TOML table.
    ///
    /// Returns `Ok(None)` when there is nothing to read; an unreadable file is
    /// logged and treated the same way. Malformed content is an error.
    fn read_table(&self) -> Result<Option<(PathBuf, toml::Table)>, ConfigError> {
        let (origin, raw) = match &self.source {
            ThresholdSource::Builtin => return Ok(None),
            ThresholdSource::Bundled => (
                PathBuf::from("<bundled thresholds.toml>"),
                BUNDLED_THRESHOLDS.to_string(),
            ),
            ThresholdSource::File(path) => {
                if !path.exists() {
                    tracing::info!(
                        path = %path.display(),
                        "Thresholds file not found, using built-in defaults"
                    );
                    return Ok(None);
                }
                match std::fs::read_to_string(path) {
                    Ok(raw) => (path.clone(), raw),
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Thresholds file unreadable, using built-in defaults"
                        );
                        return Ok(None);
                    }
                }
            }
        };
        let table = raw.parse::<toml::Table>().map_err(|e| ConfigError::Parse {
            path: origin.clone(),
            message: e.to_string(),
        })?;
        Ok(Some((origin, table)))
    }
}

/// Numeric bounds from one section of a thresholds table.
///
/// Only metric keys are read, and those must be numbers. Anything else in the
/// section, or in sections for other domains, is left alone.
fn section_bounds(
    table: &toml::Table,
    section: &str,
    origin: &Path,
) -> Result<Option<BTreeMap<&'static str, f64>>, ConfigError> {
    let Some(value) = table.get(section) else {
        return Ok(None);
    };
    let parse_error = |message: String| ConfigError::Parse {
        path: origin.to_path_buf(),
        message,
    };
    let entries = value
        .as_table()
        .ok_or_else(|| parse_error(format!("[{section}] must be a table")))?;

    let mut bounds = BTreeMap::new();
    for (key, _) in ThresholdSet::default().entries() {
        let bound = match entries.get(key) {
            None => continue,
            Some(toml::Value::Float(v)) => *v,
            Some(toml::Value::Integer(v)) => *v as f64,
            Some(other) => {
                return Err(parse_error(format!(
                    "{section}.{key} must be a number, found {}",
                    other.type_str()
                )));
            }
        };
        bounds.insert(key, bound);
    }
    let ignored: Vec<&str> = entries
        .keys()
        .map(String::as_str)
        .filter(|k| !bounds.contains_key(*k))
        .collect();
    if !ignored.is_empty() {
        tracing::debug!(section, ?ignored, "Ignoring non-metric threshold keys");
    }
    Ok(Some(bounds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write_thresholds(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("thresholds.toml");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_builtin_defaults() {
        let t = ThresholdResolver::builtin().resolve(Domain::Medicine).unwrap();
        assert_eq!(t, ThresholdSet::default());
        assert_eq!(t.sultan_index, 0.15);
        assert_eq!(t.tts_critical, 0.99);
        assert_eq!(t.hru, 0.03);
        assert_eq!(t.cvf_impact, 0.05);
    }

    #[test]
    fn test_default_resolver_uses_bundled_table() {
        let resolver = ThresholdResolver::new();
        assert!(resolver.path().is_none());

        let medicine = resolver.resolve(Domain::Medicine).unwrap();
        assert_eq!(medicine.sultan_index, 0.05);
        assert_eq!(medicine.hru, 0.01);
        assert_eq!(medicine.cvf_impact, 0.05);

        let journalism = resolver.resolve(Domain::Journalism).unwrap();
        assert_eq!(journalism.sultan_index, 0.20);
        assert_eq!(journalism.tts_background, 0.60);
        assert_eq!(journalism.hru, 0.03);
    }

    #[test]
    fn test_bundled_table_covers_every_domain() {
        let resolver = ThresholdResolver::new();
        for domain in Domain::ALL {
            let bundled = resolver.resolve(domain).unwrap();
            assert_ne!(bundled, ThresholdSet::default(), "{domain}");
        }
    }

    #[test]
    fn test_missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = ThresholdResolver::from_file(dir.path().join("nope.toml"));
        let t = resolver.resolve(Domain::Legal).unwrap();
        assert_eq!(t, ThresholdSet::default());
    }

    #[test]
    fn test_domain_section_overrides_and_fills_gaps() {
        let (_dir, path) = write_thresholds(
            r#"
[medicine]
sultan_index = 0.05
hru = 0
"#,
        );
        let t = ThresholdResolver::from_file(&path)
            .resolve(Domain::Medicine)
            .unwrap();
        assert_eq!(t.sultan_index, 0.05);
        assert_eq!(t.hru, 0.0);
        // Gaps come from the built-in table.
        assert_eq!(t.tts_critical, 0.99);
        assert_eq!(t.cvf_impact, 0.05);
    }

    #[test]
    fn test_defaults_section_used_when_domain_missing() {
        let (_dir, path) = write_thresholds(
            r#"
[defaults]
sultan_index = 0.2
tts_critical = 0.9

[medicine]
sultan_index = 0.01
"#,
        );
        let resolver = ThresholdResolver::from_file(&path);

        let finance = resolver.resolve(Domain::Finance).unwrap();
        assert_eq!(finance.sultan_index, 0.2);
        assert_eq!(finance.tts_critical, 0.9);

        let medicine = resolver.resolve(Domain::Medicine).unwrap();
        assert_eq!(medicine.sultan_index, 0.01);
        assert_eq!(medicine.tts_critical, 0.9);
    }

    #[test]
    fn test_unparsable_file_is_error() {
        let (_dir, path) = write_thresholds("[medicine\nsultan_index = ");
        let err = ThresholdResolver::from_file(&path)
            .resolve(Domain::Medicine)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_non_numeric_bound_is_error() {
        let (_dir, path) = write_thresholds("[medicine]\nsultan_index = \"low\"\n");
        let err = ThresholdResolver::from_file(&path)
            .resolve(Domain::Medicine)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_non_metric_entries_are_ignored() {
        let (_dir, path) = write_thresholds(
            r#"
title = "LAB bounds"

[medicine]
sultan_index = 0.05
reviewed_by = "clinical board"

[journalism]
note = "editorial"
"#,
        );
        let resolver = ThresholdResolver::from_file(&path);

        let medicine = resolver.resolve(Domain::Medicine).unwrap();
        assert_eq!(medicine.sultan_index, 0.05);

        let journalism = resolver.resolve(Domain::Journalism).unwrap();
        assert_eq!(journalism, ThresholdSet::default());
    }

    #[test]
    fn test_bad_bound_only_breaks_its_own_domain() {
        let (_dir, path) = write_thresholds("[legal]\nhru = \"tight\"\n\n[finance]\nhru = 0.02\n");
        let resolver = ThresholdResolver::from_file(&path);

        assert_eq!(resolver.resolve(Domain::Finance).unwrap().hru, 0.02);
        let err = resolver.resolve(Domain::Legal).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Parse { ref message, .. } if message.contains("legal.hru")
        ));
    }

    #[test]
    fn test_non_table_section_is_error() {
        let (_dir, path) = write_thresholds("medicine = 0.05\n");
        let err = ThresholdResolver::from_file(&path)
            .resolve(Domain::Medicine)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_env_overrides_beat_file_sections() {
        figment::Jail::expect_with(|jail| {
            let path = jail.directory().join("thresholds.toml");
            std::fs::write(
                &path,
                "[defaults]\nhru = 0.02\nsultan_index = 0.2\n\n\
                 [medicine]\nsultan_index = 0.05\n",
            )
            .unwrap();
            jail.set_env("LAB_THRESHOLD_SULTAN_INDEX", "0.3");
            jail.set_env("LAB_THRESHOLD_HRU", "0.4");

            let resolver = ThresholdResolver::from_file(&path);
            let file_only = resolver.resolve(Domain::Medicine).unwrap();
            assert_eq!(file_only.sultan_index, 0.05);
            assert_eq!(file_only.hru, 0.02);

            let with_env = resolver
                .with_env_overrides(true)
                .resolve(Domain::Medicine)
                .unwrap();
            assert_eq!(with_env.sultan_index, 0.3);
            assert_eq!(with_env.hru, 0.4);
            assert_eq!(with_env.tts_critical, 0.99);
            Ok(())
        });
    }

    #[test]
    fn test_unknown_domain_name() {
        let err = ThresholdResolver::new()
            .resolve_named("astrology")
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownDomain { .. }));
    }

    #[test]
    fn test_entries_cover_configurable_metrics() {
        let keys: Vec<_> = ThresholdSet::default()
            .entries()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(
            keys,
            vec![
                "sultan_index",
                "jsr",
                "tts_critical",
                "tts_background",
                "hru",
                "cvf_impact"
            ]
        );
    }
}
