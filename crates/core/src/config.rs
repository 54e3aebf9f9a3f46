//! Warning rule configuration.
//!
//! The thresholds and keyword lists used by the warning engine are data, not code. They are
//! resolved once at process startup (built-in defaults, optionally overridden by a YAML file) and
//! then handed to [`WarningEngine`](crate::engine::WarningEngine). Nothing here reads environment
//! variables; binaries pass the override path in.

use crate::constants::{
    ANTIBIOTIC_KEYWORDS, DEFAULT_MAX_DAILY_UNITS, NSAID_KEYWORDS, SEDATIVE_KEYWORDS,
    STEROID_KEYWORDS,
};
use crate::{RxError, RxResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tunable heuristics for the warning engine.
///
/// Keys missing from a rules file fall back to the built-in defaults, so a file may override a
/// single list. Unknown keys are rejected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default, deny_unknown_fields)]
pub struct WarningRules {
    /// Total daily units above which `high_daily_dose` is raised.
    pub max_daily_units: f64,
    pub antibiotic_keywords: Vec<String>,
    pub steroid_keywords: Vec<String>,
    pub nsaid_keywords: Vec<String>,
    pub sedative_keywords: Vec<String>,
}

fn owned(keywords: &[&str]) -> Vec<String> {
    keywords.iter().map(|k| (*k).to_string()).collect()
}

impl Default for WarningRules {
    fn default() -> Self {
        Self {
            max_daily_units: DEFAULT_MAX_DAILY_UNITS,
            antibiotic_keywords: owned(ANTIBIOTIC_KEYWORDS),
            steroid_keywords: owned(STEROID_KEYWORDS),
            nsaid_keywords: owned(NSAID_KEYWORDS),
            sedative_keywords: owned(SEDATIVE_KEYWORDS),
        }
    }
}

impl WarningRules {
    /// Parse rules from YAML, normalise keywords and validate the result.
    ///
    /// An empty document yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns `RxError::RulesParse` for malformed YAML and `RxError::InvalidInput` if the parsed
    /// rules fail [`WarningRules::validate`].
    pub fn from_yaml_str(yaml: &str) -> RxResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let rules: Self = serde_yaml::from_str(yaml).map_err(RxError::RulesParse)?;
        let rules = rules.normalised();
        rules.validate()?;
        Ok(rules)
    }

    /// Read and parse a YAML rules file.
    ///
    /// # Errors
    ///
    /// Returns `RxError::RulesFileRead` if the file cannot be read, otherwise the errors of
    /// [`WarningRules::from_yaml_str`].
    pub fn from_yaml_file(path: &Path) -> RxResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(RxError::RulesFileRead)?;
        Self::from_yaml_str(&contents)
    }

    /// Render the rules as YAML.
    pub fn to_yaml(&self) -> RxResult<String> {
        serde_yaml::to_string(self).map_err(RxError::RulesSerialization)
    }

    /// Keywords are matched against lower-cased names, so store them trimmed and lower-cased.
    fn normalised(mut self) -> Self {
        for list in [
            &mut self.antibiotic_keywords,
            &mut self.steroid_keywords,
            &mut self.nsaid_keywords,
            &mut self.sedative_keywords,
        ] {
            for keyword in list.iter_mut() {
                *keyword = keyword.trim().to_lowercase();
            }
        }
        self
    }

    /// Check the rules are usable.
    ///
    /// - the daily threshold must be finite and not negative
    /// - no keyword may be empty, since an empty keyword would match every name
    ///
    /// # Errors
    ///
    /// Returns `RxError::InvalidInput` describing the first problem found.
    pub fn validate(&self) -> RxResult<()> {
        if !self.max_daily_units.is_finite() || self.max_daily_units < 0.0 {
            return Err(RxError::InvalidInput(
                "max_daily_units must be a finite, non-negative number".into(),
            ));
        }

        let lists = [
            ("antibiotic_keywords", &self.antibiotic_keywords),
            ("steroid_keywords", &self.steroid_keywords),
            ("nsaid_keywords", &self.nsaid_keywords),
            ("sedative_keywords", &self.sedative_keywords),
        ];
        for (name, keywords) in lists {
            if keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(RxError::InvalidInput(format!(
                    "{name} must not contain empty keywords"
                )));
            }
        }

        Ok(())
    }
}

/// Resolve the active rules without reading environment variables.
///
/// If `override_file` is provided the rules are loaded from it, otherwise the built-in defaults
/// are used.
pub fn resolve_rules(override_file: Option<PathBuf>) -> RxResult<WarningRules> {
    match override_file {
        Some(path) => {
            let rules = WarningRules::from_yaml_file(&path)?;
            tracing::info!("loaded warning rules from {}", path.display());
            Ok(rules)
        }
        None => Ok(WarningRules::default()),
    }
}
