//! YAML configuration: ordering and execution budget.

use std::fs;
use std::path::Path;

use ppl_core::errors::ErrorInfo;
use ppl_core::EnumError;
use serde::{Deserialize, Serialize};

/// Order in which pending branches are resumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Highest path score first.
    #[default]
    #[serde(alias = "likely-first")]
    MostProbableFirst,
    /// First in, first out.
    BreadthFirst,
    /// Last in, first out.
    DepthFirst,
}

impl Strategy {
    /// Stable label used in logs and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::MostProbableFirst => "most-probable-first",
            Strategy::BreadthFirst => "breadth-first",
            Strategy::DepthFirst => "depth-first",
        }
    }
}

/// YAML-configurable parameters governing an enumeration run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnumerateConfig {
    /// Exploration discipline.
    #[serde(default)]
    pub strategy: Strategy,
    /// Maximum number of completed executions; `None` runs to exhaustion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_executions: Option<usize>,
}

impl EnumerateConfig {
    /// Most-probable-first enumeration without a budget.
    pub fn likely_first() -> Self {
        Self::with_strategy(Strategy::MostProbableFirst)
    }

    /// Breadth-first enumeration without a budget.
    pub fn breadth_first() -> Self {
        Self::with_strategy(Strategy::BreadthFirst)
    }

    /// Depth-first enumeration without a budget.
    pub fn depth_first() -> Self {
        Self::with_strategy(Strategy::DepthFirst)
    }

    /// Unbounded enumeration using `strategy`.
    pub fn with_strategy(strategy: Strategy) -> Self {
        Self {
            strategy,
            max_executions: None,
        }
    }

    /// Caps the number of completed executions.
    pub fn with_max_executions(mut self, max_executions: usize) -> Self {
        self.max_executions = Some(max_executions);
        self
    }

    /// Rejects configurations that could never complete a single execution.
    pub fn validate(&self) -> Result<(), EnumError> {
        if self.max_executions == Some(0) {
            return Err(EnumError::Config(
                ErrorInfo::new("budget-zero", "max_executions must be positive")
                    .with_context("max_executions", "0")
                    .with_hint("omit max_executions for an unbounded run"),
            ));
        }
        Ok(())
    }

    /// Returns true while `completed` executions leave room under the budget.
    pub fn allows(&self, completed: usize) -> bool {
        self.max_executions.map_or(true, |max| completed < max)
    }

    /// Parses and validates a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, EnumError> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|err| {
            EnumError::Config(ErrorInfo::new("config-parse", err.to_string()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self, EnumError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            EnumError::Config(
                ErrorInfo::new("config-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        Self::from_yaml_str(&contents).map_err(|err| match err {
            EnumError::Config(info) => {
                EnumError::Config(info.with_context("path", path.display().to_string()))
            }
            other => other,
        })
    }

    /// Serializes the configuration to YAML.
    pub fn to_yaml_string(&self) -> Result<String, EnumError> {
        serde_yaml::to_string(self)
            .map_err(|err| EnumError::Config(ErrorInfo::new("config-serialize", err.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = EnumerateConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config.strategy, Strategy::MostProbableFirst);
        assert_eq!(config.max_executions, None);
    }

    #[test]
    fn likely_first_alias_is_accepted() {
        let config = EnumerateConfig::from_yaml_str("strategy: likely-first\n").unwrap();
        assert_eq!(config.strategy, Strategy::MostProbableFirst);
    }

    #[test]
    fn zero_budget_is_rejected() {
        let err = EnumerateConfig::from_yaml_str("max_executions: 0\n").unwrap_err();
        assert_eq!(err.info().code, "budget-zero");
    }

    #[test]
    fn unknown_strategy_is_a_parse_error() {
        let err = EnumerateConfig::from_yaml_str("strategy: random-walk\n").unwrap_err();
        assert_eq!(err.info().code, "config-parse");
    }

    #[test]
    fn budget_allows_until_reached() {
        let config = EnumerateConfig::depth_first().with_max_executions(2);
        assert!(config.allows(0));
        assert!(config.allows(1));
        assert!(!config.allows(2));
        assert!(EnumerateConfig::depth_first().allows(usize::MAX));
    }
}
