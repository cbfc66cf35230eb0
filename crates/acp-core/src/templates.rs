//! Predefined session templates

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::types::{LlmConfig, DEFAULT_MODEL};
use crate::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionTemplate {
    Triage,
    Bugfix,
    Feature,
    Exploration,
}

impl SessionTemplate {
    pub const ALL: [SessionTemplate; 4] = [Self::Triage, Self::Bugfix, Self::Feature, Self::Exploration];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Triage => "triage",
            Self::Bugfix => "bugfix",
            Self::Feature => "feature",
            Self::Exploration => "exploration",
        }
    }

    /// Workflow the platform runs for sessions created from this template
    pub fn workflow(&self) -> &'static str {
        match self {
            Self::Triage => "triage",
            Self::Bugfix => "bugfix",
            Self::Feature => "feature-development",
            Self::Exploration => "codebase-exploration",
        }
    }

    pub fn temperature(&self) -> f64 {
        match self {
            Self::Triage => 0.7,
            Self::Bugfix => 0.3,
            Self::Feature => 0.5,
            Self::Exploration => 0.8,
        }
    }

    pub fn llm_config(&self) -> LlmConfig {
        LlmConfig::new(DEFAULT_MODEL).with_temperature(self.temperature())
    }
}

impl fmt::Display for SessionTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SessionTemplate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|t| t.name()).collect();
                ValidationError::unsupported("template", s, &names)
            })
    }
}
