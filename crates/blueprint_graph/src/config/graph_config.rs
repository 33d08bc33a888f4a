//! # Graph Configuration
//!
//! Tunables of a graph session, grouped by subsystem:
//!
//! - **Naming**: iteration cap of the label resolver, anonymous label prefix
//! - **Diagnostics**: whether soft degradations are logged
//! - **Logging**: default filter used by applications that initialise logging

use serde::{Serialize, Deserialize};

use super::Config;

/// # Naming Configuration
///
/// Controls how the name authority turns user labels into unique names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Maximum renaming rounds before resolution gives up
    pub max_rounds: u32,
    /// Prefix of labels generated for nodes created without one
    pub anonymous_prefix: String,
}

impl NamingConfig {
    /// Create a new naming configuration
    pub fn new() -> Self {
        Self {
            max_rounds: 32,
            anonymous_prefix: "anonymous".to_string(),
        }
    }

    /// Set the renaming round cap
    pub const fn with_max_rounds(mut self, rounds: u32) -> Self {
        self.max_rounds = rounds;
        self
    }

    /// Set the anonymous label prefix
    pub fn with_anonymous_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.anonymous_prefix = prefix.into();
        self
    }

    /// Label given to an unlabelled node of kind `kind`
    pub fn anonymous_label(&self, kind: &str) -> String {
        format!("{}_{}", self.anonymous_prefix, kind)
    }
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Diagnostics Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Log every reference dropped during copy or detach at `warn`
    pub log_dropped_references: bool,
}

impl DiagnosticsConfig {
    /// Create a new diagnostics configuration
    pub const fn new() -> Self {
        Self {
            log_dropped_references: true,
        }
    }

    /// Enable or disable warnings for dropped references
    pub const fn with_dropped_reference_logging(mut self, enabled: bool) -> Self {
        self.log_dropped_references = enabled;
        self
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Complete Graph Configuration
///
/// Top-level configuration handed to [`Graph::with_config`](crate::graph::Graph::with_config).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Log filter for applications built on the graph
    pub log_level: String,
    /// Naming configuration
    pub naming: NamingConfig,
    /// Diagnostics configuration
    pub diagnostics: DiagnosticsConfig,
}

impl GraphConfig {
    /// Create a new graph configuration with defaults
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            naming: NamingConfig::default(),
            diagnostics: DiagnosticsConfig::default(),
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set naming configuration
    pub fn with_naming(mut self, naming: NamingConfig) -> Self {
        self.naming = naming;
        self
    }

    /// Set diagnostics configuration
    pub const fn with_diagnostics(mut self, diagnostics: DiagnosticsConfig) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.naming.max_rounds == 0 {
            return Err("naming.max_rounds must be at least 1".to_string());
        }
        if self.naming.anonymous_prefix.is_empty() {
            return Err("naming.anonymous_prefix must not be empty".to_string());
        }
        Ok(())
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for GraphConfig {}
