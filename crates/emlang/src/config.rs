//! Configuration types for the Emlang tools.
//!
//! This module provides configuration structures consumed by the linter,
//! the formatter and the diagram exporter. All types implement
//! [`serde::Deserialize`] for flexible loading from external sources.
//! Configuration never reaches the validator or the layout engine.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level application configuration.
//! - [`LintConfig`] - Lint rules to suppress.
//! - [`FmtConfig`] - Key style used by the canonical formatter.
//! - [`DiagramConfig`] - CSS custom property overrides for HTML diagrams
//!   and the live-reload server address.
//! - [`ServeConfig`] - Listen address and port of an HTTP server.
//!
//! # Example
//!
//! ```
//! # use emlang::config::AppConfig;
//! # use emlang::format::KeyStyle;
//! // Use default configuration
//! let config = AppConfig::default();
//! assert_eq!(config.fmt().keys(), KeyStyle::Long);
//! assert!(config.lint().ignore().is_empty());
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::format::KeyStyle;

/// Top-level application configuration.
///
/// Every section is optional; missing sections take their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Linter configuration section.
    #[serde(default)]
    lint: LintConfig,

    /// Formatter configuration section.
    #[serde(default)]
    fmt: FmtConfig,

    /// Diagram configuration section.
    #[serde(default)]
    diagram: DiagramConfig,

    /// REPL server section.
    #[serde(default)]
    repl: ServeConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(lint: LintConfig, fmt: FmtConfig, diagram: DiagramConfig) -> Self {
        Self {
            lint,
            fmt,
            diagram,
            repl: ServeConfig::default(),
        }
    }

    /// Sets the REPL server section.
    pub fn with_repl(mut self, repl: ServeConfig) -> Self {
        self.repl = repl;
        self
    }

    /// Returns the linter configuration.
    pub fn lint(&self) -> &LintConfig {
        &self.lint
    }

    /// Returns the formatter configuration.
    pub fn fmt(&self) -> &FmtConfig {
        &self.fmt
    }

    /// Returns the diagram configuration.
    pub fn diagram(&self) -> &DiagramConfig {
        &self.diagram
    }

    /// Returns the REPL server configuration.
    pub fn repl(&self) -> &ServeConfig {
        &self.repl
    }
}

/// Linter configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LintConfig {
    /// Names of lint rules whose issues are suppressed.
    #[serde(default)]
    ignore: Vec<String>,
}

impl LintConfig {
    /// Creates a new [`LintConfig`] ignoring the given rules.
    pub fn new(ignore: Vec<String>) -> Self {
        Self { ignore }
    }

    /// Returns the ignored rule names.
    pub fn ignore(&self) -> &[String] {
        &self.ignore
    }
}

/// Formatter configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FmtConfig {
    #[serde(default)]
    keys: Option<KeyStyle>,
}

impl FmtConfig {
    /// Creates a new [`FmtConfig`] with the given key style.
    pub fn new(keys: KeyStyle) -> Self {
        Self { keys: Some(keys) }
    }

    /// Returns the configured key style, defaulting to [`KeyStyle::Long`].
    pub fn keys(&self) -> KeyStyle {
        self.keys.unwrap_or(KeyStyle::Long)
    }
}

/// Diagram configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiagramConfig {
    /// CSS custom properties (`--name`) and their values.
    #[serde(default)]
    css: BTreeMap<String, String>,

    /// Live-reload server used by `diagram --serve`.
    #[serde(default)]
    serve: ServeConfig,
}

impl DiagramConfig {
    /// Creates a new [`DiagramConfig`] with the given CSS overrides.
    pub fn new(css: BTreeMap<String, String>) -> Self {
        Self {
            css,
            serve: ServeConfig::default(),
        }
    }

    /// Sets the live-reload server section.
    pub fn with_serve(mut self, serve: ServeConfig) -> Self {
        self.serve = serve;
        self
    }

    /// Returns the CSS overrides, sorted by property name.
    pub fn css(&self) -> &BTreeMap<String, String> {
        &self.css
    }

    /// Returns the live-reload server configuration.
    pub fn serve(&self) -> &ServeConfig {
        &self.serve
    }
}

/// HTTP server configuration.
///
/// Unset fields fall back to the defaults of the command that starts the
/// server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServeConfig {
    #[serde(default)]
    address: Option<String>,

    #[serde(default)]
    port: Option<u16>,
}

impl ServeConfig {
    pub fn new(address: Option<String>, port: Option<u16>) -> Self {
        Self { address, port }
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();

        assert!(config.lint().ignore().is_empty());
        assert_eq!(config.fmt().keys(), KeyStyle::Long);
        assert!(config.diagram().css().is_empty());
        assert_eq!(config.diagram().serve(), &ServeConfig::default());
        assert_eq!(config.repl().port(), None);
    }

    #[test]
    fn test_server_sections() {
        let source = r#"
[diagram.serve]
address = "0.0.0.0"

[repl]
port = 9000
"#;
        let config: AppConfig = toml::from_str(source).unwrap();

        assert_eq!(config.diagram().serve().address(), Some("0.0.0.0"));
        assert_eq!(config.diagram().serve().port(), None);
        assert_eq!(config.repl().address(), None);
        assert_eq!(config.repl().port(), Some(9000));
    }

    #[test]
    fn test_full_config() {
        let source = r##"
[lint]
ignore = ["command-without-event", "orphan-exception"]

[fmt]
keys = "short"

[diagram.css]
"--trigger-color" = "#f0f0f0"
"--command-color" = "#ddeeff"
"##;
        let config: AppConfig = toml::from_str(source).unwrap();

        assert_eq!(
            config.lint().ignore(),
            ["command-without-event", "orphan-exception"]
        );
        assert_eq!(config.fmt().keys(), KeyStyle::Short);
        let keys: Vec<&str> = config.diagram().css().keys().map(String::as_str).collect();
        assert_eq!(keys, ["--command-color", "--trigger-color"]);
    }

    #[test]
    fn test_invalid_key_style_rejected() {
        let result: Result<AppConfig, _> = toml::from_str("[fmt]\nkeys = \"medium\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_section_rejected() {
        let result: Result<AppConfig, _> = toml::from_str("[layout]\nengine = \"basic\"\n");
        assert!(result.is_err());
    }
}
