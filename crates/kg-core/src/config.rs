//! kgraph Configuration Management
//!
//! Handles configuration from environment variables, config files,
//! and command-line arguments with sensible defaults for local use.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Sentence parser configuration
    pub parser: ParserConfig,

    /// Web page fetch configuration
    pub fetch: FetchConfig,

    /// Graph rendering configuration
    pub render: RenderConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_override()
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply every variable that `lookup` reports as set
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        // Parser
        if let Some(backend) = lookup("KG_PARSER_BACKEND") {
            self.parser.backend = backend.parse()?;
        }
        if let Some(url) = lookup("UDPIPE_URL") {
            self.parser.udpipe_url = url;
        }
        if let Some(model) = lookup("UDPIPE_MODEL") {
            self.parser.model = model;
        }
        if let Some(secs) = lookup("UDPIPE_TIMEOUT_SECS") {
            self.parser.timeout_secs = Some(parse_value("UDPIPE_TIMEOUT_SECS", secs)?);
        }

        // Fetch
        if let Some(secs) = lookup("KG_FETCH_TIMEOUT_SECS") {
            self.fetch.timeout_secs = Some(parse_value("KG_FETCH_TIMEOUT_SECS", secs)?);
        }

        // Render
        if let Some(format) = lookup("KG_OUTPUT_FORMAT") {
            self.render.format = format.parse()?;
        }
        if let Some(seed) = lookup("KG_LAYOUT_SEED") {
            self.render.seed = Some(parse_value("KG_LAYOUT_SEED", seed)?);
        }

        // Logging
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(self)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

/// Sentence parser configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Which parser backend to use
    pub backend: ParserBackend,

    /// UDPipe REST service base URL
    pub udpipe_url: String,

    /// UDPipe model name
    pub model: String,

    /// Request timeout in seconds (none by default)
    pub timeout_secs: Option<u64>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            backend: ParserBackend::Udpipe,
            udpipe_url: "https://lindat.mff.cuni.cz/services/udpipe/api".to_string(),
            model: "english".to_string(),
            timeout_secs: None,
        }
    }
}

/// Supported sentence parser backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserBackend {
    /// Remote UDPipe service
    Udpipe,
    /// Input text is already CoNLL-U
    Conllu,
}

impl std::str::FromStr for ParserBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "udpipe" => Ok(Self::Udpipe),
            "conllu" | "conll-u" => Ok(Self::Conllu),
            _ => Err(ConfigError::InvalidValue {
                key: "KG_PARSER_BACKEND".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Web page fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Request timeout in seconds (none by default)
    pub timeout_secs: Option<u64>,

    /// User-Agent header sent with page requests
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            user_agent: concat!("kgraph/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Graph rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Output format
    pub format: OutputFormat,

    /// Canvas width in pixels
    pub width: u32,

    /// Canvas height in pixels
    pub height: u32,

    /// Spring layout iterations
    pub iterations: u32,

    /// Layout seed; random per run when unset
    pub seed: Option<u64>,

    /// Node fill color
    pub node_color: String,

    /// Edge label color
    pub edge_label_color: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Svg,
            width: 1000,
            height: 700,
            iterations: 50,
            seed: None,
            node_color: "lightblue".to_string(),
            edge_label_color: "red".to_string(),
        }
    }
}

/// Graph output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Svg,
    Dot,
    Json,
}

impl OutputFormat {
    /// File extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Dot => "dot",
            Self::Json => "json",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "dot" | "gv" => Ok(Self::Dot),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidValue {
                key: "KG_OUTPUT_FORMAT".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn toml_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{content}").unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.parser.backend, ParserBackend::Udpipe);
        assert_eq!(config.parser.model, "english");
        assert!(config.fetch.timeout_secs.is_none());
        assert_eq!(config.render.format, OutputFormat::Svg);
        assert!(config.render.seed.is_none());
    }

    #[test]
    fn test_parser_backend_parse() {
        assert_eq!(
            "udpipe".parse::<ParserBackend>().unwrap(),
            ParserBackend::Udpipe
        );
        assert_eq!(
            "CoNLL-U".parse::<ParserBackend>().unwrap(),
            ParserBackend::Conllu
        );
        assert!("spacy".parse::<ParserBackend>().is_err());
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("SVG".parse::<OutputFormat>().unwrap(), OutputFormat::Svg);
        assert_eq!("gv".parse::<OutputFormat>().unwrap(), OutputFormat::Dot);
        assert_eq!(OutputFormat::Json.extension(), "json");
        assert!("png".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_from_file_partial_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[parser]\nbackend = \"conllu\"\n\n[render]\nformat = \"dot\"\nseed = 7"
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.parser.backend, ParserBackend::Conllu);
        assert_eq!(config.render.format, OutputFormat::Dot);
        assert_eq!(config.render.seed, Some(7));
        // Unspecified fields keep their defaults
        assert_eq!(config.render.width, 1000);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_from_file_errors() {
        let missing = AppConfig::from_file("/nonexistent/kgraph.toml");
        assert!(matches!(missing, Err(ConfigError::FileReadError { .. })));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[parser\nbackend = ").unwrap();
        let invalid = AppConfig::from_file(file.path());
        assert!(matches!(invalid, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_overrides_win_even_when_equal_to_defaults() {
        let file = toml_file(
            "[parser]\nbackend = \"conllu\"\n\n[render]\nformat = \"json\"\n\n[logging]\nlevel = \"debug\"",
        );
        let env: HashMap<&str, &str> = [
            ("KG_PARSER_BACKEND", "udpipe"),
            ("KG_OUTPUT_FORMAT", "svg"),
            ("LOG_LEVEL", "warn"),
        ]
        .into_iter()
        .collect();

        let config = AppConfig::from_file(file.path())
            .unwrap()
            .with_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.parser.backend, ParserBackend::Udpipe);
        assert_eq!(config.render.format, OutputFormat::Svg);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_unset_variables_keep_file_values() {
        let file = toml_file("[parser]\nmodel = \"czech\"\n\n[render]\nseed = 3");

        let config = AppConfig::from_file(file.path())
            .unwrap()
            .with_overrides(|key| (key == "KG_FETCH_TIMEOUT_SECS").then(|| "15".to_string()))
            .unwrap();

        assert_eq!(config.parser.model, "czech");
        assert_eq!(config.render.seed, Some(3));
        assert_eq!(config.fetch.timeout_secs, Some(15));
    }

    #[test]
    fn test_invalid_override_value() {
        let result = AppConfig::default()
            .with_overrides(|key| (key == "KG_LAYOUT_SEED").then(|| "abc".to_string()));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "KG_LAYOUT_SEED"
        ));
    }

    #[test]
    fn test_process_env_overrides_file() {
        // Only test in this crate that touches the process environment
        let file = toml_file("[parser]\nbackend = \"conllu\"\nmodel = \"czech\"");
        std::env::set_var("KG_PARSER_BACKEND", "udpipe");
        std::env::set_var("UDPIPE_MODEL", "english");

        let from_file = AppConfig::from_file(file.path()).unwrap().with_env_override();
        let from_env = AppConfig::from_env();

        std::env::remove_var("KG_PARSER_BACKEND");
        std::env::remove_var("UDPIPE_MODEL");

        let from_file = from_file.unwrap();
        assert_eq!(from_file.parser.backend, ParserBackend::Udpipe);
        assert_eq!(from_file.parser.model, "english");
        assert_eq!(from_env.unwrap().parser.backend, ParserBackend::Udpipe);
    }
}
