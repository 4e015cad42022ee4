use std::str::FromStr;

/// Output format enum
///
/// Unified processing of `--format` and `--json` parameters in CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable terminal output.
    #[default]
    Text,
    /// Machine-readable JSON output.
    Json,
}

impl FromStr for OutputFormat {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        })
    }
}

impl OutputFormat {
    /// Parse output format from CLI parameters
    ///
    /// `--json` takes precedence over `--format`
    pub fn from_cli(format: &str, json: bool) -> Self {
        if json {
            Self::Json
        } else {
            format.parse().unwrap_or_default()
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }

    /// Get the effective colored setting (color disabled for JSON)
    pub fn effective_colored(&self, config_colored: bool) -> bool {
        !self.is_json() && config_colored
    }
}
