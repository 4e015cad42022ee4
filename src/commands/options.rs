//! command option structure
//!
//! Global CLI flags shared by every command, resolved once in `main`.

use super::format::OutputFormat;
use crate::cli::Cli;
use crate::config::{AppConfig, ProviderKind};
use crate::error::{FolioError, Result};

/// Options shared by all commands
///
/// # Field description
/// - `format`: output format (Text/JSON)
/// - `verbose`: verbose mode (debug logs)
/// - `provider_override`: provider requested with `--provider`, overriding `llm.preferred_provider`
#[derive(Debug, Clone, Copy)]
pub struct CommandOptions {
    pub format: OutputFormat,
    pub verbose: bool,
    pub provider_override: Option<ProviderKind>,
}

impl CommandOptions {
    /// Build from CLI arguments; an unknown `--provider` is an input error.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let provider_override = cli
            .provider
            .as_deref()
            .map(|name| name.parse::<ProviderKind>().map_err(FolioError::InvalidInput))
            .transpose()?;

        Ok(Self {
            format: OutputFormat::from_cli(&cli.format, cli.json),
            verbose: cli.verbose,
            provider_override,
        })
    }

    /// Configuration with `--provider` applied.
    pub fn apply(&self, config: &AppConfig) -> AppConfig {
        let mut config = config.clone();
        if let Some(kind) = self.provider_override {
            config.llm.preferred_provider = Some(kind);
        }
        config
    }

    /// Get the effective colored setting
    pub fn effective_colored(&self, config: &AppConfig) -> bool {
        self.format.effective_colored(config.ui.colored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_from_cli_parses_provider() {
        let cli = Cli::parse_from(["folio", "--provider", "hf", "--json", "summary", "Emma"]);
        let options = CommandOptions::from_cli(&cli).unwrap();
        assert_eq!(options.provider_override, Some(ProviderKind::Tertiary));
        assert!(options.format.is_json());

        let config = options.apply(&AppConfig::default());
        assert_eq!(config.llm.preferred_provider, Some(ProviderKind::Tertiary));
        assert!(!options.effective_colored(&config));
    }

    #[test]
    fn test_from_cli_rejects_unknown_provider() {
        let cli = Cli::parse_from(["folio", "--provider", "claude", "summary", "Emma"]);
        let err = CommandOptions::from_cli(&cli).unwrap_err();
        assert!(matches!(err, FolioError::InvalidInput(_)));
    }

    #[test]
    fn test_apply_without_override_keeps_config() {
        let cli = Cli::parse_from(["folio", "recap", "Emma"]);
        let options = CommandOptions::from_cli(&cli).unwrap();
        let mut config = AppConfig::default();
        config.llm.preferred_provider = Some(ProviderKind::Primary);
        assert_eq!(
            options.apply(&config).llm.preferred_provider,
            Some(ProviderKind::Primary)
        );
    }
}
