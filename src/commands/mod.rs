//! Command implementations.
//!
//! # Modules
//! - `capability` - The ten reading-aid subcommands (search, chat, translate, ...).
//! - `providers` - Provider and credential overview.
//! - `config` - Configuration inspection and validation.
//! - `format` - Output format definition.
//! - `options` - Global command options.
//! - `json` - JSON output helpers.
//!
//! # Architecture
//! ```text
//! CLI (cli.rs)
//!   ├── commands/capability.rs ─> llm::provider::fallback::FallbackChain
//!   ├── commands/providers.rs
//!   ├── commands/config.rs
//!   └── shared command options (commands/options.rs)
//! ```

/// Capability subcommands.
pub mod capability;
/// Configuration show/validation commands.
pub mod config;
/// Output format types and parsing helpers.
pub mod format;
/// Shared JSON output helpers.
pub mod json;
/// Shared command option structs.
pub mod options;
/// Provider overview command.
pub mod providers;

pub use format::OutputFormat;
pub use options::CommandOptions;
