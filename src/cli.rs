use std::path::PathBuf;

use clap::{Parser, Subcommand, builder::styling};

const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::Green.on_default().bold())
    .usage(styling::AnsiColor::Green.on_default().bold())
    .literal(styling::AnsiColor::Cyan.on_default().bold())
    .placeholder(styling::AnsiColor::Cyan.on_default());

#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, long_about = None)]
#[command(styles = STYLES)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Prefer a provider: gemini | groq | huggingface | static
    #[arg(short, long, global = true)]
    pub provider: Option<String>,

    /// Output format: text | json
    #[arg(short, long, global = true, default_value = "text")]
    pub format: String,

    /// Shortcut for --format json
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search books by title, author or topic
    Search {
        /// Search query
        #[arg(required = true, trailing_var_arg = true)]
        query: Vec<String>,
    },

    /// Ask the reading concierge for recommendations
    Concierge {
        /// Message to the concierge
        message: String,

        /// JSON file with earlier turns: [{"role": "user", "text": "..."}]
        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// Get first recommendations for a new reader
    Onboard {
        /// Favourite genre (repeatable)
        #[arg(short, long = "genre")]
        genres: Vec<String>,

        /// Reading goal
        #[arg(long, default_value = "")]
        goal: String,
    },

    /// Generate reader reviews for a book
    Reviews {
        /// Book title
        title: String,

        /// Book author
        author: String,
    },

    /// Chat about a book
    Chat {
        /// Book title
        title: String,

        /// Your message
        message: String,

        /// JSON file with earlier turns: [{"role": "user", "text": "..."}]
        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// Translate a passage
    Translate {
        /// Text to translate
        text: String,

        /// Target language (default: English)
        #[arg(short, long)]
        to: Option<String>,
    },

    /// Explain a passage in the context of its book
    Explain {
        /// Book title
        title: String,

        /// Passage to explain
        text: String,
    },

    /// Generate one chapter of a book as HTML
    Chapter {
        /// Book title
        title: String,

        /// Book author
        author: String,

        /// Chapter number (default: 1)
        #[arg(short, long)]
        number: Option<u32>,
    },

    /// Summarize a book
    Summary {
        /// Book title
        title: String,
    },

    /// Recap a book for a returning reader
    Recap {
        /// Book title
        title: String,
    },

    /// Show providers, credentials and the active provider
    Providers,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

impl Commands {
    /// Whether this subcommand runs a capability.
    pub fn is_capability(&self) -> bool {
        !matches!(self, Commands::Providers | Commands::Config { .. })
    }
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the configuration file path
    Path,

    /// Print the effective configuration
    Show,

    /// Validate configuration and show which provider would be used
    Validate,
}
