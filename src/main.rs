#[macro_use]
extern crate rust_i18n;

// Re-export all library modules
use folio::*;

use anyhow::Result;
use clap::{CommandFactory, FromArgMatches};
use cli::{Cli, Commands};
use commands::CommandOptions;
use tokio::runtime::Runtime;

// Initialize i18n for binary crate
// This ensures translations are available in main.rs context
i18n!("locales", fallback = "en");

fn main() -> Result<()> {
    human_panic::setup_panic!();

    // reqwest 使用 rustls-no-provider，需要在任何 HTTP 请求前安装 crypto provider
    let _ = rustls::crypto::ring::default_provider().install_default();

    // 在解析 CLI 之前初始化语言（支持多语言 help text）
    init_locale_early();

    // 解析 CLI 参数并注入国际化 help text
    let cli = parse_cli_localized()?;

    // 根据 verbose 标志设置日志级别
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    // 初始化 tracing 日志（输出到 stderr，不干扰 JSON 输出）
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(log_level.into()),
        )
        .init();

    // config 命令自己加载配置，配置损坏时也能运行
    let config = if matches!(cli.command, Commands::Config { .. }) {
        config::load_config().unwrap_or_default()
    } else {
        match config::load_config() {
            Ok(config) => config,
            Err(e) => exit_with_error(&e, cli.json, true),
        }
    };

    let options = match CommandOptions::from_cli(&cli) {
        Ok(options) => options,
        Err(e) => exit_with_error(&e, cli.json, config.ui.colored),
    };

    // 创建 tokio 运行时
    let rt = Runtime::new()?;

    rt.block_on(async {
        let result = match &cli.command {
            Commands::Providers => commands::providers::run(&options, &config),
            Commands::Config { action } => commands::config::run(action.as_ref(), &options),
            command => commands::capability::run(command, &options, &config).await,
        };

        if let Err(e) = result {
            exit_with_error(&e, options.format.is_json(), config.ui.colored);
        }
        Ok(())
    })
}

/// 输出错误（JSON 或彩色文本）并以状态码 1 退出
fn exit_with_error(e: &error::FolioError, json: bool, colored: bool) -> ! {
    if json {
        let _ = commands::json::output_json_error::<()>(e);
    } else {
        ui::error(&e.to_string(), colored);
        if let Some(suggestion) = e.suggestion() {
            println!();
            println!("{}", ui::info(suggestion, colored));
        }
    }
    std::process::exit(1);
}

/// Parse CLI arguments with localized help text
///
/// Uses clap's derive + runtime override pattern:
/// 1. Get Command from derive macro (type-safe parsing)
/// 2. Override help text at runtime with rust_i18n::t!()
/// 3. Parse and reconstruct the Cli struct
fn parse_cli_localized() -> Result<Cli> {
    let title_help = rust_i18n::t!("cli.arg.title").to_string();
    let author_help = rust_i18n::t!("cli.arg.author").to_string();
    let history_help = rust_i18n::t!("cli.arg.history").to_string();

    let cmd = Cli::command()
        .about(rust_i18n::t!("cli.about").to_string())
        .mut_arg("verbose", |arg| {
            arg.help(rust_i18n::t!("cli.verbose").to_string())
        })
        .mut_arg("provider", |arg| {
            arg.help(rust_i18n::t!("cli.provider").to_string())
        })
        .mut_arg("format", |arg| {
            arg.help(rust_i18n::t!("cli.format").to_string())
        })
        .mut_arg("json", |arg| arg.help(rust_i18n::t!("cli.json").to_string()))
        .mut_subcommand("search", |cmd| {
            cmd.about(rust_i18n::t!("cli.search").to_string())
                .mut_arg("query", |arg| {
                    arg.help(rust_i18n::t!("cli.search.query").to_string())
                })
        })
        .mut_subcommand("concierge", |cmd| {
            cmd.about(rust_i18n::t!("cli.concierge").to_string())
                .mut_arg("message", |arg| {
                    arg.help(rust_i18n::t!("cli.arg.message").to_string())
                })
                .mut_arg("history", |arg| arg.help(history_help.clone()))
        })
        .mut_subcommand("onboard", |cmd| {
            cmd.about(rust_i18n::t!("cli.onboard").to_string())
                .mut_arg("genres", |arg| {
                    arg.help(rust_i18n::t!("cli.onboard.genre").to_string())
                })
                .mut_arg("goal", |arg| {
                    arg.help(rust_i18n::t!("cli.onboard.goal").to_string())
                })
        })
        .mut_subcommand("reviews", |cmd| {
            cmd.about(rust_i18n::t!("cli.reviews").to_string())
                .mut_arg("title", |arg| arg.help(title_help.clone()))
                .mut_arg("author", |arg| arg.help(author_help.clone()))
        })
        .mut_subcommand("chat", |cmd| {
            cmd.about(rust_i18n::t!("cli.chat").to_string())
                .mut_arg("title", |arg| arg.help(title_help.clone()))
                .mut_arg("message", |arg| {
                    arg.help(rust_i18n::t!("cli.arg.message").to_string())
                })
                .mut_arg("history", |arg| arg.help(history_help.clone()))
        })
        .mut_subcommand("translate", |cmd| {
            cmd.about(rust_i18n::t!("cli.translate").to_string())
                .mut_arg("text", |arg| {
                    arg.help(rust_i18n::t!("cli.translate.text").to_string())
                })
                .mut_arg("to", |arg| {
                    arg.help(rust_i18n::t!("cli.translate.to").to_string())
                })
        })
        .mut_subcommand("explain", |cmd| {
            cmd.about(rust_i18n::t!("cli.explain").to_string())
                .mut_arg("title", |arg| arg.help(title_help.clone()))
                .mut_arg("text", |arg| {
                    arg.help(rust_i18n::t!("cli.explain.text").to_string())
                })
        })
        .mut_subcommand("chapter", |cmd| {
            cmd.about(rust_i18n::t!("cli.chapter").to_string())
                .mut_arg("title", |arg| arg.help(title_help.clone()))
                .mut_arg("author", |arg| arg.help(author_help.clone()))
                .mut_arg("number", |arg| {
                    arg.help(rust_i18n::t!("cli.chapter.number").to_string())
                })
        })
        .mut_subcommand("summary", |cmd| {
            cmd.about(rust_i18n::t!("cli.summary").to_string())
                .mut_arg("title", |arg| arg.help(title_help.clone()))
        })
        .mut_subcommand("recap", |cmd| {
            cmd.about(rust_i18n::t!("cli.recap").to_string())
                .mut_arg("title", |arg| arg.help(title_help.clone()))
        })
        .mut_subcommand("providers", |cmd| {
            cmd.about(rust_i18n::t!("cli.providers").to_string())
        })
        .mut_subcommand("config", |cmd| {
            cmd.about(rust_i18n::t!("cli.config").to_string())
                .mut_subcommand("path", |s| {
                    s.about(rust_i18n::t!("cli.config.path").to_string())
                })
                .mut_subcommand("show", |s| {
                    s.about(rust_i18n::t!("cli.config.show").to_string())
                })
                .mut_subcommand("validate", |s| {
                    s.about(rust_i18n::t!("cli.config.validate").to_string())
                })
        });

    let matches = cmd.get_matches();
    Cli::from_arg_matches(&matches)
        .map_err(|e| anyhow::anyhow!("Failed to parse CLI arguments: {}", e))
}

/// Initialize locale early in the startup process
///
/// Priority order:
/// 1. Environment variable FOLIO_UI_LANGUAGE (highest priority)
/// 2. Configuration file ui.language
/// 3. System locale detection
/// 4. Fallback to English
fn init_locale_early() {
    let locale = std::env::var("FOLIO_UI_LANGUAGE")
        .ok()
        .or_else(|| get_language_from_config().ok())
        .or_else(detect_system_locale)
        .unwrap_or_else(|| "en".to_string());

    rust_i18n::set_locale(&locale);
}

/// Attempt to read language setting from config file
///
/// This is a lightweight read that only parses the ui.language field
/// without loading the entire configuration.
fn get_language_from_config() -> Result<String> {
    let config_path = config::get_config_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    if !config_path.exists() {
        return Err(anyhow::anyhow!("Config file not found"));
    }

    let content = std::fs::read_to_string(&config_path)?;
    let config: toml::Value = toml::from_str(&content)?;

    config
        .get("ui")
        .and_then(|ui| ui.get("language"))
        .and_then(|lang| lang.as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("ui.language not found in config"))
}

/// Detect system locale using sys-locale crate
///
/// Returns locale in BCP 47 format (e.g., "en", "zh-CN", "ja-JP")
fn detect_system_locale() -> Option<String> {
    sys_locale::get_locale().map(|locale| {
        // Normalize locale format: "zh_CN" -> "zh-CN"
        locale.replace('_', "-")
    })
}
