use crate::cli::ConfigAction;
use crate::config::{self, AppConfig, Credentials, load_config};
use crate::error::{FolioError, Result};
use crate::ui;

use super::options::CommandOptions;
use super::providers::build_report;

pub fn run(action: Option<&ConfigAction>, options: &CommandOptions) -> Result<()> {
    // 默认行为：validate
    let action = action.unwrap_or(&ConfigAction::Validate);

    match action {
        ConfigAction::Path => path(),
        ConfigAction::Show => show(),
        ConfigAction::Validate => validate(options),
    }
}

/// 打印配置文件路径（不存在时提示）
fn path() -> Result<()> {
    let config_file = config::get_config_path().ok_or_else(|| {
        FolioError::Config(rust_i18n::t!("config.failed_determine_dir").to_string())
    })?;
    println!("{}", config_file.display());
    if !config_file.exists() {
        eprintln!("{}", rust_i18n::t!("config.file_not_found"));
    }
    Ok(())
}

/// 以 TOML 打印合并后的生效配置
fn show() -> Result<()> {
    let config = load_config()?;
    print!("{}", render_toml(&config)?);
    Ok(())
}

fn render_toml(config: &AppConfig) -> Result<String> {
    toml::to_string_pretty(config).map_err(|e| {
        FolioError::Config(rust_i18n::t!("config.render_failed", error = e.to_string()).to_string())
    })
}

/// 验证配置
fn validate(options: &CommandOptions) -> Result<()> {
    let colored = options.format.effective_colored(true);
    ui::step("1/2", &rust_i18n::t!("config.loading"), colored);

    let config = options.apply(&load_config()?);
    let colored = options.effective_colored(&config);
    ui::success(&rust_i18n::t!("config.loaded"), colored);
    println!();

    ui::step("2/2", &rust_i18n::t!("config.checking_credentials"), colored);
    let credentials = Credentials::from_env(&config.llm);
    let report = build_report(&config, &credentials);

    for status in &report.providers {
        let line = rust_i18n::t!(
            "config.provider_line",
            name = status.name,
            model = status.model.as_str()
        );
        if status.credential {
            ui::success(&line, colored);
        } else {
            ui::warning(
                &format!(
                    "{} ({})",
                    line,
                    rust_i18n::t!(
                        "config.missing_env",
                        env = status.api_key_env.as_deref().unwrap_or("-")
                    )
                ),
                colored,
            );
        }
    }
    println!();

    if report.live {
        ui::success(
            &rust_i18n::t!("config.validated", provider = report.active),
            colored,
        );
    } else {
        ui::warning(&rust_i18n::t!("capability.offline_notice"), colored);
    }
    Ok(())
}
