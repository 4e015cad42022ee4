use serde::Serialize;

use super::json::output_json;
use super::options::CommandOptions;
use crate::config::{AppConfig, Credentials, ProviderKind};
use crate::error::Result;
use crate::llm::provider::base::{get_alternate_model, get_model};
use crate::llm::provider::selector::ActiveProvider;
use crate::ui;

/// One row of the provider table.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ProviderStatus {
    pub name: &'static str,
    pub api_key_env: Option<String>,
    pub credential: bool,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate_model: Option<String>,
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct ProvidersReport {
    pub active: &'static str,
    pub live: bool,
    pub providers: Vec<ProviderStatus>,
}

/// 列出 provider、凭据状态以及当前会选中的 provider
pub fn run(options: &CommandOptions, config: &AppConfig) -> Result<()> {
    let config = options.apply(config);
    let credentials = Credentials::from_env(&config.llm);
    let report = build_report(&config, &credentials);

    if options.format.is_json() {
        return output_json(&report);
    }

    let colored = options.effective_colored(&config);
    println!(
        "{}",
        ui::info(
            &rust_i18n::t!("providers.active", name = report.active),
            colored
        )
    );
    println!();

    for status in &report.providers {
        let marker = if status.active { "*" } else { " " };
        let credential = if status.credential {
            rust_i18n::t!("providers.credential_present")
        } else {
            rust_i18n::t!("providers.credential_missing")
        };
        println!(
            "{} {:<12} {:<40} {}",
            marker,
            ui::heading(status.name, colored),
            status.model,
            ui::dim(
                &format!(
                    "{} ({})",
                    credential,
                    status.api_key_env.as_deref().unwrap_or("-")
                ),
                colored
            )
        );
    }

    if !report.live {
        println!();
        ui::warning(&rust_i18n::t!("capability.offline_notice"), colored);
    }
    Ok(())
}

pub fn build_report(config: &AppConfig, credentials: &Credentials) -> ProvidersReport {
    let active = ActiveProvider::select(credentials, config.llm.preferred_provider);

    let providers = ProviderKind::LIVE
        .into_iter()
        .filter_map(|kind| {
            let provider_config = config.llm.providers.get(kind)?;
            Some(ProviderStatus {
                name: kind.name(),
                api_key_env: config.llm.api_key_env(kind),
                credential: credentials.has(kind),
                model: get_model(provider_config, kind),
                alternate_model: get_alternate_model(provider_config, kind),
                active: active.kind() == kind,
            })
        })
        .collect();

    ProvidersReport {
        active: active.name(),
        live: active.is_live(),
        providers,
    }
}
