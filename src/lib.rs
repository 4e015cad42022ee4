//! # folio
//!
//! AI reading aids for an e-reader, backed by several LLM providers with an
//! offline fallback.
//!
//! ## 功能
//! - **十种能力**：搜索、读书顾问、新手推荐、书评、对话、翻译、释义、章节生成、摘要、回顾
//! - **多 Provider 支持**：Gemini（主）、Groq（次）、Hugging Face（第三）
//! - **永不失败**：live provider 出错、超时或返回无法解析的内容时，自动退回静态 provider
//! - **国际化**：支持中英文
//!
//! ## 快速开始
//!
//! ### 作为 CLI 使用
//! ```bash
//! export GROQ_API_KEY=gsk-...
//! folio search white whale
//! folio translate "Bonjour" --to English
//! folio chapter "Emma" "Jane Austen" -n 2
//! folio providers
//! ```
//!
//! ### 作为库使用
//! ```no_run
//! use folio::config::{AppConfig, Credentials};
//! use folio::llm::provider::fallback::FallbackChain;
//!
//! # async fn example() {
//! let config = AppConfig::default();
//! let credentials = Credentials::from_env(&config.llm);
//! let chain = FallbackChain::from_config(&config, &credentials);
//!
//! // 永远返回结果：出错时是静态 provider 的内容
//! let hello = chain.translate_text("Bonjour", None).await;
//! println!("{} ({})", hello, chain.active_provider());
//! # }
//! ```
//!
//! ## 核心模块
//! - [`llm`] - 能力类型、prompt、provider、normalizer 与 fallback chain
//! - [`commands`] - CLI 命令实现
//! - [`config`] - 配置管理与凭据
//! - [`error`] - 统一错误类型
//! - [`ui`] - 用户界面工具
//!
//! ## 配置
//! 配置文件位置：
//! - Linux: `~/.config/folio/config.toml`
//! - macOS: `~/Library/Application Support/folio/config.toml`
//! - Windows: `%APPDATA%\folio\config\config.toml`
//!
//! 示例配置：
//! ```toml
//! [llm]
//! preferred_provider = "gemini"
//! call_timeout_secs = 30
//!
//! [llm.providers.secondary]
//! model = "llama-3.3-70b-versatile"
//! alternate_model = "llama-3.1-8b-instant"
//! ```

#[macro_use]
extern crate rust_i18n;

pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod llm;
pub mod ui;

// Initialize i18n for library modules
i18n!("locales", fallback = "en");
