use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use super::json::output_json;
use super::options::CommandOptions;
use crate::cli::Commands;
use crate::config::{AppConfig, Credentials};
use crate::constants::capability::{DEFAULT_CHAPTER, DEFAULT_TARGET_LANG};
use crate::error::{FolioError, Result};
use crate::llm::provider::fallback::FallbackChain;
use crate::llm::{BookSuggestion, CapabilityRequest, CapabilityResult, ChatTurn, ReviewEntry};
use crate::ui;

/// JSON payload of a capability command.
#[derive(Debug, Serialize)]
pub struct CapabilityOutput<'a> {
    pub operation: &'static str,
    pub provider: &'a str,
    pub live: bool,
    pub result: &'a CapabilityResult,
}

/// 执行能力类子命令（公开接口）
pub async fn run(command: &Commands, options: &CommandOptions, config: &AppConfig) -> Result<()> {
    let request = request_from_command(command)?;
    let config = options.apply(config);
    let credentials = Credentials::from_env(&config.llm);
    let chain = FallbackChain::from_config(&config, &credentials);
    run_internal(&request, options, &config, &chain).await
}

/// 内部实现，接受依赖注入（用于测试）
pub async fn run_internal(
    request: &CapabilityRequest,
    options: &CommandOptions,
    config: &AppConfig,
    chain: &FallbackChain,
) -> Result<()> {
    let colored = options.effective_colored(config);
    let operation = request.kind().as_str();

    // JSON 模式不显示 spinner
    let spinner = if options.format.is_json() {
        None
    } else {
        Some(ui::Spinner::new(
            &rust_i18n::t!(
                "spinner.working",
                operation = operation,
                provider = chain.active_provider()
            ),
            colored,
        ))
    };

    // spinner 至少显示 min_display_ms，与请求并发等待（join，不是 race）
    let min_display = Duration::from_millis(config.ui.min_display_ms);
    let show_spinner = spinner.is_some();
    let (result, _) = tokio::join!(chain.run(request), async {
        if show_spinner {
            tokio::time::sleep(min_display).await;
        }
    });

    if let Some(s) = spinner {
        s.finish_and_clear();
    }

    if options.format.is_json() {
        return output_json(CapabilityOutput {
            operation,
            provider: chain.active_provider(),
            live: chain.is_live(),
            result: &result,
        });
    }

    if !chain.is_live() {
        ui::warning(&rust_i18n::t!("capability.offline_notice"), colored);
        println!();
    }
    print_result(&result, colored);
    Ok(())
}

/// Maps a capability subcommand to its request.
pub fn request_from_command(command: &Commands) -> Result<CapabilityRequest> {
    let request = match command {
        Commands::Search { query } => {
            let query = query.join(" ");
            if query.trim().is_empty() {
                return Err(FolioError::InvalidInput(
                    rust_i18n::t!("capability.empty_query").to_string(),
                ));
            }
            CapabilityRequest::SearchBooks { query }
        }
        Commands::Concierge { message, history } => CapabilityRequest::Concierge {
            message: message.clone(),
            history: load_history(history.as_deref())?,
        },
        Commands::Onboard { genres, goal } => CapabilityRequest::Onboarding {
            genres: genres.clone(),
            goal: goal.clone(),
        },
        Commands::Reviews { title, author } => CapabilityRequest::GenerateReviews {
            title: non_empty_title(title)?,
            author: author.clone(),
        },
        Commands::Chat {
            title,
            message,
            history,
        } => CapabilityRequest::ChatAboutBook {
            title: non_empty_title(title)?,
            message: message.clone(),
            history: load_history(history.as_deref())?,
        },
        Commands::Translate { text, to } => CapabilityRequest::Translate {
            text: text.clone(),
            target_lang: to.clone().unwrap_or_else(|| DEFAULT_TARGET_LANG.to_string()),
        },
        Commands::Explain { title, text } => CapabilityRequest::ExplainContext {
            text: text.clone(),
            title: non_empty_title(title)?,
        },
        Commands::Chapter {
            title,
            author,
            number,
        } => CapabilityRequest::GenerateChapter {
            title: non_empty_title(title)?,
            author: author.clone(),
            chapter: number.unwrap_or(DEFAULT_CHAPTER),
        },
        Commands::Summary { title } => CapabilityRequest::Summarize {
            title: non_empty_title(title)?,
        },
        Commands::Recap { title } => CapabilityRequest::Recap {
            title: non_empty_title(title)?,
        },
        Commands::Providers | Commands::Config { .. } => {
            return Err(FolioError::InvalidInput(
                rust_i18n::t!("capability.not_a_capability").to_string(),
            ));
        }
    };
    Ok(request)
}

fn non_empty_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(FolioError::InvalidInput(
            rust_i18n::t!("capability.empty_title").to_string(),
        ));
    }
    Ok(title.to_string())
}

/// Reads a JSON array of chat turns; no file means no history.
pub fn load_history(path: Option<&Path>) -> Result<Vec<ChatTurn>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let content = std::fs::read_to_string(path)?;
    let turns: Vec<ChatTurn> = serde_json::from_str(&content)?;
    tracing::debug!("Loaded {} history turns from {}", turns.len(), path.display());
    Ok(turns)
}

fn print_result(result: &CapabilityResult, colored: bool) {
    match result {
        CapabilityResult::Books(books) => print_books(books, colored),
        CapabilityResult::Concierge(reply) => {
            println!("{}", reply.reply);
            if !reply.suggestions.is_empty() {
                println!();
                println!(
                    "{}",
                    ui::heading(&rust_i18n::t!("capability.suggestions_title"), colored)
                );
                print_books(&reply.suggestions, colored);
            }
        }
        CapabilityResult::Reviews(reviews) => print_reviews(reviews, colored),
        CapabilityResult::Text(text) => println!("{}", text),
    }
}

fn print_books(books: &[BookSuggestion], colored: bool) {
    if books.is_empty() {
        println!("{}", rust_i18n::t!("capability.no_results"));
        return;
    }

    for (i, book) in books.iter().enumerate() {
        let year = if book.published_year.is_empty() {
            String::new()
        } else {
            format!(" ({})", book.published_year)
        };
        println!(
            "{:>3}. {} · {}{}",
            i + 1,
            ui::heading(&book.title, colored),
            book.author,
            ui::dim(&year, colored)
        );
        if !book.description.is_empty() {
            println!("     {}", book.description);
        }
        println!("     {}", ui::dim(&book.categories.join(", "), colored));
        if let Some(reason) = &book.match_reason {
            println!(
                "     {}",
                rust_i18n::t!("capability.match_reason", reason = reason.as_str())
            );
        }
        println!();
    }
}

fn print_reviews(reviews: &[ReviewEntry], colored: bool) {
    if reviews.is_empty() {
        println!("{}", rust_i18n::t!("capability.no_results"));
        return;
    }

    for review in reviews {
        println!(
            "{} {} {}",
            ui::format_rating(review.rating, colored),
            ui::heading(&review.reviewer, colored),
            ui::dim(&review.date, colored)
        );
        if !review.text.is_empty() {
            println!("  {}", review.text);
        }
        println!();
    }
}
