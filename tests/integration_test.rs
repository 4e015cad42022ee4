//! 集成测试
//!
//! 通过 mock HTTP 服务测试从配置到能力调用的完整流程

use folio::config::{AppConfig, Credentials, ProviderConfig, ProviderKind};
use folio::llm::provider::fallback::FallbackChain;
use mockito::{Matcher, Server};
use pretty_assertions::assert_eq;

const GROQ_PATH: &str = "/v1/chat/completions";

fn ensure_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

fn provider_at(url: &str, model: &str, alternate: &str) -> ProviderConfig {
    ProviderConfig {
        endpoint: Some(url.to_string()),
        model: Some(model.to_string()),
        alternate_model: Some(alternate.to_string()),
        ..Default::default()
    }
}

fn groq_body(content: &str) -> String {
    serde_json::json!({
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
    .to_string()
}

fn gemini_body(text: &str) -> String {
    serde_json::json!({
        "candidates": [{
            "content": {"parts": [{"text": text}], "role": "model"},
            "finishReason": "STOP"
        }]
    })
    .to_string()
}

/// Groq 可用时，翻译直接返回 live 结果
#[tokio::test]
async fn test_translate_through_groq() {
    ensure_crypto_provider();
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", GROQ_PATH)
        .match_header("authorization", "Bearer gsk-integration")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "model": "llama-test"
        })))
        .with_status(200)
        .with_body(groq_body("Hello"))
        .expect(1)
        .create_async()
        .await;

    let mut config = AppConfig::default();
    config.llm.providers.secondary = provider_at(&server.url(), "llama-test", "");
    let credentials = Credentials::none().with_key(ProviderKind::Secondary, "gsk-integration");

    let chain = FallbackChain::from_config(&config, &credentials);
    assert_eq!(chain.active_provider(), "groq");
    assert!(chain.is_live());

    let text = chain.translate_text("Bonjour", None).await;
    assert_eq!(text, "Hello");
    mock.assert_async().await;
}

/// Groq 返回 500 时，搜索退回静态书目，且只请求一次
#[tokio::test]
async fn test_search_falls_back_to_catalogue_on_server_error() {
    ensure_crypto_provider();
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", GROQ_PATH)
        .with_status(500)
        .with_body(r#"{"error":{"message":"internal"}}"#)
        .expect(1)
        .create_async()
        .await;

    let mut config = AppConfig::default();
    config.llm.providers.secondary = provider_at(&server.url(), "llama-test", "llama-small");
    let credentials = Credentials::none().with_key(ProviderKind::Secondary, "gsk-integration");

    let chain = FallbackChain::from_config(&config, &credentials);
    let books = chain.search_books("moby").await;

    // 搜索没有第二次 live 尝试
    mock.assert_async().await;
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "Moby-Dick");
    assert!(books[0].id.starts_with("static-"));
}

/// Gemini 主模型失败后，备用模型生成章节
#[tokio::test]
async fn test_chapter_uses_alternate_gemini_model() {
    ensure_crypto_provider();
    let mut server = Server::new_async().await;
    let primary = server
        .mock("POST", "/v1beta/models/gemini-main:generateContent")
        .with_status(503)
        .with_body("overloaded")
        .expect(1)
        .create_async()
        .await;
    let alternate = server
        .mock("POST", "/v1beta/models/gemini-lite:generateContent")
        .with_status(200)
        .with_body(gemini_body(
            "<h3>Chapter 2</h3><p>The morning was grey.</p><script>x</script>",
        ))
        .expect(1)
        .create_async()
        .await;

    let mut config = AppConfig::default();
    config.llm.providers.primary = provider_at(&server.url(), "gemini-main", "gemini-lite");
    let credentials = Credentials::none().with_key(ProviderKind::Primary, "AIza-integration");

    let chain = FallbackChain::from_config(&config, &credentials);
    assert_eq!(chain.active_provider(), "gemini");

    let html = chain
        .generate_book_content("Emma", "Jane Austen", Some(2))
        .await;
    primary.assert_async().await;
    alternate.assert_async().await;

    assert!(html.contains("<h3>Chapter 2</h3>"));
    assert!(html.contains("<p>The morning was grey.</p>"));
    assert!(!html.contains("script"));
}

/// 活动 provider 失败时，Hugging Face 作为静态 provider 的最后手段回答摘要
#[tokio::test]
async fn test_summary_uses_last_resort_endpoint() {
    ensure_crypto_provider();
    let mut groq = Server::new_async().await;
    let groq_mock = groq
        .mock("POST", GROQ_PATH)
        .with_status(429)
        .with_body("rate limited")
        .create_async()
        .await;

    let mut hf = Server::new_async().await;
    let hf_mock = hf
        .mock("POST", "/models/tiny-model")
        .match_header("authorization", "Bearer hf_integration")
        .with_status(200)
        .with_body(r#"[{"generated_text":"A clever heroine meddles in matches."}]"#)
        .expect(1)
        .create_async()
        .await;

    let mut config = AppConfig::default();
    config.llm.providers.secondary = provider_at(&groq.url(), "llama-test", "");
    config.llm.providers.tertiary = provider_at(&hf.url(), "tiny-model", "");
    let credentials = Credentials::none()
        .with_key(ProviderKind::Secondary, "gsk-integration")
        .with_key(ProviderKind::Tertiary, "hf_integration");

    let chain = FallbackChain::from_config(&config, &credentials);
    assert_eq!(chain.active_provider(), "groq");

    let summary = chain.get_book_summary("Emma").await;
    assert_eq!(summary, "A clever heroine meddles in matches.");
    groq_mock.assert_async().await;
    hf_mock.assert_async().await;
}

/// 没有任何凭据时，所有能力都由静态 provider 回答
#[tokio::test]
async fn test_no_credentials_is_offline() {
    let config = AppConfig::default();
    let chain = FallbackChain::from_config(&config, &Credentials::none());

    assert_eq!(chain.active_provider(), "static");
    assert!(!chain.is_live());

    let reply = chain.consult_concierge("something gothic", &[]).await;
    assert!(!reply.reply.is_empty());
    assert_eq!(reply.suggestions.len(), 3);

    let reviews = chain.generate_reviews("Emma", "Jane Austen").await;
    assert!(!reviews.is_empty());
    assert!(reviews.iter().all(|r| (1..=5).contains(&r.rating)));

    let recap = chain.get_book_recap("Emma").await;
    assert!(recap.contains("Emma"));
}

/// 没有 live provider 时，翻译返回固定的英文占位文本
#[tokio::test]
async fn test_offline_translate_returns_literal() {
    let chain = FallbackChain::from_config(&AppConfig::default(), &Credentials::none());

    let text = chain.translate_text("Bonjour", Some("English")).await;
    assert_eq!(
        text,
        "Translation is unavailable right now. Please try again later."
    );
}

/// 静态 provider 的新手推荐在多次调用间完全一致
#[tokio::test]
async fn test_offline_onboarding_is_deterministic() {
    let chain = FallbackChain::offline_only();
    let genres = vec!["Horror".to_string(), "Romance".to_string()];

    let first = chain
        .get_onboarding_recommendations(&genres, "read more classics")
        .await;
    let second = chain.get_onboarding_recommendations(&[], "").await;

    assert_eq!(first.len(), 6);
    assert_eq!(first, second);
    assert!(first.iter().all(|b| b.match_reason.is_some()));
}

/// 指定 static 时即使有凭据也不发请求
#[tokio::test]
async fn test_preferred_static_skips_network() {
    ensure_crypto_provider();
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", GROQ_PATH)
        .expect(0)
        .create_async()
        .await;

    let mut config = AppConfig::default();
    config.llm.preferred_provider = Some(ProviderKind::Static);
    config.llm.providers.secondary = provider_at(&server.url(), "llama-test", "");
    let credentials = Credentials::none().with_key(ProviderKind::Secondary, "gsk-integration");

    let chain = FallbackChain::from_config(&config, &credentials);
    assert_eq!(chain.active_provider(), "static");

    let text = chain.explain_context("a ha-ha", "Mansfield Park").await;
    assert!(!text.is_empty());
    mock.assert_async().await;
}
