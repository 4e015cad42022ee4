//! Provider 公共抽象和辅助函数
//!
//! 提取各 Provider 的通用逻辑，减少重复代码。
//!
//! 模块结构：
//! - `config` - 配置提取工具函数
//! - `request` - HTTP 请求发送
//! - `response` - 响应归一化（宽松 JSON 解析 + 字段默认值）
//! - `ApiBackend` trait - 各 provider 只需实现独有部分，通用逻辑由 blanket impl 提供

pub mod config;
pub mod request;
pub mod response;

pub use config::*;
pub use request::send_llm_request;
pub use response::{Unparseable, normalize, parse_lenient_json, truncate_for_preview};

use async_trait::async_trait;

use crate::error::Result;
use crate::llm::prompt::{PromptParts, build_prompt};
use crate::llm::{BookAssistant, CapabilityRequest, CapabilityResult};

/// 内部 trait：每个 provider 只需实现自己独有的部分
///
/// 通过 blanket impl 自动为所有 `ApiBackend` 实现者提供 `BookAssistant`：
/// 构建 prompt → 调用 API → 归一化响应。
/// 静态 provider 不实现此 trait。
#[async_trait]
pub(crate) trait ApiBackend: Send + Sync {
    /// Provider 名称
    fn name(&self) -> &str;

    /// 当前使用的模型
    fn model(&self) -> &str;

    /// 调用 API，返回模型输出的原始文本
    async fn call_api(&self, parts: &PromptParts) -> Result<String>;
}

#[async_trait]
impl<T: ApiBackend> BookAssistant for T {
    async fn invoke(&self, request: &CapabilityRequest) -> Result<CapabilityResult> {
        let parts = build_prompt(request);
        tracing::debug!(
            "{} ({}) invoking {} - system ({} chars), user ({} chars)",
            ApiBackend::name(self),
            self.model(),
            request.kind(),
            parts.system.len(),
            parts.user.len()
        );

        let raw = self.call_api(&parts).await?;
        tracing::debug!("{} raw output: {}", ApiBackend::name(self), raw);

        normalize(&raw, parts.shape).map_err(|e| e.into_error(ApiBackend::name(self)))
    }

    fn name(&self) -> String {
        ApiBackend::name(self).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FolioError;
    use crate::llm::CapabilityKind;
    use std::sync::Mutex;

    /// 记录收到的 prompt 并返回固定输出
    struct CannedBackend {
        output: String,
        seen: Mutex<Vec<PromptParts>>,
    }

    impl CannedBackend {
        fn new(output: &str) -> Self {
            Self {
                output: output.to_string(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ApiBackend for CannedBackend {
        fn name(&self) -> &str {
            "canned"
        }

        fn model(&self) -> &str {
            "canned-1"
        }

        async fn call_api(&self, parts: &PromptParts) -> Result<String> {
            self.seen.lock().unwrap().push(parts.clone());
            Ok(self.output.clone())
        }
    }

    #[tokio::test]
    async fn test_blanket_impl_normalizes_output() {
        let backend = CannedBackend::new("```json\n[{\"title\":\"Emma\"}]\n```");
        let result = backend
            .invoke(&CapabilityRequest::SearchBooks {
                query: "austen".to_string(),
            })
            .await
            .unwrap();
        assert!(result.matches(CapabilityKind::SearchBooks));
        assert_eq!(result.into_books().unwrap()[0].title, "Emma");

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].user, "Search query: austen");
    }

    #[tokio::test]
    async fn test_blanket_impl_reports_malformed() {
        let backend = CannedBackend::new("not json at all");
        let err = backend
            .invoke(&CapabilityRequest::GenerateReviews {
                title: "Emma".to_string(),
                author: "Jane Austen".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, FolioError::MalformedResponse { ref provider, .. } if provider == "canned"));
    }

    #[test]
    fn test_blanket_impl_name() {
        let backend = CannedBackend::new("");
        assert_eq!(BookAssistant::name(&backend), "canned");
    }
}
