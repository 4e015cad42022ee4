mod app;
mod llm;
mod network;

pub use app::{AppConfig, UIConfig};
pub use llm::{LLMConfig, ProviderConfig, ProviderKind, ProvidersConfig};
pub use network::NetworkConfig;
