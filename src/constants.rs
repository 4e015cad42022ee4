//! 全局常量定义

/// LLM 相关常量
pub mod llm {
    /// 默认 max_tokens
    pub const DEFAULT_MAX_TOKENS: u32 = 2048;

    /// 默认 temperature
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;

    /// 单次 provider 调用的超时（秒）
    pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 45;
}

/// 能力调用的默认参数
pub mod capability {
    /// translate 未指定目标语言时使用
    pub const DEFAULT_TARGET_LANG: &str = "English";

    /// chapter 未指定章节号时使用
    pub const DEFAULT_CHAPTER: u32 = 1;
}

/// UI 相关常量
pub mod ui {
    /// 错误预览最大长度
    pub const ERROR_PREVIEW_LENGTH: usize = 500;

    /// spinner 最短显示时间（毫秒）
    pub const DEFAULT_MIN_DISPLAY_MS: u64 = 600;
}
