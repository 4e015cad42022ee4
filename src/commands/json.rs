use serde::Serialize;

use crate::error::{FolioError, Result};

/// JSON 错误输出结构（统一）
#[derive(Debug, Serialize)]
pub struct ErrorJson {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ErrorJson {
    /// 从 FolioError 创建 ErrorJson
    pub fn from_error(err: &FolioError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            suggestion: err.suggestion().map(String::from),
        }
    }
}

/// 通用的 JSON 输出结构
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorJson>,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// 输出 JSON 格式的成功结果
pub fn output_json<T: Serialize>(data: T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(&JsonOutput::success(data))?
    );
    Ok(())
}

/// 输出 JSON 格式的错误（通用函数）
///
/// # 示例
/// ```no_run
/// use folio::commands::json;
/// use folio::error::FolioError;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// json::output_json_error::<String>(&FolioError::InvalidInput("empty title".into()))?;
/// # Ok(())
/// # }
/// ```
pub fn output_json_error<T: Serialize>(err: &FolioError) -> Result<()> {
    let output = JsonOutput::<T> {
        success: false,
        data: None,
        error: Some(ErrorJson::from_error(err)),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
