use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误（启动时致命）
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// Notion 数据源错误（遍历时会被吞掉并降级）
    #[error("数据源错误: {0}")]
    Source(#[from] SourceError),
    /// LLM 服务错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 生成结果解析错误（对整个请求致命）
    #[error("生成错误: {0}")]
    Generation(#[from] GenerationError),
    /// 业务逻辑错误
    #[error("业务错误: {0}")]
    Business(#[from] BusinessError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量不存在
    #[error("环境变量 {var_name} 不存在")]
    EnvVarNotFound { var_name: String },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 分块参数非法（overlap 必须小于 max_chars）
    #[error("分块参数非法: max_chars={max_chars}, overlap={overlap}（要求 0 <= overlap < max_chars）")]
    InvalidChunking { max_chars: usize, overlap: usize },
}

/// Notion 数据源错误
#[derive(Debug, Error)]
pub enum SourceError {
    /// 网络请求失败（含超时）
    #[error("请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// API 返回错误响应
    #[error("API返回错误响应 ({endpoint}): status={status}, body={body}")]
    BadResponse {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// 响应体无法解析
    #[error("响应解析失败 ({endpoint}): {source}")]
    DecodeFailed {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    /// 测试替身或其他来源使用的通用错误
    #[error("{0}")]
    Other(String),
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {message}")]
    ApiCallFailed { model: String, message: String },
    /// 请求构建失败
    #[error("LLM 请求构建失败: {0}")]
    RequestBuildFailed(String),
    /// 调用超时
    #[error("LLM 调用超时 (模型: {model}, {timeout_secs} 秒)")]
    Timeout { model: String, timeout_secs: u64 },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
}

/// 生成结果错误
#[derive(Debug, Error)]
pub enum GenerationError {
    /// 返回文本不是合法 JSON
    #[error("生成结果不是合法的 JSON (第 {chunk} 块): {source}")]
    InvalidJson {
        chunk: usize,
        #[source]
        source: serde_json::Error,
    },
    /// JSON 合法但不是对象
    #[error("生成结果不是 JSON 对象 (第 {chunk} 块)，实际类型: {found}")]
    NotAnObject { chunk: usize, found: &'static str },
}

/// 业务逻辑错误
#[derive(Debug, Error)]
pub enum BusinessError {
    /// 会话中没有生成结果
    #[error("当前会话没有生成结果，请先执行 generate")]
    NothingGenerated,
    /// 闪卡数据不完整
    #[error("闪卡数据无效: {0}")]
    InvalidFlashcard(String),
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// JSON 文件解析失败
    #[error("JSON解析失败 ({path}): {source}")]
    JsonParseFailed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建缺少环境变量错误
    pub fn missing_env(var_name: impl Into<String>) -> Self {
        AppError::Config(ConfigError::EnvVarNotFound {
            var_name: var_name.into(),
        })
    }

    /// 创建数据源请求失败错误
    pub fn source_request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Source(SourceError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        })
    }

    /// 创建LLM API调用错误
    pub fn llm_api_failed(model: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Llm(LlmError::ApiCallFailed {
            model: model.into(),
            message: message.into(),
        })
    }

    /// 是否属于"生成结果不可解析"这一类致命错误
    pub fn is_generation_parse_error(&self) -> bool {
        matches!(self, AppError::Generation(_))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_env_message() {
        let err = AppError::missing_env("NOTION_SECRET");
        assert_eq!(err.to_string(), "配置错误: 环境变量 NOTION_SECRET 不存在");
    }

    #[test]
    fn test_generation_error_is_distinct() {
        let source = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err: AppError = GenerationError::InvalidJson { chunk: 2, source }.into();
        assert!(err.is_generation_parse_error());
        assert!(err.to_string().contains("第 2 块"));

        let other = AppError::llm_api_failed("gpt-4o-mini", "boom");
        assert!(!other.is_generation_parse_error());
    }
}
