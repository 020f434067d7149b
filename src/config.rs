use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{AppError, AppResult, ConfigError, FileError};

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    // --- Notion 配置 ---
    pub notion_secret: String,
    pub notion_database_id: String,
    pub notion_api_base_url: String,
    /// 标题属性名
    pub notion_title_prop: String,
    /// 笔记正文属性名
    pub notion_notes_prop: String,
    /// 单次 Notion 请求超时（秒）
    pub fetch_timeout_secs: u64,
    /// 递归遍历的最大深度
    pub max_depth: usize,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
    /// 单次生成调用超时（秒）
    pub llm_timeout_secs: u64,
    // --- 分块配置 ---
    pub chunk_max_chars: usize,
    pub chunk_overlap: usize,
    /// 会话文件（保存最近一次生成结果和收藏的闪卡）
    pub session_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notion_secret: String::new(),
            notion_database_id: String::new(),
            notion_api_base_url: "https://api.notion.com/v1".to_string(),
            notion_title_prop: "Name".to_string(),
            notion_notes_prop: "Summary".to_string(),
            fetch_timeout_secs: 30,
            max_depth: 32,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            llm_temperature: 0.2,
            llm_timeout_secs: 120,
            chunk_max_chars: 7000,
            chunk_overlap: 400,
            session_file: "study_session.json".to_string(),
        }
    }
}

/// TOML 配置文件结构，所有字段可选
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    notion: NotionSection,
    #[serde(default)]
    llm: LlmSection,
    #[serde(default)]
    pipeline: PipelineSection,
}

#[derive(Debug, Default, Deserialize)]
struct NotionSection {
    secret: Option<String>,
    database_id: Option<String>,
    api_base_url: Option<String>,
    title_prop: Option<String>,
    notes_prop: Option<String>,
    fetch_timeout_secs: Option<u64>,
    max_depth: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmSection {
    api_key: Option<String>,
    api_base_url: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct PipelineSection {
    chunk_max_chars: Option<usize>,
    chunk_overlap: Option<usize>,
    session_file: Option<String>,
}

impl Config {
    /// 加载配置：默认值 → TOML 文件（可选）→ 环境变量 → 校验
    ///
    /// # 参数
    /// - `path`: TOML 配置文件路径（可选）
    ///
    /// # 返回
    /// 返回校验通过的配置；缺少必需项时返回错误（启动即失败）
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let mut config = Self::default();
        if let Some(path) = path {
            config.apply_file(path)?;
        }
        config.apply_env_with(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// 只从环境变量加载
    pub fn from_env() -> AppResult<Self> {
        Self::load(None)
    }

    fn apply_file(&mut self, path: &Path) -> AppResult<()> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| FileError::ReadFailed {
            path: display.clone(),
            source,
        })?;
        let file: ConfigFile = toml::from_str(&content).map_err(|source| {
            FileError::TomlParseFailed {
                path: display,
                source,
            }
        })?;
        self.merge_file(file);
        Ok(())
    }

    fn merge_file(&mut self, file: ConfigFile) {
        let ConfigFile {
            notion,
            llm,
            pipeline,
        } = file;

        override_with(&mut self.notion_secret, notion.secret);
        override_with(&mut self.notion_database_id, notion.database_id);
        override_with(&mut self.notion_api_base_url, notion.api_base_url);
        override_with(&mut self.notion_title_prop, notion.title_prop);
        override_with(&mut self.notion_notes_prop, notion.notes_prop);
        override_with(&mut self.fetch_timeout_secs, notion.fetch_timeout_secs);
        override_with(&mut self.max_depth, notion.max_depth);

        override_with(&mut self.llm_api_key, llm.api_key);
        override_with(&mut self.llm_api_base_url, llm.api_base_url);
        override_with(&mut self.llm_model_name, llm.model);
        override_with(&mut self.llm_temperature, llm.temperature);
        override_with(&mut self.llm_timeout_secs, llm.timeout_secs);

        override_with(&mut self.chunk_max_chars, pipeline.chunk_max_chars);
        override_with(&mut self.chunk_overlap, pipeline.chunk_overlap);
        override_with(&mut self.session_file, pipeline.session_file);
    }

    /// 用环境变量覆盖配置
    ///
    /// `lookup` 通常是 `std::env::var`，测试中可以传入固定的映射
    pub fn apply_env_with<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        override_with(&mut self.notion_secret, lookup("NOTION_SECRET"));
        override_with(&mut self.notion_database_id, lookup("NOTION_DATABASE_ID"));
        override_with(&mut self.notion_api_base_url, lookup("NOTION_API_BASE_URL"));
        override_with(&mut self.notion_title_prop, lookup("NOTION_TITLE_PROP"));
        override_with(&mut self.notion_notes_prop, lookup("NOTION_NOTES_PROP"));
        override_with(
            &mut self.fetch_timeout_secs,
            parse_env(&lookup, "NOTION_FETCH_TIMEOUT_SECS", "u64")?,
        );
        override_with(
            &mut self.max_depth,
            parse_env(&lookup, "NOTION_MAX_DEPTH", "usize")?,
        );

        override_with(&mut self.llm_api_key, lookup("OPENAI_API_KEY"));
        override_with(&mut self.llm_api_base_url, lookup("OPENAI_API_BASE"));
        override_with(&mut self.llm_model_name, lookup("OPENAI_MODEL"));
        override_with(
            &mut self.llm_temperature,
            parse_env(&lookup, "OPENAI_TEMPERATURE", "f32")?,
        );
        override_with(
            &mut self.llm_timeout_secs,
            parse_env(&lookup, "OPENAI_TIMEOUT_SECS", "u64")?,
        );

        override_with(
            &mut self.chunk_max_chars,
            parse_env(&lookup, "CHUNK_MAX_CHARS", "usize")?,
        );
        override_with(
            &mut self.chunk_overlap,
            parse_env(&lookup, "CHUNK_OVERLAP", "usize")?,
        );
        override_with(&mut self.session_file, lookup("SESSION_FILE"));
        Ok(())
    }

    /// 校验必需项与分块参数
    pub fn validate(&self) -> AppResult<()> {
        if self.notion_secret.trim().is_empty() {
            return Err(AppError::missing_env("NOTION_SECRET"));
        }
        if self.notion_database_id.trim().is_empty() {
            return Err(AppError::missing_env("NOTION_DATABASE_ID"));
        }
        if self.llm_api_key.trim().is_empty() {
            return Err(AppError::missing_env("OPENAI_API_KEY"));
        }
        if self.chunk_max_chars == 0 || self.chunk_overlap >= self.chunk_max_chars {
            return Err(ConfigError::InvalidChunking {
                max_chars: self.chunk_max_chars,
                overlap: self.chunk_overlap,
            }
            .into());
        }
        Ok(())
    }
}

fn override_with<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn parse_env<T, F>(lookup: &F, var_name: &str, expected_type: &str) -> AppResult<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var_name) {
        None => Ok(None),
        Some(value) => value.trim().parse::<T>().map(Some).map_err(|_| {
            ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }
            .into()
        }),
    }
}
