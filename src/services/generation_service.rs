//! 生成服务 - 业务能力层
//!
//! 只负责"一块笔记 → 一份结构化结果"，不关心分块和合并

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{AppResult, GenerationError};
use crate::infrastructure::GenerationBackend;
use crate::models::GenerationPayload;
use crate::utils::logging::truncate_text;

/// 生成服务
///
/// 职责：
/// - 每次调用恰好请求一次后端
/// - 校验返回文本是 JSON 对象并解析成 `GenerationPayload`
/// - 缺少的键或 `null` 按空处理，其余形状不对视为解析错误
pub struct GenerationClient {
    backend: Arc<dyn GenerationBackend>,
}

impl GenerationClient {
    /// 创建新的生成服务
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    /// 当前使用的模型名
    pub fn model_name(&self) -> &str {
        self.backend.model_name()
    }

    /// 请求后端生成一份结果
    ///
    /// # 参数
    /// - `system_instructions`: 系统指令（输出结构说明）
    /// - `user_instructions`: 用户指令（笔记 + 难度 + 关注点）
    /// - `chunk_index`: 当前块序号（从 1 开始，仅用于错误信息）
    ///
    /// # 返回
    /// 解析后的 `GenerationPayload`；后端失败或返回内容无法解析时返回错误
    pub async fn generate(
        &self,
        system_instructions: &str,
        user_instructions: &str,
        chunk_index: usize,
    ) -> AppResult<GenerationPayload> {
        let raw = self
            .backend
            .complete_json(system_instructions, user_instructions)
            .await?;
        debug!("第 {} 块返回 {} 个字符", chunk_index, raw.chars().count());

        parse_payload(&raw, chunk_index)
    }
}

/// 把后端返回的文本解析成结果结构
pub fn parse_payload(raw: &str, chunk_index: usize) -> AppResult<GenerationPayload> {
    let value: Value = serde_json::from_str(raw).map_err(|source| {
        warn!(
            "❌ 第 {} 块返回的不是合法 JSON: {}",
            chunk_index,
            truncate_text(raw, 200)
        );
        GenerationError::InvalidJson {
            chunk: chunk_index,
            source,
        }
    })?;

    if !value.is_object() {
        return Err(GenerationError::NotAnObject {
            chunk: chunk_index,
            found: json_type_name(&value),
        }
        .into());
    }

    let payload = serde_json::from_value(value).map_err(|source| GenerationError::InvalidJson {
        chunk: chunk_index,
        source,
    })?;
    Ok(payload)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
