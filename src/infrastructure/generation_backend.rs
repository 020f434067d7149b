//! 生成后端 - 基础设施层
//!
//! 只暴露"一次对话补全"能力，返回原始文本，不做 JSON 解析

use async_trait::async_trait;

use crate::error::AppResult;

/// 严格 JSON 模式的对话补全能力
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// 发送一次请求（系统指令 + 用户指令），返回模型输出的原始文本
    async fn complete_json(&self, system_message: &str, user_message: &str) -> AppResult<String>;

    /// 模型标识（用于日志）
    fn model_name(&self) -> &str;
}
