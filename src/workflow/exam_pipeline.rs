//! 出题流程 - 流程层
//!
//! 核心职责：定义"一次生成请求"的完整处理流程
//!
//! 流程顺序：
//! 1. 遍历笔记树 → 语料（为空则直接返回，不调用后端）
//! 2. 分块
//! 3. 逐块生成（严格顺序，任何一块失败都终止整个请求）
//! 4. 合并

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::{DocumentSource, GenerationBackend};
use crate::models::GenerationOutcome;
use crate::services::prompts::{build_user_prompt, SYSTEM_PROMPT};
use crate::services::{
    chunk_text, merge_payloads, DocumentTreeWalker, GenerationClient, WalkSettings,
};
use crate::utils::logging;
use crate::workflow::chunk_ctx::ChunkCtx;

/// 默认难度
pub const DEFAULT_DIFFICULTY: &str = "balanced";
/// 没有指定关注点时使用的值
pub const NO_FOCUS: &str = "none";

/// 一次生成请求的参数
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub difficulty: String,
    pub focus: String,
}

impl GenerationRequest {
    /// 创建生成请求，空白的关注点归一化为 `"none"`
    pub fn new(difficulty: Option<&str>, focus: Option<&str>) -> Self {
        let difficulty = difficulty.unwrap_or(DEFAULT_DIFFICULTY).to_string();
        let focus = match focus.map(str::trim) {
            Some(f) if !f.is_empty() => f.to_string(),
            _ => NO_FOCUS.to_string(),
        };
        Self { difficulty, focus }
    }
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// 出题流程
///
/// - 编排遍历、分块、生成、合并
/// - 只依赖业务能力（services）
/// - 不保存任何跨请求状态
pub struct ExamPipeline {
    walker: DocumentTreeWalker,
    generator: GenerationClient,
    root_database_id: String,
    chunk_max_chars: usize,
    chunk_overlap: usize,
}

impl ExamPipeline {
    /// 用给定的数据源和生成后端创建流程
    pub fn new(
        config: &Config,
        source: Arc<dyn DocumentSource>,
        backend: Arc<dyn GenerationBackend>,
    ) -> Self {
        Self {
            walker: DocumentTreeWalker::new(source, WalkSettings::from(config)),
            generator: GenerationClient::new(backend),
            root_database_id: config.notion_database_id.clone(),
            chunk_max_chars: config.chunk_max_chars,
            chunk_overlap: config.chunk_overlap,
        }
    }

    /// 执行一次生成请求
    ///
    /// # 返回
    /// - `Generated`: 合并后的结果
    /// - `NoSourceNotes`: 笔记为空，未调用后端
    ///
    /// 任何一块的后端错误或解析错误都会直接返回，已生成的部分结果丢弃
    pub async fn generate_artifacts(
        &self,
        request: &GenerationRequest,
    ) -> AppResult<GenerationOutcome> {
        info!(
            "📚 开始读取笔记 (难度: {}, 关注点: {})",
            request.difficulty, request.focus
        );
        let notes = self.walker.collect_text(&self.root_database_id).await;
        if notes.is_empty() {
            warn!("⚠️ 没有找到任何笔记内容，跳过生成");
            return Ok(GenerationOutcome::NoSourceNotes);
        }

        let chunks = chunk_text(&notes, self.chunk_max_chars, self.chunk_overlap)?;
        logging::log_corpus_loaded(notes.chars().count(), chunks.len());

        let mut payloads = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            let ctx = ChunkCtx::new(i + 1, chunks.len(), chunk.chars().count());
            logging::log_chunk_start(ctx.chunk_index, ctx.total_chunks, ctx.chunk_chars);

            let user_prompt = build_user_prompt(chunk, &request.difficulty, &request.focus);
            let payload = self
                .generator
                .generate(SYSTEM_PROMPT, &user_prompt, ctx.chunk_index)
                .await
                .map_err(|e| {
                    error!("{} ❌ 生成失败，终止本次请求: {}", ctx, e);
                    e
                })?;

            info!(
                "{} ✓ 闪卡 {} / 选择题 {} / 模拟题 {}",
                ctx,
                payload.flashcards.len(),
                payload.mcqs.len(),
                payload.mock_exam.questions.len()
            );
            payloads.push(payload);
        }

        let merged = merge_payloads(payloads);
        logging::print_final_stats(&merged, chunks.len());

        Ok(GenerationOutcome::Generated(merged))
    }

    /// 笔记预览：前 1200 个字符，超出部分用省略号表示
    pub async fn preview_notes(&self) -> String {
        let notes = self.walker.collect_text(&self.root_database_id).await;
        logging::notes_preview(&notes, logging::NOTES_PREVIEW_CHARS)
    }

    /// 当前使用的模型名
    pub fn model_name(&self) -> &str {
        self.generator.model_name()
    }
}
