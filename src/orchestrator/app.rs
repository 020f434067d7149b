//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：构建 Notion / LLM 客户端和出题流程，整个进程只构建一次
//! 2. **命令执行**：generate / preview / grade / save-card / saved-cards
//! 3. **会话管理**：读写会话文件，保存最近一次结果和收藏的闪卡
//!
//! 不做具体业务判断，全部委托给 workflow 和 services

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::clients::{LlmClient, NotionClient};
use crate::config::Config;
use crate::error::{AppResult, FileError};
use crate::infrastructure::{DocumentSource, GenerationBackend};
use crate::models::{GenerationOutcome, NewFlashcard, SavedFlashcard};
use crate::orchestrator::study_session::StudySession;
use crate::services::{grade_mcqs, QuizReport};
use crate::utils::logging::log_startup;
use crate::workflow::{ExamPipeline, GenerationRequest};

/// 应用主结构
pub struct App {
    config: Config,
    pipeline: ExamPipeline,
}

impl App {
    /// 初始化应用（连接真实的 Notion 和 LLM 服务）
    pub fn initialize(config: Config) -> AppResult<Self> {
        log_startup(&config);

        let source: Arc<dyn DocumentSource> = Arc::new(NotionClient::new(&config)?);
        let backend: Arc<dyn GenerationBackend> = Arc::new(LlmClient::new(&config));

        Ok(Self::with_backends(config, source, backend))
    }

    /// 用给定的数据源和生成后端初始化应用
    pub fn with_backends(
        config: Config,
        source: Arc<dyn DocumentSource>,
        backend: Arc<dyn GenerationBackend>,
    ) -> Self {
        let pipeline = ExamPipeline::new(&config, source, backend);
        Self { config, pipeline }
    }

    fn session_path(&self) -> PathBuf {
        PathBuf::from(&self.config.session_file)
    }

    /// 生成闪卡、选择题和模拟考试，成功时写入会话
    ///
    /// # 参数
    /// - `request`: 难度和关注点
    /// - `output`: 额外把结果写到这个 JSON 文件（可选）
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        output: Option<&Path>,
    ) -> AppResult<GenerationOutcome> {
        let outcome = self.pipeline.generate_artifacts(request).await?;

        let Some(merged) = outcome.merged() else {
            warn!("⚠️ Notion 中没有找到笔记");
            return Ok(outcome);
        };

        let path = self.session_path();
        let mut session = StudySession::load(&path)?;
        session.store_generated(merged.clone());
        session.save(&path)?;
        info!("💾 结果已保存到会话 {}", path.display());

        if let Some(output) = output {
            write_json(output, merged)?;
            info!("💾 结果已写入 {}", output.display());
        }

        Ok(outcome)
    }

    /// 笔记预览，同时记入会话
    pub async fn preview(&self) -> AppResult<String> {
        let preview = self.pipeline.preview_notes().await;

        let path = self.session_path();
        let mut session = StudySession::load(&path)?;
        session.store_preview(preview.clone());
        session.save(&path)?;

        Ok(preview)
    }

    /// 给最近一次生成的选择题判分
    pub fn grade(&self, answers: &[Option<i64>]) -> AppResult<QuizReport> {
        let session = StudySession::load(&self.session_path())?;
        let merged = session.require_generated()?;
        let report = grade_mcqs(&merged.mcqs, answers);
        info!("🎯 得分: {}/{}", report.score, report.total);
        Ok(report)
    }

    /// 收藏一张闪卡
    pub fn save_card(&self, card: NewFlashcard) -> AppResult<SavedFlashcard> {
        let path = self.session_path();
        let mut session = StudySession::load(&path)?;
        let saved = session.save_flashcard(card)?;
        session.save(&path)?;
        Ok(saved)
    }

    /// 所有收藏的闪卡
    pub fn saved_cards(&self) -> AppResult<Vec<SavedFlashcard>> {
        let session = StudySession::load(&self.session_path())?;
        Ok(session.saved_flashcards().to_vec())
    }

    /// 当前配置
    pub fn config(&self) -> &Config {
        &self.config
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> AppResult<()> {
    let display = path.display().to_string();
    let content = serde_json::to_string_pretty(value).map_err(|source| {
        FileError::JsonParseFailed {
            path: display.clone(),
            source,
        }
    })?;
    std::fs::write(path, content).map_err(|source| FileError::WriteFailed {
        path: display,
        source,
    })?;
    Ok(())
}
