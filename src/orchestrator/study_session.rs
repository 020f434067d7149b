//! 学习会话
//!
//! 保存最近一次生成结果和收藏的闪卡，单用户，后写覆盖先写。
//! 会话以 JSON 文件形式落盘，命令行多次调用之间共享状态。

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AppResult, BusinessError, FileError};
use crate::models::{MergedPayload, NewFlashcard, SavedFlashcard};

/// 学习会话
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudySession {
    #[serde(default)]
    generated: Option<MergedPayload>,
    #[serde(default)]
    saved_flashcards: Vec<SavedFlashcard>,
    #[serde(default)]
    last_preview: Option<String>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl StudySession {
    /// 从文件加载会话，文件不存在时返回空会话
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            debug!("会话文件 {} 不存在，使用空会话", path.display());
            return Ok(Self::default());
        }

        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| FileError::ReadFailed {
            path: display.clone(),
            source,
        })?;
        let session = serde_json::from_str(&content).map_err(|source| FileError::JsonParseFailed {
            path: display,
            source,
        })?;
        Ok(session)
    }

    /// 把会话写回文件
    pub fn save(&self, path: &Path) -> AppResult<()> {
        let display = path.display().to_string();
        let content =
            serde_json::to_string_pretty(self).map_err(|source| FileError::JsonParseFailed {
                path: display.clone(),
                source,
            })?;
        std::fs::write(path, content).map_err(|source| FileError::WriteFailed {
            path: display,
            source,
        })?;
        debug!("会话已保存到 {}", path.display());
        Ok(())
    }

    /// 保存最新的生成结果（覆盖上一次）
    pub fn store_generated(&mut self, merged: MergedPayload) {
        self.generated = Some(merged);
        self.touch();
    }

    /// 最近一次的生成结果
    pub fn generated(&self) -> Option<&MergedPayload> {
        self.generated.as_ref()
    }

    /// 最近一次的生成结果，没有时返回业务错误
    pub fn require_generated(&self) -> AppResult<&MergedPayload> {
        self.generated
            .as_ref()
            .ok_or_else(|| BusinessError::NothingGenerated.into())
    }

    /// 记录最近一次的笔记预览
    pub fn store_preview(&mut self, preview: String) {
        self.last_preview = Some(preview);
        self.touch();
    }

    /// 最近一次的笔记预览
    pub fn last_preview(&self) -> Option<&str> {
        self.last_preview.as_deref()
    }

    /// 收藏一张闪卡
    ///
    /// id 为当前收藏数 + 1；同一张闪卡可以重复收藏
    pub fn save_flashcard(&mut self, card: NewFlashcard) -> AppResult<SavedFlashcard> {
        if card.question.trim().is_empty() || card.answer.trim().is_empty() {
            return Err(BusinessError::InvalidFlashcard(
                "question 和 answer 都不能为空".to_string(),
            )
            .into());
        }

        let saved = SavedFlashcard {
            id: self.saved_flashcards.len() + 1,
            question: card.question,
            answer: card.answer,
            saved_at: card.saved_at,
        };
        info!("⭐ 收藏闪卡 #{}", saved.id);
        self.saved_flashcards.push(saved.clone());
        self.touch();

        Ok(saved)
    }

    /// 所有收藏的闪卡（按收藏顺序）
    pub fn saved_flashcards(&self) -> &[SavedFlashcard] {
        &self.saved_flashcards
    }

    /// 最后修改时间
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::Flashcard;

    fn card(question: &str, answer: &str) -> NewFlashcard {
        NewFlashcard {
            question: question.to_string(),
            answer: answer.to_string(),
            saved_at: None,
        }
    }

    #[test]
    fn test_store_generated_last_write_wins() {
        let mut session = StudySession::default();
        assert!(session.generated().is_none());
        assert!(matches!(
            session.require_generated(),
            Err(AppError::Business(BusinessError::NothingGenerated))
        ));

        let mut first = MergedPayload::default();
        first.flashcards.push(Flashcard::new("q1", "a1"));
        session.store_generated(first);
        session.store_generated(MergedPayload::default());

        assert_eq!(session.generated(), Some(&MergedPayload::default()));
        assert!(session.updated_at().is_some());
    }

    #[test]
    fn test_saved_flashcards_sequential_ids_no_dedup() {
        let mut session = StudySession::default();
        session.save_flashcard(card("What is ATP?", "Energy")).unwrap();
        let second = session.save_flashcard(card("What is ATP?", "Energy")).unwrap();
        assert_eq!(second.id, 2);
        assert_eq!(session.saved_flashcards().last(), Some(&second));

        let ids: Vec<usize> = session.saved_flashcards().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_blank_flashcard_rejected() {
        let mut session = StudySession::default();
        let err = session.save_flashcard(card("  ", "answer")).unwrap_err();
        assert!(matches!(err, AppError::Business(BusinessError::InvalidFlashcard(_))));
        assert!(session.saved_flashcards().is_empty());
    }

    #[test]
    fn test_file_round_trip_and_missing_file() {
        let dir = std::env::temp_dir().join(format!("notion_exam_session_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("session.json");
        let _ = std::fs::remove_file(&path);

        assert_eq!(StudySession::load(&path).unwrap(), StudySession::default());

        let mut session = StudySession::default();
        session.store_generated(MergedPayload::default());
        session.store_preview("Cells are the basic unit of life".to_string());
        session
            .save_flashcard(NewFlashcard {
                question: "Define osmosis".to_string(),
                answer: "Diffusion of water".to_string(),
                saved_at: Some("2024-05-01T10:00:00Z".to_string()),
            })
            .unwrap();
        session.save(&path).unwrap();

        let loaded = StudySession::load(&path).unwrap();
        assert_eq!(loaded, session);
        assert_eq!(loaded.last_preview(), Some("Cells are the basic unit of life"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
