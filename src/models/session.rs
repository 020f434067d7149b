use serde::{Deserialize, Serialize};

/// 调用方提交的待收藏闪卡
#[derive(Debug, Clone, Deserialize)]
pub struct NewFlashcard {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub saved_at: Option<String>,
}

/// 已收藏的闪卡（id 在会话内从 1 开始递增）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedFlashcard {
    pub id: usize,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub saved_at: Option<String>,
}
