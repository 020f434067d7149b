//! 选择题判分

use serde::Serialize;

use crate::models::Mcq;

/// 未作答时显示的文本
pub const NO_ANSWER: &str = "(no answer)";
/// 标准答案下标越界时显示的文本
pub const NOT_AVAILABLE: &str = "(n/a)";

/// 单题回顾
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewItem {
    pub question: String,
    pub your_answer_text: String,
    pub correct_answer_text: String,
    pub explanation: String,
}

/// 判分结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizReport {
    pub score: usize,
    pub total: usize,
    pub review: Vec<ReviewItem>,
}

/// 按作答下标给选择题判分
///
/// `answers[i]` 对应第 i 题所选的选项下标；缺失视为未作答（-1）
pub fn grade_mcqs(mcqs: &[Mcq], answers: &[Option<i64>]) -> QuizReport {
    let mut score = 0;
    let review = mcqs
        .iter()
        .enumerate()
        .map(|(i, mcq)| {
            let chosen = answers.get(i).copied().flatten().unwrap_or(-1);
            if chosen == mcq.answer_index {
                score += 1;
            }
            ReviewItem {
                question: mcq.question.clone(),
                your_answer_text: mcq.choice(chosen).unwrap_or(NO_ANSWER).to_string(),
                correct_answer_text: mcq
                    .choice(mcq.answer_index)
                    .unwrap_or(NOT_AVAILABLE)
                    .to_string(),
                explanation: mcq.explanation.clone(),
            }
        })
        .collect();

    QuizReport {
        score,
        total: mcqs.len(),
        review,
    }
}

/// 解析命令行传入的作答列表，如 `0,2,,1`；空位或非数字视为未作答
pub fn parse_answers(raw: &str) -> Vec<Option<i64>> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(',').map(|part| part.trim().parse().ok()).collect()
}
