//! 结果合并
//!
//! 按块顺序拼接各块结果，去重后截断到固定上限

use std::collections::HashSet;

use crate::models::{GenerationPayload, MergedPayload, MockExam, MERGED_MOCK_EXAM_TITLE};

/// 闪卡上限
pub const MAX_FLASHCARDS: usize = 25;
/// 选择题上限
pub const MAX_MCQS: usize = 20;
/// 模拟考试题上限
pub const MAX_MOCK_QUESTIONS: usize = 10;

/// 合并多块生成结果，永不失败
///
/// - 闪卡按 (问题, 答案) 去首尾空白后去重，先到先得
/// - 选择题只按问题去重
/// - 模拟考试题不去重
pub fn merge_payloads(payloads: Vec<GenerationPayload>) -> MergedPayload {
    let mut flashcards = Vec::new();
    let mut mcqs = Vec::new();
    let mut questions = Vec::new();

    let mut seen_cards = HashSet::new();
    let mut seen_mcqs = HashSet::new();

    for payload in payloads {
        for card in payload.flashcards {
            let key = (card.question.trim().to_string(), card.answer.trim().to_string());
            if seen_cards.insert(key) {
                flashcards.push(card);
            }
        }
        for mcq in payload.mcqs {
            if seen_mcqs.insert(mcq.question.trim().to_string()) {
                mcqs.push(mcq);
            }
        }
        questions.extend(payload.mock_exam.questions);
    }

    flashcards.truncate(MAX_FLASHCARDS);
    mcqs.truncate(MAX_MCQS);
    questions.truncate(MAX_MOCK_QUESTIONS);

    MergedPayload {
        flashcards,
        mcqs,
        mock_exam: MockExam {
            title: MERGED_MOCK_EXAM_TITLE.to_string(),
            questions,
        },
    }
}
