//! 生成提示词

/// 系统指令：描述输出结构和数量要求
pub const SYSTEM_PROMPT: &str = r#"You are an exam-writer AI. Return STRICT VALID JSON only.
Schema:
{
  "flashcards": [{"question": str, "answer": str}],
  "mcqs": [{"question": str, "choices": [str,...], "answer_index": int, "explanation": str}],
  "mock_exam": {
    "title": str,
    "questions": [
      {"type": "mcq", "question": str, "choices": [str,...], "answer_index": int},
      {"type": "short", "question": str, "expected_points": [str,...]}
    ]
  }
}
Use concise, exam-appropriate language. 12-20 flashcards, 8-12 MCQs, and a 6-8 question mock exam."#;

/// 构建单块的用户指令
///
/// # 参数
/// - `notes`: 当前块的笔记文本
/// - `difficulty`: 难度描述
/// - `focus`: 关注的主题（没有时传 `"none"`）
pub fn build_user_prompt(notes: &str, difficulty: &str, focus: &str) -> String {
    format!(
        "Create flashcards, MCQs, and a short mock exam from the following notes.\n\
         \n\
         NOTES:\n\
         ---\n\
         {notes}\n\
         ---\n\
         \n\
         Constraints:\n\
         - Difficulty: {difficulty}\n\
         - Focus topics: {focus}\n\
         - Prefer conceptual coverage over trivia.\n\
         - Fix inaccuracies if present.\n"
    )
}
