//! 生成结果数据结构
//!
//! 后端只按自然语言描述的结构返回 JSON，这里所有字段都带默认值，
//! 缺字段或字段为 `null` 都不报错；`q` / `a` 短键作为 `question` / `answer` 的别名接受。
//! `answer_index` 也接受数字字符串（如 `"0"`），无法识别时按 -1 处理

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// 合并后模拟考试的固定标题
pub const MERGED_MOCK_EXAM_TITLE: &str = "Merged Mock Exam";

/// 闪卡
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    #[serde(default, alias = "q", deserialize_with = "null_as_default")]
    pub question: String,
    #[serde(default, alias = "a", deserialize_with = "null_as_default")]
    pub answer: String,
}

impl Flashcard {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// 选择题
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mcq {
    #[serde(default, alias = "q", deserialize_with = "null_as_default")]
    pub question: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub choices: Vec<String>,
    #[serde(default = "missing_answer_index", deserialize_with = "lenient_index")]
    pub answer_index: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub explanation: String,
}

fn missing_answer_index() -> i64 {
    -1
}

// null 按字段默认值处理
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// 答案下标可能是数字、数字字符串或 null，其余情况一律视为 -1
fn lenient_index<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let index = match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(index.unwrap_or_else(missing_answer_index))
}

impl Mcq {
    pub fn new(question: impl Into<String>, choices: &[&str], answer_index: i64) -> Self {
        Self {
            question: question.into(),
            choices: choices.iter().map(|c| c.to_string()).collect(),
            answer_index,
            explanation: String::new(),
        }
    }

    /// 按下标取选项文本（越界或负数返回 None）
    pub fn choice(&self, index: i64) -> Option<&str> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.choices.get(i))
            .map(String::as_str)
    }
}

/// 模拟考试题目，按 `type` 分派
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MockQuestion {
    Mcq {
        #[serde(default, alias = "q", deserialize_with = "null_as_default")]
        question: String,
        #[serde(default, deserialize_with = "null_as_default")]
        choices: Vec<String>,
        #[serde(default = "missing_answer_index", deserialize_with = "lenient_index")]
        answer_index: i64,
    },
    Short {
        #[serde(default, alias = "q", deserialize_with = "null_as_default")]
        question: String,
        #[serde(default, deserialize_with = "null_as_default")]
        expected_points: Vec<String>,
    },
    /// 其他题型原样保留
    #[serde(untagged)]
    Other(serde_json::Value),
}

impl MockQuestion {
    pub fn short(question: impl Into<String>, expected_points: &[&str]) -> Self {
        MockQuestion::Short {
            question: question.into(),
            expected_points: expected_points.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// 模拟考试
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MockExam {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub questions: Vec<MockQuestion>,
}

/// 单次生成调用返回的结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub flashcards: Vec<Flashcard>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mcqs: Vec<Mcq>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mock_exam: MockExam,
}

/// 多块结果合并、去重、截断后的最终结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedPayload {
    pub flashcards: Vec<Flashcard>,
    pub mcqs: Vec<Mcq>,
    pub mock_exam: MockExam,
}

impl Default for MergedPayload {
    fn default() -> Self {
        Self {
            flashcards: Vec::new(),
            mcqs: Vec::new(),
            mock_exam: MockExam {
                title: MERGED_MOCK_EXAM_TITLE.to_string(),
                questions: Vec::new(),
            },
        }
    }
}

/// 一次生成请求的结果
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    /// 成功生成
    Generated(MergedPayload),
    /// 没有任何笔记内容，未调用后端
    NoSourceNotes,
}

impl GenerationOutcome {
    pub fn merged(&self) -> Option<&MergedPayload> {
        match self {
            GenerationOutcome::Generated(merged) => Some(merged),
            GenerationOutcome::NoSourceNotes => None,
        }
    }
}
