/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use tracing::info;

use crate::config::Config;
use crate::models::MergedPayload;

/// 笔记预览的最大字符数
pub const NOTES_PREVIEW_CHARS: usize = 1200;

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - Notion 笔记出题模式");
    info!("🗂️ 根数据库: {}", config.notion_database_id);
    info!("🤖 模型: {}", config.llm_model_name);
    info!(
        "✂️ 分块: 每块 {} 字符, 重叠 {} 字符",
        config.chunk_max_chars, config.chunk_overlap
    );
    info!("{}", "=".repeat(60));
}

/// 记录笔记加载信息
///
/// # 参数
/// - `total_chars`: 语料总字符数
/// - `chunk_count`: 分块数量
pub fn log_corpus_loaded(total_chars: usize, chunk_count: usize) {
    info!("✓ 笔记语料共 {} 个字符", total_chars);
    info!("📋 将分 {} 块依次生成", chunk_count);
}

/// 记录单块生成开始
pub fn log_chunk_start(chunk_index: usize, total: usize, chunk_chars: usize) {
    info!("\n{}", "─".repeat(60));
    info!(
        "📦 开始生成第 {}/{} 块 ({} 字符)",
        chunk_index, total, chunk_chars
    );
}

/// 打印最终统计信息
///
/// # 参数
/// - `merged`: 合并后的结果
/// - `chunk_count`: 分块数量
pub fn print_final_stats(merged: &MergedPayload, chunk_count: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📊 生成完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("🧩 分块数: {}", chunk_count);
    info!("🃏 闪卡: {}", merged.flashcards.len());
    info!("❓ 选择题: {}", merged.mcqs.len());
    info!("📝 模拟考试题: {}", merged.mock_exam.questions.len());
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

/// 生成笔记预览（超过上限时截断并追加省略号）
pub fn notes_preview(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "…"
    } else {
        text.to_string()
    }
}
