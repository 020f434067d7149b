//! 分块处理上下文
//!
//! 封装"我正在生成第几块"这一信息

use std::fmt::Display;

/// 分块处理上下文
#[derive(Debug, Clone, Copy)]
pub struct ChunkCtx {
    /// 块序号（从1开始）
    pub chunk_index: usize,

    /// 总块数
    pub total_chunks: usize,

    /// 本块字符数（仅用于日志显示）
    pub chunk_chars: usize,
}

impl ChunkCtx {
    /// 创建新的分块上下文
    pub fn new(chunk_index: usize, total_chunks: usize, chunk_chars: usize) -> Self {
        Self {
            chunk_index,
            total_chunks,
            chunk_chars,
        }
    }
}

impl Display for ChunkCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[块 #{}/{}]", self.chunk_index, self.total_chunks)
    }
}
