//! 文本分块服务 - 业务能力层
//!
//! 把整份笔记语料切成带重叠的定长窗口，保证单次生成请求不超过输入上限。
//! 长度按字符（Unicode 标量）计，切分点永远落在字符边界上。

use crate::error::{AppResult, ConfigError};

/// 按固定窗口 + 重叠切分文本
///
/// # 参数
/// - `text`: 完整语料
/// - `max_chars`: 每块最大字符数
/// - `overlap`: 相邻块的重叠字符数，必须小于 `max_chars`
///
/// # 返回
/// 返回按顺序排列的分块；空文本返回空列表
pub fn chunk_text(text: &str, max_chars: usize, overlap: usize) -> AppResult<Vec<String>> {
    if max_chars == 0 || overlap >= max_chars {
        return Err(ConfigError::InvalidChunking { max_chars, overlap }.into());
    }

    if text.is_empty() {
        return Ok(Vec::new());
    }

    // 每个字符的起始字节偏移，末尾补上总长度，便于按字符下标切片
    let mut offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let total_chars = offsets.len();
    offsets.push(text.len());

    if total_chars <= max_chars {
        return Ok(vec![text.to_string()]);
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + max_chars).min(total_chars);
        chunks.push(text[offsets[start]..offsets[end]].to_string());
        if end == total_chars {
            break;
        }
        start = end.saturating_sub(overlap);
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    /// 去掉后续块开头的重叠部分后拼回原文
    fn reassemble(chunks: &[String], overlap: usize) -> String {
        let mut out = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            if i == 0 {
                out.push_str(chunk);
            } else {
                out.extend(chunk.chars().skip(overlap));
            }
        }
        out
    }

    #[test]
    fn test_empty_text() {
        assert!(chunk_text("", 100, 10).unwrap().is_empty());
    }

    #[test]
    fn test_short_text_single_chunk() {
        assert_eq!(chunk_text("hello", 5, 1).unwrap(), vec!["hello".to_string()]);
        assert_eq!(chunk_text("hi", 100, 10).unwrap(), vec!["hi".to_string()]);
    }

    #[test]
    fn test_overlap_not_smaller_than_window_is_rejected() {
        for (max_chars, overlap) in [(10, 10), (10, 11), (0, 0)] {
            let err = chunk_text("some text here", max_chars, overlap).unwrap_err();
            assert!(matches!(
                err,
                AppError::Config(ConfigError::InvalidChunking { .. })
            ));
        }
    }

    #[test]
    fn test_default_parameters_on_15000_chars() {
        let text: String = (0..15000).map(|i| (b'a' + (i % 26) as u8) as char).collect();
        let chunks = chunk_text(&text, 7000, 400).unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 7000);
        assert_eq!(chunks[1].len(), 7000);
        // 第三块从 13200 开始，到 15000 结束
        assert_eq!(chunks[2].len(), 1800);
        assert!(text.ends_with(chunks[2].as_str()));
        assert_eq!(&chunks[1][..400], &chunks[0][6600..]);
    }

    #[test]
    fn test_reassembly_reproduces_original() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(37);
        for (max_chars, overlap) in [(50, 0), (50, 10), (64, 63), (7, 3), (1, 0)] {
            let chunks = chunk_text(&text, max_chars, overlap).unwrap();
            assert!(chunks.iter().all(|c| c.chars().count() <= max_chars));
            assert_eq!(reassemble(&chunks, overlap), text, "max={} overlap={}", max_chars, overlap);
        }
    }

    #[test]
    fn test_multibyte_text_never_split_inside_char() {
        let text = "线粒体是细胞的能量工厂。🧬 ".repeat(20);
        let chunks = chunk_text(&text, 16, 4).unwrap();

        assert!(chunks.len() > 1);
        assert_eq!(reassemble(&chunks, 4), text);
        assert!(text.ends_with(chunks.last().unwrap().as_str()));
    }
}
