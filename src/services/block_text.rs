//! 块文本提取
//!
//! 按块类型分派，把单个块转成纯文本；嵌入数据库的内容由遍历服务负责

use crate::models::notion::{plain_text, BlockContent, MediaBlock};
use crate::models::Block;

/// 表格块的占位文本（表格内容不提取）
pub const TABLE_PLACEHOLDER: &str = "[Table content]";

/// 把一个块转换为纯文本，没有可用文本时返回空字符串
pub fn block_to_text(block: &Block) -> String {
    match &block.content {
        BlockContent::Paragraph { paragraph: t }
        | BlockContent::Heading1 { heading_1: t }
        | BlockContent::Heading2 { heading_2: t }
        | BlockContent::Heading3 { heading_3: t }
        | BlockContent::Callout { callout: t }
        | BlockContent::Quote { quote: t }
        | BlockContent::Toggle { toggle: t }
        | BlockContent::ToDo { to_do: t }
        | BlockContent::BulletedListItem { bulleted_list_item: t }
        | BlockContent::NumberedListItem { numbered_list_item: t } => plain_text(&t.rich_text),

        BlockContent::Code { code } => {
            let text = plain_text(&code.rich_text);
            if text.is_empty() {
                String::new()
            } else {
                format!("[code {}]\n{}", code.language, text)
            }
        }

        BlockContent::Table => TABLE_PLACEHOLDER.to_string(),

        BlockContent::ChildDatabase => String::new(),

        BlockContent::Image { image: m } => media_text("Image", m),
        BlockContent::File { file: m } => media_text("File", m),
        BlockContent::Video { video: m } => media_text("Video", m),
        BlockContent::Audio { audio: m } => media_text("Audio", m),

        BlockContent::Unsupported => String::new(),
    }
}

fn media_text(label: &str, media: &MediaBlock) -> String {
    let caption = plain_text(&media.caption);
    if caption.is_empty() {
        format!("[{}]", label)
    } else {
        format!("[{}: {}]", label, caption)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notion::{CodeBlock, RichText, TextBlock};

    fn block(content: BlockContent) -> Block {
        Block::new("b", content)
    }

    #[test]
    fn test_text_containers() {
        let b = block(BlockContent::BulletedListItem {
            bulleted_list_item: TextBlock {
                rich_text: vec![RichText::new("  ATP "), RichText::new("synthase  ")],
            },
        });
        assert_eq!(block_to_text(&b), "ATP synthase");

        let h = block(BlockContent::Heading1 {
            heading_1: TextBlock::from_text("Chapter 1"),
        });
        assert_eq!(block_to_text(&h), "Chapter 1");
    }

    #[test]
    fn test_code_block() {
        let code = block(BlockContent::Code {
            code: CodeBlock {
                rich_text: vec![RichText::new("print(1)")],
                language: "python".to_string(),
            },
        });
        assert_eq!(block_to_text(&code), "[code python]\nprint(1)");

        let empty = block(BlockContent::Code {
            code: CodeBlock::default(),
        });
        assert_eq!(block_to_text(&empty), "");
    }

    #[test]
    fn test_placeholders_and_media() {
        assert_eq!(block_to_text(&block(BlockContent::Table)), TABLE_PLACEHOLDER);
        assert_eq!(block_to_text(&block(BlockContent::ChildDatabase)), "");
        assert_eq!(block_to_text(&block(BlockContent::Unsupported)), "");

        let image = block(BlockContent::Image {
            image: MediaBlock {
                caption: vec![RichText::new("Cell diagram")],
            },
        });
        assert_eq!(block_to_text(&image), "[Image: Cell diagram]");

        let audio = block(BlockContent::Audio {
            audio: MediaBlock::default(),
        });
        assert_eq!(block_to_text(&audio), "[Audio]");
    }
}
