//! Notion 数据模型
//!
//! 属性和块都按 `type` 字段分派成枚举，未知类型落到兜底变体，
//! 不在运行时对 JSON 形状做反射判断

use std::collections::BTreeMap;

use serde::Deserialize;

/// 分页列表（数据库查询 / 子块列表共用）
#[derive(Debug, Clone, Deserialize)]
pub struct PaginatedList<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

impl<T> PaginatedList<T> {
    /// 构造最后一页
    pub fn last(results: Vec<T>) -> Self {
        Self {
            results,
            has_more: false,
            next_cursor: None,
        }
    }

    /// 构造后面还有数据的一页
    pub fn more(results: Vec<T>, next_cursor: impl Into<String>) -> Self {
        Self {
            results,
            has_more: true,
            next_cursor: Some(next_cursor.into()),
        }
    }
}

/// 富文本片段，只关心纯文本
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,
}

impl RichText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            plain_text: text.into(),
        }
    }
}

/// 拼接富文本片段并去掉首尾空白
pub fn plain_text(runs: &[RichText]) -> String {
    runs.iter()
        .map(|r| r.plain_text.as_str())
        .collect::<String>()
        .trim()
        .to_string()
}

/// 页面属性值
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title {
        #[serde(default)]
        title: Vec<RichText>,
    },
    RichText {
        #[serde(default)]
        rich_text: Vec<RichText>,
    },
    Relation {
        #[serde(default)]
        relation: Vec<RelationRef>,
    },
    /// 其余属性类型（select、number、date 等）以及将来新增的类型
    #[serde(other)]
    Unknown,
}

impl PropertyValue {
    /// 标题或富文本属性的纯文本；其他类型返回 None
    pub fn text(&self) -> Option<String> {
        match self {
            PropertyValue::Title { title } => Some(plain_text(title)),
            PropertyValue::RichText { rich_text } => Some(plain_text(rich_text)),
            _ => None,
        }
    }

    pub fn is_title(&self) -> bool {
        matches!(self, PropertyValue::Title { .. })
    }

    pub fn is_relation(&self) -> bool {
        matches!(self, PropertyValue::Relation { .. })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelationRef {
    pub id: String,
}

/// 数据库查询返回的一行（通常是页面，也可能是数据库）
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseEntry {
    #[serde(default = "default_object")]
    pub object: String,
    pub id: String,
    #[serde(default)]
    pub has_children: bool,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
}

fn default_object() -> String {
    "page".to_string()
}

impl DatabaseEntry {
    /// 是否被数据源显式标记为数据库
    pub fn is_database_object(&self) -> bool {
        self.object == "database"
    }

    /// 是否存在 relation 类型的属性
    pub fn has_relation_property(&self) -> bool {
        self.properties.values().any(PropertyValue::is_relation)
    }
}

/// 内容块
#[derive(Debug, Clone, Deserialize)]
pub struct Block {
    pub id: String,
    #[serde(default)]
    pub has_children: bool,
    #[serde(flatten)]
    pub content: BlockContent,
}

impl Block {
    pub fn new(id: impl Into<String>, content: BlockContent) -> Self {
        Self {
            id: id.into(),
            has_children: false,
            content,
        }
    }

    pub fn with_children(mut self) -> Self {
        self.has_children = true;
        self
    }

    pub fn is_child_database(&self) -> bool {
        matches!(self.content, BlockContent::ChildDatabase)
    }
}

/// 文本类块的内容
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
}

impl TextBlock {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            rich_text: vec![RichText::new(text)],
        }
    }
}

/// 代码块内容
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CodeBlock {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub language: String,
}

/// 媒体块内容（只取说明文字）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaBlock {
    #[serde(default)]
    pub caption: Vec<RichText>,
}

/// 块类型
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockContent {
    Paragraph {
        #[serde(default)]
        paragraph: TextBlock,
    },
    #[serde(rename = "heading_1")]
    Heading1 {
        #[serde(default)]
        heading_1: TextBlock,
    },
    #[serde(rename = "heading_2")]
    Heading2 {
        #[serde(default)]
        heading_2: TextBlock,
    },
    #[serde(rename = "heading_3")]
    Heading3 {
        #[serde(default)]
        heading_3: TextBlock,
    },
    Callout {
        #[serde(default)]
        callout: TextBlock,
    },
    Quote {
        #[serde(default)]
        quote: TextBlock,
    },
    Toggle {
        #[serde(default)]
        toggle: TextBlock,
    },
    ToDo {
        #[serde(default)]
        to_do: TextBlock,
    },
    BulletedListItem {
        #[serde(default)]
        bulleted_list_item: TextBlock,
    },
    NumberedListItem {
        #[serde(default)]
        numbered_list_item: TextBlock,
    },
    Code {
        #[serde(default)]
        code: CodeBlock,
    },
    Table,
    ChildDatabase,
    Image {
        #[serde(default)]
        image: MediaBlock,
    },
    File {
        #[serde(default)]
        file: MediaBlock,
    },
    Video {
        #[serde(default)]
        video: MediaBlock,
    },
    Audio {
        #[serde(default)]
        audio: MediaBlock,
    },
    #[serde(other)]
    Unsupported,
}

impl BlockContent {
    pub fn paragraph(text: impl Into<String>) -> Self {
        BlockContent::Paragraph {
            paragraph: TextBlock::from_text(text),
        }
    }
}
