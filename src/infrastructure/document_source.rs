//! 文档数据源 - 基础设施层
//!
//! 只暴露"分页读取"能力，不认识页面文本、不处理遍历流程

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{Block, DatabaseEntry, PaginatedList};

/// 分页读取文档树的能力
///
/// 职责：
/// - 按父 ID 查询数据库的一页结果
/// - 按父 ID 列出子块的一页结果
/// - 不做重试、不吞错误（由遍历层决定如何降级）
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// 查询数据库的一页条目
    ///
    /// # 参数
    /// - `database_id`: 数据库 ID
    /// - `start_cursor`: 上一页返回的游标，首页为 None
    async fn query_database(
        &self,
        database_id: &str,
        start_cursor: Option<&str>,
    ) -> AppResult<PaginatedList<DatabaseEntry>>;

    /// 列出块（或页面）的一页子块
    ///
    /// # 参数
    /// - `block_id`: 父块 ID
    /// - `start_cursor`: 游标
    /// - `page_size`: 每页数量，None 使用数据源默认值
    async fn list_block_children(
        &self,
        block_id: &str,
        start_cursor: Option<&str>,
        page_size: Option<u32>,
    ) -> AppResult<PaginatedList<Block>>;
}
