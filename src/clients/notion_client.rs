/// Notion API 客户端
///
/// 封装所有与 Notion REST API 相关的调用逻辑
use std::time::Duration;

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult, SourceError};
use crate::infrastructure::DocumentSource;
use crate::models::{Block, DatabaseEntry, PaginatedList};

/// Notion API 版本
const NOTION_VERSION: &str = "2022-06-28";

/// 数据库查询每页数量（Notion 上限）
const QUERY_PAGE_SIZE: u32 = 100;

/// Notion 客户端
pub struct NotionClient {
    http: reqwest::Client,
    base_url: String,
    secret: String,
}

impl NotionClient {
    /// 创建新的 Notion 客户端
    ///
    /// 每个请求都带超时，超时与其他网络错误走同一条失败路径
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .build()
            .map_err(|e| AppError::source_request_failed("client-builder", e))?;

        Ok(Self {
            http,
            base_url: config.notion_api_base_url.trim_end_matches('/').to_string(),
            secret: config.notion_secret.clone(),
        })
    }

    /// 发送请求并把响应体解析为指定类型
    async fn send<T: DeserializeOwned>(&self, endpoint: &str, request: RequestBuilder) -> AppResult<T> {
        let response = request
            .bearer_auth(&self.secret)
            .header("Notion-Version", NOTION_VERSION)
            .send()
            .await
            .map_err(|e| AppError::source_request_failed(endpoint, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::source_request_failed(endpoint, e))?;

        if !status.is_success() {
            return Err(SourceError::BadResponse {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            }
            .into());
        }

        serde_json::from_str(&body).map_err(|source| {
            SourceError::DecodeFailed {
                endpoint: endpoint.to_string(),
                source,
            }
            .into()
        })
    }
}

/// 构建数据库查询请求体
fn query_body(start_cursor: Option<&str>) -> Value {
    let mut body = json!({ "page_size": QUERY_PAGE_SIZE });
    if let Some(cursor) = start_cursor {
        body["start_cursor"] = json!(cursor);
    }
    body
}

/// 构建子块列表的查询参数
fn children_query(start_cursor: Option<&str>, page_size: Option<u32>) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(size) = page_size {
        params.push(("page_size", size.to_string()));
    }
    if let Some(cursor) = start_cursor {
        params.push(("start_cursor", cursor.to_string()));
    }
    params
}

#[async_trait]
impl DocumentSource for NotionClient {
    async fn query_database(
        &self,
        database_id: &str,
        start_cursor: Option<&str>,
    ) -> AppResult<PaginatedList<DatabaseEntry>> {
        let endpoint = format!("databases/{}/query", database_id);
        debug!("查询数据库 {} (游标: {:?})", database_id, start_cursor);

        let request = self
            .http
            .post(format!("{}/{}", self.base_url, endpoint))
            .json(&query_body(start_cursor));

        self.send(&endpoint, request).await
    }

    async fn list_block_children(
        &self,
        block_id: &str,
        start_cursor: Option<&str>,
        page_size: Option<u32>,
    ) -> AppResult<PaginatedList<Block>> {
        let endpoint = format!("blocks/{}/children", block_id);
        debug!("列出子块 {} (游标: {:?})", block_id, start_cursor);

        let request = self
            .http
            .get(format!("{}/{}", self.base_url, endpoint))
            .query(&children_query(start_cursor, page_size));

        self.send(&endpoint, request).await
    }
}
