//! # Notion Exam Gen
//!
//! 把 Notion 学习笔记转换成闪卡、选择题和模拟考试的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的分层架构：
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 对外部服务的具体调用
//! - `NotionClient` - Notion REST API（数据库查询、子块列表）
//! - `LlmClient` - OpenAI 兼容的对话补全接口（严格 JSON 模式）
//!
//! ### ② 基础设施层（Infrastructure）
//! - `infrastructure/` - 客户端之上的抽象接缝，测试时可替换为内存实现
//! - `DocumentSource` - 分页读取数据库和子块
//! - `GenerationBackend` - 一次请求换一段 JSON 文本
//!
//! ### ③ 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `DocumentTreeWalker` - 递归遍历笔记树，拍平成语料
//! - `chunk_text` - 带重叠的定长分块
//! - `GenerationClient` - 单块生成与结果解析
//! - `merge_payloads` - 合并、去重、截断
//! - `grade_mcqs` - 选择题判分
//!
//! ### ④ 流程层（Workflow）
//! - `workflow/` - 定义"一次生成请求"的完整处理流程
//! - `ExamPipeline` - 遍历 → 分块 → 逐块生成 → 合并
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator/app` - 应用入口，构建依赖并执行命令
//! - `orchestrator/study_session` - 会话状态（最近结果、收藏的闪卡）
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{DocumentSource, GenerationBackend};
pub use models::{GenerationOutcome, MergedPayload};
pub use orchestrator::{App, StudySession};
pub use services::{DocumentTreeWalker, GenerationClient};
pub use workflow::{ExamPipeline, GenerationRequest};
