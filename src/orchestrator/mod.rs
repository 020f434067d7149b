//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责应用生命周期和会话状态，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 构建客户端和出题流程（只构建一次）
//! - 执行命令行子命令
//! - 读写会话文件
//!
//! ### `study_session` - 学习会话
//! - 最近一次生成结果（后写覆盖先写）
//! - 收藏的闪卡（id 递增，不去重）
//!
//! ## 层次关系
//!
//! ```text
//! app (处理命令)
//!     ↓
//! workflow::ExamPipeline (处理一次生成请求)
//!     ↓
//! services (能力层：walker / chunker / generation / merger / grader)
//!     ↓
//! infrastructure (DocumentSource / GenerationBackend)
//!     ↓
//! clients (NotionClient / LlmClient)
//! ```

pub mod app;
pub mod study_session;

pub use app::App;
pub use study_session::StudySession;
