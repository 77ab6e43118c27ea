//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责整棵目录树的遍历和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `run_processor` - 整体运行处理器
//! - 管理应用生命周期（校验、登录、运行、报告）
//! - 运行前清理远端队列
//! - 持有会话和失败汇总
//!
//! ### `directory_processor` - 单个目录处理器
//! - 分类、复制、跳过已存在文件
//! - 分批并逐批交给 `BatchFlow`
//!
//! ## 层次关系
//!
//! ```text
//! run_processor (处理整棵树)
//!     ↓
//! directory_processor (处理一个目录)
//!     ↓
//! workflow::BatchFlow (处理一批文件)
//!     ↓
//! services (能力层：分类 / 上传 / 解析 / 下载 / 清理)
//!     ↓
//! infrastructure (基础设施：RemoteSession)
//! ```

pub mod directory_processor;
pub mod run_processor;

// 重新导出主要类型
pub use directory_processor::{DirectoryProcessor, RunStats};
pub use run_processor::{App, RunReport};
