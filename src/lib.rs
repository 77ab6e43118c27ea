//! # Decode Mirror
//!
//! 通过远端解码服务批量解码整棵目录树，并把结果镜像到目标目录
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（HTTP 会话），只暴露能力
//! - `RemoteSession` - 唯一的会话 owner，负责登录和收发请求
//! - `markup` - 页面结构扫描
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个服务只做一件事
//! - `TreeClassifier` - 判断文件是否需要远端解码
//! - `Batcher` - 分批
//! - `UploadCoordinator` / `ResultParser` - 上传并解析结果
//! - `ArchiveRetriever` - 下载解码结果
//! - `QueueClearer` - 清理远端队列
//! - `ReconciliationTracker` - 汇总失败文件
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一批文件"的完整处理流程
//! - `BatchCtx` - 上下文封装（目录序号 + 批次序号）
//! - `BatchFlow` - 流程编排（upload → parse → download → clear）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/run_processor` - 整体运行，管理会话和失败汇总
//! - `orchestrator/directory_processor` - 单个目录处理器
//!
//! ## 模块结构

pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use cli::Cli;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::RemoteSession;
pub use models::{Batch, DirectoryMirror, UploadOutcome};
pub use orchestrator::{App, RunReport};
pub use services::ReconciliationTracker;
pub use workflow::{BatchCtx, BatchFlow};
