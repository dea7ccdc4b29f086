//! # 会话上下文
//!
//! 一个自动化会话持有的全部共享状态，以 `Arc` 显式传递给该会话的所有弹性元素。
//!
//! ## 主要功能
//! - **会话标识**: 每个会话使用 UUID 标识并记录创建时间
//! - **驱动与配置**: 持有驱动句柄、静态配置以及可在运行时调整的配置存储
//! - **监控**: 会话级的性能监控与元素事件监控，互不串扰
//! - **重试上下文**: 持有用于推断重试上下文的探针
//! - **生命周期**: 根取消令牌，关闭或销毁会话时停止所有后台监听任务
//!
//! ## 模块结构
//! - `context`: [`SessionContext`] 实现
//!
//! ## 使用示例
//! ```rust,no_run
//! use flakeguard::config::Config;
//! use flakeguard::driver::MockDriver;
//! use flakeguard::session::SessionContext;
//! use std::sync::Arc;
//!
//! let session = SessionContext::new(Arc::new(MockDriver::new()), Config::default());
//! let watcher_token = session.child_token();
//!
//! session.shutdown();
//! assert!(watcher_token.is_cancelled());
//! ```

pub mod context;


pub use context::SessionContext;
