//! # 故障恢复
//!
//! 按驱动错误类型精确匹配恢复动作，在策略失败后把页面恢复到可重试的状态。
//!
//! ## 主要功能
//! - **过期引用**: 使缓存引用失效并通过自愈定位器重新解析
//! - **点击被拦截**: 滚动到元素并隐藏已知遮罩层 (`.overlay, .modal, .dialog`)
//! - **不可交互**: 滚动到元素并短暂等待稳定
//! - **运行时管理**: 可添加、替换、移除恢复动作或清空整个表
//!
//! 只做精确类型匹配，未注册的错误类型返回 `false`。
//!
//! ## 模块结构
//! - `registry`: 恢复动作注册表
//!
//! ## 使用示例
//! ```rust,no_run
//! use flakeguard::driver::{DriverError, ElementRef, ErrorKind, MockDriver};
//! use flakeguard::recovery::RecoveryRegistry;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let registry = RecoveryRegistry::new(Arc::new(MockDriver::new()));
//! registry
//!     .add(ErrorKind::Timeout, |_driver, _element| async { true })
//!     .await;
//!
//! let failure = DriverError::Timeout("slow page".into());
//! assert!(registry.attempt(&failure, &ElementRef::new("button#0")).await);
//! # }
//! ```

pub mod registry;

#[cfg(test)]
pub mod tests;

pub use registry::{RecoveryRegistry, Remedy};
