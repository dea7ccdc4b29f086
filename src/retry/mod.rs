//! # 上下文感知重试
//!
//! 根据运行时推断的网络与页面状态选择重试预算和间隔。
//!
//! ## 主要功能
//! - **上下文推断**: 通过导航耗时、页面脚本错误数和 JS 堆占用推断 [`RetryContext`]，信号不可用时降级为 `Unknown`
//! - **策略表**: 按上下文精确匹配 [`RetryPolicy`]，未映射的上下文使用回退策略 (3 次 / 500ms)
//! - **中途切换**: 每次失败后重新采样，上下文变化且有映射时改用新策略
//! - **错误分类**: 编程错误立即返回，不做重试
//!
//! ## 模块结构
//! - `context`: 上下文类型与采样探针
//! - `policy`: 重试策略与策略表
//! - `executor`: 重试执行器
//!
//! ## 使用示例
//! ```rust,no_run
//! use flakeguard::driver::MockDriver;
//! use flakeguard::retry::{ContextAwareRetry, ScriptContextProbe};
//! use std::sync::Arc;
//!
//! # async fn example() -> flakeguard::Result<()> {
//! let driver = Arc::new(MockDriver::new());
//! let retry = ContextAwareRetry::new(Arc::new(ScriptContextProbe::new(driver, 1_000, 100_000_000)));
//!
//! let answer = retry
//!     .execute("compute", || async { Ok::<_, flakeguard::Error>(42) })
//!     .await?;
//! assert_eq!(answer, 42);
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod executor;
pub mod policy;

#[cfg(test)]
pub mod tests;

pub use context::{BrowserState, ContextProbe, NetworkCondition, RetryContext, ScriptContextProbe};
pub use executor::ContextAwareRetry;
pub use policy::{PolicyTable, RetryPolicy};
