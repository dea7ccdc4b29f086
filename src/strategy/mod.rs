//! # 交互策略
//!
//! 以多种方式执行元素交互，按顺序回退直到某一策略成功。
//!
//! ## 主要功能
//! - **原生策略**: 自适应等待元素可交互，滚动到视口并短暂稳定后调用驱动原语
//! - **指针策略**: 通过指针/键盘动作链点击与输入，居中按下失败时以 (1,1) 偏移重试
//! - **脚本策略**: 注入 `el.click()`，失败时派发合成 `MouseEvent`；输入通过设置 `value` 并派发事件
//! - **结果校验**: 输入与清空都会回读值，不一致视为失败
//! - **编排**: [`StrategyOrchestrator`] 按配置顺序尝试，失败时可调用 [`FailureRecovery`] 恢复后重试一次
//!
//! ## 模块结构
//! - `traits`: 策略 trait 与尝试结果
//! - `native`: 原生策略
//! - `pointer`: 指针策略
//! - `script`: 脚本策略
//! - `orchestrator`: 策略编排器
//!
//! ## 使用示例
//! ```rust,no_run
//! use flakeguard::config::Config;
//! use flakeguard::driver::{Driver, Locator, MockDriver, MockElement};
//! use flakeguard::strategy::{Interaction, StrategyOrchestrator};
//! use std::sync::Arc;
//!
//! # async fn example() -> flakeguard::Result<()> {
//! let driver = Arc::new(MockDriver::new());
//! driver
//!     .add_element("search", MockElement::new("input").with_id("q"))
//!     .await;
//! let element = driver.find_element(&Locator::id("q")).await?;
//!
//! let orchestrator = StrategyOrchestrator::with_defaults(driver.clone(), &Config::default());
//! orchestrator
//!     .perform(Interaction::Type("rust"), &element, None)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod traits;
pub mod native;
pub mod pointer;
pub mod script;
pub mod orchestrator;

#[cfg(test)]
pub mod tests;

pub use native::NativeStrategy;
pub use orchestrator::{FailureRecovery, StrategyOrchestrator};
pub use pointer::PointerStrategy;
pub use script::ScriptStrategy;
pub use traits::{Attempt, Interaction, InteractionStrategy, StrategyKind};
