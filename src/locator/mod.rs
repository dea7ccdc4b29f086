//! # 自愈定位器
//!
//! 按历史成功率对候选定位器排序并依次尝试，全部失败时根据上次成功解析的元素快照
//! 合成新的候选定位器。
//!
//! ## 主要功能
//! - **候选排序**: 得分 = 成功次数 − 失败次数，得分相同按注册顺序
//! - **原子计数**: 计数器为原子类型，更新时无需锁定候选列表
//! - **元素快照**: 成功解析后尽力记录 `id`、`class`、`name`、文本与标签
//! - **定位自愈**: 按 id > class 选择器 > name > 文本 的优先级合成候选并立即尝试
//! - **引用缓存**: 当前引用整体替换，`invalidate` 后下一次访问重新解析
//!
//! ## 模块结构
//! - `candidate`: 候选定位器与元素快照
//! - `synthesis`: 候选定位器合成
//! - `resolver`: [`SelfHealingLocator`]
//!
//! ## 使用示例
//! ```rust,no_run
//! use flakeguard::driver::{Locator, MockDriver, MockElement};
//! use flakeguard::locator::SelfHealingLocator;
//! use std::sync::Arc;
//!
//! # async fn example() -> flakeguard::Result<()> {
//! let driver = Arc::new(MockDriver::new());
//! driver
//!     .add_element("login", MockElement::new("button").with_id("login"))
//!     .await;
//!
//! let locator = SelfHealingLocator::new(
//!     "login-button",
//!     driver,
//!     vec![Locator::css("#old-login"), Locator::id("login")],
//! )?;
//! let element = locator.resolve().await?;
//! println!("Resolved {} via {:?}", element, locator.ranked_locators().await.first());
//! # Ok(())
//! # }
//! ```

pub mod candidate;
pub mod synthesis;
pub mod resolver;


pub use candidate::{ElementSnapshot, LocatorCandidate};
pub use resolver::SelfHealingLocator;
