//! # 弹性元素
//!
//! 面向调用方的元素接口，把自愈定位、交互策略、故障恢复、上下文感知重试和监控组合在一起。
//!
//! ## 主要功能
//! - **动作**: `click`、`type_text`、`clear` 经由重试包裹的策略编排执行，失败时调用恢复注册表
//! - **过期处理**: 出现过期引用时使缓存失效，下次尝试重新解析
//! - **直接原语**: `submit`、`get_text`、`get_attribute`、`get_tag_name`、`is_selected` 直接调用驱动原语并在重试下执行
//! - **查询降级**: `is_displayed`、`is_enabled` 出错时返回 `false`
//! - **统一失败**: 动作的最终失败统一包装为 [`Error::ActionFailed`](crate::Error::ActionFailed)，保留原因链
//! - **扩展**: 自定义恢复动作、状态监听、网络活动、性能指标、运行时配置、状态校验器
//!
//! ## 模块结构
//! - `resilient`: [`ResilientElement`] 实现
//!
//! ## 使用示例
//! ```rust,no_run
//! use flakeguard::config::Config;
//! use flakeguard::driver::{Locator, MockDriver, MockElement};
//! use flakeguard::element::ResilientElement;
//! use flakeguard::session::SessionContext;
//! use std::sync::Arc;
//!
//! # async fn example() -> flakeguard::Result<()> {
//! let driver = Arc::new(MockDriver::new());
//! driver
//!     .add_element("login", MockElement::new("button").with_id("login-btn"))
//!     .await;
//!
//! let session = SessionContext::new(driver, Config::default());
//! let login = ResilientElement::new(
//!     session.clone(),
//!     "login",
//!     vec![Locator::id("login-btn"), Locator::css("form button")],
//! )?;
//!
//! login.click().await?;
//! println!("{}", login.performance_metrics().await?);
//! session.shutdown();
//! # Ok(())
//! # }
//! ```

pub mod resilient;


pub use resilient::ResilientElement;
