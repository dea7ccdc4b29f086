//! # 自适应等待
//!
//! 以可配置的轮询策略反复求值条件，直到条件成立、超时或达到轮询次数上限。
//!
//! ## 主要功能
//! - **自适应轮询**: 轮询间隔从 `min_poll` 开始，渐进模式下按 `factor` 递增并以 `max_poll` 封顶
//! - **容错求值**: 条件返回错误或 `None` 视为"尚未成立"，保留最后一次错误作为超时原因
//! - **时间预算**: 每次休眠都会被截断到剩余的超时时间
//! - **元素条件**: 可见、可点击、文本、值等常用元素条件
//! - **状态校验**: [`ElementStateValidator`] 将等待结果降级为布尔值
//!
//! ## 模块结构
//! - `adaptive`: [`WaitSpec`] 与 [`AdaptiveWait`]
//! - `conditions`: 元素等待条件
//! - `validator`: 元素状态校验器
//!
//! ## 使用示例
//! ```rust,no_run
//! use flakeguard::wait::{AdaptiveWait, WaitSpec};
//! use std::time::Duration;
//!
//! # async fn example() -> flakeguard::Result<()> {
//! let wait = AdaptiveWait::new(
//!     WaitSpec::default()
//!         .with_timeout(Duration::from_secs(5))
//!         .with_retry_attempts(20),
//! );
//!
//! let mut polls = 0;
//! let value = wait
//!     .until("counter reaches three", || {
//!         polls += 1;
//!         let current = polls;
//!         async move { Ok::<_, flakeguard::Error>((current >= 3).then_some(current)) }
//!     })
//!     .await?;
//! assert_eq!(value, 3);
//! # Ok(())
//! # }
//! ```

pub mod adaptive;
pub mod conditions;
pub mod validator;


pub use adaptive::{AdaptiveWait, WaitSpec};
pub use validator::ElementStateValidator;
