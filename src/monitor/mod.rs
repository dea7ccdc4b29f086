//! # 事件与性能监控
//!
//! 记录元素操作耗时，并以后台任务监听元素状态变化与页面网络活动。
//!
//! ## 主要功能
//! - **性能记录**: 按 (元素, 动作) 记录开始时间与耗时，仅显式清理
//! - **页面性能**: 通过注入脚本读取导航与资源耗时，不支持时返回空对象
//! - **状态监听**: 每个注册对应一个 tokio 任务，首次观察到目标状态时回调一次后结束
//! - **网络活动**: 尽力安装 `PerformanceObserver`，上报新观察到的请求
//! - **取消**: 监听任务使用会话取消令牌的子令牌，会话关闭时自动停止
//!
//! ## 模块结构
//! - `performance`: [`PerformanceMonitor`]
//! - `events`: [`ElementEventMonitor`] 与 [`WatchHandle`]
//!
//! ## 使用示例
//! ```rust,no_run
//! use flakeguard::monitor::PerformanceMonitor;
//!
//! # async fn example() {
//! let monitor = PerformanceMonitor::new();
//! let answer = monitor
//!     .time("login-button", "click", async { 42 })
//!     .await;
//! assert_eq!(answer, 42);
//! assert!(monitor.element_metrics("login-button").contains_key("click"));
//! # }
//! ```

pub mod performance;
pub mod events;


pub use events::{ElementEventMonitor, ElementSource, NetworkEntry, WatchHandle, WatchedState};
pub use performance::{PerformanceMonitor, PerformanceRecord, Timer};
