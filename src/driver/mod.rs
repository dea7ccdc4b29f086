//! # 驱动层
//!
//! 定义弹性层所依赖的浏览器自动化驱动接口。本 crate 不实现任何自动化协议，
//! 所有浏览器交互都通过 [`Driver`] trait 完成。
//!
//! ## 主要功能
//! - **元素定位**: 通过 [`Locator`] 解析单个或多个元素
//! - **基础交互**: 点击、输入、清空、提交
//! - **状态读取**: 文本、属性、标签、可见性、可用性、选中状态、尺寸
//! - **动作链**: 指针移动、按下、释放与键盘输入
//! - **脚本执行**: 在页面中执行 [`scripts`] 中的注入脚本
//! - **错误分类**: [`DriverError::kind`] 提供恢复注册表使用的 [`ErrorKind`]
//!
//! ## 模块结构
//! - `traits`: 驱动 trait 与协议无关的数据类型
//! - `scripts`: 页面注入脚本常量
//! - `mock`: 内存页面模型，用于开发与测试
//!
//! ## 使用示例
//! ```rust,no_run
//! use flakeguard::driver::{Driver, Locator, MockDriver, MockElement};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let driver = MockDriver::new();
//! driver
//!     .add_element("submit", MockElement::new("button").with_id("submit"))
//!     .await;
//!
//! let element = driver.find_element(&Locator::id("submit")).await?;
//! driver.click(&element).await?;
//! # Ok(())
//! # }
//! ```

pub mod traits;
pub mod scripts;
pub mod mock;

#[cfg(test)]
pub mod tests;

pub use traits::{
    Driver, DriverError, DriverResult, ElementRef, ErrorKind, Key, Locator, PointerAction, Rect,
    ScriptArg,
};

// Re-export mock for development/testing
pub use mock::{MockDriver, MockElement, MockOp};
