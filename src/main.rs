//! # Flakeguard 演示入口
//!
//! 在内存模拟页面上演示弹性元素如何处理不稳定的界面交互。
//!
//! ## 主要功能
//! - 初始化日志并从环境变量加载配置
//! - 构建带遮罩层和易过期按钮的模拟登录页
//! - 依次演示定位自愈、输入回退、遮罩恢复、过期引用恢复与状态监听
//! - 以 JSON 输出性能指标
//!
//! ## 环境变量
//! - `RUST_LOG`: 日志级别（优先于 `FLAKEGUARD_LOG_LEVEL`，默认: info）
//! - `FLAKEGUARD_*`: 见 [`Config::from_env`]

use flakeguard::{
    config::Config,
    driver::{Locator, MockDriver, MockElement},
    ResilientElement, SessionContext,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

async fn build_login_page() -> Arc<MockDriver> {
    let driver = Arc::new(MockDriver::new());
    driver
        .add_element(
            "cookie-banner",
            MockElement::new("div")
                .with_class("overlay cookie-consent")
                .with_text("We use cookies"),
        )
        .await;
    driver
        .add_element(
            "username",
            MockElement::new("input")
                .with_id("user-field")
                .with_name("username")
                .with_max_length(12),
        )
        .await;
    driver
        .add_element(
            "password",
            MockElement::new("input")
                .with_id("password")
                .with_name("password"),
        )
        .await;
    driver
        .add_element(
            "login",
            MockElement::new("button")
                .with_id("login-btn")
                .with_class("btn primary")
                .with_text("Sign in")
                .covered_by("cookie-banner"),
        )
        .await;
    driver
        .add_element(
            "welcome",
            MockElement::new("div")
                .with_id("welcome")
                .with_text("Welcome back")
                .hidden(),
        )
        .await;
    driver.set_response_time(Some(180)).await;
    driver
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    // Initialize tracing - RUST_LOG wins over FLAKEGUARD_LOG_LEVEL
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|v| v.parse::<Level>().ok())
        .unwrap_or_else(|| config.tracing_level());

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Flakeguard demo v{}", flakeguard::VERSION);
    info!(
        "Configuration loaded: wait={}ms, overlays='{}'",
        config.wait_timeout_ms, config.overlay_selectors
    );

    let driver = build_login_page().await;
    let session = SessionContext::new(driver.clone(), config);
    info!("Session {} ready", session.id());

    // The first locator is outdated; ranking moves the working one to the front
    let username = ResilientElement::new(
        session.clone(),
        "username",
        vec![Locator::id("username"), Locator::name("username")],
    )?;
    let password = ResilientElement::new(session.clone(), "password", vec![Locator::id("password")])?;
    let login = ResilientElement::new(
        session.clone(),
        "login",
        vec![Locator::id("login-btn"), Locator::css("form button.primary")],
    )?;
    let welcome = ResilientElement::new(session.clone(), "welcome", vec![Locator::id("welcome")])?;

    username.type_text("demo-user").await?;
    password.type_text("correct horse battery staple").await?;
    info!(
        "Username candidates by rank: {:?}",
        username.locator().ranked_locators().await
    );

    let greeted = welcome.wait_for_state("visible", |element| {
        info!("Welcome banner shown as {}", element);
    })?;

    // Resolve the button, then re-render it so the cached reference goes stale
    if login.is_displayed().await {
        driver.rerender("login").await;
    }
    login.click().await?;
    info!("Journal: {:?}", driver.journal().await);

    driver.update("welcome", |e| e.displayed = true).await;
    if tokio::time::timeout(Duration::from_secs(2), greeted.finished())
        .await
        .is_err()
    {
        warn!("Welcome banner did not show up in time");
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&session.performance().all_metrics())?
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&login.performance_metrics().await?)?
    );

    session.shutdown();
    info!("Demo complete");
    Ok(())
}
