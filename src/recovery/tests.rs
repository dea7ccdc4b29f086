//! Recovery registry tests

use super::*;
use crate::driver::{Driver, DriverError, ElementRef, ErrorKind, Locator, MockDriver, MockElement};
use crate::locator::SelfHealingLocator;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

const OVERLAYS: &str = ".overlay, .modal, .dialog";

async fn page() -> (Arc<MockDriver>, Arc<SelfHealingLocator>) {
    let driver = Arc::new(MockDriver::new());
    driver
        .add_element("cookie-banner", MockElement::new("div").with_class("overlay"))
        .await;
    driver
        .add_element(
            "buy",
            MockElement::new("button")
                .with_id("buy")
                .covered_by("cookie-banner"),
        )
        .await;
    let locator =
        SelfHealingLocator::new("buy", driver.clone(), vec![Locator::id("buy")]).unwrap();
    (driver, Arc::new(locator))
}

fn registry(driver: &Arc<MockDriver>, locator: &Arc<SelfHealingLocator>) -> RecoveryRegistry {
    RecoveryRegistry::with_defaults(
        driver.clone(),
        locator.clone(),
        OVERLAYS.to_string(),
        Duration::from_millis(500),
    )
}

#[tokio::test]
async fn test_default_remedies() {
    let (driver, locator) = page().await;
    let registry = registry(&driver, &locator);

    assert_eq!(registry.len().await, 3);
    assert!(registry.has_strategy_for(ErrorKind::StaleElementReference).await);
    assert!(registry.has_strategy_for(ErrorKind::ElementClickIntercepted).await);
    assert!(registry.has_strategy_for(ErrorKind::ElementNotInteractable).await);
    assert!(!registry.has_strategy_for(ErrorKind::NoSuchElement).await);
}

#[tokio::test]
async fn test_intercepted_click_hides_overlays() {
    let (driver, locator) = page().await;
    let registry = registry(&driver, &locator);
    let buy = locator.resolve().await.unwrap();

    let error = driver.click(&buy).await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::ElementClickIntercepted);

    assert!(registry.attempt(&error, &buy).await);
    assert!(!driver.element("cookie-banner").await.unwrap().displayed);
    driver.click(&buy).await.unwrap();
}

#[tokio::test]
async fn test_stale_reference_re_resolves() {
    let (driver, locator) = page().await;
    let registry = registry(&driver, &locator);
    let old = locator.resolve().await.unwrap();
    driver.rerender("buy").await;

    let error = driver.get_text(&old).await.unwrap_err();
    assert!(registry.attempt(&error, &old).await);

    let fresh = locator.current().await.unwrap();
    assert_ne!(fresh, old);
    assert!(driver.get_text(&fresh).await.is_ok());
}

#[tokio::test]
async fn test_stale_remedy_fails_when_element_is_gone() {
    let (driver, locator) = page().await;
    let registry = registry(&driver, &locator);
    let old = locator.resolve().await.unwrap();
    driver.detach("buy").await;

    let error = DriverError::StaleElementReference("detached".into());
    assert!(!registry.attempt(&error, &old).await);
}

#[tokio::test(start_paused = true)]
async fn test_not_interactable_scrolls_and_settles() {
    let (driver, locator) = page().await;
    let registry = registry(&driver, &locator);
    let buy = locator.resolve().await.unwrap();
    let started = Instant::now();

    let error = DriverError::ElementNotInteractable("offscreen".into());
    assert!(registry.attempt(&error, &buy).await);
    assert_eq!(started.elapsed(), Duration::from_millis(500));
    assert_eq!(driver.count("scroll:buy").await, 1);
}

#[tokio::test]
async fn test_unmapped_kind_has_no_recovery() {
    let driver = Arc::new(MockDriver::new());
    let registry = RecoveryRegistry::new(driver);
    assert!(registry.is_empty().await);

    let error = DriverError::NoSuchElement("nothing".into());
    assert!(!registry.attempt(&error, &ElementRef::new("x#0")).await);
}

#[tokio::test]
async fn test_add_replace_remove_clear() {
    let (driver, locator) = page().await;
    let registry = registry(&driver, &locator);
    let calls = Arc::new(AtomicU32::new(0));

    let counter = calls.clone();
    registry
        .add(ErrorKind::ElementClickIntercepted, move |_driver, _element| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                false
            }
        })
        .await;
    assert_eq!(registry.len().await, 3);

    let error = DriverError::ElementClickIntercepted("banner".into());
    assert!(!registry.attempt(&error, &ElementRef::new("buy#0")).await);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    // the replaced overlay remedy no longer runs
    assert!(driver.element("cookie-banner").await.unwrap().displayed);

    assert!(registry.remove(ErrorKind::ElementClickIntercepted).await);
    assert!(!registry.remove(ErrorKind::ElementClickIntercepted).await);
    assert_eq!(registry.len().await, 2);

    registry.clear().await;
    assert!(registry.is_empty().await);
}
