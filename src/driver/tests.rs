//! Driver layer tests
//!
//! Exercises the in-memory page model the rest of the crate is tested against.

use super::mock::{MockDriver, MockElement, MockOp};
use super::scripts;
use super::traits::*;
use serde_json::json;

async fn login_page() -> MockDriver {
    let driver = MockDriver::new();
    driver
        .add_element(
            "username",
            MockElement::new("input")
                .with_id("username")
                .with_name("user")
                .with_class("form-control input-lg"),
        )
        .await;
    driver
        .add_element(
            "submit",
            MockElement::new("button")
                .with_id("submit")
                .with_class("btn btn-primary")
                .with_text("Sign in")
                .covered_by("overlay"),
        )
        .await;
    driver
        .add_element("overlay", MockElement::new("div").with_class("overlay"))
        .await;
    driver
}

#[tokio::test]
async fn test_locator_display() {
    assert_eq!(Locator::id("submit").to_string(), "id:submit");
    assert_eq!(Locator::css(".btn").to_string(), "css:.btn");
    assert_eq!(Locator::text("Sign in").kind(), "text");
}

#[tokio::test]
async fn test_error_kind_round_trip() {
    let error = DriverError::of_kind(ErrorKind::ElementClickIntercepted, "covered");
    assert_eq!(error.kind(), ErrorKind::ElementClickIntercepted);
    assert!(error.is_transient());
    assert!(!DriverError::NoSuchElement("x".into()).is_transient());
}

#[tokio::test]
async fn test_find_by_supported_locators() {
    let driver = login_page().await;

    for locator in [
        Locator::id("username"),
        Locator::name("user"),
        Locator::ClassName("input-lg".into()),
        Locator::css("input#username"),
        Locator::css(".form-control.input-lg"),
        Locator::css("[name='user']"),
        Locator::css("form input[name=\"user\"]"),
    ] {
        let element = driver.find_element(&locator).await;
        assert!(element.is_ok(), "locator {} should match", locator);
    }

    let by_text = driver.find_element(&Locator::text("Sign")).await.unwrap();
    assert_eq!(driver.get_tag_name(&by_text).await.unwrap(), "button");

    let missing = driver.find_element(&Locator::xpath("//button")).await;
    assert!(matches!(missing, Err(DriverError::NoSuchElement(_))));
}

#[tokio::test]
async fn test_find_elements_returns_all_matches() {
    let driver = login_page().await;
    driver
        .add_element("other", MockElement::new("button").with_class("btn"))
        .await;

    let buttons = driver.find_elements(&Locator::css(".btn")).await.unwrap();
    assert_eq!(buttons.len(), 2);

    let none = driver.find_elements(&Locator::css(".nothing")).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_overlay_intercepts_native_click_only() {
    let driver = login_page().await;
    let submit = driver.find_element(&Locator::id("submit")).await.unwrap();

    let result = driver.click(&submit).await;
    assert_eq!(
        result.unwrap_err().kind(),
        ErrorKind::ElementClickIntercepted
    );

    driver
        .execute_script(scripts::CLICK, vec![ScriptArg::from(&submit)])
        .await
        .unwrap();
    assert_eq!(driver.count("js-click:submit").await, 1);

    let hidden = driver
        .execute_script(
            scripts::HIDE_OVERLAYS,
            vec![
                ScriptArg::from(&submit),
                ScriptArg::from(json!(".overlay, .modal, .dialog")),
            ],
        )
        .await
        .unwrap();
    assert_eq!(hidden, json!(1));

    driver.click(&submit).await.unwrap();
    assert_eq!(driver.count("click:submit").await, 1);
}

#[tokio::test]
async fn test_rerender_makes_references_stale() {
    let driver = login_page().await;
    let before = driver.find_element(&Locator::id("username")).await.unwrap();

    driver.rerender("username").await;

    let result = driver.get_text(&before).await;
    assert_eq!(result.unwrap_err().kind(), ErrorKind::StaleElementReference);

    let after = driver.find_element(&Locator::id("username")).await.unwrap();
    assert_ne!(before, after);
    assert!(driver.is_displayed(&after).await.unwrap());
}

#[tokio::test]
async fn test_max_length_truncates_keys() {
    let driver = MockDriver::new();
    driver
        .add_element("code", MockElement::new("input").with_id("code").with_max_length(4))
        .await;
    let code = driver.find_element(&Locator::id("code")).await.unwrap();

    driver.send_keys(&code, "123456").await.unwrap();
    assert_eq!(
        driver.get_attribute(&code, "value").await.unwrap().as_deref(),
        Some("1234")
    );
}

#[tokio::test]
async fn test_pointer_chain_select_all_and_type() {
    let driver = MockDriver::new();
    driver
        .add_element("q", MockElement::new("input").with_id("q").with_value("old"))
        .await;
    let q = driver.find_element(&Locator::id("q")).await.unwrap();

    driver
        .perform_actions(&[
            PointerAction::MoveTo {
                element: q.clone(),
                offset: None,
            },
            PointerAction::Down,
            PointerAction::Up,
            PointerAction::KeyDown(Key::Control),
            PointerAction::SendKeys("a".into()),
            PointerAction::KeyUp(Key::Control),
            PointerAction::Press(Key::Delete),
            PointerAction::SendKeys("new".into()),
        ])
        .await
        .unwrap();

    assert_eq!(driver.element("q").await.unwrap().value, "new");
}

#[tokio::test]
async fn test_injected_faults_are_consumed() {
    let driver = login_page().await;
    let username = driver.find_element(&Locator::id("username")).await.unwrap();

    driver
        .fail_next(
            Some("username"),
            MockOp::SendKeys,
            DriverError::ElementNotInteractable("animating".into()),
            2,
        )
        .await;

    assert!(driver.send_keys(&username, "a").await.is_err());
    assert!(driver.send_keys(&username, "a").await.is_err());
    assert!(driver.send_keys(&username, "a").await.is_ok());
}

#[tokio::test]
async fn test_context_signal_scripts() {
    let driver = MockDriver::new();

    let response = driver
        .execute_script(scripts::NAVIGATION_RESPONSE_TIME, vec![])
        .await
        .unwrap();
    assert!(response.is_null());

    driver.set_response_time(Some(1500)).await;
    driver.set_page_errors(2).await;
    driver.set_heap_used(42).await;

    assert_eq!(
        driver
            .execute_script(scripts::NAVIGATION_RESPONSE_TIME, vec![])
            .await
            .unwrap(),
        json!(1500)
    );
    assert_eq!(
        driver.execute_script(scripts::PAGE_ERROR_COUNT, vec![]).await.unwrap(),
        json!(2)
    );
    assert_eq!(
        driver.execute_script(scripts::JS_HEAP_USED, vec![]).await.unwrap(),
        json!(42)
    );
}

#[tokio::test]
async fn test_network_entries_require_observer() {
    let driver = MockDriver::new();
    driver.push_network_entry("https://example.com/ignored").await;

    let installed = driver
        .execute_script(scripts::INSTALL_NETWORK_OBSERVER, vec![])
        .await
        .unwrap();
    assert_eq!(installed, json!(true));

    driver.push_network_entry("https://example.com/api").await;
    let entries = driver
        .execute_script(scripts::READ_NETWORK_ENTRIES, vec![])
        .await
        .unwrap();
    assert_eq!(entries.as_array().map(|a| a.len()), Some(1));
}

#[tokio::test]
async fn test_screenshot_is_png() {
    let driver = MockDriver::new();
    let bytes = driver.screenshot().await.unwrap();
    assert_eq!(&bytes[1..4], b"PNG");
}
