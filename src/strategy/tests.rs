//! Strategy and orchestrator tests

use super::*;
use crate::config::Config;
use crate::driver::{
    Driver, DriverError, ElementRef, Locator, MockDriver, MockElement, MockOp, Rect,
};
use crate::Error;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Strategy replaying a fixed list of outcomes and logging its calls
#[derive(Debug)]
struct ScriptedStrategy {
    name: &'static str,
    outcomes: Mutex<VecDeque<Attempt>>,
    log: Arc<Mutex<Vec<String>>>,
    displayed: bool,
}

impl ScriptedStrategy {
    fn new(name: &'static str, outcomes: Vec<Attempt>, log: &Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        Arc::new(Self {
            name,
            outcomes: Mutex::new(outcomes.into()),
            log: log.clone(),
            displayed: false,
        })
    }

    fn next(&self, call: &str) -> Attempt {
        self.log.lock().unwrap().push(format!("{}:{}", self.name, call));
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Attempt::Failed(None))
    }
}

#[async_trait]
impl InteractionStrategy for ScriptedStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Custom(self.name)
    }

    async fn click(&self, _element: &ElementRef) -> Attempt {
        self.next("click")
    }

    async fn type_text(&self, _element: &ElementRef, _text: &str) -> Attempt {
        self.next("type")
    }

    async fn clear(&self, _element: &ElementRef) -> Attempt {
        self.next("clear")
    }

    async fn is_displayed(&self, _element: &ElementRef) -> bool {
        self.log.lock().unwrap().push(format!("{}:displayed", self.name));
        self.displayed
    }

    async fn is_enabled(&self, _element: &ElementRef) -> bool {
        false
    }
}

/// Recovery hook that always hands back the same reference
struct CountingRecovery {
    calls: AtomicUsize,
    result: Option<ElementRef>,
}

#[async_trait]
impl FailureRecovery for CountingRecovery {
    async fn recover(&self, _failure: &DriverError, _element: &ElementRef) -> Option<ElementRef> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

fn element() -> ElementRef {
    ElementRef::new("button#0")
}

fn intercepted() -> Attempt {
    Attempt::Failed(Some(DriverError::ElementClickIntercepted("overlay".into())))
}

#[tokio::test]
async fn test_strict_order_and_short_circuit() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let orchestrator = StrategyOrchestrator::new(vec![
        ScriptedStrategy::new("a", vec![Attempt::Failed(None)], &log),
        ScriptedStrategy::new("b", vec![intercepted()], &log),
        ScriptedStrategy::new("c", vec![Attempt::Succeeded], &log),
        ScriptedStrategy::new("d", vec![Attempt::Succeeded], &log),
    ]);

    orchestrator
        .perform(Interaction::Click, &element(), None)
        .await
        .unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["a:click", "b:click", "c:click"]);
    assert_eq!(
        orchestrator.strategies().await,
        vec![
            StrategyKind::Custom("a"),
            StrategyKind::Custom("b"),
            StrategyKind::Custom("c"),
            StrategyKind::Custom("d"),
        ]
    );
}

#[tokio::test]
async fn test_all_strategies_failing_aggregates_causes() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let orchestrator = StrategyOrchestrator::new(vec![
        ScriptedStrategy::new("a", vec![intercepted()], &log),
        ScriptedStrategy::new("b", vec![Attempt::Failed(None)], &log),
    ]);

    let result = orchestrator
        .perform(Interaction::Type("hello"), &element(), None)
        .await;

    match result {
        Err(Error::StrategiesExhausted {
            operation,
            failures,
        }) => {
            assert_eq!(operation, "type");
            assert_eq!(failures.len(), 2);
            assert_eq!(failures[0].strategy, StrategyKind::Custom("a"));
            assert!(failures[0].cause.is_some());
            assert!(failures[1].cause.is_none());
        }
        other => panic!("expected StrategiesExhausted, got {:?}", other),
    }
}

#[tokio::test]
async fn test_recovery_retries_same_strategy_once() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let orchestrator = StrategyOrchestrator::new(vec![
        ScriptedStrategy::new("a", vec![intercepted(), Attempt::Succeeded], &log),
        ScriptedStrategy::new("b", vec![Attempt::Succeeded], &log),
    ]);
    let recovery = CountingRecovery {
        calls: AtomicUsize::new(0),
        result: Some(element()),
    };

    orchestrator
        .perform(Interaction::Click, &element(), Some(&recovery))
        .await
        .unwrap();

    assert_eq!(recovery.calls.load(Ordering::SeqCst), 1);
    assert_eq!(*log.lock().unwrap(), vec!["a:click", "a:click"]);
}

#[tokio::test]
async fn test_recovery_declined_falls_through() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let orchestrator = StrategyOrchestrator::new(vec![
        ScriptedStrategy::new("a", vec![intercepted()], &log),
        ScriptedStrategy::new("b", vec![Attempt::Failed(None), Attempt::Succeeded], &log),
    ]);
    let recovery = CountingRecovery {
        calls: AtomicUsize::new(0),
        result: None,
    };

    let result = orchestrator
        .perform(Interaction::Clear, &element(), Some(&recovery))
        .await;

    // b failed without a driver cause, so recovery is not consulted for it
    assert!(result.is_err());
    assert_eq!(recovery.calls.load(Ordering::SeqCst), 1);
    assert_eq!(*log.lock().unwrap(), vec!["a:clear", "b:clear"]);
}

#[tokio::test]
async fn test_strategy_list_management() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let orchestrator = StrategyOrchestrator::new(vec![ScriptedStrategy::new("a", vec![], &log)]);

    orchestrator
        .add_strategy(ScriptedStrategy::new("first", vec![], &log))
        .await;
    assert_eq!(
        orchestrator.strategies().await,
        vec![StrategyKind::Custom("first"), StrategyKind::Custom("a")]
    );

    assert!(orchestrator.remove_strategy(StrategyKind::Custom("a")).await);
    assert!(!orchestrator.remove_strategy(StrategyKind::Native).await);
    assert_eq!(orchestrator.strategies().await.len(), 1);
}

#[tokio::test]
async fn test_query_is_true_if_any_strategy_agrees() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let visible = Arc::new(ScriptedStrategy {
        name: "visible",
        outcomes: Mutex::new(VecDeque::new()),
        log: log.clone(),
        displayed: true,
    });
    let orchestrator = StrategyOrchestrator::new(vec![
        ScriptedStrategy::new("hidden", vec![], &log),
        visible,
        ScriptedStrategy::new("never", vec![], &log),
    ]);

    assert!(orchestrator.is_displayed(&element()).await);
    assert_eq!(
        *log.lock().unwrap(),
        vec!["hidden:displayed", "visible:displayed"]
    );
    assert!(!orchestrator.is_enabled(&element()).await);
}

#[tokio::test]
async fn test_default_order() {
    let driver = Arc::new(MockDriver::new());
    let orchestrator = StrategyOrchestrator::with_defaults(driver, &Config::default());
    assert_eq!(
        orchestrator.strategies().await,
        vec![StrategyKind::Native, StrategyKind::Pointer, StrategyKind::Script]
    );
}

async fn limited_input() -> (Arc<MockDriver>, ElementRef) {
    let driver = Arc::new(MockDriver::new());
    driver
        .add_element(
            "pin",
            MockElement::new("input")
                .with_id("pin")
                .with_value("99")
                .with_max_length(4),
        )
        .await;
    let pin = driver.find_element(&Locator::id("pin")).await.unwrap();
    (driver, pin)
}

#[tokio::test(start_paused = true)]
async fn test_type_verification_per_strategy() {
    let config = Config::default();

    let (driver, pin) = limited_input().await;
    let native = NativeStrategy::new(driver.clone(), config.wait_spec(), config.settle_delay());
    assert_eq!(native.type_text(&pin, "1234").await, Attempt::Succeeded);
    assert_eq!(native.type_text(&pin, "123456").await, Attempt::Failed(None));

    let (driver, pin) = limited_input().await;
    let pointer = PointerStrategy::new(driver.clone(), config.wait_spec(), config.pointer_pause());
    assert_eq!(pointer.type_text(&pin, "4321").await, Attempt::Succeeded);
    assert_eq!(driver.element("pin").await.unwrap().value, "4321");
    assert_eq!(pointer.type_text(&pin, "123456").await, Attempt::Failed(None));

    let (driver, pin) = limited_input().await;
    let script = ScriptStrategy::new(driver.clone(), config.settle_delay());
    assert_eq!(script.type_text(&pin, "123456").await, Attempt::Succeeded);
    assert_eq!(script.clear(&pin).await, Attempt::Succeeded);
    assert_eq!(driver.element("pin").await.unwrap().value, "");
}

async fn covered_button() -> (Arc<MockDriver>, ElementRef) {
    let driver = Arc::new(MockDriver::new());
    driver
        .add_element("overlay", MockElement::new("div").with_class("modal"))
        .await;
    driver
        .add_element(
            "save",
            MockElement::new("button").with_id("save").covered_by("overlay"),
        )
        .await;
    let save = driver.find_element(&Locator::id("save")).await.unwrap();
    (driver, save)
}

#[tokio::test(start_paused = true)]
async fn test_overlay_defeats_native_and_pointer_but_not_script() {
    let config = Config::default();
    let (driver, save) = covered_button().await;

    let native = NativeStrategy::new(driver.clone(), config.wait_spec(), config.settle_delay());
    let attempt = native.click(&save).await;
    assert!(matches!(
        attempt.cause(),
        Some(DriverError::ElementClickIntercepted(_))
    ));

    let pointer = PointerStrategy::new(driver.clone(), config.wait_spec(), config.pointer_pause());
    assert!(!pointer.click(&save).await.is_success());

    let script = ScriptStrategy::new(driver.clone(), config.settle_delay());
    assert!(script.click(&save).await.is_success());
    assert_eq!(driver.count("js-click:save").await, 1);
    assert_eq!(driver.count("click:save").await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_pointer_click_retries_with_offset() {
    let config = Config::default();
    let driver = Arc::new(MockDriver::new());
    driver
        .add_element("ok", MockElement::new("button").with_id("ok"))
        .await;
    let ok = driver.find_element(&Locator::id("ok")).await.unwrap();
    driver
        .fail_next(
            Some("ok"),
            MockOp::Pointer,
            DriverError::Script("move target out of bounds".into()),
            1,
        )
        .await;

    let pointer = PointerStrategy::new(driver.clone(), config.wait_spec(), config.pointer_pause());
    assert!(pointer.click(&ok).await.is_success());
    assert_eq!(driver.count("click:ok").await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_pointer_visibility_and_enabled() {
    let config = Config::default();
    let driver = Arc::new(MockDriver::new());
    driver
        .add_element("shown", MockElement::new("div").with_id("shown"))
        .await;
    driver
        .add_element(
            "collapsed",
            MockElement::new("div").with_id("collapsed").with_rect(Rect {
                x: 0.0,
                y: 0.0,
                width: 0.0,
                height: 0.0,
            }),
        )
        .await;
    let shown = driver.find_element(&Locator::id("shown")).await.unwrap();
    let collapsed = driver.find_element(&Locator::id("collapsed")).await.unwrap();

    let pointer = PointerStrategy::new(driver.clone(), config.wait_spec(), config.pointer_pause());
    assert!(pointer.is_displayed(&shown).await);
    assert!(!pointer.is_displayed(&collapsed).await);
    assert!(!pointer.is_enabled(&shown).await);
}

#[tokio::test(start_paused = true)]
async fn test_stale_reference_is_reported_as_cause() {
    let config = Config::default();
    let (driver, pin) = limited_input().await;
    driver.rerender("pin").await;

    let native = NativeStrategy::new(driver.clone(), config.wait_spec(), config.settle_delay());
    let attempt = native.click(&pin).await;
    assert!(matches!(
        attempt.cause(),
        Some(DriverError::StaleElementReference(_))
    ));
}
