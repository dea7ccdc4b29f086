//! Mock driver implementation
//!
//! An in-memory page model implementing [`Driver`] for development and testing.
//! Elements are registered under a test-chosen key; references handed out are
//! `"{key}#{generation}"` so that re-rendering an element (bumping its
//! generation) turns every reference resolved earlier into a stale one.
//!
//! Supported locators: `Id`, `Name`, `ClassName`, `TagName`, `Text` and simple
//! CSS (tag, `#id`, `.class`, `[attr='value']`, comma lists; descendant
//! combinators match on the right-most compound). XPath never matches.

use async_trait::async_trait;
use base64::Engine;
use serde_json::{json, Value};
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::scripts;
use super::traits::*;

/// 1x1 transparent PNG returned by [`MockDriver::screenshot`]
const MOCK_SCREENSHOT_PNG: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

/// Element in the mock page
#[derive(Debug, Clone, PartialEq)]
pub struct MockElement {
    pub tag: String,
    pub attributes: HashMap<String, String>,
    pub text: String,
    pub value: String,
    pub displayed: bool,
    pub enabled: bool,
    pub selected: bool,
    pub rect: Rect,
    /// Truncates keyboard input like the `maxlength` attribute
    pub max_length: Option<usize>,
    /// Key of an overlay element that intercepts clicks while displayed
    pub covered_by: Option<String>,
}

impl MockElement {
    /// Create a visible, enabled element with the given tag
    pub fn new<S: Into<String>>(tag: S) -> Self {
        Self {
            tag: tag.into(),
            attributes: HashMap::new(),
            text: String::new(),
            value: String::new(),
            displayed: true,
            enabled: true,
            selected: false,
            rect: Rect {
                x: 10.0,
                y: 10.0,
                width: 120.0,
                height: 32.0,
            },
            max_length: None,
            covered_by: None,
        }
    }

    pub fn with_attribute<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_id<S: Into<String>>(self, id: S) -> Self {
        self.with_attribute("id", id)
    }

    pub fn with_class<S: Into<String>>(self, class: S) -> Self {
        self.with_attribute("class", class)
    }

    pub fn with_name<S: Into<String>>(self, name: S) -> Self {
        self.with_attribute("name", name)
    }

    pub fn with_text<S: Into<String>>(mut self, text: S) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_value<S: Into<String>>(mut self, value: S) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn covered_by<S: Into<String>>(mut self, overlay_key: S) -> Self {
        self.covered_by = Some(overlay_key.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Attribute lookup; `value` reads the live value
    pub fn attribute(&self, name: &str) -> Option<String> {
        if name == "value" {
            return Some(self.value.clone());
        }
        self.attributes.get(name).cloned()
    }

    fn has_class(&self, class: &str) -> bool {
        self.attributes
            .get("class")
            .map(|c| c.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    fn accept_keys(&mut self, text: &str) {
        self.value.push_str(text);
        if let Some(max) = self.max_length {
            self.value = self.value.chars().take(max).collect();
        }
    }

    fn matches(&self, locator: &Locator) -> bool {
        match locator {
            Locator::Id(id) => self.attributes.get("id") == Some(id),
            Locator::Name(name) => self.attributes.get("name") == Some(name),
            Locator::ClassName(class) => self.has_class(class),
            Locator::TagName(tag) => self.tag.eq_ignore_ascii_case(tag),
            Locator::Text(text) => !text.is_empty() && self.text.contains(text.as_str()),
            Locator::Css(selector) => css_matches(selector, self),
            Locator::XPath(_) => false,
        }
    }
}

/// Driver operation a fault can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockOp {
    Find,
    Click,
    SendKeys,
    Clear,
    Submit,
    Read,
    Pointer,
    Script,
}

/// Injected failure
#[derive(Debug, Clone)]
struct Fault {
    /// Element key (or locator display string for `Find`); `None` matches all
    target: Option<String>,
    op: MockOp,
    error: DriverError,
    remaining: u32,
}

#[derive(Debug)]
struct Slot {
    key: String,
    element: MockElement,
    generation: u64,
    detached: bool,
}

#[derive(Debug)]
struct MockState {
    slots: Vec<Slot>,
    faults: Vec<Fault>,
    journal: Vec<String>,
    submissions: Vec<String>,
    script_results: HashMap<String, Value>,
    viewport: (f64, f64),
    response_time_ms: Option<i64>,
    page_errors: u64,
    heap_used: u64,
    performance_supported: bool,
    network_supported: bool,
    observer_installed: bool,
    network_entries: Vec<Value>,
}

impl MockState {
    fn slot_index(&self, element: &ElementRef) -> DriverResult<usize> {
        let (key, generation) = element
            .id()
            .rsplit_once('#')
            .and_then(|(k, g)| g.parse::<u64>().ok().map(|g| (k, g)))
            .ok_or_else(|| DriverError::InvalidArgument(format!("not a mock reference: {}", element)))?;

        let index = self
            .slots
            .iter()
            .position(|s| s.key == key)
            .ok_or_else(|| DriverError::NoSuchElement(key.to_string()))?;

        let slot = &self.slots[index];
        if slot.detached || slot.generation != generation {
            return Err(DriverError::StaleElementReference(format!(
                "{} is no longer attached to the DOM",
                element
            )));
        }
        Ok(index)
    }

    fn take_fault(&mut self, target: Option<&str>, op: MockOp) -> DriverResult<()> {
        let position = self.faults.iter().position(|f| {
            f.op == op && (f.target.is_none() || f.target.as_deref() == target)
        });
        if let Some(position) = position {
            let fault = &mut self.faults[position];
            let error = fault.error.clone();
            fault.remaining = fault.remaining.saturating_sub(1);
            if fault.remaining == 0 {
                self.faults.remove(position);
            }
            return Err(error);
        }
        Ok(())
    }

    /// Resolve the slot of a reference and apply any injected fault
    fn checked(&mut self, element: &ElementRef, op: MockOp) -> DriverResult<usize> {
        let index = self.slot_index(element)?;
        let key = self.slots[index].key.clone();
        self.take_fault(Some(&key), op)?;
        Ok(index)
    }

    fn overlay_blocking(&self, index: usize) -> Option<String> {
        let overlay_key = self.slots[index].element.covered_by.as_ref()?;
        self.slots
            .iter()
            .find(|s| &s.key == overlay_key && !s.detached && s.element.displayed)
            .map(|s| s.key.clone())
    }

    fn native_click(&mut self, index: usize) -> DriverResult<()> {
        let slot = &self.slots[index];
        if !slot.element.displayed {
            return Err(DriverError::ElementNotInteractable(format!(
                "{} is not visible",
                slot.key
            )));
        }
        if !slot.element.enabled {
            return Err(DriverError::ElementNotInteractable(format!(
                "{} is disabled",
                slot.key
            )));
        }
        if let Some(overlay) = self.overlay_blocking(index) {
            return Err(DriverError::ElementClickIntercepted(format!(
                "{} would receive the click instead of {}",
                overlay, self.slots[index].key
            )));
        }
        let key = self.slots[index].key.clone();
        self.journal.push(format!("click:{}", key));
        Ok(())
    }

    fn ensure_typeable(&self, index: usize) -> DriverResult<()> {
        let slot = &self.slots[index];
        if !slot.element.displayed || !slot.element.enabled {
            return Err(DriverError::ElementNotInteractable(format!(
                "{} cannot accept input",
                slot.key
            )));
        }
        Ok(())
    }

    fn reference(&self, index: usize) -> ElementRef {
        let slot = &self.slots[index];
        ElementRef::new(format!("{}#{}", slot.key, slot.generation))
    }

    fn element_arg(&self, args: &[ScriptArg]) -> Option<ElementRef> {
        match args.first() {
            Some(ScriptArg::Element(element)) => Some(element.clone()),
            _ => None,
        }
    }

    fn string_arg(args: &[ScriptArg], position: usize) -> String {
        match args.get(position) {
            Some(ScriptArg::Value(Value::String(s))) => s.clone(),
            Some(ScriptArg::Value(v)) => v.to_string(),
            _ => String::new(),
        }
    }

    fn run_script(&mut self, script: &str, args: &[ScriptArg]) -> DriverResult<Value> {
        let target = self.element_arg(args);
        let index = match &target {
            Some(element) => Some(self.checked(element, MockOp::Script)?),
            None => {
                self.take_fault(None, MockOp::Script)?;
                None
            }
        };
        let require = |index: Option<usize>| {
            index.ok_or_else(|| DriverError::Script("arguments[0] is undefined".to_string()))
        };

        match script {
            scripts::SCROLL_INTO_VIEW => {
                let index = require(index)?;
                self.journal.push(format!("scroll:{}", self.slots[index].key));
                Ok(Value::Null)
            }
            scripts::CLICK | scripts::DISPATCH_CLICK => {
                let index = require(index)?;
                self.journal.push(format!("js-click:{}", self.slots[index].key));
                Ok(Value::Null)
            }
            scripts::SET_VALUE => {
                let index = require(index)?;
                self.slots[index].element.value = Self::string_arg(args, 1);
                self.journal.push(format!("js-set-value:{}", self.slots[index].key));
                Ok(Value::Null)
            }
            scripts::GET_VALUE => {
                let index = require(index)?;
                Ok(Value::String(self.slots[index].element.value.clone()))
            }
            scripts::IS_VISIBLE => Ok(Value::Bool(self.slots[require(index)?].element.displayed)),
            scripts::IS_ENABLED => Ok(Value::Bool(self.slots[require(index)?].element.enabled)),
            scripts::VIEWPORT_SIZE => Ok(json!({
                "width": self.viewport.0,
                "height": self.viewport.1,
            })),
            scripts::HIDE_OVERLAYS => {
                let selectors = Self::string_arg(args, 1);
                let mut hidden = 0;
                for slot in self.slots.iter_mut().filter(|s| !s.detached) {
                    if css_matches(&selectors, &slot.element) && slot.element.displayed {
                        slot.element.displayed = false;
                        hidden += 1;
                    }
                }
                self.journal.push(format!("hide-overlays:{}", hidden));
                Ok(json!(hidden))
            }
            scripts::NAVIGATION_RESPONSE_TIME => Ok(self
                .response_time_ms
                .map(|ms| json!(ms))
                .unwrap_or(Value::Null)),
            scripts::PAGE_ERROR_COUNT => Ok(json!(self.page_errors)),
            scripts::JS_HEAP_USED => Ok(json!(self.heap_used)),
            scripts::INSTALL_NETWORK_OBSERVER => {
                self.observer_installed = self.network_supported;
                Ok(Value::Bool(self.network_supported))
            }
            scripts::READ_NETWORK_ENTRIES => {
                if !self.network_supported {
                    return Ok(Value::Null);
                }
                Ok(Value::Array(self.network_entries.clone()))
            }
            scripts::CLEAR_NETWORK_ENTRIES => {
                self.network_entries.clear();
                Ok(Value::Null)
            }
            scripts::PAGE_PERFORMANCE => {
                if !self.performance_supported {
                    return Ok(Value::Null);
                }
                Ok(json!({
                    "timing": { "responseTime": self.response_time_ms },
                    "navigation": [],
                    "resources": self.network_entries.clone(),
                }))
            }
            other => Ok(self.script_results.get(other).cloned().unwrap_or(Value::Null)),
        }
    }
}

/// Mock driver
#[derive(Debug)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    /// Create an empty mock page
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                slots: Vec::new(),
                faults: Vec::new(),
                journal: Vec::new(),
                submissions: Vec::new(),
                script_results: HashMap::new(),
                viewport: (1920.0, 1080.0),
                response_time_ms: None,
                page_errors: 0,
                heap_used: 0,
                performance_supported: true,
                network_supported: true,
                observer_installed: false,
                network_entries: Vec::new(),
            }),
        }
    }

    /// Add an element under a test-chosen key
    pub async fn add_element<S: Into<String>>(&self, key: S, element: MockElement) {
        let mut state = self.state.lock().await;
        state.slots.push(Slot {
            key: key.into(),
            element,
            generation: 0,
            detached: false,
        });
    }

    /// Mutate an element in place; returns false when the key is unknown
    pub async fn update<F>(&self, key: &str, f: F) -> bool
    where
        F: FnOnce(&mut MockElement),
    {
        let mut state = self.state.lock().await;
        match state.slots.iter_mut().find(|s| s.key == key) {
            Some(slot) => {
                f(&mut slot.element);
                true
            }
            None => false,
        }
    }

    /// Snapshot of an element
    pub async fn element(&self, key: &str) -> Option<MockElement> {
        let state = self.state.lock().await;
        state
            .slots
            .iter()
            .find(|s| s.key == key)
            .map(|s| s.element.clone())
    }

    /// Re-render an element: earlier references become stale
    pub async fn rerender(&self, key: &str) {
        let mut state = self.state.lock().await;
        if let Some(slot) = state.slots.iter_mut().find(|s| s.key == key) {
            slot.generation += 1;
        }
    }

    /// Detach an element from the page
    pub async fn detach(&self, key: &str) {
        let mut state = self.state.lock().await;
        if let Some(slot) = state.slots.iter_mut().find(|s| s.key == key) {
            slot.detached = true;
        }
    }

    /// Re-attach a detached element (as a new render)
    pub async fn attach(&self, key: &str) {
        let mut state = self.state.lock().await;
        if let Some(slot) = state.slots.iter_mut().find(|s| s.key == key) {
            slot.detached = false;
            slot.generation += 1;
        }
    }

    /// Fail the next `times` calls of `op` on `target` with `error`
    ///
    /// For [`MockOp::Find`] the target is the locator's display string.
    pub async fn fail_next(&self, target: Option<&str>, op: MockOp, error: DriverError, times: u32) {
        let mut state = self.state.lock().await;
        state.faults.push(Fault {
            target: target.map(str::to_string),
            op,
            error,
            remaining: times,
        });
    }

    /// Set the navigation response time reported to context probes
    pub async fn set_response_time(&self, ms: Option<i64>) {
        self.state.lock().await.response_time_ms = ms;
    }

    /// Set the number of page script errors
    pub async fn set_page_errors(&self, count: u64) {
        self.state.lock().await.page_errors = count;
    }

    /// Set the reported JS heap usage
    pub async fn set_heap_used(&self, bytes: u64) {
        self.state.lock().await.heap_used = bytes;
    }

    /// Toggle availability of the performance timing facility
    pub async fn set_performance_supported(&self, supported: bool) {
        self.state.lock().await.performance_supported = supported;
    }

    /// Toggle availability of the network observer facility
    pub async fn set_network_supported(&self, supported: bool) {
        self.state.lock().await.network_supported = supported;
    }

    /// Record a network request (only visible once an observer is installed)
    pub async fn push_network_entry<S: Into<String>>(&self, name: S) {
        let mut state = self.state.lock().await;
        if state.observer_installed {
            let entry = json!({
                "name": name.into(),
                "entry_type": "resource",
                "start_time": 0.0,
                "duration": 12.5,
            });
            state.network_entries.push(entry);
        }
    }

    /// Register the result of an arbitrary script
    pub async fn set_script_result<S: Into<String>>(&self, script: S, value: Value) {
        self.state.lock().await.script_results.insert(script.into(), value);
    }

    /// Set the viewport size
    pub async fn set_viewport(&self, width: f64, height: f64) {
        self.state.lock().await.viewport = (width, height);
    }

    /// Journal of effective interactions (`click:key`, `js-click:key`, ...)
    pub async fn journal(&self) -> Vec<String> {
        self.state.lock().await.journal.clone()
    }

    /// Number of journal entries starting with `prefix`
    pub async fn count(&self, prefix: &str) -> usize {
        self.state
            .lock()
            .await
            .journal
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }

    /// Keys of elements whose form was submitted
    pub async fn submissions(&self) -> Vec<String> {
        self.state.lock().await.submissions.clone()
    }
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Driver for MockDriver {
    async fn find_element(&self, locator: &Locator) -> DriverResult<ElementRef> {
        let mut state = self.state.lock().await;
        state.take_fault(Some(&locator.to_string()), MockOp::Find)?;
        state.journal.push(format!("find:{}", locator));
        let index = state
            .slots
            .iter()
            .position(|s| !s.detached && s.element.matches(locator))
            .ok_or_else(|| DriverError::NoSuchElement(format!("unable to locate {}", locator)))?;
        Ok(state.reference(index))
    }

    async fn find_elements(&self, locator: &Locator) -> DriverResult<Vec<ElementRef>> {
        let mut state = self.state.lock().await;
        state.take_fault(Some(&locator.to_string()), MockOp::Find)?;
        state.journal.push(format!("find-all:{}", locator));
        let indices: Vec<usize> = state
            .slots
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.detached && s.element.matches(locator))
            .map(|(i, _)| i)
            .collect();
        Ok(indices.into_iter().map(|i| state.reference(i)).collect())
    }

    async fn click(&self, element: &ElementRef) -> DriverResult<()> {
        let mut state = self.state.lock().await;
        let index = state.checked(element, MockOp::Click)?;
        state.native_click(index)
    }

    async fn send_keys(&self, element: &ElementRef, text: &str) -> DriverResult<()> {
        let mut state = self.state.lock().await;
        let index = state.checked(element, MockOp::SendKeys)?;
        state.ensure_typeable(index)?;
        state.slots[index].element.accept_keys(text);
        let key = state.slots[index].key.clone();
        state.journal.push(format!("keys:{}", key));
        Ok(())
    }

    async fn clear(&self, element: &ElementRef) -> DriverResult<()> {
        let mut state = self.state.lock().await;
        let index = state.checked(element, MockOp::Clear)?;
        state.ensure_typeable(index)?;
        state.slots[index].element.value.clear();
        let key = state.slots[index].key.clone();
        state.journal.push(format!("clear:{}", key));
        Ok(())
    }

    async fn submit(&self, element: &ElementRef) -> DriverResult<()> {
        let mut state = self.state.lock().await;
        let index = state.checked(element, MockOp::Submit)?;
        let key = state.slots[index].key.clone();
        state.submissions.push(key.clone());
        state.journal.push(format!("submit:{}", key));
        Ok(())
    }

    async fn get_text(&self, element: &ElementRef) -> DriverResult<String> {
        let mut state = self.state.lock().await;
        let index = state.checked(element, MockOp::Read)?;
        Ok(state.slots[index].element.text.clone())
    }

    async fn get_attribute(&self, element: &ElementRef, name: &str) -> DriverResult<Option<String>> {
        let mut state = self.state.lock().await;
        let index = state.checked(element, MockOp::Read)?;
        Ok(state.slots[index].element.attribute(name))
    }

    async fn get_tag_name(&self, element: &ElementRef) -> DriverResult<String> {
        let mut state = self.state.lock().await;
        let index = state.checked(element, MockOp::Read)?;
        Ok(state.slots[index].element.tag.clone())
    }

    async fn is_displayed(&self, element: &ElementRef) -> DriverResult<bool> {
        let mut state = self.state.lock().await;
        let index = state.checked(element, MockOp::Read)?;
        Ok(state.slots[index].element.displayed)
    }

    async fn is_enabled(&self, element: &ElementRef) -> DriverResult<bool> {
        let mut state = self.state.lock().await;
        let index = state.checked(element, MockOp::Read)?;
        Ok(state.slots[index].element.enabled)
    }

    async fn is_selected(&self, element: &ElementRef) -> DriverResult<bool> {
        let mut state = self.state.lock().await;
        let index = state.checked(element, MockOp::Read)?;
        Ok(state.slots[index].element.selected)
    }

    async fn rect(&self, element: &ElementRef) -> DriverResult<Rect> {
        let mut state = self.state.lock().await;
        let index = state.checked(element, MockOp::Read)?;
        Ok(state.slots[index].element.rect)
    }

    async fn perform_actions(&self, actions: &[PointerAction]) -> DriverResult<()> {
        let mut state = self.state.lock().await;
        let mut target: Option<usize> = None;
        let mut control = false;
        let mut select_all = false;

        for action in actions {
            match action {
                PointerAction::MoveTo { element, .. } => {
                    let index = state.checked(element, MockOp::Pointer)?;
                    if !state.slots[index].element.displayed {
                        return Err(DriverError::ElementNotInteractable(format!(
                            "cannot move pointer to hidden {}",
                            state.slots[index].key
                        )));
                    }
                    target = Some(index);
                }
                PointerAction::Pause(_) | PointerAction::Down => {}
                PointerAction::Up => {
                    let index = target.ok_or_else(|| {
                        DriverError::InvalidArgument("pointer released without a target".to_string())
                    })?;
                    state.native_click(index)?;
                }
                PointerAction::KeyDown(Key::Control) => control = true,
                PointerAction::KeyUp(Key::Control) => control = false,
                PointerAction::KeyDown(_) | PointerAction::KeyUp(_) => {}
                PointerAction::SendKeys(text) => {
                    let index = target.ok_or_else(|| {
                        DriverError::InvalidArgument("no focused element for key input".to_string())
                    })?;
                    state.ensure_typeable(index)?;
                    if control && text == "a" {
                        select_all = true;
                    } else {
                        state.slots[index].element.accept_keys(text);
                    }
                }
                PointerAction::Press(Key::Delete) | PointerAction::Press(Key::Backspace) => {
                    if let Some(index) = target {
                        if select_all {
                            state.slots[index].element.value.clear();
                            select_all = false;
                        } else {
                            state.slots[index].element.value.pop();
                        }
                    }
                }
                PointerAction::Press(_) => {}
            }
        }
        state.journal.push("actions".to_string());
        Ok(())
    }

    async fn execute_script(&self, script: &str, args: Vec<ScriptArg>) -> DriverResult<Value> {
        let mut state = self.state.lock().await;
        state.run_script(script, &args)
    }

    async fn screenshot(&self) -> DriverResult<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(MOCK_SCREENSHOT_PNG)
            .map_err(|e| DriverError::Session(format!("screenshot decode failed: {}", e)))
    }
}

fn css_matches(selector: &str, element: &MockElement) -> bool {
    selector
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .any(|s| compound_matches(s, element))
}

fn read_ident(chars: &[char], i: &mut usize) -> String {
    let start = *i;
    while *i < chars.len() && (chars[*i].is_alphanumeric() || chars[*i] == '-' || chars[*i] == '_') {
        *i += 1;
    }
    chars[start..*i].iter().collect()
}

fn compound_matches(selector: &str, element: &MockElement) -> bool {
    let compound = match selector.split_whitespace().last() {
        Some(c) => c,
        None => return false,
    };
    let chars: Vec<char> = compound.chars().collect();
    let mut i = 0;

    match chars.first() {
        Some('*') => i = 1,
        Some('#') | Some('.') | Some('[') => {}
        Some(_) => {
            let tag = read_ident(&chars, &mut i);
            if tag.is_empty() || !tag.eq_ignore_ascii_case(&element.tag) {
                return false;
            }
        }
        None => return false,
    }

    while i < chars.len() {
        match chars[i] {
            '#' => {
                i += 1;
                let id = read_ident(&chars, &mut i);
                if element.attributes.get("id") != Some(&id) {
                    return false;
                }
            }
            '.' => {
                i += 1;
                let class = read_ident(&chars, &mut i);
                if !element.has_class(&class) {
                    return false;
                }
            }
            '[' => {
                let end = match chars[i..].iter().position(|c| *c == ']') {
                    Some(p) => i + p,
                    None => return false,
                };
                let inner: String = chars[i + 1..end].iter().collect();
                i = end + 1;
                if !attribute_matches(&inner, element) {
                    return false;
                }
            }
            _ => return false,
        }
    }
    true
}

fn attribute_matches(inner: &str, element: &MockElement) -> bool {
    match inner.split_once('=') {
        Some((name, value)) => {
            let value = value.trim().trim_matches(|c| c == '\'' || c == '"');
            element.attribute(name.trim()).as_deref() == Some(value)
        }
        None => element.attribute(inner.trim()).is_some(),
    }
}
