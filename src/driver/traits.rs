//! Driver layer traits
//!
//! This module defines the abstract interface of the browser-automation driver
//! the resilience layer sits on top of.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Native element reference handed out by the driver
///
/// Opaque to this crate. A reference becomes stale once the page structure
/// it was resolved against changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef {
    id: String,
}

impl ElementRef {
    /// Create a reference from a driver-specific id
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self { id: id.into() }
    }

    /// Get the driver-specific id
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element({})", self.id)
    }
}

/// Locator expression identifying zero or more elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "using", content = "value", rename_all = "snake_case")]
pub enum Locator {
    /// CSS selector
    Css(String),
    /// XPath expression
    XPath(String),
    /// Exact `id` attribute match
    Id(String),
    /// Exact `name` attribute match
    Name(String),
    /// Single class name
    ClassName(String),
    /// Tag name
    TagName(String),
    /// Text content contains
    Text(String),
}

impl Locator {
    /// Create a CSS locator
    pub fn css<S: Into<String>>(selector: S) -> Self {
        Locator::Css(selector.into())
    }

    /// Create an XPath locator
    pub fn xpath<S: Into<String>>(expression: S) -> Self {
        Locator::XPath(expression.into())
    }

    /// Create an id locator
    pub fn id<S: Into<String>>(id: S) -> Self {
        Locator::Id(id.into())
    }

    /// Create a name locator
    pub fn name<S: Into<String>>(name: S) -> Self {
        Locator::Name(name.into())
    }

    /// Create a text-content locator
    pub fn text<S: Into<String>>(text: S) -> Self {
        Locator::Text(text.into())
    }

    /// Create a tag name locator
    pub fn tag<S: Into<String>>(tag: S) -> Self {
        Locator::TagName(tag.into())
    }

    /// Strategy name as used by the WebDriver protocol
    pub fn kind(&self) -> &'static str {
        match self {
            Locator::Css(_) => "css",
            Locator::XPath(_) => "xpath",
            Locator::Id(_) => "id",
            Locator::Name(_) => "name",
            Locator::ClassName(_) => "class",
            Locator::TagName(_) => "tag",
            Locator::Text(_) => "text",
        }
    }

    /// Raw expression
    pub fn expression(&self) -> &str {
        match self {
            Locator::Css(s)
            | Locator::XPath(s)
            | Locator::Id(s)
            | Locator::Name(s)
            | Locator::ClassName(s)
            | Locator::TagName(s)
            | Locator::Text(s) => s,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.expression())
    }
}

/// Tag identifying the kind of a driver failure
///
/// Used as the exact-match key of the recovery registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    NoSuchElement,
    StaleElementReference,
    ElementClickIntercepted,
    ElementNotInteractable,
    InvalidArgument,
    Script,
    Timeout,
    Unsupported,
    Session,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NoSuchElement => "no such element",
            ErrorKind::StaleElementReference => "stale element reference",
            ErrorKind::ElementClickIntercepted => "element click intercepted",
            ErrorKind::ElementNotInteractable => "element not interactable",
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::Script => "javascript error",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Unsupported => "unsupported operation",
            ErrorKind::Session => "session error",
        };
        f.write_str(name)
    }
}

/// Error reported by the driver
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    #[error("no such element: {0}")]
    NoSuchElement(String),

    #[error("stale element reference: {0}")]
    StaleElementReference(String),

    #[error("element click intercepted: {0}")]
    ElementClickIntercepted(String),

    #[error("element not interactable: {0}")]
    ElementNotInteractable(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("javascript error: {0}")]
    Script(String),

    #[error("driver timeout: {0}")]
    Timeout(String),

    #[error("unsupported operation: {0}")]
    Unsupported(String),

    #[error("session error: {0}")]
    Session(String),
}

impl DriverError {
    /// Get the kind tag of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            DriverError::NoSuchElement(_) => ErrorKind::NoSuchElement,
            DriverError::StaleElementReference(_) => ErrorKind::StaleElementReference,
            DriverError::ElementClickIntercepted(_) => ErrorKind::ElementClickIntercepted,
            DriverError::ElementNotInteractable(_) => ErrorKind::ElementNotInteractable,
            DriverError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            DriverError::Script(_) => ErrorKind::Script,
            DriverError::Timeout(_) => ErrorKind::Timeout,
            DriverError::Unsupported(_) => ErrorKind::Unsupported,
            DriverError::Session(_) => ErrorKind::Session,
        }
    }

    /// Build an error of the given kind
    pub fn of_kind<S: Into<String>>(kind: ErrorKind, msg: S) -> Self {
        let msg = msg.into();
        match kind {
            ErrorKind::NoSuchElement => DriverError::NoSuchElement(msg),
            ErrorKind::StaleElementReference => DriverError::StaleElementReference(msg),
            ErrorKind::ElementClickIntercepted => DriverError::ElementClickIntercepted(msg),
            ErrorKind::ElementNotInteractable => DriverError::ElementNotInteractable(msg),
            ErrorKind::InvalidArgument => DriverError::InvalidArgument(msg),
            ErrorKind::Script => DriverError::Script(msg),
            ErrorKind::Timeout => DriverError::Timeout(msg),
            ErrorKind::Unsupported => DriverError::Unsupported(msg),
            ErrorKind::Session => DriverError::Session(msg),
        }
    }

    /// Transient interaction failures are the ones recovery can act on
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::StaleElementReference
                | ErrorKind::ElementClickIntercepted
                | ErrorKind::ElementNotInteractable
        )
    }
}

/// Driver-level result
pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// Element rectangle in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Center point of the rectangle
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether the rectangle has a visible area
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Modifier and editing keys used in pointer/keyboard action chains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Control,
    Shift,
    Delete,
    Backspace,
    Enter,
}

/// One step of a pointer/keyboard action chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PointerAction {
    /// Move the pointer to the element, optionally offset from its center
    MoveTo {
        element: ElementRef,
        offset: Option<(i32, i32)>,
    },
    /// Pause the chain
    Pause(u64),
    /// Press the primary button
    Down,
    /// Release the primary button
    Up,
    /// Press a key
    KeyDown(Key),
    /// Release a key
    KeyUp(Key),
    /// Type text into the focused element
    SendKeys(String),
    /// Press and release a key
    Press(Key),
}

/// Argument passed to an injected script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScriptArg {
    /// Element reference, exposed to the script as `arguments[i]`
    Element(ElementRef),
    /// Plain JSON value
    Value(Value),
}

impl From<&ElementRef> for ScriptArg {
    fn from(element: &ElementRef) -> Self {
        ScriptArg::Element(element.clone())
    }
}

impl From<Value> for ScriptArg {
    fn from(value: Value) -> Self {
        ScriptArg::Value(value)
    }
}

/// Browser-automation driver trait
///
/// The resilience layer never speaks a wire protocol itself; every browser
/// interaction goes through this trait.
#[async_trait]
pub trait Driver: Send + Sync + std::fmt::Debug {
    /// Resolve a locator to the first matching element
    async fn find_element(&self, locator: &Locator) -> DriverResult<ElementRef>;

    /// Resolve a locator to all matching elements
    async fn find_elements(&self, locator: &Locator) -> DriverResult<Vec<ElementRef>>;

    /// Primitive click
    async fn click(&self, element: &ElementRef) -> DriverResult<()>;

    /// Primitive key input
    async fn send_keys(&self, element: &ElementRef, text: &str) -> DriverResult<()>;

    /// Primitive clear
    async fn clear(&self, element: &ElementRef) -> DriverResult<()>;

    /// Submit the form owning the element
    async fn submit(&self, element: &ElementRef) -> DriverResult<()>;

    /// Visible text of the element
    async fn get_text(&self, element: &ElementRef) -> DriverResult<String>;

    /// Attribute (or property) value
    async fn get_attribute(&self, element: &ElementRef, name: &str) -> DriverResult<Option<String>>;

    /// Tag name of the element
    async fn get_tag_name(&self, element: &ElementRef) -> DriverResult<String>;

    /// Whether the element is rendered visibly
    async fn is_displayed(&self, element: &ElementRef) -> DriverResult<bool>;

    /// Whether the element accepts input
    async fn is_enabled(&self, element: &ElementRef) -> DriverResult<bool>;

    /// Whether the element (checkbox, option, radio) is selected
    async fn is_selected(&self, element: &ElementRef) -> DriverResult<bool>;

    /// Element rectangle
    async fn rect(&self, element: &ElementRef) -> DriverResult<Rect>;

    /// Perform a pointer/keyboard action chain
    async fn perform_actions(&self, actions: &[PointerAction]) -> DriverResult<()>;

    /// Execute a script in the page and return its JSON result
    async fn execute_script(&self, script: &str, args: Vec<ScriptArg>) -> DriverResult<Value>;

    /// Capture a screenshot of the current viewport
    async fn screenshot(&self) -> DriverResult<Vec<u8>>;
}
