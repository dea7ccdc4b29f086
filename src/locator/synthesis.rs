//! Locator synthesis from element snapshots

use super::candidate::ElementSnapshot;
use crate::driver::Locator;

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn class_selector(classes: &str) -> Option<String> {
    let parts: Vec<&str> = classes
        .split_whitespace()
        .filter(|c| {
            c.chars()
                .all(|ch| ch.is_alphanumeric() || ch == '-' || ch == '_')
        })
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(format!(".{}", parts.join(".")))
}

/// Alternative locators for a snapshot, most specific first
///
/// id > class selector > name > text content.
pub fn synthesize(snapshot: &ElementSnapshot) -> Vec<Locator> {
    let mut locators = Vec::new();

    if let Some(id) = present(&snapshot.id) {
        locators.push(Locator::id(id));
    }
    if let Some(selector) = present(&snapshot.class).and_then(class_selector) {
        locators.push(Locator::css(selector));
    }
    if let Some(name) = present(&snapshot.name) {
        locators.push(Locator::name(name));
    }
    if let Some(text) = present(&snapshot.text) {
        locators.push(Locator::text(text));
    }

    locators
}
