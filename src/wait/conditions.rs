//! Element wait conditions
//!
//! A reference that went stale or vanished counts as "not yet" so a wait can
//! outlast a re-render.

use crate::driver::{Driver, DriverResult, ElementRef, ErrorKind};
use crate::error::Result;

fn not_yet<T: Default>(result: DriverResult<T>) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(e)
            if matches!(
                e.kind(),
                ErrorKind::StaleElementReference | ErrorKind::NoSuchElement
            ) =>
        {
            Ok(T::default())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn element_displayed(driver: &dyn Driver, element: &ElementRef) -> Result<bool> {
    not_yet(driver.is_displayed(element).await)
}

pub async fn element_enabled(driver: &dyn Driver, element: &ElementRef) -> Result<bool> {
    not_yet(driver.is_enabled(element).await)
}

pub async fn element_selected(driver: &dyn Driver, element: &ElementRef) -> Result<bool> {
    not_yet(driver.is_selected(element).await)
}

/// Displayed and enabled
pub async fn element_clickable(driver: &dyn Driver, element: &ElementRef) -> Result<bool> {
    Ok(element_displayed(driver, element).await? && element_enabled(driver, element).await?)
}

pub async fn element_has_text(
    driver: &dyn Driver,
    element: &ElementRef,
    expected: &str,
) -> Result<bool> {
    let text = not_yet(driver.get_text(element).await)?;
    Ok(text == expected)
}

pub async fn element_contains_text(
    driver: &dyn Driver,
    element: &ElementRef,
    fragment: &str,
) -> Result<bool> {
    let text = not_yet(driver.get_text(element).await)?;
    Ok(text.contains(fragment))
}

pub async fn element_has_value(
    driver: &dyn Driver,
    element: &ElementRef,
    expected: &str,
) -> Result<bool> {
    let value = not_yet(driver.get_attribute(element, "value").await)?;
    Ok(value.as_deref() == Some(expected))
}
