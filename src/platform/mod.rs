//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Play-field measurement
//! - Device class detection
//! - Page lifecycle (back/forward cache)

use crate::consts::DEFAULT_FIELD_WIDTH;
use crate::input::DeviceClass;

/// Use a measured field width, or the default when there is none yet
pub fn field_width_or_default(measured: Option<i32>) -> i32 {
    match measured {
        Some(width) if width > 0 => width,
        _ => DEFAULT_FIELD_WIDTH,
    }
}

/// What the host does when the page is hidden
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageHide {
    /// Page kept in the back/forward cache: pause, resume on `pageshow`
    Suspend,
    /// Page is being unloaded: stop the session and drop listeners
    Teardown,
}

impl PageHide {
    /// Decide from `PageTransitionEvent.persisted`
    pub fn from_persisted(persisted: bool) -> Self {
        if persisted {
            PageHide::Suspend
        } else {
            PageHide::Teardown
        }
    }
}

/// Rendered width of the element with the given id
#[cfg(target_arch = "wasm32")]
pub fn measure_element_width(id: &str) -> Option<i32> {
    use wasm_bindgen::JsCast;

    let element = web_sys::window()?.document()?.get_element_by_id(id)?;
    let element: web_sys::HtmlElement = element.dyn_into().ok()?;
    Some(element.offset_width())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn measure_element_width(_id: &str) -> Option<i32> {
    None
}

/// Device class of the current browser
#[cfg(target_arch = "wasm32")]
pub fn detect_device() -> DeviceClass {
    web_sys::window()
        .and_then(|w| w.navigator().user_agent().ok())
        .map(|ua| DeviceClass::from_user_agent(&ua))
        .unwrap_or(DeviceClass::Desktop)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn detect_device() -> DeviceClass {
    DeviceClass::Desktop
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_width_fallback() {
        assert_eq!(field_width_or_default(Some(420)), 420);
        assert_eq!(field_width_or_default(Some(0)), DEFAULT_FIELD_WIDTH);
        assert_eq!(field_width_or_default(None), DEFAULT_FIELD_WIDTH);
    }

    #[test]
    fn test_cached_page_is_only_suspended() {
        assert_eq!(PageHide::from_persisted(true), PageHide::Suspend);
        assert_eq!(PageHide::from_persisted(false), PageHide::Teardown);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_native_has_no_element() {
        assert_eq!(measure_element_width("game-window"), None);
        assert_eq!(detect_device(), DeviceClass::Desktop);
    }
}
