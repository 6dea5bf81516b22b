//! The session trait page objects are written against

use std::time::Duration;

use crate::error::UiResult;

/// One logged-in browser session against the console.
///
/// Every method is synchronous and blocking; a call returns once the browser
/// finished (or failed) the action. Implementations enforce their own
/// per-action timeouts and surface them as [`crate::UiError::Timeout`].
pub trait UiSession: Send + Sync {
    /// Load a path relative to the console base URL.
    fn goto(&self, path: &str) -> UiResult<()>;

    fn click(&self, selector: &str) -> UiResult<()>;

    /// Replace the value of an input field.
    fn fill(&self, selector: &str, value: &str) -> UiResult<()>;

    /// Choose a dropdown option by value.
    fn select_option(&self, selector: &str, value: &str) -> UiResult<()>;

    fn set_checkbox(&self, selector: &str, checked: bool) -> UiResult<()>;

    /// Block until the selector matches a visible element.
    fn wait_for(&self, selector: &str, timeout: Duration) -> UiResult<()>;

    /// Inner text of the first matching element.
    fn text_of(&self, selector: &str) -> UiResult<String>;

    /// Inner texts of all matching elements; empty when none match.
    fn texts_of(&self, selector: &str) -> UiResult<Vec<String>>;

    fn is_visible(&self, selector: &str) -> UiResult<bool>;

    /// Arm the session to accept the next browser confirm/alert dialog.
    /// Must be called before the click that raises the dialog.
    fn accept_alert(&self) -> UiResult<()>;

    /// Path component of the current browser URL.
    fn current_path(&self) -> UiResult<String>;
}
