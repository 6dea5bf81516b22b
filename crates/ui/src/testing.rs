//! Recording fake session for behaviour tests
//!
//! `FakeSession` records every action in order, serves canned texts and
//! visibility, and can be armed to fail a selector with a chosen error.
//! Model tests assert on the recorded sequence the way the real console
//! would have seen it.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::{UiError, UiResult};
use crate::session::UiSession;

/// How an armed selector should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    NotFound,
    Timeout,
}

#[derive(Default)]
pub struct FakeSession {
    actions: Mutex<Vec<String>>,
    texts: Mutex<HashMap<String, Vec<String>>>,
    visible: Mutex<HashMap<String, bool>>,
    failures: Mutex<HashMap<String, Failure>>,
    current_path: Mutex<String>,
}

impl FakeSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything the session was asked to do, in order.
    pub fn actions(&self) -> Vec<String> {
        self.actions.lock().clone()
    }

    pub fn clear_actions(&self) {
        self.actions.lock().clear();
    }

    /// Canned reply for `text_of`/`texts_of` on `selector`.
    pub fn stage_texts(&self, selector: &str, texts: Vec<String>) {
        self.texts.lock().insert(selector.to_string(), texts);
    }

    pub fn stage_visible(&self, selector: &str, visible: bool) {
        self.visible.lock().insert(selector.to_string(), visible);
    }

    /// Make any action touching `selector` fail.
    pub fn fail_on(&self, selector: &str, failure: Failure) {
        self.failures.lock().insert(selector.to_string(), failure);
    }

    fn record(&self, action: String) {
        self.actions.lock().push(action);
    }

    fn check(&self, selector: &str) -> UiResult<()> {
        match self.failures.lock().get(selector) {
            Some(Failure::NotFound) => Err(UiError::CandidateNotFound {
                selector: selector.to_string(),
            }),
            Some(Failure::Timeout) => Err(UiError::Timeout {
                selector: selector.to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl UiSession for FakeSession {
    fn goto(&self, path: &str) -> UiResult<()> {
        self.check(path)?;
        self.record(format!("goto:{path}"));
        *self.current_path.lock() = path.to_string();
        Ok(())
    }

    fn click(&self, selector: &str) -> UiResult<()> {
        self.check(selector)?;
        self.record(format!("click:{selector}"));
        Ok(())
    }

    fn fill(&self, selector: &str, value: &str) -> UiResult<()> {
        self.check(selector)?;
        self.record(format!("fill:{selector}={value}"));
        Ok(())
    }

    fn select_option(&self, selector: &str, value: &str) -> UiResult<()> {
        self.check(selector)?;
        self.record(format!("select:{selector}={value}"));
        Ok(())
    }

    fn set_checkbox(&self, selector: &str, checked: bool) -> UiResult<()> {
        self.check(selector)?;
        self.record(format!("check:{selector}={checked}"));
        Ok(())
    }

    fn wait_for(&self, selector: &str, _timeout: Duration) -> UiResult<()> {
        self.check(selector)?;
        self.record(format!("wait:{selector}"));
        Ok(())
    }

    fn text_of(&self, selector: &str) -> UiResult<String> {
        self.check(selector)?;
        self.record(format!("text:{selector}"));
        self.texts
            .lock()
            .get(selector)
            .and_then(|texts| texts.first().cloned())
            .ok_or_else(|| UiError::CandidateNotFound {
                selector: selector.to_string(),
            })
    }

    fn texts_of(&self, selector: &str) -> UiResult<Vec<String>> {
        self.check(selector)?;
        self.record(format!("texts:{selector}"));
        Ok(self.texts.lock().get(selector).cloned().unwrap_or_default())
    }

    fn is_visible(&self, selector: &str) -> UiResult<bool> {
        self.check(selector)?;
        self.record(format!("visible:{selector}"));
        Ok(self.visible.lock().get(selector).copied().unwrap_or(false))
    }

    fn accept_alert(&self) -> UiResult<()> {
        self.record("accept_alert".to_string());
        Ok(())
    }

    fn current_path(&self) -> UiResult<String> {
        Ok(self.current_path.lock().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_actions_in_order() {
        let session = FakeSession::new();
        session.goto("/login").unwrap();
        session.fill("#user", "admin").unwrap();
        session.click("#submit").unwrap();

        assert_eq!(
            session.actions(),
            vec!["goto:/login", "fill:#user=admin", "click:#submit"]
        );
        assert_eq!(session.current_path().unwrap(), "/login");
    }

    #[test]
    fn armed_selector_fails_without_recording() {
        let session = FakeSession::new();
        session.fail_on("#missing", Failure::NotFound);

        let err = session.click("#missing").unwrap_err();
        assert!(err.is_not_found());
        assert!(session.actions().is_empty());
    }

    #[test]
    fn visibility_probes_respect_armed_failures() {
        let session = FakeSession::new();
        session.fail_on("#flaky", Failure::Timeout);

        assert!(session.is_visible("#flaky").is_err());
        assert!(session.actions().is_empty());
    }

    #[test]
    fn staged_texts_are_served() {
        let session = FakeSession::new();
        session.stage_texts("#title", vec!["EVM User alice".to_string()]);

        assert_eq!(session.text_of("#title").unwrap(), "EVM User alice");
        assert!(session.text_of("#other").unwrap_err().is_not_found());
    }
}
