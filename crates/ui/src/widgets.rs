//! Page widgets: forms, flash messages, toolbar menus, accordion trees
//!
//! These encode the console's markup conventions once. Everything is keyed
//! off `data-testid`/`data-*` attributes, matching the selectors the app
//! exposes for testing.

use std::time::Duration;

use tracing::debug;

use crate::error::{UiError, UiResult};
use crate::session::UiSession;

/// Lowercase, space-to-dash slug used in `data-testid` attributes.
pub fn slug(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Select,
    Checkbox,
}

#[derive(Debug, Clone)]
struct FormField {
    name: String,
    selector: String,
    kind: FieldKind,
}

/// Value supplied for one form field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Choice(String),
    Flag(bool),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

/// A declarative form: named fields bound to selectors.
///
/// `fill` applies only the values provided, in field declaration order, so
/// page objects can pass sparse updates the way entity `update` methods
/// build them.
#[derive(Debug, Clone)]
pub struct Form {
    name: String,
    fields: Vec<FormField>,
}

impl Form {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn text(self, name: &str, selector: &str) -> Self {
        self.field(name, selector, FieldKind::Text)
    }

    pub fn select(self, name: &str, selector: &str) -> Self {
        self.field(name, selector, FieldKind::Select)
    }

    pub fn checkbox(self, name: &str, selector: &str) -> Self {
        self.field(name, selector, FieldKind::Checkbox)
    }

    fn field(mut self, name: &str, selector: &str, kind: FieldKind) -> Self {
        self.fields.push(FormField {
            name: name.to_string(),
            selector: selector.to_string(),
            kind,
        });
        self
    }

    /// Fill the provided values. Unknown field names are a programming error
    /// in the page object and fail loudly.
    pub fn fill(&self, session: &dyn UiSession, values: &[(&str, FieldValue)]) -> UiResult<()> {
        for (name, _) in values {
            if !self.fields.iter().any(|f| f.name == *name) {
                return Err(UiError::UnknownField {
                    form: self.name.clone(),
                    field: name.to_string(),
                });
            }
        }

        for field in &self.fields {
            let Some((_, value)) = values.iter().find(|(name, _)| *name == field.name) else {
                continue;
            };
            debug!(form = %self.name, field = %field.name, "filling field");
            match (field.kind, value) {
                (FieldKind::Text, FieldValue::Text(v)) => session.fill(&field.selector, v)?,
                (FieldKind::Select, FieldValue::Choice(v))
                | (FieldKind::Select, FieldValue::Text(v)) => {
                    session.select_option(&field.selector, v)?
                }
                (FieldKind::Checkbox, FieldValue::Flag(v)) => {
                    session.set_checkbox(&field.selector, *v)?
                }
                (kind, value) => {
                    return Err(UiError::Script(format!(
                        "form '{}' field '{}' is {kind:?}, got {value:?}",
                        self.name, field.name
                    )))
                }
            }
        }
        Ok(())
    }

    /// Fill the provided values, then click an action button (Add/Save).
    pub fn fill_and(
        &self,
        session: &dyn UiSession,
        values: &[(&str, FieldValue)],
        action_selector: &str,
    ) -> UiResult<()> {
        self.fill(session, values)?;
        session.click(action_selector)
    }
}

/// Flash-message bar assertions.
pub mod flash {
    use super::*;

    const ALL: &str = "[data-testid=\"flash-msg\"]";
    const SUCCESS: &str = "[data-testid=\"flash-msg\"][data-level=\"success\"]";
    const ERROR: &str = "[data-testid=\"flash-msg\"][data-level=\"error\"]";

    pub fn messages(session: &dyn UiSession) -> UiResult<Vec<String>> {
        session.texts_of(ALL)
    }

    /// Assert that a success flash with exactly `expected` is displayed.
    pub fn assert_success(session: &dyn UiSession, expected: &str) -> UiResult<()> {
        let got = session.texts_of(SUCCESS)?;
        if got.iter().any(|msg| msg == expected) {
            Ok(())
        } else {
            Err(UiError::FlashMismatch {
                expected: expected.to_string(),
                got,
            })
        }
    }

    pub fn assert_no_errors(session: &dyn UiSession) -> UiResult<()> {
        let errors = session.texts_of(ERROR)?;
        if errors.is_empty() {
            Ok(())
        } else {
            Err(UiError::FlashErrors(errors))
        }
    }
}

/// Toolbar dropdown menus (Configuration, Policy, Power, Monitoring).
pub mod toolbar {
    use super::*;

    fn menu_selector(menu: &str) -> String {
        format!("[data-testid=\"toolbar-{}\"]", slug(menu))
    }

    fn item_selector(item: &str) -> String {
        format!("[data-menu-item=\"{}\"]", slug(item))
    }

    /// Open `menu` and click `item`.
    pub fn select(session: &dyn UiSession, menu: &str, item: &str) -> UiResult<()> {
        session.click(&menu_selector(menu))?;
        session.click(&item_selector(item))
    }

    /// Like [`select`] for items that raise a browser confirm; the dialog is
    /// accepted.
    pub fn select_confirm(session: &dyn UiSession, menu: &str, item: &str) -> UiResult<()> {
        session.accept_alert()?;
        select(session, menu, item)
    }
}

/// Accordion navigation trees in explorer-style screens.
pub mod accordion {
    use super::*;

    const NODE_TIMEOUT: Duration = Duration::from_secs(5);

    fn accordion_selector(name: &str) -> String {
        format!("[data-testid=\"accordion-{}\"]", slug(name))
    }

    /// Open the named accordion and click through a tree path, waiting for
    /// each node to render before descending. A node that never renders is
    /// reported as not found, so `exists`-style probes see a missing row,
    /// not a broken session.
    pub fn tree(session: &dyn UiSession, name: &str, path: &[&str]) -> UiResult<()> {
        session.click(&accordion_selector(name))?;
        for node in path {
            let selector = format!("[data-tree-node=\"{node}\"]");
            match session.wait_for(&selector, NODE_TIMEOUT) {
                Ok(()) => {}
                Err(UiError::Timeout { selector }) => {
                    return Err(UiError::CandidateNotFound { selector })
                }
                Err(other) => return Err(other),
            }
            session.click(&selector)?;
        }
        Ok(())
    }

    /// Reload the accordion's tree contents.
    pub fn refresh(session: &dyn UiSession, name: &str) -> UiResult<()> {
        session.click(&format!("[data-testid=\"accordion-{}-refresh\"]", slug(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeSession;

    #[test]
    fn slug_normalizes_names() {
        assert_eq!(slug("Access Control"), "access-control");
        assert_eq!(slug("Power"), "power");
    }

    #[test]
    fn form_fills_only_provided_values_in_declaration_order() {
        let session = FakeSession::new();
        let form = Form::new("user")
            .text("name", "#name")
            .text("email", "#email")
            .select("group", "#group");

        form.fill(
            &session,
            &[("group", FieldValue::Choice("admins".into())), ("name", "alice".into())],
        )
        .unwrap();

        assert_eq!(
            session.actions(),
            vec!["fill:#name=alice", "select:#group=admins"]
        );
    }

    #[test]
    fn form_rejects_unknown_fields() {
        let session = FakeSession::new();
        let form = Form::new("user").text("name", "#name");

        let err = form.fill(&session, &[("nope", "x".into())]).unwrap_err();
        assert!(matches!(err, UiError::UnknownField { .. }));
        assert!(session.actions().is_empty());
    }

    #[test]
    fn flash_assert_success_matches_exact_message() {
        let session = FakeSession::new();
        session.stage_texts(
            "[data-testid=\"flash-msg\"][data-level=\"success\"]",
            vec!["User \"alice\" was saved".to_string()],
        );

        flash::assert_success(&session, "User \"alice\" was saved").unwrap();
        let err = flash::assert_success(&session, "something else").unwrap_err();
        assert!(matches!(err, UiError::FlashMismatch { .. }));
    }

    #[test]
    fn toolbar_select_confirm_arms_the_dialog_first() {
        let session = FakeSession::new();
        toolbar::select_confirm(&session, "Configuration", "Delete this User").unwrap();
        assert_eq!(
            session.actions(),
            vec![
                "accept_alert",
                "click:[data-testid=\"toolbar-configuration\"]",
                "click:[data-menu-item=\"delete-this-user\"]",
            ]
        );
    }

    #[test]
    fn accordion_tree_waits_then_clicks_each_node() {
        let session = FakeSession::new();
        accordion::tree(&session, "Access Control", &["Users", "alice"]).unwrap();
        assert_eq!(
            session.actions(),
            vec![
                "click:[data-testid=\"accordion-access-control\"]",
                "wait:[data-tree-node=\"Users\"]",
                "click:[data-tree-node=\"Users\"]",
                "wait:[data-tree-node=\"alice\"]",
                "click:[data-tree-node=\"alice\"]",
            ]
        );
    }

    #[test]
    fn accordion_node_that_never_renders_reads_as_not_found() {
        use crate::testing::Failure;

        let session = FakeSession::new();
        session.fail_on("[data-tree-node=\"ghost\"]", Failure::Timeout);

        let err = accordion::tree(&session, "Access Control", &["ghost"]).unwrap_err();
        assert!(err.is_not_found());
    }
}
