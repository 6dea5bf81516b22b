//! Browser session and page widgets for the Stratus e2e suite
//!
//! The [`UiSession`] trait is the narrow seam between page objects and the
//! browser: navigation steps and entity CRUD methods are written against it,
//! the [`browser::PlaywrightSession`] implementation drives a real browser
//! through a long-lived `node` driver process, and
//! [`testing::FakeSession`] records actions for behaviour tests.
//!
//! Widgets (`widgets::{flash, toolbar, accordion, Form}`) encode the
//! console's markup conventions (`data-testid` attributes) once so page
//! objects stay declarative.

pub mod browser;
pub mod error;
pub mod session;
pub mod testing;
pub mod widgets;

pub use browser::{Browser, BrowserConfig, PlaywrightSession};
pub use error::{UiError, UiResult};
pub use session::UiSession;
