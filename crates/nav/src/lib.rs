//! Declarative navigation-graph resolver for the Stratus e2e suite
//!
//! Page objects register one [`NavStep`] per `(subject type, destination)`
//! pair in a [`Registry`]. Each step declares a prerequisite destination:
//! none (a root), a sibling destination on the same subject, or a destination
//! on a related subject reached through a dotted attribute path. Given a
//! subject and a destination name, the [`Navigator`] builds the full
//! prerequisite chain, rejects cycles and unknown destinations before any
//! side effect, then executes the chain root-to-leaf against the browser
//! session the steps capture.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  Navigator                                               │
//! │    navigate_to(subject, "Edit")                          │
//! │      ├── Registry::lookup(type_chain, "Edit")            │
//! │      ├── build chain:  All ── Details ── Edit            │
//! │      └── execute root-to-leaf, terminal never skipped    │
//! ├──────────────────────────────────────────────────────────┤
//! │  Registry: ("User", "All")     -> UserAll                │
//! │            ("User", "Details") -> UserDetails            │
//! │            ("User", "Edit")    -> UserEdit               │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The registry is populated once at startup (see
//! `stratus_model::register_all`) and shared read-only; each session owns its
//! own `Navigator`, so no navigation-time locking discipline is required
//! beyond the resolver's internal path cache.

pub mod error;
pub mod registry;
pub mod resolver;
pub mod step;
pub mod subject;

pub use error::{NavError, NavResult, StepError};
pub use registry::Registry;
pub use resolver::Navigator;
pub use step::{NavArgs, NavStep, Prerequisite, ViewHandle};
pub use subject::{downcast_subject, Subject, SubjectRef};
