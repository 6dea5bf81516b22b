//! Stratus console end-to-end test harness
//!
//! This crate glues the other layers into runnable suites:
//! - Spawns the console server as a subprocess (or targets a running one)
//! - Launches a Playwright-driven browser session
//! - Logs in and hands tests a ready [`stratus_model::Appliance`]
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                     Test Harness (Rust)                    │
//! ├────────────────────────────────────────────────────────────┤
//! │  Harness                                                   │
//! │    ├── ServerHandle::spawn() (optional, local runs)        │
//! │    ├── PlaywrightSession::new() -> browser                 │
//! │    ├── Appliance::new() + login()                          │
//! │    └── wait_for(probe) polling helper                      │
//! ├────────────────────────────────────────────────────────────┤
//! │  HarnessConfig (YAML + STRATUS_* env overrides)            │
//! │    base_url, username, password, browser, headless         │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Live suites gate on `STRATUS_BASE_URL`: unset means skip, so the
//! behaviour tests that run against a recording fake stay green anywhere.

pub mod config;
pub mod error;
pub mod harness;
pub mod server;

pub use config::HarnessConfig;
pub use error::{HarnessError, HarnessResult};
pub use harness::{wait_for, Harness};
pub use server::{ServerConfig, ServerHandle};
