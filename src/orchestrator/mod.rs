//! Application-level orchestration.
//!
//! This module owns the selection and analysis session for interactive use and
//! the one-shot analysis used by text/JSON modes. UI/CLI layers only send
//! commands and render the snapshots published here.

mod controller;

pub(crate) use controller::{analyze_once, run_controller, UiCommand};
