//! Client for the bioequivalence study planning backend.
//!
//! Collects drug parameters, requests the full analysis, renders the
//! literature / PK / design / sample size / regulatory sections, and
//! downloads generated study synopses.

pub mod config;
pub mod controller;
pub mod domain;
pub mod error;
pub mod logging;
pub mod payload;
pub mod services;
pub mod view;

pub use controller::ViewController;
pub use error::{ClientError, ClientResult};
