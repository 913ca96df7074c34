//! # Forecast CLI
//!
//! Terminal front end for the SARIMA forecast: loads the price history and
//! the fitted model once, then renders metric cards, the recent history, the
//! forecast table and the model configuration.

pub mod demo;
pub mod report;
pub mod session;

pub use crate::session::Session;
