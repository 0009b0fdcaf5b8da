//! JSON API over a single session.

pub mod app;
pub mod error;
pub mod handlers;
pub mod state;
