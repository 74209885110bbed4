//! Medicine stock management backend: medicines with an append-only action
//! history, dated lots, stock movements and expiry alerts.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod services;
