//! Lesson booking service: lists lessons, takes orders, and updates single lesson attributes
//! over a JSON HTTP API.

pub mod adapters;
pub mod commands;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
