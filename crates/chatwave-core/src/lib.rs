//! Chatwave Core Library
//!
//! This crate provides shared types, errors, and configuration for Chatwave.

pub mod config;
pub mod error;
pub mod types;

pub use config::{BridgeConfig, UserConfig};
pub use error::{ChatwaveError, ChatwaveResult};
pub use types::{Command, NotificationPayload, OutboundMessage};
