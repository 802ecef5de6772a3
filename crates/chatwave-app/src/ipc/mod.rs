//! IPC module for Chatwave
//!
//! The native side talks to the binary in line-delimited JSON: one message
//! per stdin line, one outbound event per stdout line.

pub mod commands;

use chatwave_core::{ChatwaveError, ChatwaveResult, Command};
use chatwave_dom::{NotificationOptions, NotificationText};
use serde::Deserialize;

/// Message arriving from the native side
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IpcMessage {
    Shell(ShellMessage),
    Command(Command),
}

/// Messages handled by the shell itself rather than the page bridge
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "cmd", rename_all = "kebab-case")]
pub enum ShellMessage {
    // Native command sources
    Menu {
        id: String,
    },
    Accelerator {
        keys: String,
    },

    // Page events
    PageTitle {
        title: String,
    },
    PageNotification {
        title: NotificationText,
        #[serde(default)]
        options: NotificationOptions,
    },
}

impl IpcMessage {
    /// Parse one input line
    pub fn from_line(line: &str) -> ChatwaveResult<Self> {
        serde_json::from_str(line)
            .map_err(|e| ChatwaveError::ipc(format!("unrecognized message: {}", e)))
    }
}
