//! IPC command handlers

use super::{IpcMessage, ShellMessage};
use crate::menu;
use chatwave_bridge::{Bridge, DispatchOutcome};
use chatwave_core::{ChatwaveError, ChatwaveResult, Command};
use chatwave_dom::{NotificationHandle, NotificationRequest};
use tracing::{debug, info};

/// What a handled message did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
    Dispatched(DispatchOutcome),
    TitleChanged,
    Notification(NotificationHandle),
}

/// Handle one inbound message against the bridge
pub fn handle_message(bridge: &Bridge, message: IpcMessage) -> ChatwaveResult<Handled> {
    match message {
        IpcMessage::Command(command) => Ok(dispatch(bridge, &command)),

        IpcMessage::Shell(ShellMessage::Menu { id }) => {
            let entry = menu::find_by_id(&id)
                .ok_or_else(|| ChatwaveError::NotFound(format!("menu item '{}'", id)))?;
            debug!(menu = entry.label, "Menu item activated");
            Ok(dispatch(bridge, &entry.command))
        }
        IpcMessage::Shell(ShellMessage::Accelerator { keys }) => {
            let entry = menu::find_by_accelerator(&keys)
                .ok_or_else(|| ChatwaveError::NotFound(format!("accelerator '{}'", keys)))?;
            debug!(keys = %keys, menu = entry.label, "Accelerator pressed");
            Ok(dispatch(bridge, &entry.command))
        }

        IpcMessage::Shell(ShellMessage::PageTitle { title }) => {
            bridge
                .document()
                .set_title(&title)
                .map_err(|e| ChatwaveError::dom(e.to_string()))?;
            Ok(Handled::TitleChanged)
        }
        IpcMessage::Shell(ShellMessage::PageNotification { title, options }) => {
            let handle = bridge
                .window()
                .new_notification(NotificationRequest { title, options });
            Ok(Handled::Notification(handle))
        }
    }
}

fn dispatch(bridge: &Bridge, command: &Command) -> Handled {
    let outcome = bridge.handle_command(command);
    if outcome == DispatchOutcome::Performed {
        info!(command = command.name(), "Command dispatched");
    }
    Handled::Dispatched(outcome)
}
