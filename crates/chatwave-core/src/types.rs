//! Messages exchanged across the native boundary

use serde::{Deserialize, Serialize};

/// A command raised by the native side (menu item, shortcut, notification click)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "kebab-case")]
pub enum Command {
    ShowSettings,
    NewConversation,

    // Message list
    ShowMessageListInbox,
    ShowMessageListActiveContacts,
    ShowMessageListMessageRequests,
    ShowMessageListArchivedThreads,

    // Conversation menu
    MuteConversation,
    ArchiveConversation,
    DeleteConversation,
    MarkUnreadConversation,
    MarkSpamConversation,
    ReportConversation,

    // Conversation navigation
    NextConversation,
    PreviousConversation,
    LikeConversation,
    JumpToConversation {
        id: String,
    },
    JumpToConversationByImage {
        #[serde(rename = "imageName")]
        image_name: String,
    },
}

impl Command {
    /// Wire name of the command
    pub fn name(&self) -> &'static str {
        match self {
            Command::ShowSettings => "show-settings",
            Command::NewConversation => "new-conversation",
            Command::ShowMessageListInbox => "show-message-list-inbox",
            Command::ShowMessageListActiveContacts => "show-message-list-active-contacts",
            Command::ShowMessageListMessageRequests => "show-message-list-message-requests",
            Command::ShowMessageListArchivedThreads => "show-message-list-archived-threads",
            Command::MuteConversation => "mute-conversation",
            Command::ArchiveConversation => "archive-conversation",
            Command::DeleteConversation => "delete-conversation",
            Command::MarkUnreadConversation => "mark-unread-conversation",
            Command::MarkSpamConversation => "mark-spam-conversation",
            Command::ReportConversation => "report-conversation",
            Command::NextConversation => "next-conversation",
            Command::PreviousConversation => "previous-conversation",
            Command::LikeConversation => "like-conversation",
            Command::JumpToConversation { .. } => "jump-to-conversation",
            Command::JumpToConversationByImage { .. } => "jump-to-conversation-by-image",
        }
    }
}

/// A page notification, rasterized and ready for native presentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub silent: bool,
    /// PNG data URL of the sender avatar
    pub icon_data_url: String,
    /// File name of the avatar, used to jump back to the conversation later
    pub image_name: String,
}

/// Message from the bridge to the native side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum OutboundMessage {
    NotificationReady { payload: NotificationPayload },
    DockCount { count: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_wire_names() {
        let json = serde_json::to_value(Command::MarkUnreadConversation).unwrap();
        assert_eq!(json["cmd"], "mark-unread-conversation");

        let cmd: Command =
            serde_json::from_str(r#"{"cmd":"show-message-list-active-contacts"}"#).unwrap();
        assert_eq!(cmd, Command::ShowMessageListActiveContacts);
        assert_eq!(cmd.name(), "show-message-list-active-contacts");
    }

    #[test]
    fn test_command_arguments() {
        let cmd: Command =
            serde_json::from_str(r#"{"cmd":"jump-to-conversation-by-image","imageName":"a.jpg"}"#)
                .unwrap();
        assert_eq!(
            cmd,
            Command::JumpToConversationByImage {
                image_name: "a.jpg".to_string()
            }
        );

        let cmd: Command =
            serde_json::from_str(r#"{"cmd":"jump-to-conversation","id":"row_123"}"#).unwrap();
        assert_eq!(cmd.name(), "jump-to-conversation");
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(serde_json::from_str::<Command>(r#"{"cmd":"format-disk"}"#).is_err());
    }

    #[test]
    fn test_outbound_shape() {
        let msg = OutboundMessage::NotificationReady {
            payload: NotificationPayload {
                title: "Alice".into(),
                body: "Hi".into(),
                silent: false,
                icon_data_url: "data:image/png;base64,AAAA".into(),
                image_name: "photo.jpg".into(),
            },
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["event"], "notification-ready");
        assert_eq!(json["payload"]["imageName"], "photo.jpg");
        assert_eq!(json["payload"]["iconDataUrl"], "data:image/png;base64,AAAA");

        let json = serde_json::to_value(OutboundMessage::DockCount { count: 4 }).unwrap();
        assert_eq!(json, serde_json::json!({"event": "dock-count", "count": 4}));
    }
}
