//! Native menu and shortcut table.
//!
//! Menu construction itself belongs to the platform layer; this table is
//! what it is built from, and what incoming menu ids and key combinations
//! are resolved against.

use std::str::FromStr;

use chatwave_core::{ChatwaveError, Command};
use keyboard_types::{Code, Modifiers};

/// Menu item IDs
pub mod menu_ids {
    pub const MESSENGER_PREFERENCES: &str = "messenger_preferences";
    pub const NEW_CONVERSATION: &str = "new_conversation";
    pub const INBOX: &str = "inbox";
    pub const ACTIVE_CONTACTS: &str = "active_contacts";
    pub const MESSAGE_REQUESTS: &str = "message_requests";
    pub const ARCHIVED_THREADS: &str = "archived_threads";
    pub const MUTE_CONVERSATION: &str = "mute_conversation";
    pub const ARCHIVE_CONVERSATION: &str = "archive_conversation";
    pub const DELETE_CONVERSATION: &str = "delete_conversation";
    pub const MARK_UNREAD: &str = "mark_unread";
    pub const MARK_SPAM: &str = "mark_spam";
    pub const REPORT_CONVERSATION: &str = "report_conversation";
    pub const NEXT_CONVERSATION: &str = "next_conversation";
    pub const PREVIOUS_CONVERSATION: &str = "previous_conversation";
    pub const LIKE: &str = "like";
}

/// One menu item.
#[derive(Debug, Clone)]
pub struct MenuEntry {
    pub label: &'static str,
    pub id: &'static str,
    pub accelerator: Option<Accelerator>,
    pub command: Command,
}

const PRIMARY: Modifiers = Modifiers::META;
const PRIMARY_SHIFT: Modifiers = Modifiers::META.union(Modifiers::SHIFT);

pub static MENU: &[MenuEntry] = &[
    MenuEntry {
        label: "Messenger Preferences...",
        id: menu_ids::MESSENGER_PREFERENCES,
        accelerator: None,
        command: Command::ShowSettings,
    },
    MenuEntry {
        label: "New Conversation",
        id: menu_ids::NEW_CONVERSATION,
        accelerator: Some(Accelerator::new(Some(PRIMARY), Code::KeyN)),
        command: Command::NewConversation,
    },
    MenuEntry {
        label: "Inbox",
        id: menu_ids::INBOX,
        accelerator: Some(Accelerator::new(Some(PRIMARY), Code::Digit1)),
        command: Command::ShowMessageListInbox,
    },
    MenuEntry {
        label: "Active contacts",
        id: menu_ids::ACTIVE_CONTACTS,
        accelerator: Some(Accelerator::new(Some(PRIMARY), Code::Digit2)),
        command: Command::ShowMessageListActiveContacts,
    },
    MenuEntry {
        label: "Message requests",
        id: menu_ids::MESSAGE_REQUESTS,
        accelerator: Some(Accelerator::new(Some(PRIMARY), Code::Digit3)),
        command: Command::ShowMessageListMessageRequests,
    },
    MenuEntry {
        label: "Archived threads",
        id: menu_ids::ARCHIVED_THREADS,
        accelerator: Some(Accelerator::new(Some(PRIMARY), Code::Digit4)),
        command: Command::ShowMessageListArchivedThreads,
    },
    MenuEntry {
        label: "Mute",
        id: menu_ids::MUTE_CONVERSATION,
        accelerator: Some(Accelerator::new(Some(PRIMARY_SHIFT), Code::KeyM)),
        command: Command::MuteConversation,
    },
    MenuEntry {
        label: "Archive",
        id: menu_ids::ARCHIVE_CONVERSATION,
        accelerator: Some(Accelerator::new(Some(PRIMARY_SHIFT), Code::KeyA)),
        command: Command::ArchiveConversation,
    },
    MenuEntry {
        label: "Delete",
        id: menu_ids::DELETE_CONVERSATION,
        accelerator: Some(Accelerator::new(Some(PRIMARY_SHIFT), Code::KeyD)),
        command: Command::DeleteConversation,
    },
    MenuEntry {
        label: "Mark as Unread/Read",
        id: menu_ids::MARK_UNREAD,
        accelerator: Some(Accelerator::new(Some(PRIMARY_SHIFT), Code::KeyR)),
        command: Command::MarkUnreadConversation,
    },
    MenuEntry {
        label: "Mark as Spam",
        id: menu_ids::MARK_SPAM,
        accelerator: None,
        command: Command::MarkSpamConversation,
    },
    MenuEntry {
        label: "Report Spam or Abuse",
        id: menu_ids::REPORT_CONVERSATION,
        accelerator: None,
        command: Command::ReportConversation,
    },
    MenuEntry {
        label: "Select Next Conversation",
        id: menu_ids::NEXT_CONVERSATION,
        accelerator: Some(Accelerator::new(Some(PRIMARY), Code::BracketRight)),
        command: Command::NextConversation,
    },
    MenuEntry {
        label: "Select Previous Conversation",
        id: menu_ids::PREVIOUS_CONVERSATION,
        accelerator: Some(Accelerator::new(Some(PRIMARY), Code::BracketLeft)),
        command: Command::PreviousConversation,
    },
    // Touch bar only
    MenuEntry {
        label: "Like",
        id: menu_ids::LIKE,
        accelerator: None,
        command: Command::LikeConversation,
    },
];

pub fn find_by_id(id: &str) -> Option<&'static MenuEntry> {
    MENU.iter().find(|entry| entry.id == id)
}

/// Resolve a key combination such as `shift+ctrl+m`.
pub fn find_by_accelerator(keys: &str) -> Option<&'static MenuEntry> {
    let wanted: Accelerator = keys.parse().ok()?;
    MENU.iter().find(|entry| entry.accelerator == Some(wanted))
}

/// A key combination, modelled on the `keyboard_types` codes and modifiers
/// that native menu accelerators are built from.
///
/// `META` is the primary modifier: Cmd on macOS, Ctrl elsewhere. Parsing
/// folds Cmd, Ctrl and CmdOrCtrl onto it and ignores order and case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accelerator {
    modifiers: Modifiers,
    key: Code,
}

impl Accelerator {
    pub const fn new(modifiers: Option<Modifiers>, key: Code) -> Self {
        let modifiers = match modifiers {
            Some(modifiers) => modifiers,
            None => Modifiers::empty(),
        };
        Self { modifiers, key }
    }
}

impl FromStr for Accelerator {
    type Err = ChatwaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut modifiers = Modifiers::empty();
        let mut key = None;

        for part in s.split('+').map(str::trim) {
            let modifier = match part.to_ascii_lowercase().as_str() {
                "cmdorctrl" | "commandorcontrol" | "cmd" | "command" | "ctrl" | "control"
                | "meta" | "super" => Some(Modifiers::META),
                "shift" => Some(Modifiers::SHIFT),
                "alt" | "option" => Some(Modifiers::ALT),
                "" => return Err(ChatwaveError::parse(format!("empty key in '{}'", s))),
                _ => None,
            };
            match (modifier, key) {
                (Some(modifier), _) => modifiers.insert(modifier),
                (None, None) => {
                    let code = key_code(part).ok_or_else(|| {
                        ChatwaveError::parse(format!("unknown key '{}' in '{}'", part, s))
                    })?;
                    key = Some(code);
                }
                (None, Some(_)) => {
                    return Err(ChatwaveError::parse(format!(
                        "more than one key in '{}'",
                        s
                    )))
                }
            }
        }

        let key = key.ok_or_else(|| ChatwaveError::parse(format!("no key in '{}'", s)))?;
        Ok(Self::new(Some(modifiers), key))
    }
}

/// Physical key for a single character, or a W3C code name such as `Escape`.
fn key_code(key: &str) -> Option<Code> {
    let mut chars = key.chars();
    let name = match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => format!("Key{}", c.to_ascii_uppercase()),
        (Some(c), None) if c.is_ascii_digit() => format!("Digit{}", c),
        (Some('['), None) => "BracketLeft".to_string(),
        (Some(']'), None) => "BracketRight".to_string(),
        _ => key.to_string(),
    };
    name.parse().ok()
}
