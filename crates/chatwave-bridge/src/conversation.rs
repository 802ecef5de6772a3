//! Conversation dropdown actions.
//!
//! The selected conversation's dropdown is opened by clicking its opener,
//! then every open menu is inspected. Only menus whose item labels include a
//! mute sentinel are treated as conversation menus, since other dropdowns can
//! be open at the same time.

use std::rc::Rc;

use chatwave_dom::{Document, Node};
use tracing::{debug, info, warn};

use crate::selectors::{self, detect_generation, resolve, Generation, UiElement};

/// Labels identifying a conversation menu.
pub const MENU_SENTINELS: &[&str] = &["Mute", "Unmute"];

/// Label present only in group conversation menus.
pub const GROUP_SENTINEL: &str = "Leave Group";

/// Ancestor hidden while an item is activated.
const MENU_ROOT_DEPTH: usize = 3;

/// Actions in the conversation dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationAction {
    Mute,
    Archive,
    Delete,
    MarkUnread,
    MarkSpam,
    Report,
}

impl ConversationAction {
    /// 1-based item position for individual conversations.
    pub fn index(&self) -> usize {
        match self {
            ConversationAction::Mute => 1,
            ConversationAction::Archive => 3,
            ConversationAction::Delete => 4,
            ConversationAction::MarkUnread => 6,
            ConversationAction::MarkSpam => 7,
            ConversationAction::Report => 8,
        }
    }

    /// 1-based item position for group conversations.
    pub fn group_index(&self) -> usize {
        match self {
            ConversationAction::Mute => 1,
            ConversationAction::Archive => 4,
            ConversationAction::Delete => 5,
            ConversationAction::MarkUnread => 7,
            ConversationAction::MarkSpam => 8,
            ConversationAction::Report => 9,
        }
    }
}

/// What happened inside one qualifying menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuAction {
    pub group: bool,
    /// Position that was chosen.
    pub index: usize,
    /// False when the menu had no item at that position.
    pub clicked: bool,
}

/// Result of a conversation action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationOutcome {
    /// No selected conversation, or it has no dropdown opener.
    NoMenuOpener,
    /// The dropdown did not produce a menu carrying a sentinel label.
    NoConversationMenu,
    Actioned(Vec<MenuAction>),
}

/// Open the selected conversation's dropdown and activate one item.
pub fn perform_conversation_action(
    document: &Document,
    action_index: usize,
    group_action_index: usize,
) -> ConversationOutcome {
    let generation = detect_generation(document);

    let Some(opener) = query(document, resolve(UiElement::ConversationMenuOpener, generation))
    else {
        debug!("No conversation menu opener");
        return ConversationOutcome::NoMenuOpener;
    };
    document.click(&opener);

    let menus = match document.query_selector_all(resolve(UiElement::ConversationMenu, generation))
    {
        Ok(menus) => menus,
        Err(e) => {
            warn!(error = %e, "Conversation menu selector rejected");
            return ConversationOutcome::NoConversationMenu;
        }
    };

    let mut actions = Vec::new();
    for menu in menus {
        let labels = item_labels(document, &menu, generation);
        if !labels.iter().any(|l| MENU_SENTINELS.contains(&l.as_str())) {
            continue;
        }

        if let Some(root) = menu.nth_ancestor_element(MENU_ROOT_DEPTH) {
            document.set_style_property(&root, "visibility", "hidden");
        }

        let group = labels.iter().any(|l| l == GROUP_SENTINEL);
        let index = if group {
            group_action_index
        } else {
            action_index
        };

        let item = document
            .query_selector_in(&menu, &selectors::conversation_menu_item(generation, index))
            .ok()
            .flatten();
        let clicked = match item {
            Some(item) => {
                document.click(&item);
                true
            }
            None => false,
        };

        info!(group, index, clicked, "Conversation menu action");
        actions.push(MenuAction {
            group,
            index,
            clicked,
        });
    }

    if actions.is_empty() {
        debug!("No open menu carries a conversation sentinel");
        ConversationOutcome::NoConversationMenu
    } else {
        ConversationOutcome::Actioned(actions)
    }
}

fn item_labels(document: &Document, menu: &Rc<Node>, generation: Generation) -> Vec<String> {
    document
        .query_selector_all_in(menu, resolve(UiElement::ConversationMenuItem, generation))
        .unwrap_or_default()
        .iter()
        .map(|item| item.text_content().trim().to_string())
        .collect()
}

fn query(document: &Document, selector: &str) -> Option<Rc<Node>> {
    match document.query_selector(selector) {
        Ok(found) => found,
        Err(e) => {
            warn!(selector, error = %e, "Selector rejected");
            None
        }
    }
}
