//! Command dispatch against the hosted page.
//!
//! Each [`Command`] maps to a fixed DOM operation. Anything that is not on
//! the page yet is a silent no-op: the page loads its chrome lazily and a
//! shortcut pressed too early must not break anything.

use std::rc::Rc;

use chatwave_core::Command;
use chatwave_dom::{Document, DomEvent, Node};
use tracing::{debug, info, warn};

use crate::conversation::{perform_conversation_action, ConversationAction, ConversationOutcome};
use crate::selectors::{self, detect_generation, resolve, Generation, UiElement};

/// Result of dispatching one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The page was acted on.
    Performed,
    /// Nothing to act on; the page was left as it was.
    NoOp,
    Conversation(ConversationOutcome),
}

/// Result of returning the message list to the inbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    /// The inbox was already showing; nothing was touched.
    AlreadyAtInbox,
    Reset,
    /// Neither the inbox link nor the settings button was on the page.
    NothingToReset,
}

/// Maps commands to page operations.
pub struct CommandDispatcher {
    document: Rc<Document>,
}

impl CommandDispatcher {
    pub fn new(document: Rc<Document>) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &Rc<Document> {
        &self.document
    }

    /// Dispatch a command. Commands are handled in the order they arrive.
    pub fn dispatch(&self, command: &Command) -> DispatchOutcome {
        info!(command = command.name(), "Dispatching command");

        match command {
            Command::ShowSettings => self.click_element(UiElement::SettingsLink),
            Command::NewConversation => self.click_element(UiElement::NewMessageButton),

            Command::ShowMessageListInbox => match self.reset_to_inbox() {
                ResetOutcome::Reset => DispatchOutcome::Performed,
                ResetOutcome::AlreadyAtInbox | ResetOutcome::NothingToReset => {
                    DispatchOutcome::NoOp
                }
            },
            Command::ShowMessageListActiveContacts => {
                self.open_message_list(UiElement::ActiveContactsLink)
            }
            Command::ShowMessageListMessageRequests => {
                self.open_message_list(UiElement::MessageRequestsLink)
            }
            Command::ShowMessageListArchivedThreads => {
                self.open_message_list(UiElement::ArchivedThreadsLink)
            }

            Command::MuteConversation => self.conversation_action(ConversationAction::Mute),
            Command::ArchiveConversation => self.conversation_action(ConversationAction::Archive),
            Command::DeleteConversation => self.conversation_action(ConversationAction::Delete),
            Command::MarkUnreadConversation => {
                self.conversation_action(ConversationAction::MarkUnread)
            }
            Command::MarkSpamConversation => {
                self.conversation_action(ConversationAction::MarkSpam)
            }
            Command::ReportConversation => self.conversation_action(ConversationAction::Report),

            Command::NextConversation => self.select_sibling_conversation(true),
            Command::PreviousConversation => self.select_sibling_conversation(false),
            Command::LikeConversation => self.like_conversation(),

            Command::JumpToConversation { id } => {
                self.click_selector(&selectors::conversation_by_id(id))
            }
            Command::JumpToConversationByImage { image_name } => {
                self.click_selector(&selectors::conversation_by_image(image_name))
            }
        }
    }

    /// Close any sub-view so the inbox is showing.
    ///
    /// The active-contacts link only exists while the inbox is showing, so
    /// its presence means there is nothing to do.
    pub fn reset_to_inbox(&self) -> ResetOutcome {
        let generation = detect_generation(&self.document);
        if self
            .query(resolve(UiElement::ActiveContactsLink, generation))
            .is_some()
        {
            debug!("Inbox already showing");
            return ResetOutcome::AlreadyAtInbox;
        }

        let inbox = self.query(resolve(UiElement::InboxLink, generation));
        if let Some(inbox) = &inbox {
            self.document.click(inbox);
        }
        let warmed = self.warm_up_settings();

        if inbox.is_some() || warmed {
            ResetOutcome::Reset
        } else {
            ResetOutcome::NothingToReset
        }
    }

    /// Open then close the settings dropdown so its links are in the page.
    pub fn warm_up_settings(&self) -> bool {
        let generation = detect_generation(&self.document);
        match self.query(resolve(UiElement::SettingsButton, generation)) {
            Some(button) => {
                self.document.click(&button);
                self.document.click(&button);
                true
            }
            None => {
                debug!("Settings button not present");
                false
            }
        }
    }

    fn open_message_list(&self, link: UiElement) -> DispatchOutcome {
        self.reset_to_inbox();
        self.click_element(link)
    }

    fn conversation_action(&self, action: ConversationAction) -> DispatchOutcome {
        DispatchOutcome::Conversation(perform_conversation_action(
            &self.document,
            action.index(),
            action.group_index(),
        ))
    }

    fn select_sibling_conversation(&self, next: bool) -> DispatchOutcome {
        let generation = detect_generation(&self.document);
        let Some(selected) = self.query(resolve(UiElement::SelectedConversation, generation))
        else {
            debug!("No selected conversation");
            return DispatchOutcome::NoOp;
        };

        let sibling = if next {
            selected.next_element_sibling()
        } else {
            selected.previous_element_sibling()
        };
        let Some(sibling) = sibling else {
            debug!(next, "No sibling conversation");
            return DispatchOutcome::NoOp;
        };

        let link = self
            .document
            .query_selector_in(&sibling, resolve(UiElement::ActivateConversation, generation))
            .ok()
            .flatten();
        self.activate(link)
    }

    /// The like control reacts to press and release rather than click.
    fn like_conversation(&self) -> DispatchOutcome {
        let generation = detect_generation(&self.document);
        let Some(like) = self.query(resolve(UiElement::LikeButton, generation)) else {
            debug!(?generation, "Like button not present");
            return DispatchOutcome::NoOp;
        };

        self.document.dispatch_event(&like, &DomEvent::mouse("mousedown"));
        self.document.dispatch_event(&like, &DomEvent::mouse("mouseup"));
        DispatchOutcome::Performed
    }

    fn click_element(&self, element: UiElement) -> DispatchOutcome {
        let generation: Generation = detect_generation(&self.document);
        self.click_selector(resolve(element, generation))
    }

    fn click_selector(&self, selector: &str) -> DispatchOutcome {
        let found = self.query(selector);
        if found.is_none() {
            debug!(selector, "Element not found");
        }
        self.activate(found)
    }

    fn activate(&self, element: Option<Rc<Node>>) -> DispatchOutcome {
        match element {
            Some(element) => {
                self.document.click(&element);
                DispatchOutcome::Performed
            }
            None => DispatchOutcome::NoOp,
        }
    }

    fn query(&self, selector: &str) -> Option<Rc<Node>> {
        match self.document.query_selector(selector) {
            Ok(found) => found,
            Err(e) => {
                warn!(selector, error = %e, "Selector rejected");
                None
            }
        }
    }
}
