//! Version-sensitive selectors for the hosted page.
//!
//! Every selector the bridge uses lives in [`SELECTOR_TABLE`], one column per
//! markup generation. Supporting another generation means another column,
//! never a branch at a call site.

use chatwave_dom::Document;
use tracing::warn;

/// Markup generation of the hosted page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Generation {
    Current,
    Previous,
}

/// Logical UI elements the bridge reaches for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiElement {
    NewMessageButton,
    SelectedConversation,
    /// Activation link inside a conversation row
    ActivateConversation,
    /// The cog that toggles the settings dropdown
    SettingsButton,
    SettingsLink,
    InboxLink,
    ActiveContactsLink,
    MessageRequestsLink,
    ArchivedThreadsLink,
    /// Opener of the selected conversation's dropdown
    ConversationMenuOpener,
    ConversationMenu,
    ConversationMenuItem,
    LikeButton,
    PageRoot,
}

/// Marker present only in the previous generation.
pub const GENERATION_MARKER: &str = "._1enh ._36ic._5l-3 ._1tqi";

/// `(element, current, previous)`
pub const SELECTOR_TABLE: &[(UiElement, &str, &str)] = &[
    (
        UiElement::NewMessageButton,
        "._30yy._6-xp._6-xq",
        "._1enh ._36ic ._30yy._2oc8",
    ),
    (UiElement::SelectedConversation, "._1ht2", "._1ht2"),
    (UiElement::ActivateConversation, "a._1ht5", "a._1ht5"),
    (
        UiElement::SettingsButton,
        "._1enh._7q1s ._30yy._6ymd._2agf._4o_4._p",
        "._1enh ._36ic ._4kzu a",
    ),
    (
        UiElement::SettingsLink,
        "._54ni.__MenuItem:first-child",
        "._54ni.__MenuItem:first-child",
    ),
    (
        UiElement::InboxLink,
        "._1enh._7q1s ._30yy._6-xf._6-xg",
        "._1enh ._36ic ._30yy",
    ),
    (
        UiElement::ActiveContactsLink,
        "._54ni.__MenuItem:nth-child(3)",
        "._54ni.__MenuItem:nth-child(3)",
    ),
    (
        UiElement::MessageRequestsLink,
        "._54ni.__MenuItem:nth-child(4)",
        "._54ni.__MenuItem:nth-child(4)",
    ),
    (
        UiElement::ArchivedThreadsLink,
        "._54ni.__MenuItem:nth-child(5)",
        "._54ni.__MenuItem:nth-child(5)",
    ),
    (
        UiElement::ConversationMenuOpener,
        "._1ht2 ._5blh",
        "._1ht2 ._5blh",
    ),
    (UiElement::ConversationMenu, "._54nf", "._54nf"),
    (
        UiElement::ConversationMenuItem,
        "._54ni.__MenuItem",
        "._54ni.__MenuItem",
    ),
    (
        UiElement::LikeButton,
        "._5j_u._30yy._4rv9._6ymq._7kpj",
        "._4rv9._30yy._39bl",
    ),
    (UiElement::PageRoot, "#facebook", "#facebook"),
];

/// Selector for `element` in `generation`.
pub fn resolve(element: UiElement, generation: Generation) -> &'static str {
    SELECTOR_TABLE
        .iter()
        .find(|(e, _, _)| *e == element)
        .map(|(_, current, previous)| match generation {
            Generation::Current => *current,
            Generation::Previous => *previous,
        })
        // Every variant has a row; see test_table_is_complete.
        .unwrap_or_default()
}

/// Probe the page once. Absence of the marker means [`Generation::Current`].
pub fn detect_generation(document: &Document) -> Generation {
    match document.query_selector(GENERATION_MARKER) {
        Ok(Some(_)) => Generation::Previous,
        Ok(None) => Generation::Current,
        Err(e) => {
            warn!(error = %e, "Generation probe rejected");
            Generation::Current
        }
    }
}

/// Conversation link for a row id.
pub fn conversation_by_id(id: &str) -> String {
    format!("[id='{}'] a", escape_quoted(id, '\''))
}

/// Conversation avatar whose source contains `image_name`.
pub fn conversation_by_image(image_name: &str) -> String {
    format!(
        "div[role=\"navigation\"] > div > ul img[src*=\"{}\"]",
        escape_quoted(image_name, '"')
    )
}

/// `:nth-child` of a conversation menu item, 1-based.
pub fn conversation_menu_item(generation: Generation, position: usize) -> String {
    format!(
        "{}:nth-child({})",
        resolve(UiElement::ConversationMenuItem, generation),
        position
    )
}

fn escape_quoted(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '\\' || c == quote {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
