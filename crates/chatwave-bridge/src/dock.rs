//! Dock badge from the page title.
//!
//! The page writes its unread count into the title as `(N) Messenger` and
//! flickers through transient titles such as `Alice messaged you` in between.
//! Each title mutation is classified on its own.

use std::rc::{Rc, Weak};

use chatwave_core::OutboundMessage;
use chatwave_dom::{Document, MutationObserverInit, MutationRecord, Node, ObserverId};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

/// How a title maps to the dock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockState {
    /// Nothing unread.
    Idle,
    /// A badge count to show.
    PendingBadge(u32),
    /// A transient title; the badge is left alone.
    IgnoredTransient,
}

impl DockState {
    /// Count to forward, if any.
    pub fn count(&self) -> Option<u32> {
        match self {
            DockState::Idle => Some(0),
            DockState::PendingBadge(count) => Some(*count),
            DockState::IgnoredTransient => None,
        }
    }
}

/// Classify a title against the idle title.
pub fn classify_title(title: &str, idle_title: &str) -> DockState {
    let title = title.trim();
    if title == idle_title {
        return DockState::Idle;
    }
    let Some(rest) = title.strip_prefix('(') else {
        return DockState::IgnoredTransient;
    };

    // Unclosed count reads as zero
    let Some((inner, _)) = rest.split_once(')') else {
        return DockState::PendingBadge(0);
    };
    DockState::PendingBadge(leading_count(inner))
}

/// Leading decimal digits, or 0 when there are none.
fn leading_count(text: &str) -> u32 {
    let digits: String = text
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Watches the title element and forwards dock counts.
pub struct DockBadgeObserver {
    document: Weak<Document>,
    id: ObserverId,
}

impl DockBadgeObserver {
    /// Observe the document's title element. `None` when the page has no title yet.
    pub fn attach(
        document: &Rc<Document>,
        idle_title: &str,
        outbound: UnboundedSender<OutboundMessage>,
    ) -> Option<Self> {
        let Some(title) = document.title_element() else {
            debug!("No title element to observe");
            return None;
        };

        let observed: Weak<Node> = Rc::downgrade(&title);
        let idle_title = idle_title.to_string();
        let id = document.observe(
            &title,
            MutationObserverInit {
                child_list: true,
                character_data: true,
                attributes: false,
                subtree: true,
            },
            Rc::new(move |records: &[MutationRecord]| {
                if records.is_empty() {
                    return;
                }
                let Some(title) = observed.upgrade() else {
                    return;
                };

                let text = title.text_content();
                match classify_title(&text, &idle_title).count() {
                    Some(count) => {
                        info!(count, "Dock count");
                        if outbound.send(OutboundMessage::DockCount { count }).is_err() {
                            debug!("Outbound channel closed");
                        }
                    }
                    None => debug!(title = %text, "Transient title ignored"),
                }
            }),
        );

        Some(Self {
            document: Rc::downgrade(document),
            id,
        })
    }

    pub fn detach(self) {
        if let Some(document) = self.document.upgrade() {
            document.disconnect(self.id);
        }
    }
}
