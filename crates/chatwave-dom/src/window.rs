//! Page-global window state.
//!
//! The window owns the document and the replaceable notification
//! constructor that page script calls as `new Notification(title, options)`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::Document;

/// Notification title or body.
///
/// Pages pass either a plain string or a rich-text wrapper shaped like
/// `{"props": {"content": [...]}}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NotificationText {
    Plain(String),
    Rich { props: RichTextProps },
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RichTextProps {
    #[serde(default)]
    pub content: Vec<Value>,
}

impl NotificationText {
    /// The literal text: the string itself, or the first rich fragment.
    pub fn to_text(&self) -> String {
        match self {
            NotificationText::Plain(s) => s.clone(),
            NotificationText::Rich { props } => match props.content.first() {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            },
        }
    }
}

impl From<&str> for NotificationText {
    fn from(s: &str) -> Self {
        NotificationText::Plain(s.to_string())
    }
}

/// Options passed as the second constructor argument.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NotificationOptions {
    pub body: Option<NotificationText>,
    pub icon: Option<String>,
    pub silent: bool,
    pub tag: Option<String>,
}

/// A `new Notification(title, options)` call.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRequest {
    pub title: NotificationText,
    pub options: NotificationOptions,
}

/// What the constructor hands back to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationHandle {
    /// Shown by the engine's built-in presentation.
    Shown(u64),
    /// Handled elsewhere; nothing was presented.
    Disabled,
}

impl NotificationHandle {
    pub fn is_disabled(&self) -> bool {
        matches!(self, NotificationHandle::Disabled)
    }
}

/// Replacement notification constructor.
pub type NotificationConstructor = Rc<dyn Fn(&NotificationRequest) -> NotificationHandle>;

/// The page window.
pub struct Window {
    document: Rc<Document>,
    notification: RefCell<Option<NotificationConstructor>>,
    presented: RefCell<Vec<NotificationRequest>>,
    next_notification: Cell<u64>,
}

impl Window {
    pub fn new(document: Rc<Document>) -> Self {
        Self {
            document,
            notification: RefCell::new(None),
            presented: RefCell::new(Vec::new()),
            next_notification: Cell::new(1),
        }
    }

    pub fn document(&self) -> &Rc<Document> {
        &self.document
    }

    /// Install a constructor in place of the built-in one, returning the previous override.
    pub fn replace_notification_constructor(
        &self,
        constructor: NotificationConstructor,
    ) -> Option<NotificationConstructor> {
        self.notification.borrow_mut().replace(constructor)
    }

    pub fn has_notification_override(&self) -> bool {
        self.notification.borrow().is_some()
    }

    /// Page-side `new Notification(...)`.
    pub fn new_notification(&self, request: NotificationRequest) -> NotificationHandle {
        let constructor = self.notification.borrow().clone();
        if let Some(constructor) = constructor {
            return constructor(&request);
        }

        let id = self.next_notification.get();
        self.next_notification.set(id + 1);
        debug!(id, "Presenting notification with built-in handler");
        self.presented.borrow_mut().push(request);
        NotificationHandle::Shown(id)
    }

    /// Notifications the built-in presentation has shown.
    pub fn presented_notifications(&self) -> Vec<NotificationRequest> {
        self.presented.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rich_text() {
        let rich: NotificationText =
            serde_json::from_str(r#"{"props":{"content":["Hi there", {"x":1}]}}"#).unwrap();
        assert_eq!(rich.to_text(), "Hi there");

        let empty: NotificationText = serde_json::from_str(r#"{"props":{"content":[]}}"#).unwrap();
        assert_eq!(empty.to_text(), "");

        let plain: NotificationText = serde_json::from_str(r#""Alice""#).unwrap();
        assert_eq!(plain.to_text(), "Alice");
    }

    #[test]
    fn test_options_defaults() {
        let options: NotificationOptions = serde_json::from_str(r#"{"body":"Hi"}"#).unwrap();
        assert_eq!(options.body, Some("Hi".into()));
        assert!(!options.silent);
        assert!(options.icon.is_none());
    }

    #[test]
    fn test_override_suppresses_builtin() {
        let window = Window::new(Rc::new(Document::new()));
        let request = NotificationRequest {
            title: "Alice".into(),
            options: NotificationOptions::default(),
        };

        assert_eq!(
            window.new_notification(request.clone()),
            NotificationHandle::Shown(1)
        );

        window.replace_notification_constructor(Rc::new(|_| NotificationHandle::Disabled));
        assert!(window.new_notification(request).is_disabled());
        assert_eq!(window.presented_notifications().len(), 1);
    }
}
