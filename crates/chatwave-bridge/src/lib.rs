//! # Chatwave Bridge
//!
//! Drives the hosted messaging page from native commands and re-emits the
//! page's notifications and unread count to the native side.
//!
//! - [`selectors`]: version-sensitive selector table and generation probe
//! - [`conversation`]: conversation dropdown actions
//! - [`dispatcher`]: command to DOM operation mapping
//! - [`notification`]: notification constructor shim and icon rasterization
//! - [`dock`]: title observer feeding the dock badge

pub mod bridge;
pub mod conversation;
pub mod dispatcher;
pub mod dock;
pub mod notification;
pub mod selectors;

pub use bridge::Bridge;
pub use conversation::{ConversationAction, ConversationOutcome, MenuAction};
pub use dispatcher::{CommandDispatcher, DispatchOutcome, ResetOutcome};
pub use dock::{classify_title, DockBadgeObserver, DockState};
pub use notification::{
    HttpIconFetcher, IconError, IconFetcher, NotificationInterceptor, PendingNotification,
};
pub use selectors::{detect_generation, resolve, Generation, UiElement};
