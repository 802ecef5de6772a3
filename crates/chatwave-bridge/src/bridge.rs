//! The bridge between native commands and the hosted page.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use chatwave_core::{BridgeConfig, Command, OutboundMessage};
use chatwave_dom::{Document, Window};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::dispatcher::{CommandDispatcher, DispatchOutcome};
use crate::dock::DockBadgeObserver;
use crate::notification::{IconFetcher, NotificationInterceptor};
use crate::selectors::{detect_generation, resolve, Generation, UiElement};

/// Owns the page-side hooks and routes commands to the dispatcher.
pub struct Bridge {
    window: Rc<Window>,
    config: BridgeConfig,
    dispatcher: CommandDispatcher,
    fetcher: Arc<dyn IconFetcher>,
    outbound: UnboundedSender<OutboundMessage>,
    dock: RefCell<Option<DockBadgeObserver>>,
    installed: Cell<bool>,
}

impl Bridge {
    /// Create a bridge for `window`. Outbound messages arrive on the returned receiver.
    pub fn new(
        window: Rc<Window>,
        config: BridgeConfig,
        fetcher: Arc<dyn IconFetcher>,
    ) -> (Self, UnboundedReceiver<OutboundMessage>) {
        let (outbound, rx) = mpsc::unbounded_channel();
        let dispatcher = CommandDispatcher::new(Rc::clone(window.document()));
        let bridge = Self {
            window,
            config,
            dispatcher,
            fetcher,
            outbound,
            dock: RefCell::new(None),
            installed: Cell::new(false),
        };
        (bridge, rx)
    }

    pub fn window(&self) -> &Rc<Window> {
        &self.window
    }

    pub fn document(&self) -> &Rc<Document> {
        self.window.document()
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Install the notification shim and the title observer.
    ///
    /// Runs once, before page script constructs any notification. Later
    /// calls are ignored.
    pub fn install(&self) -> bool {
        if self.installed.replace(true) {
            warn!("Bridge already installed");
            return false;
        }

        NotificationInterceptor::new(Arc::clone(&self.fetcher), self.outbound.clone())
            .install(&self.window);
        self.attach_dock_observer();

        info!("Bridge installed");
        true
    }

    /// Content-loaded work, run after the configured warm-up delay.
    pub async fn on_content_loaded(&self) {
        tokio::time::sleep(self.config.warmup_delay()).await;
        self.run_content_loaded_tasks();
    }

    /// Content-loaded work without the delay.
    pub fn run_content_loaded_tasks(&self) {
        if self.dock.borrow().is_none() {
            self.attach_dock_observer();
        }
        self.mark_legacy_stylesheet();
        self.dispatcher.warm_up_settings();
    }

    /// Tag the page root so the legacy stylesheet applies to the previous generation.
    pub fn mark_legacy_stylesheet(&self) -> bool {
        let document = self.document();
        let generation = detect_generation(document);
        if generation != Generation::Previous {
            return false;
        }

        let root = document
            .query_selector(resolve(UiElement::PageRoot, generation))
            .ok()
            .flatten();
        let Some(root) = root else {
            debug!("Page root not found");
            return false;
        };

        let class = &self.config.legacy_style_class;
        if root.has_class(class) {
            return false;
        }
        document.add_class(&root, class);
        info!(class = %class, "Legacy stylesheet marker applied");
        true
    }

    pub fn handle_command(&self, command: &Command) -> DispatchOutcome {
        let outcome = self.dispatcher.dispatch(command);
        debug!(command = command.name(), ?outcome, "Command handled");
        outcome
    }

    /// Outbound sender, for components that report alongside the bridge.
    pub fn outbound(&self) -> UnboundedSender<OutboundMessage> {
        self.outbound.clone()
    }

    fn attach_dock_observer(&self) {
        let observer = DockBadgeObserver::attach(
            self.document(),
            &self.config.idle_title,
            self.outbound.clone(),
        );
        *self.dock.borrow_mut() = observer;
    }
}
