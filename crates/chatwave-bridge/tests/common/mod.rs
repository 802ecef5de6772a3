//! Page snapshots and harness shared by the bridge integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::io::Cursor;
use std::rc::{Rc, Weak};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chatwave_bridge::{Bridge, IconError, IconFetcher};
use chatwave_core::{BridgeConfig, OutboundMessage};
use chatwave_dom::{
    Document, DomEvent, ListenerOptions, MutationObserverInit, MutationRecord, Node, NodeId,
    Window,
};
use tokio::sync::mpsc::UnboundedReceiver;

/// Current markup generation, inbox showing, settings dropdown not yet loaded.
pub const CURRENT_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Messenger</title></head>
<body>
<div id="facebook">
  <div class="_1enh _7q1s">
    <a class="_30yy _6ymd _2agf _4o_4 _p" id="settings-cog" role="button">Settings, help and more</a>
    <a class="_30yy _6-xf _6-xg" id="inbox-link" role="button">Inbox</a>
    <a class="_30yy _6-xp _6-xq" id="new-message" role="button">New Message</a>
  </div>
  <div role="navigation"><div><ul id="threads">
    <li id="row_100" class="_5l-3 _1ht1 _1ht2"><a class="_1ht5" href="/t/100"><img src="https://scontent.example/v/t1/p50x50/alice.jpg?oh=1"></a><div class="_5blh" id="opener-100" role="button"></div></li>
    <li id="row_200" class="_5l-3 _1ht1"><a class="_1ht5" href="/t/200"><img src="https://scontent.example/v/t1/p50x50/bob.jpg?oh=2"></a><div class="_5blh" role="button"></div></li>
    <li id="row_300" class="_5l-3 _1ht1"><a class="_1ht5" href="/t/300"><img src="https://scontent.example/v/t1/p50x50/team.png?oh=3"></a><div class="_5blh" role="button"></div></li>
  </ul></div></div>
  <div id="composer"><a class="_5j_u _30yy _4rv9 _6ymq _7kpj" id="like" role="button">Send a Like</a></div>
</div>
</body>
</html>"#;

/// Previous markup generation.
pub const PREVIOUS_PAGE: &str = r##"<!DOCTYPE html>
<html>
<head><title>Messenger</title></head>
<body>
<div id="facebook">
  <div class="_1enh">
    <div class="_36ic _5l-3">
      <span class="_1tqi">Messenger</span>
      <div class="_4kzu"><a id="settings-cog-prev" href="#settings">Settings</a></div>
      <a class="_30yy _2oc8" id="new-message-prev" role="button">New Message</a>
    </div>
  </div>
  <div role="navigation"><div><ul>
    <li id="row_100" class="_1ht1 _1ht2"><a class="_1ht5" href="/t/100"><img src="https://scontent.example/alice.jpg?oh=1"></a></li>
    <li id="row_200" class="_1ht1"><a class="_1ht5" href="/t/200"><img src="https://scontent.example/bob.jpg?oh=2"></a></li>
  </ul></div></div>
  <a class="_4rv9 _30yy _39bl" id="like-prev" role="button">Like</a>
</div>
</body>
</html>"##;

/// Settings dropdown as the page inserts it.
pub const SETTINGS_MENU: &str = r#"<div id="settings-layer"><div><div><ul class="_54nf" role="menu"><li class="_54ni __MenuItem">Settings</li><li class="_54ni __MenuItem">Help</li><li class="_54ni __MenuItem">Active contacts</li><li class="_54ni __MenuItem">Message requests</li><li class="_54ni __MenuItem">Archived threads</li></ul></div></div></div>"#;

/// Dropdown of a one-to-one conversation.
pub const INDIVIDUAL_MENU: &str = r#"<div id="conversation-layer"><div><div><ul class="_54nf" role="menu"><li class="_54ni __MenuItem">Mute</li><li class="_54ni __MenuItem">Open in Messenger</li><li class="_54ni __MenuItem">Archive</li><li class="_54ni __MenuItem">Delete</li><li class="_54ni __MenuItem">-</li><li class="_54ni __MenuItem">Mark as Unread</li><li class="_54ni __MenuItem">Mark as Spam</li><li class="_54ni __MenuItem">Report Spam or Abuse</li></ul></div></div></div>"#;

/// Dropdown of a group conversation.
pub const GROUP_MENU: &str = r#"<div id="conversation-layer"><div><div><ul class="_54nf" role="menu"><li class="_54ni __MenuItem">Unmute</li><li class="_54ni __MenuItem">Open in Messenger</li><li class="_54ni __MenuItem">Leave Group</li><li class="_54ni __MenuItem">Archive</li><li class="_54ni __MenuItem">Delete</li><li class="_54ni __MenuItem">-</li><li class="_54ni __MenuItem">Mark as Unread</li><li class="_54ni __MenuItem">Mark as Spam</li><li class="_54ni __MenuItem">Report Spam or Abuse</li></ul></div></div></div>"#;

/// A loaded page with a record of every click that reached it.
pub struct Page {
    pub document: Rc<Document>,
    pub window: Rc<Window>,
    pub clicks: Rc<RefCell<Vec<String>>>,
}

impl Page {
    pub fn load(html: &str) -> Self {
        let document = Rc::new(Document::parse_html(html).unwrap());
        let clicks = Rc::new(RefCell::new(Vec::new()));

        let log = clicks.clone();
        let weak = Rc::downgrade(&document);
        document.root().event_target.add_event_listener(
            "click",
            Rc::new(move |event: &DomEvent| {
                let Some(document) = weak.upgrade() else { return };
                if let Some(target) = event.target().and_then(|id| node_by_id(&document, id)) {
                    log.borrow_mut().push(label(&target));
                }
            }),
            ListenerOptions {
                capture: true,
                ..Default::default()
            },
        );

        let window = Rc::new(Window::new(document.clone()));
        Self {
            document,
            window,
            clicks,
        }
    }

    /// Run `behaviour` whenever an element matching `selector` is clicked.
    pub fn on_click(&self, selector: &str, behaviour: impl Fn(&Document) + 'static) {
        let behaviour = Rc::new(behaviour);
        for node in self.document.query_selector_all(selector).unwrap() {
            let weak: Weak<Document> = Rc::downgrade(&self.document);
            let behaviour = behaviour.clone();
            node.event_target.add_event_listener(
                "click",
                Rc::new(move |_: &DomEvent| {
                    if let Some(document) = weak.upgrade() {
                        behaviour(&document);
                    }
                }),
                ListenerOptions::default(),
            );
        }
    }

    /// Clicking the cog inserts the settings dropdown the first time.
    pub fn with_settings_dropdown(self, cog: &str) -> Self {
        self.on_click(cog, |document| {
            if document.get_element_by_id("settings-layer").is_none() {
                let body = document.body().unwrap();
                document.insert_html(&body, SETTINGS_MENU).unwrap();
            }
        });
        self
    }

    /// Clicking the selected conversation's opener inserts `menu`.
    pub fn with_conversation_menu(self, menu: &'static str) -> Self {
        self.on_click("._1ht2 ._5blh", move |document| {
            let body = document.body().unwrap();
            document.insert_html(&body, menu).unwrap();
        });
        self
    }

    /// Count every mutation anywhere in the document.
    pub fn count_mutations(&self) -> Rc<Cell<usize>> {
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        self.document.observe(
            self.document.root(),
            MutationObserverInit::all(),
            Rc::new(move |records: &[MutationRecord]| {
                counter.set(counter.get() + records.len())
            }),
        );
        count
    }

    /// Count `event_type` events dispatched at the element with `id`.
    pub fn count_events(&self, id: &str, event_type: &str) -> Rc<Cell<usize>> {
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        self.document
            .get_element_by_id(id)
            .unwrap()
            .event_target
            .add_event_listener(
                event_type,
                Rc::new(move |_: &DomEvent| counter.set(counter.get() + 1)),
                ListenerOptions::default(),
            );
        count
    }

    pub fn clicks(&self) -> Vec<String> {
        self.clicks.borrow().clone()
    }

    pub fn bridge(&self, fetcher: Arc<dyn IconFetcher>) -> (Bridge, UnboundedReceiver<OutboundMessage>) {
        Bridge::new(self.window.clone(), BridgeConfig::default(), fetcher)
    }
}

/// Identify a clicked node: id, then href, then src, then text.
pub fn label(node: &Node) -> String {
    ["id", "href", "src"]
        .iter()
        .find_map(|name| node.get_attribute(name))
        .unwrap_or_else(|| node.text_content().trim().to_string())
}

fn node_by_id(document: &Document, id: NodeId) -> Option<Rc<Node>> {
    let mut found = None;
    document.traverse(|node| {
        if node.id == id {
            found = Some(node.clone());
        }
    });
    found
}

/// PNG bytes of a solid image.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([20, 120, 240, 255]));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

/// Serves fixed bytes for every icon and records what was asked for.
pub struct FixtureFetcher {
    bytes: Option<Vec<u8>>,
    pub requested: Mutex<Vec<String>>,
}

impl FixtureFetcher {
    pub fn serving(bytes: Vec<u8>) -> Arc<Self> {
        Arc::new(Self {
            bytes: Some(bytes),
            requested: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            bytes: None,
            requested: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl IconFetcher for FixtureFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, IconError> {
        self.requested.lock().unwrap().push(url.to_string());
        self.bytes
            .clone()
            .ok_or_else(|| IconError::Status(404))
    }
}
