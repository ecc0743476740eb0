pub mod color;

pub use color::Rgba;

use std::collections::{HashMap, VecDeque};

use log::debug;

use crate::buffer::{AnchorId, MarkId, TextBuffer};

/// Typed non-owning reference to a page inside one [`PageStore`].
///
/// Anchors and the codec refer to pages through this identifier instead of
/// aliasing the page itself; the store owns every page for its whole life
/// (page removal is driven by the excluded UI layer and not modelled here).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageId(usize);

/// A named document: unique heading, owned rich-text content, a UI color
/// carried through load/save, and the anchors embedded in its content.
pub struct Page {
    pub(crate) heading: String,
    pub(crate) content: TextBuffer,
    pub(crate) color: Rgba,
    style_class: String,
    /// Last single character inserted, watched by the link detector.
    pub(crate) last_char: char,
}

impl Page {
    /// The display name. Also the registry key: renaming does not re-key the
    /// store, so links resolved against the old heading keep working only as
    /// long as the strings match. Known limitation.
    pub fn heading(&self) -> &str {
        &self.heading
    }

    pub fn content(&self) -> &TextBuffer {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut TextBuffer {
        &mut self.content
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    pub fn set_color(&mut self, color: Rgba) {
        self.color = color;
    }

    /// Store-scoped style label (`page1`, `page2`, ...) assigned at creation,
    /// used by the excluded UI for per-page styling.
    pub fn style_class(&self) -> &str {
        &self.style_class
    }
}

/// Notification from the core to the excluded UI layer, drained via
/// [`PageStore::drain_events`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A page came into existence, explicitly or as a link-target stub.
    PageCreated(PageId),
    /// An anchor was materialized in `page`'s content; the UI places a
    /// navigation control for `target` at the anchor's position.
    NewAnchor {
        page: PageId,
        anchor: AnchorId,
        target: PageId,
    },
}

/// Deferred link materialization job: two marks bounding the bare link name
/// inside the owning page's buffer. Created by the detector, consumed exactly
/// once by the materializer.
#[derive(Debug, Clone, Copy)]
pub struct LinkTask {
    pub(crate) page: PageId,
    pub(crate) start: MarkId,
    pub(crate) end: MarkId,
}

/// The registry: heading to page mapping for one workspace, plus the ordered
/// page list, the deferred link-task queue, and the UI event queue.
///
/// Single-threaded by design; tasks enqueued during an insertion run strictly
/// after the insertion returns, in FIFO order, when the owner calls
/// [`run_idle_tasks`](Self::run_idle_tasks).
#[derive(Default)]
pub struct PageStore {
    pages: Vec<Page>,
    index: HashMap<String, PageId>,
    order: Vec<PageId>,
    pub(crate) pending: VecDeque<LinkTask>,
    pub(crate) events: VecDeque<Event>,
    style_counter: u32,
}

impl PageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pages ever created in this store.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Look up a page by heading.
    pub fn find(&self, heading: &str) -> Option<PageId> {
        self.index.get(heading).copied()
    }

    pub fn page(&self, id: PageId) -> &Page {
        &self.pages[id.0]
    }

    pub fn page_mut(&mut self, id: PageId) -> &mut Page {
        &mut self.pages[id.0]
    }

    /// Pages in creation order, the order the workspace index is written in.
    pub fn pages_in_order(&self) -> impl Iterator<Item = PageId> + '_ {
        self.order.iter().copied()
    }

    /// Create a page with empty content. A duplicate heading silently re-keys
    /// the index to the new page; the previous page stays alive but can no
    /// longer be resolved by name. Use
    /// [`resolve_or_create`](Self::resolve_or_create) to reuse an existing
    /// page instead.
    pub fn create_page(&mut self, heading: &str, color: Option<Rgba>) -> PageId {
        let id = PageId(self.pages.len());
        self.style_counter += 1;
        self.pages.push(Page {
            heading: heading.to_string(),
            content: TextBuffer::new(),
            color: color.unwrap_or_default(),
            style_class: format!("page{}", self.style_counter),
            last_char: ' ',
        });
        self.index.insert(heading.to_string(), id);
        self.order.push(id);
        self.events.push_back(Event::PageCreated(id));
        debug!("page created: {heading}");
        id
    }

    /// Look up `heading`, creating a stub page when absent. Never fails; the
    /// store only ever grows. `color` is used only when a stub is created.
    pub fn resolve_or_create(&mut self, heading: &str, color: Option<Rgba>) -> PageId {
        match self.find(heading) {
            Some(id) => id,
            None => self.create_page(heading, color),
        }
    }

    /// Change a page's display heading. The registry key is not updated;
    /// see [`Page::heading`] for the limitation this carries.
    pub fn set_heading(&mut self, id: PageId, heading: &str) {
        self.page_mut(id).heading = heading.to_string();
    }

    /// Hand queued UI notifications to the caller, oldest first.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }

    /// True when link tasks are waiting for [`run_idle_tasks`](Self::run_idle_tasks).
    pub fn has_pending_links(&self) -> bool {
        !self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_or_create_returns_existing_page() {
        let mut store = PageStore::new();
        let a = store.resolve_or_create("Atlas", None);
        let b = store.resolve_or_create("Atlas", None);
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn stub_pages_get_empty_content_and_default_color() {
        let mut store = PageStore::new();
        let id = store.resolve_or_create("Atlas", None);
        assert!(store.page(id).content().is_empty());
        assert_eq!(store.page(id).color(), Rgba::default());
        assert_eq!(store.drain_events(), vec![Event::PageCreated(id)]);
    }

    #[test]
    fn stub_creation_color_hint_is_used() {
        let mut store = PageStore::new();
        let color = Rgba::new(0.1, 0.2, 0.3, 1.0);
        let id = store.resolve_or_create("Atlas", Some(color));
        assert_eq!(store.page(id).color(), color);

        // The hint only applies at creation time.
        let again = store.resolve_or_create("Atlas", Some(Rgba::default()));
        assert_eq!(again, id);
        assert_eq!(store.page(id).color(), color);
    }

    #[test]
    fn style_classes_count_up_per_store() {
        let mut store = PageStore::new();
        let a = store.create_page("A", None);
        let b = store.create_page("B", None);
        assert_eq!(store.page(a).style_class(), "page1");
        assert_eq!(store.page(b).style_class(), "page2");
    }

    #[test]
    fn duplicate_heading_rekeys_silently() {
        let mut store = PageStore::new();
        let first = store.create_page("Atlas", None);
        let second = store.create_page("Atlas", None);
        assert_ne!(first, second);
        assert_eq!(store.find("Atlas"), Some(second));
        // Both pages remain in the ordered list.
        assert_eq!(store.pages_in_order().count(), 2);
    }

    #[test]
    fn rename_does_not_rekey() {
        let mut store = PageStore::new();
        let id = store.create_page("Old", None);
        store.set_heading(id, "New");
        assert_eq!(store.page(id).heading(), "New");
        assert_eq!(store.find("New"), None);
        assert_eq!(store.find("Old"), Some(id));
    }
}
