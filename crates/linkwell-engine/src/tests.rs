//! Shared helpers for the crate's unit tests.

use crate::pages::{PageId, PageStore};

/// Type a string into a page one character at a time, the way a user would,
/// always appending at the end of the buffer.
pub fn type_into(store: &mut PageStore, id: PageId, text: &str) {
    for c in text.chars() {
        let at = store.page(id).content().len();
        store.insert_text(id, at, &c.to_string());
    }
}

/// A page loaded from a raw body, fixed up the way the load path does it.
pub fn page_from_body(store: &mut PageStore, heading: &str, body: &str) -> PageId {
    let id = store.create_page(heading, None);
    store.page_mut(id).content_mut().set_text(body);
    store.fix_content(id);
    id
}
