use log::debug;

use crate::pages::{LinkTask, PageId, PageStore};

/// Named mark placed between the two `[` characters when a link opening is
/// seen. Left in the buffer after use, as a later `[[` simply moves it.
pub(crate) const START_LINK_MARK: &str = "start-link";

/// True when `c` can appear in a link name. Mirrors the interactive rule:
/// printable characters only, and the only whitespace allowed is the plain
/// space character.
fn is_valid_name_char(c: char) -> bool {
    if c.is_control() {
        return false;
    }
    !c.is_whitespace() || c == ' '
}

/// Validate the captured text of an interactively typed link.
///
/// The capture runs from just before the opening `[[` to just before the
/// closing `]]`'s second bracket, so a well-formed capture is `[[Name]`:
/// opening pair, then the name, then a single closing bracket. The scan
/// stops at the first
/// `]`; everything before it must be a valid name character.
pub(crate) fn validate_link_text(text: &str) -> bool {
    if !text.starts_with("[[") || !text.ends_with(']') {
        return false;
    }
    for c in text[2..].chars() {
        if c == ']' {
            return true;
        }
        if !is_valid_name_char(c) {
            return false;
        }
    }
    true
}

/// Validate a bare link name (no brackets), used by the batch fixer.
pub(crate) fn validate_name_chars(name: &str) -> bool {
    name.chars().all(is_valid_name_char)
}

impl PageStore {
    /// Insert `text` into `id`'s content at byte offset `at` and feed the
    /// link detector.
    ///
    /// The detector only watches single-character insertions; bulk-inserted
    /// text is picked up by the batch fixer once committed. A recognized
    /// `[[Name]]` does not mutate the buffer here; the structural change is
    /// enqueued and performed by [`run_idle_tasks`](Self::run_idle_tasks)
    /// after this call returns.
    pub fn insert_text(&mut self, id: PageId, at: usize, text: &str) {
        self.page_mut(id).content.insert(at, text);
        self.detect_link(id, at, text);
    }

    fn detect_link(&mut self, id: PageId, at: usize, text: &str) {
        let mut chars = text.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            return;
        };

        let last = self.page(id).last_char;

        if c == '[' && last == '[' {
            debug!("start link");
            let page = self.page_mut(id);
            page.last_char = ' ';
            page.content.set_named_mark(START_LINK_MARK, at);
            return;
        }

        if c == ']' && last == ']' {
            let candidate = {
                let buf = &self.page(id).content;
                let text = buf.text();
                buf.named_mark(START_LINK_MARK)
                    .and_then(|mark| buf.mark_pos(mark))
                    // The mark sits between the two opening brackets; the
                    // name region must fit between it and the terminator.
                    .filter(|&m| m >= 1 && m + 2 <= at)
                    // Edits since arming can move the mark anywhere, even
                    // between the bytes of a multibyte character; the
                    // brackets must still be in place around it.
                    .filter(|&m| text.get(m - 1..m + 1) == Some("[["))
                    .filter(|&m| text.get(m - 1..at).is_some_and(validate_link_text))
            };
            if let Some(m) = candidate {
                debug!("stop link, name {:?}", self.page(id).content.slice(m + 1..at - 1));
                let buf = &mut self.page_mut(id).content;
                let start = buf.create_mark(m + 1);
                let end = buf.create_mark(at - 1);
                self.pending.push_back(LinkTask {
                    page: id,
                    start,
                    end,
                });
            }
            self.page_mut(id).last_char = ' ';
            return;
        }

        self.page_mut(id).last_char = c;
    }
}
