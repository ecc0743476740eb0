use std::collections::HashMap;
use std::ops::Range;

use xi_rope::Rope;

use crate::pages::PageId;

/// Character embedded in the rope where an anchor lives. One anchor occupies
/// exactly one character position; the serializer keys on this value.
pub const ANCHOR_CHAR: char = '\u{FFFC}';

/// Handle to a stable position marker inside one [`TextBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkId(usize);

/// Handle to a zero-width anchor embedded in one [`TextBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnchorId(usize);

#[derive(Debug, Clone)]
struct Mark {
    pos: usize,
    deleted: bool,
}

#[derive(Debug, Clone)]
struct AnchorRecord {
    pos: usize,
    target: PageId,
    deleted: bool,
}

/// Mutable rich-text buffer backing one page's content.
///
/// The buffer holds the entire body in a single `xi_rope::Rope` as the source
/// of truth, plus three side tables that are transformed through every edit:
///
/// - **Marks**: stable byte positions with left gravity (an insertion at the
///   mark's exact position leaves the mark before the inserted text).
/// - **Anchors**: zero-width placeholders occupying one character position
///   ([`ANCHOR_CHAR`]) and carrying a non-owning reference to a target page.
///   An anchor whose character is deleted is flagged, never reused.
/// - **Bold tag**: one buffer-local inline tag stored as normalized,
///   non-overlapping byte ranges. Applying the tag over overlapping or
///   touching ranges coalesces them.
///
/// All positions are byte offsets and must fall on character boundaries.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    rope: Rope,
    marks: Vec<Mark>,
    named_marks: HashMap<String, MarkId>,
    anchors: Vec<AnchorRecord>,
    bold: Vec<Range<usize>>,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBuffer {
    pub fn new() -> Self {
        Self {
            rope: Rope::from(""),
            marks: Vec::new(),
            named_marks: HashMap::new(),
            anchors: Vec::new(),
            bold: Vec::new(),
        }
    }

    /// Length of the text in bytes.
    pub fn len(&self) -> usize {
        self.rope.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.is_empty()
    }

    /// The full text, anchor placeholder characters included.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Slice the buffer to a string, clamping the range to buffer bounds.
    pub fn slice(&self, range: Range<usize>) -> String {
        let len = self.rope.len();
        let start = range.start.min(len);
        let end = range.end.min(len).max(start);
        self.rope.slice_to_cow(start..end).into_owned()
    }

    /// Insert `text` at byte offset `at`, shifting marks, anchors and bold
    /// runs behind the insertion point.
    pub fn insert(&mut self, at: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        let at = at.min(self.rope.len());
        self.rope.edit(at..at, text);
        self.shift_for_insert(at, text.len());
    }

    /// Delete the given byte range. Marks inside the range collapse onto its
    /// start; anchors inside it are flagged deleted; emptied bold runs vanish.
    pub fn delete(&mut self, range: Range<usize>) {
        let len = self.rope.len();
        let start = range.start.min(len);
        let end = range.end.min(len).max(start);
        if start == end {
            return;
        }
        self.rope.edit(start..end, "");
        self.shift_for_delete(start..end);
    }

    /// Replace the entire text wholesale. This installs a fresh body: all
    /// marks and anchors are flagged deleted and the bold tag is cleared.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from(text);
        for mark in &mut self.marks {
            mark.deleted = true;
        }
        self.named_marks.clear();
        for anchor in &mut self.anchors {
            anchor.deleted = true;
        }
        self.bold.clear();
    }

    // ---- Marks ----

    /// Create an anonymous left-gravity mark at `at`.
    pub fn create_mark(&mut self, at: usize) -> MarkId {
        let id = MarkId(self.marks.len());
        self.marks.push(Mark {
            pos: at.min(self.rope.len()),
            deleted: false,
        });
        id
    }

    /// Create or move the named mark `name` to `at`.
    pub fn set_named_mark(&mut self, name: &str, at: usize) -> MarkId {
        if let Some(&id) = self.named_marks.get(name) {
            let mark = &mut self.marks[id.0];
            mark.pos = at.min(self.rope.len());
            mark.deleted = false;
            id
        } else {
            let id = self.create_mark(at);
            self.named_marks.insert(name.to_string(), id);
            id
        }
    }

    pub fn named_mark(&self, name: &str) -> Option<MarkId> {
        self.named_marks.get(name).copied()
    }

    /// Current position of a mark, or `None` once it has been deleted.
    pub fn mark_pos(&self, id: MarkId) -> Option<usize> {
        let mark = self.marks.get(id.0)?;
        if mark.deleted { None } else { Some(mark.pos) }
    }

    pub fn delete_mark(&mut self, id: MarkId) {
        if let Some(mark) = self.marks.get_mut(id.0) {
            mark.deleted = true;
        }
    }

    // ---- Anchors ----

    /// Embed a new anchor at `at`, bound to `target`. The anchor occupies one
    /// character position in the text.
    pub fn create_anchor(&mut self, at: usize, target: PageId) -> AnchorId {
        let at = at.min(self.rope.len());
        let mut placeholder = [0u8; 4];
        let encoded = ANCHOR_CHAR.encode_utf8(&mut placeholder);
        self.rope.edit(at..at, &*encoded);
        self.shift_for_insert(at, encoded.len());

        let id = AnchorId(self.anchors.len());
        self.anchors.push(AnchorRecord {
            pos: at,
            target,
            deleted: false,
        });
        id
    }

    /// Look up the live anchor whose placeholder character starts at `pos`.
    pub fn anchor_at(&self, pos: usize) -> Option<AnchorId> {
        self.anchors
            .iter()
            .position(|a| !a.deleted && a.pos == pos)
            .map(AnchorId)
    }

    /// Target page of an anchor, deleted or not.
    pub fn anchor_target(&self, id: AnchorId) -> Option<PageId> {
        self.anchors.get(id.0).map(|a| a.target)
    }

    pub fn anchor_deleted(&self, id: AnchorId) -> bool {
        self.anchors.get(id.0).is_none_or(|a| a.deleted)
    }

    /// Live anchors in registration order as `(id, position, target)`.
    pub fn anchors(&self) -> impl Iterator<Item = (AnchorId, usize, PageId)> + '_ {
        self.anchors
            .iter()
            .enumerate()
            .filter(|(_, a)| !a.deleted)
            .map(|(i, a)| (AnchorId(i), a.pos, a.target))
    }

    // ---- Bold tag ----

    /// Apply the bold tag over `range`. Overlapping and touching runs merge,
    /// so repeated application is idempotent.
    pub fn apply_bold(&mut self, range: Range<usize>) {
        let len = self.rope.len();
        let start = range.start.min(len);
        let end = range.end.min(len).max(start);
        if start == end {
            return;
        }
        self.bold.push(start..end);
        self.bold.sort_by_key(|r| r.start);
        let mut merged: Vec<Range<usize>> = Vec::with_capacity(self.bold.len());
        for run in self.bold.drain(..) {
            match merged.last_mut() {
                Some(last) if run.start <= last.end => {
                    last.end = last.end.max(run.end);
                }
                _ => merged.push(run),
            }
        }
        self.bold = merged;
    }

    /// Normalized bold runs, ordered and non-overlapping.
    pub fn bold_runs(&self) -> &[Range<usize>] {
        &self.bold
    }

    // ---- Search ----

    /// Find the last occurrence of `needle` that ends at or before `before`.
    pub fn backward_search(&self, needle: &str, before: usize) -> Option<Range<usize>> {
        let text = self.text();
        let before = before.min(text.len());
        let start = text[..before].rfind(needle)?;
        Some(start..start + needle.len())
    }

    // ---- Edit transforms ----

    fn shift_for_insert(&mut self, at: usize, len: usize) {
        for mark in &mut self.marks {
            // Left gravity: a mark exactly at the insertion point stays put.
            if !mark.deleted && mark.pos > at {
                mark.pos += len;
            }
        }
        for anchor in &mut self.anchors {
            // The anchor's character shifts with the text it sits in.
            if !anchor.deleted && anchor.pos >= at {
                anchor.pos += len;
            }
        }
        for run in &mut self.bold {
            if at <= run.start {
                run.start += len;
                run.end += len;
            } else if at < run.end {
                // Strictly interior insertion extends the run; boundary
                // insertion does not.
                run.end += len;
            }
        }
    }

    fn shift_for_delete(&mut self, range: Range<usize>) {
        let len = range.end - range.start;
        let collapse = |pos: usize| {
            if pos <= range.start {
                pos
            } else if pos >= range.end {
                pos - len
            } else {
                range.start
            }
        };
        for mark in &mut self.marks {
            if !mark.deleted {
                mark.pos = collapse(mark.pos);
            }
        }
        for anchor in &mut self.anchors {
            if anchor.deleted {
                continue;
            }
            if anchor.pos >= range.start && anchor.pos < range.end {
                anchor.deleted = true;
            } else if anchor.pos >= range.end {
                anchor.pos -= len;
            }
        }
        self.bold.retain_mut(|run| {
            run.start = collapse(run.start);
            run.end = collapse(run.end);
            run.start < run.end
        });
    }
}
