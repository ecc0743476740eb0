use log::debug;

use crate::buffer::MarkId;
use crate::markup::{bold, links::validate_name_chars};
use crate::pages::{Event, LinkTask, PageId, PageStore};

impl PageStore {
    /// Run every queued link task, oldest first.
    ///
    /// Buffer mutation from inside an insertion is disallowed, so the
    /// detector only enqueues; the owner calls this once the current event
    /// has fully unwound. Each task runs exactly once.
    pub fn run_idle_tasks(&mut self) {
        while let Some(task) = self.pending.pop_front() {
            self.materialize_link(task);
        }
    }

    /// Reconstruct structure in a freshly loaded raw body: convert every
    /// valid `[[Name]]` occurrence into an anchor, then pair up `**`
    /// delimiters into bold spans. Anchors never contain `**`, so the two
    /// passes are order-independent; links run first to match the load path.
    ///
    /// Running this over an already-fixed buffer performs no mutation.
    pub fn fix_content(&mut self, id: PageId) {
        debug!("fixing content for {:?}", self.page(id).heading());
        self.fix_anchors(id);
        bold::fix_bold_tags(&mut self.page_mut(id).content);
    }

    /// Replace one pending `[[Name]]` span with an anchor bound to the
    /// resolved target page.
    fn materialize_link(&mut self, task: LinkTask) {
        let LinkTask { page, start, end } = task;
        let span = {
            let buf = &self.page(page).content;
            let text = buf.text();
            match (buf.mark_pos(start), buf.mark_pos(end)) {
                // The brackets must still surround the marks; edits between
                // enqueue and run can move or mangle them.
                (Some(s), Some(e))
                    if s >= 2
                        && s <= e
                        && text.get(s - 2..s) == Some("[[")
                        && text.get(e..e + 2) == Some("]]") =>
                {
                    Some(s..e)
                }
                _ => None,
            }
        };
        // No span means the body was replaced or the link text edited away
        // between enqueue and run; nothing left to materialize.
        let Some(span) = span else {
            return;
        };

        let name = self.page(page).content.slice(span.clone());
        debug!("materializing link {name:?}");
        {
            let buf = &mut self.page_mut(page).content;
            // Drop the whole [[Name]] span, brackets included.
            buf.delete(span.start - 2..span.end + 2);
            buf.delete_mark(start);
            buf.delete_mark(end);
        }

        let target = self.resolve_or_create(&name, None);
        let anchor = self
            .page_mut(page)
            .content
            .create_anchor(span.start - 2, target);
        self.events.push_back(Event::NewAnchor {
            page,
            anchor,
            target,
        });
    }

    fn fix_anchors(&mut self, id: PageId) {
        let mut resume = self.fix_last_anchor(id, None);
        while let Some(mark) = resume {
            resume = self.fix_last_anchor(id, Some(mark));
        }
    }

    /// One step of the backward link scan: find the nearest `[[Name]]`
    /// candidate before `from` (or before the buffer end), convert it if the
    /// name is valid, and return the mark to continue from. `None` ends the
    /// pass. Each returned mark sits strictly before the match just
    /// examined, so the unprocessed prefix shrinks every step.
    fn fix_last_anchor(&mut self, id: PageId, from: Option<MarkId>) -> Option<MarkId> {
        let (begin, stop, name) = {
            let buf = &self.page(id).content;
            let limit = match from {
                Some(mark) => buf.mark_pos(mark)?,
                None => buf.len(),
            };
            let stop = buf.backward_search("]]", limit)?;
            let begin = buf.backward_search("[[", stop.start)?;
            let name = buf.slice(begin.end..stop.start);
            (begin, stop, name)
        };
        if let Some(mark) = from {
            self.page_mut(id).content.delete_mark(mark);
        }

        if !validate_name_chars(&name) {
            debug!("leaving invalid link text {name:?} as literal content");
            return Some(self.page_mut(id).content.create_mark(begin.start));
        }

        debug!("found link name {name:?}");
        // Stub targets created from a loaded body inherit the source page's
        // color; interactively typed links leave the stub at the default.
        let color = self.page(id).color;
        let resume = {
            let buf = &mut self.page_mut(id).content;
            let mark = buf.create_mark(begin.start);
            buf.delete(begin.start..stop.end);
            mark
        };
        let target = self.resolve_or_create(&name, Some(color));
        let at = self
            .page(id)
            .content
            .mark_pos(resume)
            .unwrap_or(begin.start);
        let anchor = self.page_mut(id).content.create_anchor(at, target);
        self.events.push_back(Event::NewAnchor {
            page: id,
            anchor,
            target,
        });
        Some(resume)
    }
}
