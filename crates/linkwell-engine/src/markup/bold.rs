use crate::buffer::TextBuffer;

/// Pair up `**` delimiters in a freshly loaded body and convert each pair
/// into a bold-tagged span, removing the delimiter text.
///
/// The scan runs backward from the buffer end. The `bold` flag starts
/// `false`: the first match found when cold is a span's right edge, the next
/// one its left edge. An odd delimiter count leaves the final (leftmost)
/// match dangling; its asterisks are removed and no tag is applied.
pub(crate) fn fix_bold_tags(buf: &mut TextBuffer) {
    let mut limit = buf.len();
    let mut bold = false;
    let mut span_end = None;

    loop {
        let Some(found) = buf.backward_search("**", limit) else {
            return;
        };
        let resume = buf.create_mark(found.start);

        if !bold {
            // Right edge of a span; remember where the bold text ends.
            span_end = Some(buf.create_mark(found.start));
            bold = true;
        } else {
            if let Some(mark) = span_end.take() {
                if let Some(end) = buf.mark_pos(mark) {
                    buf.apply_bold(found.end..end);
                }
                buf.delete_mark(mark);
            }
            bold = false;
        }

        // The delimiters are markup, not content.
        buf.delete(found);

        limit = buf.mark_pos(resume).unwrap_or(0);
        buf.delete_mark(resume);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(body: &str) -> TextBuffer {
        let mut buf = TextBuffer::new();
        buf.set_text(body);
        fix_bold_tags(&mut buf);
        buf
    }

    #[test]
    fn pairs_delimiters_into_one_span() {
        let buf = fixed("**bold** and *not bold*");
        assert_eq!(buf.text(), "bold and *not bold*");
        assert_eq!(buf.bold_runs(), &[0..4]);
    }

    #[test]
    fn handles_multiple_spans() {
        let buf = fixed("a **b** c **d** e");
        assert_eq!(buf.text(), "a b c d e");
        assert_eq!(buf.bold_runs(), &[2..3, 6..7]);
    }

    #[test]
    fn span_at_end_of_buffer() {
        let buf = fixed("plain **bold**");
        assert_eq!(buf.text(), "plain bold");
        assert_eq!(buf.bold_runs(), &[6..10]);
    }

    #[test]
    fn odd_delimiter_count_drops_asterisks_without_tagging() {
        let buf = fixed("**once and **twice** done");
        // The rightmost pair closes a span; the leftmost match dangles.
        assert_eq!(buf.text(), "once and twice done");
        assert_eq!(buf.bold_runs(), &[9..14]);
    }

    #[test]
    fn lone_pair_is_removed_with_no_tag() {
        let buf = fixed("before ** after");
        assert_eq!(buf.text(), "before  after");
        assert!(buf.bold_runs().is_empty());
    }

    #[test]
    fn no_delimiters_means_no_change() {
        let buf = fixed("nothing to do here");
        assert_eq!(buf.text(), "nothing to do here");
        assert!(buf.bold_runs().is_empty());
    }

    #[test]
    fn empty_span_applies_nothing() {
        let buf = fixed("a**** b");
        assert_eq!(buf.text(), "a b");
        assert!(buf.bold_runs().is_empty());
    }
}
