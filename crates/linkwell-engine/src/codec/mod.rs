//! Serialization between a page's structured content and its flat markdown
//! form: a `#<heading>` line followed by the body with literal `**` bold
//! delimiters and `[[Name]]` link markers. Load, edit, save round-trips are
//! information-preserving for any page free of unbalanced `**`.

use log::debug;

use crate::buffer::ANCHOR_CHAR;
use crate::pages::{PageId, PageStore, Rgba};

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("page file does not start with a heading line")]
    MissingHeading,
}

/// Re-emit a page's structured content as markdown text.
///
/// Walks the body character by character: at every position where a bold run
/// starts or ends, a `**` is emitted; an anchor placeholder becomes
/// `[[<target heading>]]`; everything else is copied verbatim. A bold run
/// ending exactly at the buffer end still emits its closing delimiter.
pub fn serialize(store: &PageStore, id: PageId) -> String {
    let page = store.page(id);
    let buf = page.content();
    let text = buf.text();
    let runs = buf.bold_runs();

    let mut out = format!("#{}\n", page.heading());
    for (i, c) in text.char_indices() {
        if runs.iter().any(|r| r.start == i || r.end == i) {
            out.push_str("**");
        }
        if c == ANCHOR_CHAR {
            let target = buf.anchor_at(i).and_then(|a| buf.anchor_target(a));
            if let Some(target) = target {
                out.push_str("[[");
                out.push_str(store.page(target).heading());
                out.push_str("]]");
            }
            // A placeholder with no live anchor is dropped.
        } else {
            out.push(c);
        }
    }
    if runs.iter().any(|r| r.end == text.len() && !r.is_empty()) {
        out.push_str("**");
    }
    out
}

/// Load a page from its markdown text into `store`.
///
/// The text must start with `#`; the first line is the heading, the rest the
/// raw body. A page with the same heading is reused: it keeps its identity,
/// takes the new color, and has its body replaced wholesale. The body is
/// then fixed up synchronously before this returns: links are converted to
/// anchors and `**` pairs to bold spans.
pub fn deserialize(store: &mut PageStore, text: &str, color: Rgba) -> Result<PageId, CodecError> {
    let rest = text.strip_prefix('#').ok_or(CodecError::MissingHeading)?;
    let (heading, body) = match rest.split_once('\n') {
        Some((heading, body)) => (heading, body),
        // A file that is only a heading line yields an empty body.
        None => (rest, ""),
    };
    debug!("loading page {heading:?}");

    let id = store.resolve_or_create(heading, Some(color));
    store.page_mut(id).set_color(color);
    store.page_mut(id).content_mut().set_text(body);
    store.fix_content(id);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::type_into;
    use pretty_assertions::assert_eq;

    fn load(store: &mut PageStore, text: &str) -> PageId {
        deserialize(store, text, Rgba::default()).expect("well-formed page text")
    }

    #[test]
    fn serializes_heading_and_plain_body() {
        let mut store = PageStore::new();
        let id = load(&mut store, "#Home\njust some text");
        assert_eq!(serialize(&store, id), "#Home\njust some text");
    }

    #[test]
    fn missing_heading_marker_fails_without_creating_a_page() {
        let mut store = PageStore::new();
        let result = deserialize(&mut store, "no heading here", Rgba::default());
        assert!(matches!(result, Err(CodecError::MissingHeading)));
        assert!(store.is_empty());
    }

    #[test]
    fn heading_only_file_gets_empty_body() {
        let mut store = PageStore::new();
        let id = load(&mut store, "#Lone");
        assert_eq!(store.page(id).heading(), "Lone");
        assert!(store.page(id).content().is_empty());
    }

    #[test]
    fn round_trips_links() {
        let mut store = PageStore::new();
        let id = load(&mut store, "#Home\nSee [[Atlas]] for details.");
        assert_eq!(serialize(&store, id), "#Home\nSee [[Atlas]] for details.");
    }

    #[test]
    fn round_trips_bold_spans() {
        let mut store = PageStore::new();
        let id = load(&mut store, "#Home\nsome **bold** text");
        assert_eq!(serialize(&store, id), "#Home\nsome **bold** text");
    }

    #[test]
    fn round_trips_bold_span_at_end_of_body() {
        let mut store = PageStore::new();
        let id = load(&mut store, "#Home\nends **bold**");
        assert_eq!(serialize(&store, id), "#Home\nends **bold**");
    }

    #[test]
    fn round_trips_mixed_markup() {
        let mut store = PageStore::new();
        let text = "#Home\n**Intro** with [[Atlas]] and [[Codex]], then **more**.\nSecond line.";
        let id = load(&mut store, text);
        assert_eq!(serialize(&store, id), text);
    }

    #[test]
    fn invalid_link_text_survives_the_round_trip_verbatim() {
        let mut store = PageStore::new();
        let id = load(&mut store, "#Home\n[[bad\tname]]");
        assert_eq!(serialize(&store, id), "#Home\n[[bad\tname]]");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn typed_link_serializes_like_a_loaded_one() {
        let mut store = PageStore::new();
        let id = store.create_page("Home", None);
        type_into(&mut store, id, "go to [[Atlas]] now");
        store.run_idle_tasks();
        assert_eq!(serialize(&store, id), "#Home\ngo to [[Atlas]] now");
    }

    #[test]
    fn reloading_an_existing_heading_replaces_the_body() {
        let mut store = PageStore::new();
        let first = load(&mut store, "#Home\nold body with [[Atlas]]");
        let second = load(&mut store, "#Home\nnew body");
        assert_eq!(first, second);
        assert_eq!(serialize(&store, second), "#Home\nnew body");
        // The stub from the old body remains in the store.
        assert!(store.find("Atlas").is_some());
    }

    #[test]
    fn anchor_inside_bold_span_round_trips() {
        let mut store = PageStore::new();
        let text = "#Home\n**see [[Atlas]] now** done";
        let id = load(&mut store, text);
        assert_eq!(serialize(&store, id), text);
    }
}
