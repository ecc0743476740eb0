/*!
 * Wiki-link and bold markup engine.
 *
 * Two paths feed the same structures:
 *
 * - **Interactive**: [`links`] watches every single-character insertion for
 *   the `[[`/`]]` token pair and enqueues a deferred task; [`anchors`]
 *   consumes the task queue after the insertion call stack has unwound and
 *   replaces the literal `[[Name]]` text with a zero-width anchor bound to
 *   the target page.
 * - **Batch**: after a raw body is loaded, [`anchors`] runs a backward pass
 *   converting every valid `[[Name]]` occurrence, then [`bold`] pairs up
 *   `**` delimiters into bold-tagged spans.
 *
 * Invalid link text and unbalanced delimiters are not errors: the literal
 * text is left in place (links) or the dangling delimiter's asterisks are
 * dropped with no tag applied (bold).
 */

pub mod anchors;
pub mod bold;
pub mod links;
