pub mod buffer;
pub mod codec;
pub mod io;
pub mod markup;
pub mod pages;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use buffer::{ANCHOR_CHAR, AnchorId, MarkId, TextBuffer};
pub use codec::{CodecError, deserialize, serialize};
pub use io::{INDEX_FILE, WorkspaceError, load_workspace, page_file_stem, save_workspace};
pub use pages::{Event, LinkTask, Page, PageId, PageStore, Rgba};
