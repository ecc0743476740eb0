//! Workspace folder persistence: one markdown file per page plus a
//! `meta.tab` index of `<file>.md<TAB><color>` rows in page order.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use relative_path::RelativePath;

use crate::codec;
use crate::pages::{PageId, PageStore, Rgba};

/// Index file written next to the page files in a workspace folder.
pub const INDEX_FILE: &str = "meta.tab";

#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("missing workspace index: {0}")]
    MissingIndex(PathBuf),
    #[error("not a usable workspace folder: {0}")]
    UnusableFolder(PathBuf),
}

/// Read a page file relative to the workspace root.
pub fn read_file(relative_path: &RelativePath, root: &Path) -> Result<String, WorkspaceError> {
    let absolute_path = relative_path.to_path(root);
    Ok(fs::read_to_string(&absolute_path)?)
}

/// Write a page file relative to the workspace root.
pub fn write_file(
    relative_path: &RelativePath,
    root: &Path,
    content: &str,
) -> Result<(), WorkspaceError> {
    let absolute_path = relative_path.to_path(root);
    if let Some(parent) = absolute_path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(fs::write(&absolute_path, content)?)
}

/// Filename stem for a page: the heading with every non-ASCII or
/// path-hostile character percent-escaped, so the stem maps 1:1 back to the
/// page file row in the index.
pub fn page_file_stem(heading: &str) -> String {
    let mut stem = String::with_capacity(heading.len());
    for c in heading.chars() {
        let hostile = c == '/' || c == '\\' || c == '%';
        if c.is_ascii() && !c.is_ascii_control() && !hostile {
            stem.push(c);
        } else {
            let mut utf8 = [0u8; 4];
            for byte in c.encode_utf8(&mut utf8).bytes() {
                stem.push('%');
                stem.push_str(&format!("{byte:02X}"));
            }
        }
    }
    stem
}

/// Save every page of `store` into `dir`, in page order, plus the index.
///
/// The target must be an empty (or missing) folder or an existing workspace;
/// anything else is refused rather than clobbered. Saving over an existing
/// workspace first removes the page files its index lists, so a shrunken
/// page set leaves no strays. A page file that fails to write is logged and
/// skipped; the remaining pages still save (fail-open, not atomic).
pub fn save_workspace(store: &PageStore, dir: &Path) -> Result<(), WorkspaceError> {
    prepare_folder(dir)?;

    let mut index = String::new();
    for id in store.pages_in_order() {
        let page = store.page(id);
        let file = format!("{}.md", page_file_stem(page.heading()));
        debug!("saving page {:?} as {file}", page.heading());
        index.push_str(&file);
        index.push('\t');
        index.push_str(&page.color().to_css_string());
        index.push('\n');

        let content = codec::serialize(store, id);
        if let Err(err) = write_file(RelativePath::new(&file), dir, &content) {
            warn!("could not save {file}: {err}");
        }
    }

    fs::write(dir.join(INDEX_FILE), index)?;
    Ok(())
}

/// Load a workspace folder into `store`, returning the loaded pages in
/// index order.
///
/// Rows whose first column is not a `.md` filename are skipped. A page file
/// that cannot be read or parsed is logged and skipped; the rest load. An
/// unparseable color falls back to the default.
pub fn load_workspace(store: &mut PageStore, dir: &Path) -> Result<Vec<PageId>, WorkspaceError> {
    let index_path = dir.join(INDEX_FILE);
    let index = match fs::read_to_string(&index_path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(WorkspaceError::MissingIndex(index_path));
        }
        Err(err) => return Err(err.into()),
    };

    let mut loaded = Vec::new();
    for row in index.lines() {
        let (file, color_str) = match row.split_once('\t') {
            Some((file, color)) => (file, color),
            None => (row, ""),
        };
        if !file.ends_with(".md") {
            continue;
        }
        let color = Rgba::parse_or_default(color_str);
        let content = match read_file(RelativePath::new(file), dir) {
            Ok(content) => content,
            Err(err) => {
                warn!("could not open page file {file}: {err}");
                continue;
            }
        };
        match codec::deserialize(store, &content, color) {
            Ok(id) => loaded.push(id),
            Err(err) => warn!("skipping malformed page file {file}: {err}"),
        }
    }
    Ok(loaded)
}

/// Accept the target folder for a save: create it when missing, reuse it
/// when it is an existing workspace (removing the page files its index
/// lists), allow it when empty, refuse it otherwise.
fn prepare_folder(dir: &Path) -> Result<(), WorkspaceError> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
        return Ok(());
    }

    let index_path = dir.join(INDEX_FILE);
    if let Ok(existing) = fs::read_to_string(&index_path) {
        for row in existing.lines() {
            let file = row.split_once('\t').map_or(row, |(file, _)| file);
            if !file.ends_with(".md") {
                continue;
            }
            let path = dir.join(file);
            if let Err(err) = fs::remove_file(&path) {
                warn!("could not remove stale page file {}: {err}", path.display());
            }
        }
        return Ok(());
    }

    if fs::read_dir(dir)?.next().is_some() {
        return Err(WorkspaceError::UnusableFolder(dir.to_path_buf()));
    }
    Ok(())
}
