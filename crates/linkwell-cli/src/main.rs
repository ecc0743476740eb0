use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use linkwell_engine::{PageStore, load_workspace, save_workspace, serialize};
use log::info;

/// Inspect and round-trip linkwell workspace folders.
#[derive(Parser)]
#[command(name = "linkwell", version, about)]
struct Cli {
    /// Workspace folder containing page files and the meta.tab index.
    #[arg(long, short)]
    workspace: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the pages in the workspace, in index order.
    List,
    /// Print a page's markdown, links and bold markup re-emitted literally.
    Show { page: String },
    /// Print the link targets embedded in a page.
    Links { page: String },
    /// Load the workspace and save it back out to another folder.
    Roundtrip { dest: PathBuf },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut store = PageStore::new();
    let loaded = load_workspace(&mut store, &cli.workspace)
        .with_context(|| format!("loading workspace {}", cli.workspace.display()))?;
    info!("loaded {} pages", loaded.len());

    match cli.command {
        Command::List => {
            for id in store.pages_in_order() {
                let page = store.page(id);
                println!("{}\t{}", page.heading(), page.color().to_css_string());
            }
        }
        Command::Show { page } => {
            let id = find_page(&store, &page)?;
            print!("{}", serialize(&store, id));
        }
        Command::Links { page } => {
            let id = find_page(&store, &page)?;
            for (_, _, target) in store.page(id).content().anchors() {
                println!("{}", store.page(target).heading());
            }
        }
        Command::Roundtrip { dest } => {
            save_workspace(&store, &dest)
                .with_context(|| format!("saving workspace {}", dest.display()))?;
            println!("saved {} pages to {}", store.len(), dest.display());
        }
    }

    Ok(())
}

fn find_page(store: &PageStore, heading: &str) -> Result<linkwell_engine::PageId> {
    match store.find(heading) {
        Some(id) => Ok(id),
        None => bail!("no page named {heading:?} in this workspace"),
    }
}
