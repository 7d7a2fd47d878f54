use std::fmt::Write as _;

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use tokio::runtime::Runtime;

use crate::app::{App, Route};
use crate::favorites::Favorites;
use crate::notion::Connect;
use crate::service::PoetryService;
use crate::store::NOT_FOUND_MESSAGE;
use crate::ui::{format_poem_date, EMPTY_HINT, EMPTY_TITLE};
use crate::views::SortMode;

#[derive(Args, Debug, Clone, Default)]
pub struct TuiArgs {
    /// Start on a route such as `/poem/<id>` instead of the collection
    #[arg(long)]
    pub route: Option<Route>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Case-insensitive substring matched against titles and excerpts
    #[arg(long)]
    pub search: Option<String>,
    /// recent, oldest-first or title-asc
    #[arg(long, value_parser = parse_sort)]
    pub sort: Option<SortMode>,
    /// Only print favorite poems
    #[arg(long)]
    pub favorites: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    /// Poem identifier
    pub id: String,
}

#[derive(Subcommand, Debug, Clone)]
pub enum FavoritesCommand {
    /// Add the poem to favorites, or remove it if already there
    Toggle { id: String },
}

#[derive(Args, Debug, Clone, Default)]
pub struct FavoritesArgs {
    #[command(subcommand)]
    pub command: Option<FavoritesCommand>,
}

fn parse_sort(input: &str) -> Result<SortMode, String> {
    match input.trim().to_ascii_lowercase().as_str() {
        "recent" => Ok(SortMode::Recent),
        "oldest-first" | "oldest" => Ok(SortMode::OldestFirst),
        "title-asc" | "title" => Ok(SortMode::TitleAsc),
        other => other
            .parse()
            .map_err(|_| format!("unknown sort order `{input}`")),
    }
}

pub fn run_tui<C: Connect>(app: &mut App<C>) -> Result<()> {
    app.run()
}

pub fn list_poems<C: Connect>(
    runtime: &Runtime,
    service: &PoetryService<C>,
    favorites: &Favorites,
    args: ListArgs,
) -> Result<()> {
    let output = render_list(runtime, service, favorites, &args)?;
    print!("{output}");
    Ok(())
}

fn render_list<C: Connect>(
    runtime: &Runtime,
    service: &PoetryService<C>,
    favorites: &Favorites,
    args: &ListArgs,
) -> Result<String> {
    runtime.block_on(service.fetch_poems());
    let store = service.store();
    if let Some(sort) = args.sort {
        store.set_sort(sort);
    }
    if let Some(search) = &args.search {
        store.set_search_term(search);
    }
    let snapshot = store.snapshot();
    if let Some(error) = &snapshot.error {
        bail!("{error}");
    }

    let poems: Vec<_> = snapshot
        .filtered()
        .into_iter()
        .filter(|poem| !args.favorites || favorites.contains(&poem.id))
        .collect();

    let mut out = String::new();
    let _ = writeln!(&mut out, "{}", snapshot.stats());
    if let Some(preamble) = &snapshot.preamble {
        let _ = writeln!(&mut out, "preamble  {}  ({})", preamble.title, preamble.id);
    }
    out.push('\n');
    if poems.is_empty() {
        let _ = writeln!(&mut out, "{EMPTY_TITLE}\n{EMPTY_HINT}");
        return Ok(out);
    }
    for poem in &poems {
        let star = if favorites.contains(&poem.id) { "★ " } else { "" };
        let _ = writeln!(&mut out, "{star}{}", poem.title);
        let _ = writeln!(&mut out, "    {}  {}", format_poem_date(&poem.date), poem.id);
        let _ = writeln!(&mut out, "    {}", poem.excerpt);
        out.push('\n');
    }
    Ok(out)
}

pub fn show_poem<C: Connect>(
    runtime: &Runtime,
    service: &PoetryService<C>,
    args: ShowArgs,
) -> Result<()> {
    let output = render_poem(runtime, service, &args.id)?;
    print!("{output}");
    Ok(())
}

fn render_poem<C: Connect>(
    runtime: &Runtime,
    service: &PoetryService<C>,
    poem_id: &str,
) -> Result<String> {
    if poem_id.trim().is_empty() {
        bail!("poem id cannot be empty");
    }
    runtime.block_on(service.load_poem(poem_id));
    let snapshot = service.store().snapshot();
    if let Some(error) = &snapshot.error {
        bail!("{error}");
    }
    let Some(poem) = &snapshot.selected else {
        bail!(NOT_FOUND_MESSAGE);
    };

    let mut out = String::new();
    let _ = writeln!(&mut out, "{}", poem.title);
    let _ = writeln!(&mut out, "{}", format_poem_date(&poem.date));
    if let Some(url) = &poem.image_url {
        let _ = writeln!(&mut out, "[image] {url}");
    }
    out.push('\n');
    for stanza in snapshot.stanzas() {
        let _ = writeln!(&mut out, "{stanza}\n");
    }

    let nav = snapshot.navigation();
    let mut footer = Vec::new();
    if let Some(prev) = &nav.prev {
        footer.push(format!("Previous: {}", prev.title));
    }
    footer.push(nav.position_label());
    if let Some(next) = &nav.next {
        footer.push(format!("{} :Next", next.title));
    }
    let _ = writeln!(&mut out, "{}", footer.join("  |  "));
    Ok(out)
}

pub fn handle_favorites_command<C: Connect>(
    runtime: &Runtime,
    service: &PoetryService<C>,
    favorites: &mut Favorites,
    args: FavoritesArgs,
) -> Result<()> {
    let output = match args.command {
        Some(FavoritesCommand::Toggle { id }) => toggle_favorite(favorites, &id)?,
        None => render_favorites(runtime, service, favorites),
    };
    print!("{output}");
    Ok(())
}

fn toggle_favorite(favorites: &mut Favorites, poem_id: &str) -> Result<String> {
    let poem_id = poem_id.trim();
    if poem_id.is_empty() {
        bail!("poem id cannot be empty");
    }
    let added = favorites.toggle(poem_id);
    Ok(if added {
        format!("Added {poem_id} to favorites\n")
    } else {
        format!("Removed {poem_id} from favorites\n")
    })
}

/// Favorites in the order they were added, titled when the collection loads.
fn render_favorites<C: Connect>(
    runtime: &Runtime,
    service: &PoetryService<C>,
    favorites: &Favorites,
) -> String {
    if favorites.is_empty() {
        return "No favorites yet.\n".to_string();
    }
    runtime.block_on(service.fetch_poems());
    let snapshot = service.store().snapshot();
    if let Some(error) = &snapshot.error {
        tracing::warn!(%error, "listing favorites without titles");
    }
    let mut out = String::new();
    for id in favorites.ids() {
        match snapshot.lookup(id) {
            Some(poem) => {
                let _ = writeln!(&mut out, "★ {}  ({id})", poem.title);
            }
            None => {
                let _ = writeln!(&mut out, "★ {id}  (not in collection)");
            }
        }
    }
    out
}
