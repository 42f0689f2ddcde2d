use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use docsite::config::{Config, FeedSource};
use docsite::feeds::{FeedData, FeedFetcher};
use docsite::nav::Transition;
use docsite::page::{Location, PageLoad};
use docsite::planet::PLANET_ID;
use docsite::search::{self, MODE_GROUP, QUERY_ID};
use docsite::StaticPage;

/// Minimal page carrying every element the site behaviors expect.
const BLANK_PAGE: &str = r#"<html><body id="body">
<div id="home"></div><div id="jumplinks"></div>
<div id="search"><form id="simplesearch">
<input id="searchq" type="text">
<span id="advancedsearch">
<input type="radio" name="what" value="website" checked>
<input type="radio" name="what" value="wiki">
<input type="radio" name="what" value="devs">
<input type="radio" name="what" value="users">
<input type="radio" name="what" value="lists">
</span></form></div>
<div id="planet"></div>
</body></html>"#;

#[derive(Parser)]
#[command(
    name = "docsite",
    about = "Planet feed, search dispatch and nav behaviors of the libvirt docs site",
    version
)]
struct Cli {
    /// Config file (defaults to <config dir>/docsite/config.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is unset.
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the planet feed and print the latest entries.
    Feed {
        /// Where to read the feed from (proxy or atom).
        #[arg(long)]
        source: Option<String>,

        /// Number of entries to show.
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Print the rendered <dl> instead of text.
        #[arg(long)]
        html: bool,
    },

    /// Build the outgoing search for a query.
    Search {
        query: String,

        /// Search mode: website, wiki, devs, users or lists.
        #[arg(short, long)]
        what: Option<String>,

        /// Open the result in the browser.
        #[arg(long)]
        open: bool,

        /// Print the synthesized form instead of the URL.
        #[arg(long)]
        form: bool,
    },

    /// Replay scroll offsets and print each nav state change.
    Scroll {
        #[arg(required = true, allow_negative_numbers = true)]
        offsets: Vec<i64>,

        /// Page markup to scroll (defaults to a blank site page).
        #[arg(long)]
        page: Option<PathBuf>,
    },

    /// Run the page-load sequence against a page file.
    Page {
        file: PathBuf,

        /// Location the page is served from (defaults to the file itself).
        #[arg(long)]
        location: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Feed {
            source,
            limit,
            html,
        } => {
            if let Some(source) = source {
                config.feed.source = match source.as_str() {
                    "proxy" => FeedSource::Proxy,
                    "atom" => FeedSource::Atom,
                    other => anyhow::bail!("unknown feed source `{}`", other),
                };
            }
            if let Some(limit) = limit {
                config.feed.max_entries = limit;
            }

            let data = config.create_fetcher().fetch().await?;
            let planet = config.planet();
            match &data {
                FeedData::Unavailable { status } => {
                    eprintln!("Feed unavailable (status {})", status);
                }
                FeedData::Entries(_) if html => {
                    if let Some(markup) = planet.render(&data) {
                        println!("{}", markup);
                    }
                }
                FeedData::Entries(entries) => {
                    print!("{}", planet.render_text(entries, 80));
                }
            }
        }
        Commands::Search {
            query,
            what,
            open,
            form,
        } => {
            let mut page = StaticPage::parse(BLANK_PAGE);
            page.set_input_value(QUERY_ID, &query)?;
            if let Some(what) = what {
                if !page.check_radio(MODE_GROUP, &what) {
                    anyhow::bail!("unknown search mode `{}`", what);
                }
            }

            let request = config.dispatcher()?.dispatch(&page)?;
            if form {
                println!("{}", request.form_html());
            } else if open {
                search::open_in_browser(&request)?;
            } else {
                match request.url() {
                    Some(url) => println!("{}", url),
                    None => anyhow::bail!("no search target configured for this mode"),
                }
            }
        }
        Commands::Scroll { offsets, page } => {
            let markup = match page {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?,
                None => BLANK_PAGE.to_string(),
            };
            let mut page = StaticPage::parse(&markup);
            let nav = config.scroll_shrink();

            for offset in offsets {
                match nav.on_scroll(&mut page, offset)? {
                    Transition::Changed(state) => println!("{:>6}  {:?}", offset, state),
                    Transition::Unchanged(state) => {
                        println!("{:>6}  {:?} (unchanged)", offset, state)
                    }
                }
            }
        }
        Commands::Page { file, location } => {
            let markup = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let location = match location {
                Some(loc) => Location::parse(&loc)?,
                None => {
                    let path = std::fs::canonicalize(&file)?;
                    let url = url::Url::from_file_path(&path)
                        .map_err(|_| anyhow::anyhow!("cannot make a URL of {}", path.display()))?;
                    Location::from_url(&url)
                }
            };

            let mut page = StaticPage::parse(&markup);
            let fetcher = config.create_fetcher();
            let load = PageLoad::from_config(&config)?;
            let (report, _handlers) = load.run(&mut page, &location, fetcher.as_ref()).await?;

            println!("feed requested: {}", report.feed_requested);
            match report.entries_shown {
                Some(n) => {
                    println!("entries shown:  {}", n);
                    println!("{}", page.appended_html(PLANET_ID)?);
                }
                None => println!("entries shown:  none"),
            }
        }
    }

    Ok(())
}
