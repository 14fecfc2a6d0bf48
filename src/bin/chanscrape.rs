//! Command-line scraper: reads a board or thread page from a file or stdin
//! and prints the extracted threads or posts as JSON.

use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::{error, info};

use rs_chanscrape::config::ConfigSnapshot;
use rs_chanscrape::{ChanConfiguration, ChanLocator, ConfigStore, MemoryConfigStore, Post, Site, Thread};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Board index page: a list of threads.
    Threads,
    /// Thread page: a flat list of posts.
    Posts,
}

#[derive(Parser)]
#[command(name = "chanscrape", about = "Extract threads and posts from imageboard pages", version)]
struct Cli {
    /// Page to read. Reads stdin when omitted.
    input: Option<PathBuf>,

    /// Board engine (wakaba, erlach).
    #[arg(short, long, default_value = "wakaba")]
    site: Site,

    #[arg(short, long, value_enum, default_value_t = Mode::Threads)]
    mode: Mode,

    /// Site root that relative addresses resolve against.
    #[arg(long, default_value = "http://localhost/")]
    base_url: String,

    /// Board the page belongs to.
    #[arg(short, long, default_value = "b")]
    board: String,

    /// `boards.json` document to preload into the configuration.
    #[arg(long)]
    boards_json: Option<PathBuf>,

    /// Include the configuration learned from the page in the output.
    #[arg(long)]
    show_config: bool,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,

    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Extracted {
    Threads { threads: Vec<Thread> },
    Posts { posts: Vec<Post> },
}

#[derive(Serialize)]
struct Output {
    site: Site,
    board: String,
    #[serde(flatten)]
    extracted: Extracted,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<ConfigSnapshot>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run(&cli) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            error!("{message}");
            eprintln!("chanscrape: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<String, String> {
    let locator = ChanLocator::new(&cli.base_url).map_err(|e| e.to_string())?;
    let store = Arc::new(MemoryConfigStore::new());
    let configuration = ChanConfiguration::new(Arc::clone(&store) as Arc<dyn ConfigStore>);

    if let Some(path) = &cli.boards_json {
        let text = std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
        let json: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| format!("{}: {e}", path.display()))?;
        let updated = configuration.update_from_boards_json(&json);
        info!(updated, "loaded boards document");
    }

    let mut reader: Box<dyn Read> = match &cli.input {
        Some(path) => Box::new(File::open(path).map_err(|e| format!("{}: {e}", path.display()))?),
        None => Box::new(io::stdin().lock()),
    };

    let parser = cli.site.parser(Arc::new(locator), configuration, &cli.board);
    let extracted = match cli.mode {
        Mode::Threads => parser
            .convert_threads_reader(&mut reader)
            .map(|threads| Extracted::Threads { threads }),
        Mode::Posts => parser
            .convert_posts_reader(&mut reader)
            .map(|posts| Extracted::Posts { posts }),
    }
    .map_err(|e| e.to_string())?;

    let output = Output {
        site: cli.site,
        board: cli.board.clone(),
        extracted,
        config: cli.show_config.then(|| store.snapshot()),
    };
    let json = if cli.pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    };
    json.map_err(|e| e.to_string())
}
