//! lzm-dex - command-line front end for the LizardMatch species dex
//!
//! Local edits are kept in `local.json` inside the state folder and are
//! never sent to the backend.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use lzm_common::config::{self, TomlConfig};
use lzm_common::{ApiClient, JsonFileStore};
use lzm_dex::{DexBrowser, DexEntry, DexFilter, DexSettings, DexStore, EditMode, GridView, RefreshOutcome};
use tracing::info;

/// Command-line arguments for lzm-dex
#[derive(Parser, Debug)]
#[command(name = "lzm-dex")]
#[command(about = "Reptile species dex with local edits")]
#[command(version)]
struct Args {
    /// Configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides host-based resolution)
    #[arg(long, global = true)]
    api_base_url: Option<String>,

    /// Hostname the client is served from (localhost selects the local backend)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Folder holding session and local state
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch and show the species list merged with local edits
    List {
        /// Search text
        #[arg(long, default_value = "")]
        q: String,

        /// Difficulty grade filter
        #[arg(long, default_value = "")]
        difficulty: String,

        /// Print card markup instead of a plain listing
        #[arg(long)]
        html: bool,
    },

    /// Add a local species entry
    Add {
        #[arg(long)]
        name: String,

        #[command(flatten)]
        facets: Facets,
    },

    /// Edit a species locally (the name is the key and cannot change)
    Edit {
        name: String,

        #[command(flatten)]
        facets: Facets,
    },

    /// Remove every local edit
    Clear,
}

/// Editable facets; unset flags keep the current value
#[derive(ClapArgs, Debug, Default)]
struct Facets {
    #[arg(long = "type")]
    species_type: Option<String>,

    #[arg(long)]
    summary: Option<String>,

    #[arg(long)]
    photo_url: Option<String>,

    #[arg(long)]
    difficulty: Option<i64>,

    /// Enclosure size text
    #[arg(long)]
    enclosure: Option<String>,

    #[arg(long)]
    activity: Option<String>,

    #[arg(long)]
    diet: Option<String>,

    /// Initial cost grade
    #[arg(long)]
    cost: Option<i64>,
}

impl Facets {
    fn apply(self, entry: &mut DexEntry) {
        if let Some(v) = self.species_type {
            entry.species_type = v;
        }
        if let Some(v) = self.summary {
            entry.summary = v;
        }
        if let Some(v) = self.photo_url {
            entry.photo_url = v;
        }
        if let Some(v) = self.difficulty {
            entry.difficulty = v;
        }
        if let Some(v) = self.enclosure {
            entry.enclosure = v;
        }
        if let Some(v) = self.activity {
            entry.activity = v;
        }
        if let Some(v) = self.diet {
            entry.diet = v;
        }
        if let Some(v) = self.cost {
            entry.cost = v;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut toml_config = TomlConfig::load(args.config.as_deref());
    if args.host.is_some() {
        toml_config.host = args.host.clone();
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(log_directive(&toml_config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting LizardMatch dex (lzm-dex) v{}", env!("CARGO_PKG_VERSION"));

    let state_dir = config::resolve_state_dir(args.state_dir.as_deref(), &toml_config);
    let local = JsonFileStore::open(config::local_store_path(&state_dir))
        .with_context(|| format!("Failed to open local store in {}", state_dir.display()))?;
    let store = DexStore::new(Arc::new(local));

    let base_url = config::resolve_api_base_url(args.api_base_url.as_deref(), &toml_config);
    info!("Backend: {}", base_url);
    let client = ApiClient::new(base_url).context("Failed to build HTTP client")?;

    let settings = DexSettings {
        debounce: Duration::from_millis(toml_config.dex.debounce_ms),
        list_limit: toml_config.dex.list_limit,
    };
    let view = Arc::new(Mutex::new(GridView::default()));
    let browser = DexBrowser::new(client, store, Arc::clone(&view), settings);

    match args.command {
        Command::List { q, difficulty, html } => {
            match browser.refresh(DexFilter::new(&q, &difficulty)).await {
                RefreshOutcome::Failed(message) => bail!("{}", message),
                RefreshOutcome::Applied { items } => info!(items, "Dex list loaded"),
                RefreshOutcome::Stale => {}
            }
            let view = view.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if html {
                println!("{}", view.html);
            } else {
                println!("{}개 종", view.card_count);
            }
        }

        Command::Add { name, facets } => {
            let mut entry = DexEntry {
                name,
                ..DexEntry::template()
            };
            facets.apply(&mut entry);
            browser.save_entry(&entry, EditMode::Create).await?;
            println!("'{}' 추가됨", entry.name.trim());
        }

        Command::Edit { name, facets } => {
            let record = browser.record_for_edit(&name).await;
            let mut entry = DexEntry::from_record(&record);
            entry.name = name;
            facets.apply(&mut entry);
            browser.save_entry(&entry, EditMode::Edit).await?;
            println!("'{}' 수정됨", entry.name.trim());
        }

        Command::Clear => {
            browser.store().clear()?;
            println!("로컬 도감 수정 내역을 삭제했습니다");
        }
    }

    Ok(())
}

fn log_directive(level: &str) -> tracing_subscriber::filter::Directive {
    match level.parse::<tracing::Level>() {
        Ok(level) => level.into(),
        Err(_) => {
            eprintln!("Unknown log level '{}', using info", level);
            tracing::Level::INFO.into()
        }
    }
}
