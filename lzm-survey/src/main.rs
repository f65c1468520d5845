//! lzm-survey - command-line front end for the LizardMatch survey
//!
//! Session state (page answers, stored results) lives in `session.json`
//! inside the state folder, so separate invocations behave like page loads
//! within one browser session.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use lzm_common::config::{self, TomlConfig};
use lzm_common::models::RecommendOptions;
use lzm_common::{ApiClient, JsonFileStore};
use lzm_survey::import::{answers_from_assignments, pages_from_toml};
use lzm_survey::session::{NavContext, Progress, PAGE_COUNT};
use lzm_survey::{
    DetailCache, PageStore, PreferenceAssembler, ResultsLayout, ResultsRenderer, SubmissionController,
    SubmitOutcome, SurveyView, WeightProfile,
};
use tracing::{info, warn};

/// Command-line arguments for lzm-survey
#[derive(Parser, Debug)]
#[command(name = "lzm-survey")]
#[command(about = "Reptile recommendation survey client")]
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
    /// Save one page from key=value field assignments
    Answer {
        #[arg(long)]
        page: u8,

        /// Field assignment, repeatable (`--field 종류=Gecko --field 종류=Skink`)
        #[arg(long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,

        /// Start a fresh survey before saving (page 1 only)
        #[arg(long)]
        reset: bool,
    },

    /// Save pages from a TOML answers file with [page1]..[page4] tables
    Load { file: PathBuf },

    /// Print the assembled request body
    Preview,

    /// Submit the stored answers and render the results
    Submit {
        #[arg(long, default_value = "hero")]
        layout: ResultsLayout,

        /// Write the results markup here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Render the stored results again
    Show {
        #[arg(long, default_value = "hero")]
        layout: ResultsLayout,

        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Discard all survey state
    Reset,
}

/// Terminal stand-in for the survey page
struct TerminalView;

impl SurveyView for TerminalView {
    fn set_submit_enabled(&mut self, enabled: bool, label: &str) {
        tracing::debug!(enabled, label, "Submit control updated");
    }

    fn set_busy(&mut self, busy: bool) {
        if busy {
            eprintln!("추천 결과를 분석하는 중...");
        }
    }

    fn alert(&mut self, message: &str) {
        eprintln!("{}", message);
    }

    fn navigate(&mut self, target: &str) {
        info!("Navigating to {}", target);
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

    info!("Starting LizardMatch survey client (lzm-survey) v{}", env!("CARGO_PKG_VERSION"));

    let state_dir = config::resolve_state_dir(args.state_dir.as_deref(), &toml_config);
    let session = JsonFileStore::open(config::session_store_path(&state_dir))
        .with_context(|| format!("Failed to open session store in {}", state_dir.display()))?;
    let pages = PageStore::new(Arc::new(session));

    let base_url = config::resolve_api_base_url(args.api_base_url.as_deref(), &toml_config);
    info!("Backend: {}", base_url);
    let client = ApiClient::new(base_url).context("Failed to build HTTP client")?;

    match args.command {
        Command::Answer { page, fields, reset } => {
            if !(1..=PAGE_COUNT).contains(&page) {
                bail!("page must be between 1 and {}", PAGE_COUNT);
            }
            pages.init_session(page, &NavContext { reset })?;
            let answers = answers_from_assignments(&fields)?;
            pages.save(page, &answers)?;
            let progress = Progress::for_page(page);
            println!("{} ({}%) 저장됨: {}개 항목", progress.text(), progress.percent, answers.len());
        }

        Command::Load { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let loaded = pages_from_toml(&text)?;
            pages.init_session(1, &NavContext { reset: true })?;
            for (page, answers) in &loaded {
                pages.save(*page, answers)?;
            }
            println!("{}개 페이지를 불러왔습니다", loaded.len());
        }

        Command::Preview => {
            let controller = controller(&toml_config, pages, client);
            println!("{}", serde_json::to_string_pretty(&controller.build_request())?);
        }

        Command::Submit { layout, out } => {
            let controller = controller(&toml_config, pages.clone(), client.clone());
            let mut view = TerminalView;
            match controller.submit(&mut view).await {
                SubmitOutcome::Submitted { results } => {
                    info!(results, "Recommendations stored");
                    render_stored(&pages, client, layout, out.as_deref()).await?;
                }
                SubmitOutcome::Failed { message } => bail!("submission failed: {}", message),
            }
        }

        Command::Show { layout, out } => {
            render_stored(&pages, client, layout, out.as_deref()).await?;
        }

        Command::Reset => {
            let target = pages.reset_survey()?;
            println!("설문을 초기화했습니다 ({})", target);
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

fn controller(toml_config: &TomlConfig, pages: PageStore, client: ApiClient) -> SubmissionController {
    let profile = toml_config
        .survey
        .weight_profile
        .parse::<WeightProfile>()
        .unwrap_or_else(|e| {
            warn!("{}; using standard", e);
            WeightProfile::Standard
        });

    let options = RecommendOptions {
        top_n: toml_config.survey.top_n,
        include_reasons: toml_config.survey.include_reasons,
    };

    SubmissionController::new(pages, client, PreferenceAssembler::new(profile), options)
}

async fn render_stored(
    pages: &PageStore,
    client: ApiClient,
    layout: ResultsLayout,
    out: Option<&Path>,
) -> Result<()> {
    let stored = pages.load_results();
    let cache = DetailCache::new(client);
    let view = ResultsRenderer::new(layout).render(stored.as_ref(), &cache).await;

    let text = view.into_text();
    match out {
        Some(path) => {
            std::fs::write(path, &text).with_context(|| format!("Failed to write {}", path.display()))?;
            println!("결과를 {}에 저장했습니다", path.display());
        }
        None => println!("{}", text),
    }
    Ok(())
}
