use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use study_planner_client::config::Settings;
use study_planner_client::domain::{FormState, OutputFormat};
use study_planner_client::logging;
use study_planner_client::services::{ApiClient, DownloadDir};
use study_planner_client::view::{render_page, PageView, UiState};
use study_planner_client::ViewController;

#[derive(Parser)]
#[command(name = "study-planner")]
#[command(about = "Plan bioequivalence studies against the analysis service")]
struct Cli {
    /// Analysis API base URL (overrides API_BASE_URL)
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Write the rendered page to this file instead of stdout
    #[arg(short, long, global = true)]
    out: Option<PathBuf>,

    /// Directory for generated synopses (overrides DOWNLOAD_DIR)
    #[arg(long, global = true)]
    download_dir: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search literature and compute the design recommendation
    Analyze(FormArgs),
    /// Generate a synopsis straight from the form
    Generate(GenerateArgs),
    /// Analyze, then generate a synopsis from the analysis
    Plan(GenerateArgs),
    /// Check that the analysis service is reachable
    Health,
}

#[derive(Args)]
struct FormArgs {
    /// International Nonproprietary Name of the drug
    #[arg(long, default_value = "")]
    inn: String,

    #[arg(long, default_value = "")]
    dosage_form: String,

    #[arg(long, default_value = "")]
    dosage: String,

    /// e.g. fasted or fed
    #[arg(long, default_value = "")]
    administration_mode: String,

    /// Intra-subject CV in percent; leave blank to let the service look it up
    #[arg(long, default_value = "")]
    cvintra: String,
}

#[derive(Args)]
struct GenerateArgs {
    #[command(flatten)]
    form: FormArgs,

    /// docx, json or markdown
    #[arg(long, default_value = "markdown")]
    output_format: OutputFormat,
}

impl FormArgs {
    fn into_form(self, output_format: OutputFormat) -> FormState {
        FormState {
            inn: self.inn,
            dosage_form: self.dosage_form,
            dosage: self.dosage,
            administration_mode: self.administration_mode,
            cvintra: self.cvintra,
            output_format,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let mut settings = Settings::from_env()?;
    if let Some(base) = &cli.api_base {
        settings = settings.with_api_base(base)?;
    }
    if let Some(dir) = &cli.download_dir {
        settings.download_dir = dir.clone();
    }

    // Initialize logging
    logging::init_logging(&settings.env, cli.verbose);

    tracing::info!(
        env = ?settings.env,
        api_base = %settings.api_base_url,
        "Starting study planner client"
    );

    let api = ApiClient::new(
        &settings.api_base_url,
        settings.api_timeout_seconds,
        settings.health_timeout_seconds,
    )?;
    let controller = ViewController::new(
        Arc::new(api),
        Arc::new(DownloadDir::new(settings.download_dir.clone())),
    );

    // The health check runs alongside the action; a failure only shows
    // if no action has started since.
    let snapshot = match cli.command {
        Command::Health => match controller.startup_health_check().await {
            Ok(status) => {
                println!("{}", serde_json::to_string_pretty(&status)?);
                return Ok(());
            }
            Err(_) => controller.snapshot(),
        },
        Command::Analyze(args) => {
            let form = args.into_form(OutputFormat::default());
            let (_health, snapshot) = tokio::join!(
                controller.startup_health_check(),
                controller.run_analysis(&form),
            );
            snapshot
        }
        Command::Generate(args) => {
            let form = args.form.into_form(args.output_format);
            let (_health, snapshot) = tokio::join!(
                controller.startup_health_check(),
                controller.run_document_generation(&form),
            );
            snapshot
        }
        Command::Plan(args) => {
            let form = args.form.into_form(args.output_format);
            let (_health, snapshot) = tokio::join!(controller.startup_health_check(), async {
                let analysed = controller.run_analysis(&form).await;
                if matches!(analysed.state, UiState::Success(_)) {
                    controller.run_document_generation(&form).await
                } else {
                    analysed
                }
            });
            snapshot
        }
    };

    let page = render_page(&snapshot).context("Failed to render page")?;
    write_page(&page, cli.out.as_deref()).await?;

    if let UiState::Error(message) = &snapshot.state {
        bail!("{}", message);
    }

    Ok(())
}

async fn write_page(page: &PageView, out: Option<&Path>) -> Result<()> {
    let html = page.to_html().context("Failed to render page")?;
    match out {
        Some(path) => {
            tokio::fs::write(path, html)
                .await
                .with_context(|| format!("Failed to write page to {}", path.display()))?;
            tracing::info!(path = %path.display(), "Page written");
        }
        None => print!("{}", html),
    }
    Ok(())
}
