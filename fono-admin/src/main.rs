//! fono-admin - command-line administration client for the phonogram catalogue
//!
//! Talks to the catalogue REST backend: listing and CRUD, spreadsheet batch
//! import with review, bulk edit and delete, and the ECAD submission flows.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use fono_admin::bulk::PendingDelete;
use fono_admin::import::ImportPipeline;
use fono_admin::pages::{EcadPage, EcadTab, ListingPage};
use fono_admin::upload::UploadFile;
use fono_admin::{view, ApiClient, ClientError};
use fono_common::config::{AdminConfig, ConfigResolver, LoggingConfig, ENV_API_URL, ENV_CONFIG_PATH};
use fono_common::models::{EcadStatus, Fonograma, FonogramaFilters, OutputFormat};
use fono_common::RecordId;

/// Command-line arguments for fono-admin
#[derive(Parser, Debug)]
#[command(name = "fono-admin")]
#[command(about = "Administration client for the phonogram (ISRC) catalogue")]
#[command(version)]
struct Args {
    /// Backend base URL
    #[arg(short, long, env = ENV_API_URL)]
    api_url: Option<String>,

    /// TOML config file
    #[arg(short, long, env = ENV_CONFIG_PATH)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List fonogramas, one page at a time
    List {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        /// Matches ISRC, title or producer
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        situacao: Option<String>,
        #[arg(long)]
        genero: Option<String>,
        #[arg(long)]
        status_ecad: Option<String>,
    },

    /// Show one fonograma
    Show { id: RecordId },

    /// Create a fonograma from a JSON file
    Create { file: PathBuf },

    /// Replace a fonograma from a JSON file
    Update { id: RecordId, file: PathBuf },

    /// Delete one fonograma
    Delete {
        id: RecordId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Set one field on several fonogramas
    BulkEdit {
        #[arg(long, required = true, num_args = 1.., value_delimiter = ',')]
        ids: Vec<RecordId>,
        #[arg(long)]
        field: String,
        #[arg(long)]
        value: String,
    },

    /// Delete several fonogramas
    BulkDelete {
        #[arg(long, required = true, num_args = 1.., value_delimiter = ',')]
        ids: Vec<RecordId>,
        #[arg(short, long)]
        yes: bool,
    },

    /// Validate a CSV/XLS/XLSX spreadsheet and optionally import its clean rows
    Import {
        file: PathBuf,
        /// Import the rows without errors after review
        #[arg(long)]
        confirm: bool,
        /// Show every error group instead of the first ten
        #[arg(long)]
        show_all: bool,
        /// Expand every error group
        #[arg(long)]
        expand: bool,
        /// First spreadsheet line shown in the review grid
        #[arg(long, default_value_t = 1)]
        from_line: usize,
    },

    /// ECAD submissions
    #[command(subcommand)]
    Ecad(EcadCommand),
}

#[derive(Subcommand, Debug)]
enum EcadCommand {
    /// Submission statistics
    Stats,

    /// Submission history
    Envios,

    /// One submission and its fonogramas
    Envio { id: RecordId },

    /// Download a submission's generated file
    Download {
        id: RecordId,
        /// Target directory (defaults to the configured download dir)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Generate a submission file
    Gerar {
        /// Fonograma ids; when omitted every candidate matching --status is used
        #[arg(value_delimiter = ',')]
        ids: Vec<RecordId>,
        #[arg(short, long, default_value = "excel")]
        formato: OutputFormat,
        /// Candidate filter used when no ids are given
        #[arg(short, long)]
        status: Option<EcadStatus>,
    },

    /// Import ECAD's return file
    Retorno { file: PathBuf },
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .context("Invalid log level")?;

    match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

/// Ask on stdin; anything but `s`/`sim`/`y`/`yes` is a no
fn confirm_prompt(prompt: &str) -> std::io::Result<bool> {
    print!("{} [s/N] ", prompt);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "s" | "sim" | "y" | "yes"
    ))
}

async fn read_fonograma(path: &Path) -> fono_admin::Result<Fonograma> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

fn print_listing(page: &ListingPage) {
    if let Some(error) = page.last_error() {
        eprintln!("{}", error);
    }
    print!(
        "{}",
        view::fonograma_table(page.rows(), page.selection(), page.header_checked())
    );
    println!("{}", view::pagination_bar(page.pagination()));
}

/// Notice on stdout; a failed overview reload after it goes to stderr
fn print_ecad_outcome(page: &EcadPage) {
    if let Some(notice) = page.notice() {
        println!("{}", notice);
    }
    if let Some(error) = page.last_error() {
        eprintln!("{}", error);
    }
}

async fn delete(
    client: &ApiClient,
    config: &AdminConfig,
    pending: PendingDelete,
    yes: bool,
) -> fono_admin::Result<()> {
    if !yes && !confirm_prompt(&pending.prompt())? {
        println!("Cancelado");
        return Ok(());
    }
    let mut page = ListingPage::new(config.per_page);
    let notice = page.delete(client, &pending.confirm()).await?;
    println!("{}", notice);
    print_listing(&page);
    Ok(())
}

async fn run(command: Command, client: &ApiClient, config: &AdminConfig) -> fono_admin::Result<()> {
    match command {
        Command::List {
            page: number,
            search,
            situacao,
            genero,
            status_ecad,
        } => {
            let mut page = ListingPage::new(config.per_page);
            page.set_filters(FonogramaFilters {
                search,
                situacao,
                genero,
                status_ecad,
            });
            page.go_to_page(number);
            page.load(client).await?;
            print_listing(&page);
        }

        Command::Show { id } => {
            let fonograma = client.get_fonograma(&id).await?;
            print!("{}", view::fonograma_detail(&fonograma));
        }

        Command::Create { file } => {
            let mut fonograma = read_fonograma(&file).await?;
            let reply = client.create_fonograma(&mut fonograma).await?;
            let id = reply.data.id.map(|id| id.to_string()).unwrap_or_default();
            println!("{} (id {})", reply.message.as_deref().unwrap_or("Fonograma criado"), id);
        }

        Command::Update { id, file } => {
            let mut fonograma = read_fonograma(&file).await?;
            let reply = client.update_fonograma(&id, &mut fonograma).await?;
            println!("{}", reply.message.as_deref().unwrap_or("Fonograma atualizado"));
        }

        Command::Delete { id, yes } => {
            delete(client, config, PendingDelete::single(id), yes).await?;
        }

        Command::BulkEdit { ids, field, value } => {
            let mut page = ListingPage::new(config.per_page);
            for id in ids {
                page.toggle(id);
            }
            let notice = page.bulk_edit(client, &field, &value).await?;
            println!("{}", notice);
            print_listing(&page);
        }

        Command::BulkDelete { ids, yes } => {
            let mut page = ListingPage::new(config.per_page);
            for id in ids {
                page.toggle(id);
            }
            let pending = page.request_bulk_delete()?;
            delete(client, config, pending, yes).await?;
        }

        Command::Import {
            file,
            confirm,
            show_all,
            expand,
            from_line,
        } => {
            let upload = UploadFile::read(&file).await?;
            let mut pipeline = ImportPipeline::new();
            let summary = pipeline.upload(client, &upload).await?;
            print!("{}", view::import_summary(&summary));

            if let Some(grid) = pipeline.grid_mut() {
                grid.scroll_to_row(from_line.saturating_sub(1));
                println!();
                print!("{}", view::grid_window(grid));
            }

            let panel = pipeline.panel_mut();
            if show_all {
                panel.show_more();
            }
            if expand {
                panel.expand_all();
            }
            if !panel.is_empty() {
                println!();
                print!("{}", view::error_panel(panel));
            }

            if confirm {
                let saved = pipeline.confirm(client).await?;
                info!("Imported {} new, {} updated", saved.salvos, saved.atualizados);
                if let Some(notice) = pipeline.notice() {
                    println!("{}", notice);
                }
            }
        }

        Command::Ecad(command) => run_ecad(command, client, config).await?,
    }
    Ok(())
}

async fn run_ecad(command: EcadCommand, client: &ApiClient, config: &AdminConfig) -> fono_admin::Result<()> {
    let mut page = EcadPage::new();
    match command {
        EcadCommand::Stats => {
            page.refresh(client).await?;
            print!("{}", view::ecad_stats(page.stats()));
        }

        EcadCommand::Envios => {
            page.refresh(client).await?;
            print!("{}", view::envio_table(page.envios()));
        }

        EcadCommand::Envio { id } => {
            let detail = page.detail(client, &id).await?;
            print!("{}", view::envio_detail(&detail));
        }

        EcadCommand::Download { id, dir } => {
            page.refresh(client).await?;
            let dir = dir.unwrap_or_else(|| config.download_dir.clone());
            let path = page.download(client, &id, &dir).await?;
            println!("Arquivo salvo em {}", path.display());
        }

        EcadCommand::Gerar { ids, formato, status } => {
            page.set_formato(formato);
            if ids.is_empty() {
                page.set_status_filter(status);
                if page.select_tab(EcadTab::Selecao) {
                    page.load_candidates(client).await?;
                }
                page.set_header(true);
            } else {
                for id in ids {
                    page.toggle(id);
                }
            }
            page.generate(client).await?;
            print_ecad_outcome(&page);
            print!("{}", view::envio_table(page.envios()));
        }

        EcadCommand::Retorno { file } => {
            let upload = UploadFile::read(&file).await?;
            page.import_return(client, &upload).await?;
            print_ecad_outcome(&page);
            print!("{}", view::ecad_stats(page.stats()));
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ConfigResolver::new()
        .with_api_url(args.api_url)
        .with_config_path(args.config)
        .resolve()
        .context("Failed to resolve configuration")?;

    init_tracing(&config.logging)?;

    info!(
        "Starting fono-admin v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    for warning in &config.warnings {
        warn!("{}", warning);
    }
    info!("Backend: {}", config.api_url);

    let client = ApiClient::from_config(&config).context("Failed to build HTTP client")?;

    if let Err(e) = run(args.command, &client, &config).await {
        if !matches!(e, ClientError::Validation(_)) {
            warn!("Command failed: {}", e);
        }
        for line in e.report_lines() {
            eprintln!("{}", line);
        }
        std::process::exit(1);
    }

    Ok(())
}
