//! Claimdesk CLI - claim tables, upload validation and the uploads API
//!
//! # Commands
//!
//! ```bash
//! claimdesk serve --claims claims.json      # In-memory backend (port 3000)
//! claimdesk list claims.csv --sort amount   # Collection view over a CSV/JSON file
//! claimdesk validate a.pdf b.png            # Client-side upload checks
//! claimdesk claim <token>                   # Claim details behind a claim link
//! claimdesk uploads CLM-1 --role customer   # Stored uploads, mapped onto slots
//! claimdesk submit CLM-1 --doc 1=form.pdf --media 9=dent.jpg
//! ```

use clap::{Parser, Subcommand};
use claimdesk::api::log_info_indent;
use claimdesk::server::{load_claims, start_server, AppState};
use claimdesk::upload::validator::validate_file;
use claimdesk::{
    load_rows, ClaimsClient, ClientConfig, CustomerStep, LocalFile, PageItem, Role, SlotId, SortConfig, UploadSession,
    ViewState, WizardOptions, WizardStep, WorkshopStep,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "claimdesk")]
#[command(about = "Claim dashboard tables, upload wizard and claims API", long_about = None)]
struct Cli {
    /// API base URL (defaults to CLAIMDESK_API_URL, then http://localhost:3000)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the in-memory claims backend
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// JSON object of claim-link token → claim details
        #[arg(long)]
        claims: Option<PathBuf>,
    },

    /// Search, sort and page rows from a CSV or JSON file
    List {
        /// Input file (.json array or CSV)
        input: PathBuf,

        /// Search term (display field or id)
        #[arg(short, long, default_value = "")]
        search: String,

        /// Field the search term matches and the table displays
        #[arg(short, long, default_value = "name")]
        field: String,

        /// Sort key, dotted paths allowed (e.g. labourRR.estAmt)
        #[arg(long)]
        sort: Option<String>,

        /// Sort descending
        #[arg(long)]
        desc: bool,

        /// Page to show (1-based)
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Rows per page
        #[arg(long, default_value = "10")]
        page_size: usize,

        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check files against the upload size and type rules
    Validate {
        /// Files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Fetch the claim behind a claim-link token
    Claim {
        token: String,
    },

    /// Fetch stored uploads for a claim and show where they land
    Uploads {
        reference_id: String,

        #[arg(short, long, value_enum)]
        role: Option<Role>,
    },

    /// Upload files for a claim through the wizard
    Submit {
        reference_id: String,

        #[arg(short, long, value_enum)]
        role: Option<Role>,

        /// Document as DOCUMENT_TYPE_ID=PATH (repeatable)
        #[arg(long = "doc", value_parser = parse_assignment)]
        documents: Vec<(u32, PathBuf)>,

        /// Photo as SECTION_ID=PATH (repeatable)
        #[arg(long = "media", value_parser = parse_assignment)]
        media: Vec<(u32, PathBuf)>,

        /// Customer first name
        #[arg(long, default_value = "")]
        first_name: String,

        /// Customer last name
        #[arg(long, default_value = "")]
        last_name: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    if let Some(url) = cli.api_url {
        config = config.with_api_url(url);
    }

    let result = match cli.command {
        Commands::Serve { port, claims } => cmd_serve(port, claims.as_deref()).await,

        Commands::List { input, search, field, sort, desc, page, page_size, json } => {
            let sort = sort.map(|key| if desc { SortConfig::descending(key) } else { SortConfig::ascending(key) });
            cmd_list(&input, &search, &field, sort, page, page_size, json)
        }

        Commands::Validate { files } => cmd_validate(&files),

        Commands::Claim { token } => cmd_claim(&config, &token).await,

        Commands::Uploads { reference_id, role } => {
            cmd_uploads(&config, role.unwrap_or(config.role), &reference_id).await
        }

        Commands::Submit { reference_id, role, documents, media, first_name, last_name } => {
            let request = SubmitRequest { reference_id, documents, media, first_name, last_name };
            cmd_submit(&config, role.unwrap_or(config.role), request).await
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn parse_assignment(raw: &str) -> Result<(u32, PathBuf), String> {
    let (id, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ID=PATH, got '{}'", raw))?;
    let id = id.trim().parse().map_err(|_| format!("invalid id '{}'", id))?;
    Ok((id, PathBuf::from(path.trim())))
}

async fn cmd_serve(port: u16, claims: Option<&Path>) -> CliResult {
    let state = match claims {
        Some(path) => {
            let claims = load_claims(path)?;
            eprintln!("📄 Loaded {} claim links from {}", claims.len(), path.display());
            AppState::with_claims(claims)
        }
        None => AppState::new(),
    };
    start_server(port, Arc::new(state)).await
}

fn cmd_list(
    input: &Path,
    search: &str,
    field: &str,
    sort: Option<SortConfig>,
    page: usize,
    page_size: usize,
    json: bool,
) -> CliResult {
    let rows = load_rows(input)?;

    let mut view = ViewState::with_page_size(field, page_size);
    if let Some(config) = sort.clone() {
        view = view.sorted_by(config);
    }
    view.set_search(search);
    view.go_to(page, &rows);

    let rendered = view.render(&rows);

    if json {
        println!("{}", serde_json::to_string_pretty(&rendered)?);
        return Ok(());
    }

    let sort_key = sort.as_ref().map(|s| s.key.as_str());
    for record in &rendered.rows {
        let id = record.id().unwrap_or_else(|| "-".to_string());
        match sort_key {
            Some(key) if key != field => {
                println!("  {:>8}  {:<32} {}", id, record.display(field), record.display(key))
            }
            _ => println!("  {:>8}  {}", id, record.display(field)),
        }
    }

    if rendered.filtered_count == 0 {
        eprintln!("📋 No rows match '{}'", search);
        return Ok(());
    }

    let pager: Vec<String> = rendered
        .page_items()
        .into_iter()
        .map(|item| match item {
            PageItem::Page(n) if n == rendered.page => format!("[{}]", n),
            PageItem::Page(n) => n.to_string(),
            PageItem::Ellipsis => "…".to_string(),
        })
        .collect();

    eprintln!(
        "\n📊 Showing {}-{} of {}   {}",
        rendered.start_row,
        rendered.end_row,
        rendered.filtered_count,
        pager.join(" ")
    );
    Ok(())
}

fn cmd_validate(files: &[PathBuf]) -> CliResult {
    let mut rejected = 0;

    for path in files {
        let file = LocalFile::read(path)?;
        match validate_file(&file) {
            Ok(()) => println!("✅ {} ({}, {} bytes)", path.display(), file.mime_type, file.size()),
            Err(e) => {
                rejected += 1;
                println!("❌ {}: {}", path.display(), e);
            }
        }
    }

    if rejected > 0 {
        return Err(format!("{} of {} files rejected", rejected, files.len()).into());
    }
    Ok(())
}

async fn cmd_claim(config: &ClientConfig, token: &str) -> CliResult {
    let client = ClaimsClient::new(config)?;
    let claim = client.claim_access(token).await?;
    println!("{}", serde_json::to_string_pretty(&claim)?);
    Ok(())
}

async fn cmd_uploads(config: &ClientConfig, role: Role, reference_id: &str) -> CliResult {
    let client = ClaimsClient::new(config)?;
    match role {
        Role::Workshop => show_uploads::<WorkshopStep>(&client, reference_id).await,
        Role::Customer => show_uploads::<CustomerStep>(&client, reference_id).await,
        other => Err(format!("the {} role has no upload wizard", other).into()),
    }
}

async fn show_uploads<S: WizardStep>(client: &ClaimsClient, reference_id: &str) -> CliResult {
    let mut session = UploadSession::<S>::new(reference_id, WizardOptions::default());
    let report = session.hydrate(client).await?;

    for slot in session.layout().slots().filter(|s| !s.is_empty()) {
        log_info_indent(format!("{}: {} file(s)", slot.label, slot.items().len()), 1);
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

struct SubmitRequest {
    reference_id: String,
    documents: Vec<(u32, PathBuf)>,
    media: Vec<(u32, PathBuf)>,
    first_name: String,
    last_name: String,
}

async fn cmd_submit(config: &ClientConfig, role: Role, request: SubmitRequest) -> CliResult {
    let client = ClaimsClient::new(config)?;
    match role {
        Role::Workshop => run_submit::<WorkshopStep>(&client, request).await,
        Role::Customer => run_submit::<CustomerStep>(&client, request).await,
        other => Err(format!("the {} role has no upload wizard", other).into()),
    }
}

async fn run_submit<S: WizardStep>(client: &ClaimsClient, request: SubmitRequest) -> CliResult {
    let mut session = UploadSession::<S>::new(request.reference_id, WizardOptions::default());
    session.hydrate(client).await?;

    let slots = request
        .documents
        .into_iter()
        .map(|(id, path)| (SlotId::Document(id), path))
        .chain(request.media.into_iter().map(|(id, path)| (SlotId::Media(id), path)));

    for (slot_id, path) in slots {
        let file = LocalFile::read(&path)?;
        let slot = session
            .slot_mut(slot_id)
            .ok_or_else(|| format!("no upload slot for {:?}", slot_id))?;
        slot.add(file).map_err(|e| format!("{}: {}", path.display(), e))?;
        eprintln!("📎 {} → {}", path.display(), slot.label);
    }

    session.personal_mut().first_name = request.first_name;
    session.personal_mut().last_name = request.last_name;

    while let Some(step) = session.wizard().current().filter(|s| !s.is_last()) {
        eprintln!("   {} ✓", step.label());
        session.next()?;
    }

    let outcome = session.confirm(client).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    eprintln!("✨ Submitted");
    Ok(())
}
