//! funnelcraft is a CLI wizard that turns a landing page into a sales funnel.
//!
//! Each wizard step is a command working on a project stored in a local database:
//! 1. `analyze` - Scrapes and analyzes a landing page, creating a project
//! 2. `funnel` - Generates the main page, upsells, downsells and their flow
//! 3. `emails` - Writes an email sequence for the funnel with an LLM
//! 4. `export` - Packs the funnel and emails into a zip of static files

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use env_logger::Builder;
use log::{LevelFilter, info, warn};

use funnelcraft::{
    Customizations, EmailContext, EmailParams, Project, ScrapeMode, Storage, TemplateSet, TextBy,
    analyze_page, email::email_model_builder, export_project, fetch, generate_email_sequence,
    generate_funnel,
};

/// A CLI wizard to build sales funnels from landing pages
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The wizard step to execute
    #[command(subcommand)]
    command: Command,

    #[arg(long, short, action = clap::ArgAction::Count, help = "Output v(v...)erbosity: error (0), warn (1), info (2), debug (3), trace (4)", global = true, default_value_t = 2)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape and analyze a landing page, then store it as a new project
    Analyze {
        /// The landing page URL
        url: String,
        /// Path to database file to store projects
        db: String,
        /// Project name (default: page title)
        #[arg(long, short)]
        name: Option<String>,
        /// Scrape mode: "placeholder" (default) or "live"
        #[arg(long, short, default_value = "placeholder")]
        mode: ScrapeMode,
        /// Text extraction method: "dom_smoothie" (default) or "fast_html2md"
        #[arg(long, default_value = "dom_smoothie")]
        text_by: TextBy,
    },
    /// Generate the funnel of an analyzed project
    Funnel {
        /// Path to database file with projects
        db: String,
        /// Project id
        id: i64,
        #[arg(long)]
        brand_name: Option<String>,
        #[arg(long)]
        unique_angle: Option<String>,
        #[arg(long)]
        target_audience: Option<String>,
        /// Number of upsell pages (default: 10)
        #[arg(long)]
        num_upsells: Option<u32>,
        /// Number of downsell pages (default: 10)
        #[arg(long)]
        num_downsells: Option<u32>,
    },
    /// Write an email sequence for the project's funnel using an LLM model
    Emails {
        /// Path to database file with projects
        db: String,
        /// Project id
        id: i64,
        /// URL of the LLM model to use, e.g. openai://gpt-4o
        model: String,
        /// Number of emails to request (default: 10, at most 20)
        #[arg(long)]
        num_emails: Option<u32>,
        /// Sequence type, e.g. "sales", "nurture" or "launch"
        #[arg(long)]
        sequence_type: Option<String>,
        /// Writing style, e.g. "conversational" or "formal"
        #[arg(long)]
        email_style: Option<String>,
    },
    /// Export the project as a zip archive of static pages and emails
    Export {
        /// Path to database file with projects
        db: String,
        /// Project id
        id: i64,
        /// Directory to write the archive to
        exports_dir: String,
        /// Directory with main.html, upsell.html and downsell.html templates
        #[arg(long, short)]
        templates: Option<String>,
    },
    /// List stored projects
    List {
        /// Path to database file with projects
        db: String,
    },
    /// Delete a project
    Delete {
        /// Path to database file with projects
        db: String,
        /// Project id
        id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    Builder::new()
        .filter_level(match cli.verbose {
            0 => LevelFilter::Error,
            1 => LevelFilter::Warn,
            2 => LevelFilter::Info,
            3 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .init();

    match cli.command {
        Command::Analyze {
            url,
            db,
            name,
            mode,
            text_by,
        } => handle_analyze_command(url, db, name, mode, text_by).await,
        Command::Funnel {
            db,
            id,
            brand_name,
            unique_angle,
            target_audience,
            num_upsells,
            num_downsells,
        } => handle_funnel_command(
            &db,
            id,
            Customizations {
                brand_name,
                unique_angle,
                target_audience,
                num_upsells,
                num_downsells,
            },
        ),
        Command::Emails {
            db,
            id,
            model,
            num_emails,
            sequence_type,
            email_style,
        } => {
            handle_emails_command(
                &db,
                id,
                &model,
                EmailParams {
                    num_emails,
                    sequence_type,
                    email_style,
                },
            )
            .await
        }
        Command::Export {
            db,
            id,
            exports_dir,
            templates,
        } => handle_export_command(&db, id, &exports_dir, templates.as_deref()),
        Command::List { db } => handle_list_command(&db),
        Command::Delete { db, id } => handle_delete_command(&db, id),
    }
}

fn load_project(storage: &Storage, id: i64) -> Result<Project> {
    storage
        .get_project(id)?
        .with_context(|| format!("Project {id} not found"))
}

async fn handle_analyze_command(
    url: String,
    db: String,
    name: Option<String>,
    mode: ScrapeMode,
    text_by: TextBy,
) -> Result<()> {
    let storage = Storage::new(&db)?;

    let Some(page) = fetch(&url, mode, text_by).await? else {
        bail!("Could not extract content from {url}");
    };

    let analysis = analyze_page(&page, &url);
    if let Some(reason) = analysis.reason() {
        warn!("Analysis of {url} fell back to defaults: {reason}");
    }
    let analysis = analysis.into_record();

    let name = name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| analysis.title.clone());
    let id = storage.create_project(&name, &url, &analysis)?;

    info!("Created project {id} \"{name}\" ({})", analysis.product_type);
    println!("{id}");
    Ok(())
}

fn handle_funnel_command(db: &str, id: i64, customizations: Customizations) -> Result<()> {
    let storage = Storage::new(db)?;
    let project = load_project(&storage, id)?;
    let analysis = project
        .analysis
        .with_context(|| format!("Project {id} has no analysis, run analyze first"))?;

    let funnel = generate_funnel(&analysis, &customizations);
    let fallbacks = funnel
        .upsells
        .iter()
        .chain(&funnel.downsells)
        .filter(|offer| offer.error.is_some())
        .count();
    if fallbacks > 0 || funnel.main_page.error.is_some() {
        warn!("Funnel of project {id} contains fallback pages");
    }

    storage.save_funnel(id, &funnel)?;
    info!(
        "Generated funnel for project {id}: {} upsells, {} downsells",
        funnel.upsells.len(),
        funnel.downsells.len()
    );
    Ok(())
}

async fn handle_emails_command(db: &str, id: i64, model: &str, params: EmailParams) -> Result<()> {
    let storage = Storage::new(db)?;
    let project = load_project(&storage, id)?;
    let funnel = project
        .funnel
        .with_context(|| format!("Project {id} has no funnel, run funnel first"))?;

    let model = email_model_builder(model)?
        .build()
        .map_err(|e| anyhow!("Failed to build LLM model: {}", e))?;
    let ctx = EmailContext {
        model: model.as_ref(),
    };

    let sequence = generate_email_sequence(&funnel, &params, &ctx).await;
    if let Some(reason) = sequence.reason() {
        warn!("Using the basic email sequence for project {id}: {reason}");
    }
    let sequence = sequence.into_record();

    storage.save_email_sequence(id, &sequence)?;
    info!(
        "Saved {} emails for project {id} ({})",
        sequence.num_emails, sequence.sequence_name
    );
    Ok(())
}

fn handle_export_command(
    db: &str,
    id: i64,
    exports_dir: &str,
    templates_dir: Option<&str>,
) -> Result<()> {
    let storage = Storage::new(db)?;
    let project = load_project(&storage, id)?;

    let templates = match templates_dir {
        Some(dir) => TemplateSet::from_dir(Path::new(dir))?,
        None => TemplateSet::builtin(),
    };

    let archive = export_project(&project, Path::new(exports_dir), &templates)?;
    println!("{}", archive.display());
    Ok(())
}

fn handle_list_command(db: &str) -> Result<()> {
    let storage = Storage::new(db)?;
    for project in storage.list_projects()? {
        println!(
            "{}\t{}\t{}\t{}",
            project.id, project.status, project.name, project.url
        );
    }
    Ok(())
}

fn handle_delete_command(db: &str, id: i64) -> Result<()> {
    let storage = Storage::new(db)?;
    if !storage.delete_project(id)? {
        bail!("Project {id} not found");
    }
    info!("Deleted project {id}");
    Ok(())
}
