use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use folio_cli::{report_failure, Command, Config, OutputFormat};
use folio_client::{build_resolver, OptOut};
use folio_core::config::FolioConfig;
use folio_core::path::{build_doc_store_url, project_detail_href};
use folio_core::policy::has_skip_proxy_marker;
use folio_core::{
    find_project, highlights, section_body, AttemptStatus, ProjectRecord,
    ProjectSection, Resolution,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Setup logging (stderr to keep stdout clean for JSON output)
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")?;

    let cli = Config::parse();
    let config = cli.resolve().map_err(|e| anyhow::anyhow!(e.user_message()))?;

    let opt_out = OptOut {
        page_marker: match &cli.page {
            Some(path) => {
                let html = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read page {}", path.display()))?;
                has_skip_proxy_marker(&html)
            }
            None => false,
        },
    };

    match cli.command {
        Command::List { format, highlights } => {
            let resolution = resolve(&config, opt_out).await?;
            list(&resolution, format, highlights)?;
        }
        Command::Show { id } => {
            let resolution = resolve(&config, opt_out).await?;
            let project = find_project(&resolution.projects, &id)
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            show(project);
        }
        Command::Url {
            path,
            no_cache_bust,
        } => {
            let path = path.unwrap_or_else(|| config.source.default_path.clone());
            let token = config.source.auth_token.as_ref().map(|_| "REDACTED");
            let url = build_doc_store_url(&config.source, &path, token, !no_cache_bust)
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!("{}", url);
        }
        Command::Trace => {
            trace(&config, opt_out).await?;
        }
    }

    Ok(())
}

/// Runs the fallback chain, printing the failure notice when every source fails.
async fn resolve(config: &FolioConfig, opt_out: OptOut) -> anyhow::Result<Resolution> {
    let resolver = build_resolver(config, opt_out).context("Failed to build data sources")?;
    match resolver.resolve().await {
        Ok(resolution) => {
            info!(
                "Loaded {} projects from {}",
                resolution.projects.len(),
                resolution.source
            );
            Ok(resolution)
        }
        Err(e) => Err(report_failure(&e)),
    }
}

/// Print the project grid (or the highlight slider)
fn list(resolution: &Resolution, format: OutputFormat, only_highlights: bool) -> anyhow::Result<()> {
    let projects: Vec<&ProjectRecord> = if only_highlights {
        highlights(&resolution.projects)
    } else {
        resolution.projects.iter().collect()
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&projects)?);
        }
        OutputFormat::Table => {
            if projects.is_empty() {
                if only_highlights {
                    println!("No highlights yet. Mark projects with \"highlight\": true.");
                } else {
                    println!("No projects found.");
                }
                return Ok(());
            }
            for project in projects {
                println!(
                    "{:<20} {:<6} {}{}",
                    project.id,
                    project.year.as_deref().unwrap_or(""),
                    project.title,
                    if project.is_highlight() { " ★" } else { "" }
                );
                if !project.tags.is_empty() {
                    println!("{:<27} Tags: {}", "", project.tags.join(", "));
                }
                println!("{:<27} {}", "", project_detail_href(&project.id));
            }
        }
    }
    Ok(())
}

/// Print a project's detail page: hero, then every section in tab order
fn show(project: &ProjectRecord) {
    println!("\n{}\n", project.title);
    if !project.image.is_empty() {
        println!("  Image:   {}", project.image);
    }
    if !project.tags.is_empty() {
        println!("  Tags:    {}", project.tags.join(", "));
    }
    if let Some(year) = &project.year {
        println!("  Year:    {}", year);
    }
    println!();

    for section in ProjectSection::ALL {
        println!("## {}", section.title());
        println!("{}", section_body(project, section));

        let content = project.content.as_ref();
        match section {
            ProjectSection::Wiring => {
                if let Some(image) = content.and_then(|c| c.wiring_image.as_deref()) {
                    println!("  Diagram: {}", image);
                }
            }
            ProjectSection::Firmware => {
                for firmware in project.firmware_versions.iter().flatten() {
                    println!(
                        "  - {}{}{}",
                        firmware.version,
                        firmware
                            .bin
                            .as_deref()
                            .map(|b| format!(" ({})", b))
                            .unwrap_or_default(),
                        firmware
                            .notes
                            .as_deref()
                            .map(|n| format!(": {}", n))
                            .unwrap_or_default()
                    );
                }
            }
            ProjectSection::Accessory => {
                for accessory in content.map(|c| c.accessories.as_slice()).unwrap_or_default() {
                    let label = accessory
                        .name
                        .as_deref()
                        .or(accessory.url.as_deref())
                        .unwrap_or("Accessory");
                    println!("  - {} <{}>", label, accessory.url.as_deref().unwrap_or("#"));
                }
            }
            _ => {}
        }
        println!();
    }
}

/// Print each source attempt and the final outcome
async fn trace(config: &FolioConfig, opt_out: OptOut) -> anyhow::Result<()> {
    let resolver = build_resolver(config, opt_out).context("Failed to build data sources")?;
    let report = resolver.run().await;

    println!("\nSource resolution\n");
    for (i, record) in report.trace.iter().enumerate() {
        let status = match &record.status {
            AttemptStatus::Skipped(reason) => format!("skipped ({})", reason),
            AttemptStatus::NotAvailable(reason) => format!("not available ({})", reason),
            AttemptStatus::Failed(reason) => format!("failed ({})", reason),
            AttemptStatus::Resolved(count) => format!("resolved {} projects", count),
        };
        println!("  {}. {:<12} {}", i + 1, record.source, status);
    }
    println!("\n  States: {:?}\n", report.states());

    if let Err(e) = &report.result {
        return Err(report_failure(e));
    }
    Ok(())
}
