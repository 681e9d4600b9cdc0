//! draftdoc - website content draft compiler
//!
//! A CLI tool that turns content extracted from a client's website into a
//! shared, editable document: a fixed boilerplate plus one block per section,
//! compiled into position-addressed edit operations and applied remotely.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::pedantic))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(missing_docs))]
// Allow some pedantic lints that are too strict for this project
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::enum_variant_names)]
#![allow(dead_code)]

mod app_config;
mod cli;
mod content_model;
mod template_config;
mod templates;

// Compilation: boilerplate + sections -> edit operations
mod draft_compiler;
mod operations;
mod text_units;

// Local simulation of the document service
mod replay;

// Remote document service and the publish pipeline
mod gateway;
mod publish;

// Model reply adapter
mod reply_parser;

use anyhow::{Context, Result};
use app_config::AppConfig;
use chrono::NaiveDate;
use clap::Parser;
use cli::{Cli, Commands, ReplyOrigin};
use content_model::GenerationRequest;
use gateway::{GoogleDocsGateway, ServiceAccountCredentials};
use publish::{PublishError, PublishOptions};
use reply_parser::ReplySource;
use std::path::{Path, PathBuf};
use template_config::TemplateConfig;

/// Main entry point for the draftdoc CLI application
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

/// Run the CLI application
fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if cli.verbose {
        logger.filter_level(log::LevelFilter::Info);
    }
    logger.init();

    match cli.command {
        Commands::Compile {
            input,
            output,
            config,
            date,
            template,
            preview,
        } => {
            handle_compile_command(&input, output, config, date, template, preview)?;
        }

        Commands::Publish {
            input,
            config,
            date,
            template,
        } => {
            handle_publish_command(&input, config, date, template)?;
        }

        Commands::ParseReply {
            reply,
            origin,
            source_url,
            project,
            config,
            output,
        } => {
            handle_parse_reply_command(&reply, origin, source_url, project, config, output)?;
        }

        Commands::CheckConfig { config } => {
            handle_check_config_command(config)?;
        }

        Commands::InitConfig { path, force } => {
            handle_init_config_command(&path, force)?;
        }

        Commands::ListTemplates => {
            handle_list_templates_command()?;
        }
    }

    Ok(())
}

/// Handle the compile command
fn handle_compile_command(
    input: &Path,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
    date: Option<String>,
    template_path: Option<PathBuf>,
    preview: bool,
) -> Result<()> {
    let config = AppConfig::discover(config_path.as_deref())
        .context("Failed to load configuration")?;
    let template = resolve_template(template_path, &config)?;
    let generated_on = resolve_date(date)?;

    let request = GenerationRequest::load(input)
        .with_context(|| format!("Failed to load request from {}", input.display()))?;
    log::info!(
        "Compiling {} sections with template {}",
        request.sections.len(),
        template.name
    );

    let draft = draft_compiler::compile(
        &template,
        request.project_name(),
        &request.sections,
        generated_on,
    )
    .context("Failed to compile document")?;

    let rendered = if preview {
        let document = replay::replay(&draft.operations)
            .context("Compiled operations do not replay cleanly")?;
        log::info!("Replayed {} styled runs", document.runs().len());
        format!("# {}\n\n{}", draft.title, document.text)
    } else {
        serde_json::to_string_pretty(&draft).context("Failed to serialize operations")?
    };

    match output {
        Some(path) => {
            std::fs::write(&path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "✓ Wrote {} operations ({} inserts, {} styles) to {}",
                draft.operations.len(),
                draft.insert_count(),
                draft.style_count(),
                path.display()
            );
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

/// Handle the publish command
fn handle_publish_command(
    input: &Path,
    config_path: Option<PathBuf>,
    date: Option<String>,
    template_path: Option<PathBuf>,
) -> Result<()> {
    let config = AppConfig::discover(config_path.as_deref())
        .context("Failed to load configuration")?;
    let template = resolve_template(template_path, &config)?;
    let generated_on = resolve_date(date)?;

    println!("Publishing document...");
    println!("Input: {}", input.display());

    // Stage 1: Validate and compile locally, before any remote call
    println!("\n[Stage 1/3] Compiling content...");
    let request = GenerationRequest::load(input)
        .with_context(|| format!("Failed to load request from {}", input.display()))?;
    request
        .validate_for_publish()
        .context("Request cannot be published")?;

    let draft = draft_compiler::compile(
        &template,
        request.project_name(),
        &request.sections,
        generated_on,
    )
    .context("Failed to compile document")?;
    println!(
        "✓ Compiled {} sections into {} operations",
        request.sections.len(),
        draft.operations.len()
    );

    // Stage 2: Authenticate
    println!("\n[Stage 2/3] Authenticating...");
    let credentials = ServiceAccountCredentials::from_env()
        .context("Service account credentials are not configured")?;
    let options = PublishOptions {
        share_with_anyone: config.gateway.sharing.anyone_with_link,
        delete_on_failure: config.gateway.delete_on_failure,
    };
    let gateway = GoogleDocsGateway::connect(config.gateway, &credentials)
        .context("Failed to authenticate with the document service")?;
    println!("✓ Authenticated as {}", credentials.client_email);

    // Stage 3: Create, fill and share
    println!("\n[Stage 3/3] Creating document \"{}\"...", draft.title);
    match publish::publish(&gateway, &draft, &options) {
        Ok(published) => {
            println!("✓ Document {}: {}", published.stage, published.url);
            println!("  Document id: {}", published.document_id);
        }
        Err(e) => {
            report_partial_publish(&e);
            return Err(e).context("Failed to publish document");
        }
    }

    println!("\n✓ Publish completed successfully!");

    Ok(())
}

/// Print what a failed publish left behind
fn report_partial_publish(error: &PublishError) {
    if let Some(stage) = error.last_stage() {
        println!("✗ Stopped after stage: {}", stage);
    }
    match error {
        PublishError::RemoteApply {
            url, deleted: false, ..
        }
        | PublishError::Permission { url, .. } => {
            println!("  Document left at: {}", url);
        }
        PublishError::RemoteApply { deleted: true, .. } => {
            println!("  Empty document was deleted");
        }
        PublishError::Create(_) => {}
    }
    if let Some(document_id) = error.document_id() {
        println!("  Document id: {}", document_id);
    }
}

/// Handle the parse-reply command
fn handle_parse_reply_command(
    reply_path: &Path,
    origin: ReplyOrigin,
    source_url: Option<String>,
    project: Option<String>,
    config_path: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let source = match (origin, source_url) {
        (ReplyOrigin::Url, Some(url)) => ReplySource::Url(url),
        (ReplyOrigin::Url, None) => anyhow::bail!("--origin url requires --source-url"),
        (ReplyOrigin::Images, _) => ReplySource::Images,
    };

    let reply = std::fs::read_to_string(reply_path)
        .with_context(|| format!("Failed to read {}", reply_path.display()))?;
    let parsed = reply_parser::parse_reply(&reply, &source)
        .with_context(|| format!("Failed to parse reply in {}", reply_path.display()))?;

    if !parsed.is_structured() {
        println!("Warning: reply had no sections object, kept it as a single section");
    }

    // Blank or missing name falls back to the template label
    let project_name = match project.filter(|name| !name.trim().is_empty()) {
        Some(name) => name,
        None => {
            let config = AppConfig::discover(config_path.as_deref())
                .context("Failed to load configuration")?;
            resolve_template(None, &config)?.default_project_name
        }
    };

    let request = GenerationRequest {
        project_name: Some(project_name),
        extracted_at: Some(chrono::Local::now().to_rfc3339()),
        sections: parsed.into_sections(),
    };
    let json = serde_json::to_string_pretty(&request).context("Failed to serialize request")?;

    match output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "✓ Wrote {} sections to {}",
                request.sections.len(),
                path.display()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Handle the check-config command
fn handle_check_config_command(config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::discover(config_path.as_deref())
        .context("Failed to load configuration")?;

    println!("Configuration:");
    match &config.template_path {
        Some(path) => println!("  Template: {}", path.display()),
        None => println!("  Template: {} (embedded)", templates::DEFAULT_TEMPLATE_ID),
    }
    println!("  Docs API: {}", config.gateway.docs_api_url);
    println!("  Drive API: {}", config.gateway.drive_api_url);
    println!(
        "  Link sharing: {}",
        if config.gateway.sharing.anyone_with_link {
            config.gateway.sharing.role.as_str()
        } else {
            "disabled"
        }
    );

    println!("\nEnvironment:");
    let vars = gateway::CLIENT_EMAIL_VARS
        .iter()
        .chain(gateway::PRIVATE_KEY_VARS.iter());
    for name in vars {
        let status = match std::env::var(name) {
            Ok(value) if !value.trim().is_empty() => "configured",
            _ => "MISSING",
        };
        println!("  {}: {}", name, status);
    }

    match ServiceAccountCredentials::from_env() {
        Ok(_) => println!("\n✓ Credentials available"),
        Err(e) => println!("\n✗ {}", e),
    }

    Ok(())
}

/// Handle the init-config command
fn handle_init_config_command(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite it",
            path.display()
        );
    }

    AppConfig::default()
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("✓ Wrote default configuration to {}", path.display());
    println!("\nNext steps:");
    println!("  1. Set GOOGLE_CLIENT_EMAIL and GOOGLE_PRIVATE_KEY");
    println!("  2. Run 'draftdoc check-config' to verify them");
    println!("  3. Run 'draftdoc publish <extraction.json>'");

    Ok(())
}

/// Handle the list-templates command
fn handle_list_templates_command() -> Result<()> {
    println!("Available templates:\n");

    for info in templates::get_all_templates() {
        let template = templates::parse_template(&info)
            .with_context(|| format!("Embedded template '{}' is invalid", info.id))?;
        println!("  {} ({})", info.id, info.language);
        if !template.description.is_empty() {
            println!("    {}", template.description);
        }
        println!(
            "    {} preamble, {} per-section, {} trailer fragments",
            template.preamble.len(),
            template.section.len(),
            template.trailer.len()
        );
        println!();
    }

    println!("Usage: draftdoc compile <extraction.json> --template <file.toml>");

    Ok(())
}

/// Pick the template: explicit file, then draftdoc.toml, then embedded default
fn resolve_template(explicit: Option<PathBuf>, config: &AppConfig) -> Result<TemplateConfig> {
    match explicit.or_else(|| config.template_path.clone()) {
        Some(path) => {
            log::info!("Using template {}", path.display());
            TemplateConfig::load(&path)
                .with_context(|| format!("Failed to load template {}", path.display()))
        }
        None => templates::default_template().context("Embedded template is invalid"),
    }
}

/// Parse --date, defaulting to today
fn resolve_date(date: Option<String>) -> Result<NaiveDate> {
    match date {
        Some(text) => NaiveDate::parse_from_str(&text, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", text)),
        None => Ok(chrono::Local::now().date_naive()),
    }
}
