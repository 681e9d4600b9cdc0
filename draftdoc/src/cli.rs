//! Command-line interface definitions for draftdoc

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// What the model reply was extracted from
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ReplyOrigin {
    /// Uploaded screenshots
    #[default]
    Images,
    /// A fetched web page (requires --source-url)
    Url,
}

/// CLI structure for the draftdoc application
#[derive(Parser)]
#[command(name = "draftdoc")]
#[command(version)]
#[command(
    about = "Compile extracted website content into a shared editable document",
    long_about = None
)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands for draftdoc
#[derive(Subcommand)]
pub enum Commands {
    /// Compile an extraction result into edit operations without publishing
    Compile {
        /// Extraction result JSON (projectName, sections)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Write the operations JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file (defaults to ./draftdoc.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Generation date used in the footer (YYYY-MM-DD, defaults to today)
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<String>,

        /// Boilerplate template file (overrides draftdoc.toml)
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// Print the resulting document text instead of the operations
        #[arg(long)]
        preview: bool,
    },

    /// Compile an extraction result and publish it as a shared document
    Publish {
        /// Extraction result JSON (projectName, sections)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Configuration file (defaults to ./draftdoc.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Generation date used in the footer (YYYY-MM-DD, defaults to today)
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<String>,

        /// Boilerplate template file (overrides draftdoc.toml)
        #[arg(short, long)]
        template: Option<PathBuf>,
    },

    /// Turn a raw model reply into an extraction result
    ParseReply {
        /// File holding the model's reply text
        #[arg(value_name = "REPLY")]
        reply: PathBuf,

        /// Where the content came from
        #[arg(long, value_enum, default_value = "images")]
        origin: ReplyOrigin,

        /// Page URL, used to label the fallback section for URL extractions
        #[arg(long)]
        source_url: Option<String>,

        /// Project name stored in the result (defaults to the template's label)
        #[arg(short, long)]
        project: Option<String>,

        /// Configuration file, consulted for the template's default label
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the extraction result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report which settings and credentials are configured
    CheckConfig {
        /// Configuration file (defaults to ./draftdoc.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write a draftdoc.toml with the default settings
    InitConfig {
        /// Target file
        #[arg(default_value = "draftdoc.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// List embedded boilerplate templates
    ListTemplates,
}
