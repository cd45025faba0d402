use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "audiofolio", version, about = "Catalogue field recordings and publish them as a static site")]
pub struct Cli {
    /// Directory of source recordings (overrides `paths.source_dir`)
    #[arg(long = "wav", value_name = "DIR", global = true)]
    pub wav: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Bring the metadata documents in line with the source recordings (default)
    Scan,
    /// Scan, then rebuild the publish directory
    Generate,
    /// Show every record grouped by folder
    List,
    /// Change the metadata of one recording
    Edit {
        /// Source path relative to the source directory
        source: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        location: Option<String>,
        /// New recording time, read as UTC
        #[arg(long, value_name = "YYYY-MM-DD HH:MM:SS")]
        recorded_at: Option<String>,
        /// Move the recording (source, document and cache) to a new path
        #[arg(long, value_name = "NEW")]
        rename_to: Option<String>,
    },
    /// Set the location of every recording in a folder (`/` for the top level)
    FolderLocation { folder: String, location: String },
    /// Change the about page
    About {
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Set the public URL of the published site
    Domain { url: String },
    /// Print the effective configuration as TOML
    Config,
}

impl Cli {
    pub fn command_or_default(&self) -> Command {
        self.command.clone().unwrap_or(Command::Scan)
    }
}
