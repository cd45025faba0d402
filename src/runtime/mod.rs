use clap::Parser;

use crate::editor::RecordEdit;
use crate::error::Result;

mod cli;
mod commands;
mod settings;

pub use cli::{Cli, Command};

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let settings = settings::load_settings();
    let command = cli.command_or_default();

    if command == Command::Config {
        return commands::print_config(&settings);
    }

    let layout = settings.layout(cli.wav.as_deref())?;
    match command {
        Command::Scan => commands::scan(&settings, &layout).map(|_| ()),
        Command::Generate => commands::generate(&settings, &layout),
        Command::List => commands::list(&layout),
        Command::Edit {
            source,
            title,
            description,
            location,
            recorded_at,
            rename_to,
        } => {
            let edit = RecordEdit {
                title,
                description,
                location,
                recorded_at,
                rename_to,
            };
            commands::edit(&layout, &source, &edit)
        }
        Command::FolderLocation { folder, location } => {
            commands::folder_location(&layout, &folder, &location)
        }
        Command::About { content, email } => {
            commands::about(&layout, content.as_deref(), email.as_deref())
        }
        Command::Domain { url } => commands::domain(&layout, &url),
        Command::Config => commands::print_config(&settings),
    }
}
