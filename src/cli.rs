use clap::Parser;
use std::path::PathBuf;

/// Upload files to Pixeldrain and keep them from expiring.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Upload a file and record it in the state file.
    #[arg(long, value_name = "PATH", conflicts_with = "alive")]
    pub upload: Option<PathBuf>,
    /// Visit recorded files that are due, so the host keeps them.
    #[arg(long)]
    pub alive: bool,
}

impl Cli {
    /// Whether any operation was requested; without one only help is shown.
    pub fn has_action(&self) -> bool {
        self.upload.is_some() || self.alive
    }
}
