use clap::Args;
use miette::{Context, IntoDiagnostic, Result};
use std::path::PathBuf;
use tracing::info;

use super::report::Report;

#[derive(Args)]
pub struct DumpArgs {
    /// Kindle HD image container file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Directory the HD images are extracted into
    #[arg(value_name = "DIR", default_value = "azwres_images")]
    directory: PathBuf,

    /// Keep images left by a previous run instead of replacing them
    #[arg(long, default_value_t = false)]
    no_clobber: bool,

    /// Print the report as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

impl DumpArgs {
    pub fn handle(&self) -> Result<()> {
        info!("reading {}", self.file.display());
        let data = std::fs::read(&self.file)
            .into_diagnostic()
            .context(format!("path: {}", &self.file.display()))?;

        let report = Report::build(&self.file, &data, &self.directory, !self.no_clobber)
            .context(format!("path: {}", &self.file.display()))?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).into_diagnostic()?
            );
        } else {
            print!("{report}");
            println!("\nUnpacking successfully completed");
        }

        Ok(())
    }
}
