use std::path::{Path, PathBuf};

use anyhow::Context;
use cardocs::{Compiler, Scope, SourceDirectory, Summary, write_records};
use tracing::instrument;

use super::terminal::Colorize;

const SUPPORTED_OUTPUT: &str = "supported_cars.json";
const EVERYTHING_OUTPUT: &str = "all_cars.json";

#[derive(Debug, Default, clap::Parser)]
pub struct Command {
    /// Where to write the JSON records
    ///
    /// Defaults to `supported_cars.json`, or `all_cars.json` with
    /// `--everything`.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Include every support tier, not only supported vehicles
    #[arg(long)]
    everything: bool,

    /// Configuration file (defaults to `cardocs.toml` in the source directory)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Command {
    #[instrument]
    pub fn run(self, source: PathBuf) -> anyhow::Result<()> {
        let source = SourceDirectory::new(source)?;
        let config = source.config(self.config.as_deref())?;
        let descriptors = source.load()?;

        let scope = self.scope();
        let compilation = Compiler::standard(config)?.compile(&descriptors, scope)?;

        let output = self.output.unwrap_or_else(|| default_output(scope));
        write_records(&output, &compilation.records)
            .with_context(|| format!("Failed to write {}", output.display()))?;

        print_summary(&compilation.summary, &output);
        Ok(())
    }

    const fn scope(&self) -> Scope {
        if self.everything {
            Scope::Everything
        } else {
            Scope::Supported
        }
    }
}

fn default_output(scope: Scope) -> PathBuf {
    match scope {
        Scope::Supported => PathBuf::from(SUPPORTED_OUTPUT),
        Scope::Everything => PathBuf::from(EVERYTHING_OUTPUT),
    }
}

fn print_summary(summary: &Summary, output: &Path) {
    println!(
        "{}",
        format!(
            "✅ Compiled {} records to {}",
            summary.processed,
            output.display()
        )
        .success()
    );
    if summary.skipped > 0 {
        println!(
            "{}",
            format!("   Skipped {} entries by support type", summary.skipped).dim()
        );
    }
    if summary.excluded > 0 {
        println!(
            "{}",
            format!("⚠️  Excluded {} invalid entries", summary.excluded).warning()
        );
    }
    if summary.warned > 0 {
        println!(
            "{}",
            format!("⚠️  {} records have warnings", summary.warned).warning()
        );
    }
}
