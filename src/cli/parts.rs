use cardocs::{
    PartCatalog,
    domain::{CountStrategy, ResolvedPart, resolve},
};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Part identifiers, as they would appear in a descriptor
    #[arg(value_name = "ID", required = true)]
    parts: Vec<String>,

    /// Count each part once instead of once per occurrence
    #[arg(long)]
    distinct: bool,
}

impl Command {
    #[instrument]
    pub fn run(self) -> anyhow::Result<()> {
        let catalog = PartCatalog::standard()?;
        let (explicit, missing) = resolve::lookup(catalog, &self.parts);
        if !missing.is_empty() {
            anyhow::bail!("Unknown parts: {}", missing.join(", "));
        }

        let strategy = if self.distinct {
            CountStrategy::Distinct
        } else {
            CountStrategy::Flat
        };
        let bill = resolve::resolve(catalog, &explicit, strategy)?;

        println!("{}", "Parts".heading());
        print_lines(&bill.parts_by_name());
        if !bill.tools().is_empty() {
            println!();
            println!("{}", "Tools".heading());
            print_lines(&bill.tools_by_name());
        }
        Ok(())
    }
}

fn print_lines(lines: &[ResolvedPart<'_>]) {
    for line in lines {
        println!(
            "  {:>2} × {} {}",
            line.count,
            line.part.name(),
            format!("({})", line.part.id()).dim()
        );
    }
}
