use std::path::PathBuf;

mod catalog;
mod compile;
mod parts;
mod terminal;

use clap::ArgAction;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The directory holding platform descriptor files
    #[arg(short, long, default_value = ".", global = true)]
    source: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or_else(|| Command::Compile(compile::Command::default()))
            .run(self.source)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Compile descriptors into JSON records (default)
    Compile(compile::Command),

    /// Resolve a part list into a bill of materials
    ///
    /// Child parts are expanded transitively and counted.
    Parts(parts::Command),

    /// List the parts in the built-in catalog
    Catalog(catalog::Command),
}

impl Command {
    fn run(self, source: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Compile(command) => command.run(source)?,
            Self::Parts(command) => command.run()?,
            Self::Catalog(command) => command.run()?,
        }
        Ok(())
    }
}
