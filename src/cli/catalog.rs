use cardocs::{PartCatalog, PartId, domain::PartCategory};
use tracing::instrument;

use super::terminal::{Colorize, is_narrow};

#[derive(Debug, Default, clap::Parser)]
pub struct Command {
    /// Only list parts of this category
    #[arg(long, value_name = "CATEGORY")]
    category: Option<Category>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum Category {
    Harness,
    Tool,
    Kit,
    Accessory,
    Mount,
    Device,
}

impl From<Category> for PartCategory {
    fn from(category: Category) -> Self {
        match category {
            Category::Harness => Self::Harness,
            Category::Tool => Self::Tool,
            Category::Kit => Self::Kit,
            Category::Accessory => Self::Accessory,
            Category::Mount => Self::Mount,
            Category::Device => Self::Device,
        }
    }
}

impl Command {
    #[instrument]
    pub fn run(self) -> anyhow::Result<()> {
        let catalog = PartCatalog::standard()?;
        let wanted = self.category.map(PartCategory::from);
        let narrow = is_narrow();

        for part in catalog
            .iter()
            .filter(|part| wanted.is_none_or(|c| part.category() == c))
        {
            if narrow {
                println!("{}", part.id());
            } else {
                println!(
                    "{:<28} {:<10} {}",
                    part.id().as_str(),
                    part.category().as_str().dim(),
                    part.name()
                );
            }

            let children: Vec<_> = part.children().iter().map(PartId::as_str).collect();
            if !children.is_empty() {
                println!("    {}", format!("-> {}", children.join(", ")).dim());
            }
        }
        Ok(())
    }
}
