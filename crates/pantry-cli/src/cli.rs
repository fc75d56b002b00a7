use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pantry", about = "Pantry: a local-first recipe catalog", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a pantry.toml (default: ./pantry.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the recipe record (overrides the config file)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Skip the remote category fetch and use the bundled list
    #[arg(long, global = true)]
    pub offline: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// List recipes, newest first
    List(ListArgs),
    /// Show one recipe in full
    Show(ShowArgs),
    /// Add a recipe
    Add(AddArgs),
    /// Edit a recipe
    Update(UpdateArgs),
    /// Delete a recipe
    Delete(DeleteArgs),
    /// List recipe categories
    Categories(CategoriesArgs),
    /// Discard all recipes and restore the samples
    Reset(ResetArgs),
}

#[derive(Args)]
pub struct ListArgs {
    /// Only recipes in this category key
    #[arg(short, long)]
    pub category: Option<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Recipe id or a unique prefix of it
    pub id: String,
}

#[derive(Args)]
pub struct AddArgs {
    #[arg(short, long)]
    pub title: String,
    #[arg(short, long)]
    pub category: String,
    #[arg(short = 'i', long = "ingredient")]
    pub ingredients: Vec<String>,
    #[arg(short = 's', long = "step")]
    pub steps: Vec<String>,
    #[command(flatten)]
    pub image: ImageArgs,
}

#[derive(Args)]
pub struct UpdateArgs {
    pub id: String,
    #[arg(short, long)]
    pub title: Option<String>,
    #[arg(short, long)]
    pub category: Option<String>,
    /// Replaces all ingredients when given
    #[arg(short = 'i', long = "ingredient")]
    pub ingredients: Vec<String>,
    /// Replaces all steps when given
    #[arg(short = 's', long = "step")]
    pub steps: Vec<String>,
    #[command(flatten)]
    pub image: ImageArgs,
    /// Remove the recipe's photo
    #[arg(long, conflicts_with_all = ["image_uri", "image_key"])]
    pub clear_image: bool,
}

#[derive(Args)]
pub struct ImageArgs {
    /// Photo location (file path or URI)
    #[arg(long)]
    pub image_uri: Option<String>,
    /// Name of a bundled sample photo
    #[arg(long)]
    pub image_key: Option<String>,
}

#[derive(Args)]
pub struct DeleteArgs {
    pub id: String,
}

#[derive(Args)]
pub struct CategoriesArgs {}

#[derive(Args)]
pub struct ResetArgs {
    /// Confirm that every stored recipe may be discarded
    #[arg(long)]
    pub yes: bool,
}
