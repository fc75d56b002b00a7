use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context};
use colored::Colorize;
use serde::Serialize;
use serde_json::{json, Value};

use pantry_sdk::{
    Catalog, CatalogAction, CatalogConfig, ImageRef, Notice, NoticeLevel, Recipe, RecipeDraft,
    RecipeId, SdkResult,
};

use crate::cli::*;

/// Config file picked up from the working directory when `--config` is
/// not given.
const LOCAL_CONFIG: &str = "pantry.toml";

/// Run one command. A failed catalog action has already been reported to
/// the user as a notice and comes back as `ExitCode::FAILURE` rather than an
/// error.
pub async fn run_command(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = load_config(&cli)?;
    let catalog = Catalog::open(&config)?;
    let boot = catalog.boot().await?;
    if let Err(e) = &boot.recipes {
        eprintln!("{} could not save sample recipes: {}", "warning:".yellow().bold(), e);
    }

    let format = cli.format;
    match cli.command {
        Command::List(args) => cmd_list(&catalog, args, format).map(|()| ExitCode::SUCCESS),
        Command::Show(args) => cmd_show(&catalog, args, format).map(|()| ExitCode::SUCCESS),
        Command::Add(args) => cmd_add(&catalog, args, format).await,
        Command::Update(args) => cmd_update(&catalog, args, format).await,
        Command::Delete(args) => cmd_delete(&catalog, args, format).await,
        Command::Categories(_) => cmd_categories(&catalog, format).map(|()| ExitCode::SUCCESS),
        Command::Reset(args) => cmd_reset(&catalog, args).await.map(|()| ExitCode::SUCCESS),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<CatalogConfig> {
    let mut config = match &cli.config {
        Some(path) => CatalogConfig::from_file(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None if Path::new(LOCAL_CONFIG).exists() => {
            CatalogConfig::from_file(LOCAL_CONFIG).context("reading pantry.toml")?
        }
        None => CatalogConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if cli.offline {
        config.fetch_remote_taxonomy = false;
    }
    Ok(config)
}

fn cmd_list(catalog: &Catalog, args: ListArgs, format: OutputFormat) -> anyhow::Result<()> {
    if let Some(category) = args.category {
        catalog.set_filter(category);
    }
    let recipes = catalog.filtered_recipes();

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&recipes)?);
        return Ok(());
    }

    println!("{} ({})", "Recipes".bold(), catalog.filter_label().cyan());
    if recipes.is_empty() {
        println!("No recipes found.");
        return Ok(());
    }
    for recipe in &recipes {
        println!(
            "  {}  {}  {}",
            recipe.id.short_id().yellow(),
            recipe.title.bold(),
            catalog.label_for(&recipe.category_key).cyan()
        );
    }
    Ok(())
}

fn cmd_show(catalog: &Catalog, args: ShowArgs, format: OutputFormat) -> anyhow::Result<()> {
    let id = resolve_id(&catalog.recipes(), &args.id)?;
    let recipe = catalog.recipe(&id)?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&recipe)?);
        return Ok(());
    }

    println!("{}", recipe.title.bold());
    println!("  Id: {}", recipe.id.as_str().yellow());
    println!("  Category: {}", catalog.label_for(&recipe.category_key).cyan());
    if let Some(image) = describe_image(&recipe.image) {
        println!("  Photo: {image}");
    }
    println!("  Added: {}", recipe.created_at.format("%Y-%m-%d %H:%M"));
    println!("  Updated: {}", recipe.updated_at.format("%Y-%m-%d %H:%M"));
    println!("\n{}", "Ingredients".bold());
    for line in &recipe.ingredients {
        println!("  - {line}");
    }
    println!("\n{}", "Steps".bold());
    for (n, line) in recipe.steps.iter().enumerate() {
        println!("  {}. {line}", n + 1);
    }
    Ok(())
}

async fn cmd_add(catalog: &Catalog, args: AddArgs, format: OutputFormat) -> anyhow::Result<ExitCode> {
    let draft = RecipeDraft {
        title: args.title,
        category_key: args.category,
        image: ImageRef::from_parts(args.image.image_key, args.image.image_uri),
        ingredients: args.ingredients,
        steps: args.steps,
    };
    let Some(recipe) = report(CatalogAction::Add, catalog.add(draft).await, format) else {
        return Ok(ExitCode::FAILURE);
    };
    if format == OutputFormat::Text {
        println!("  Id: {}", recipe.id.as_str().yellow());
    }
    Ok(ExitCode::SUCCESS)
}

async fn cmd_update(catalog: &Catalog, args: UpdateArgs, format: OutputFormat) -> anyhow::Result<ExitCode> {
    let id = resolve_id(&catalog.recipes(), &args.id)?;
    let mut draft = RecipeDraft::from_recipe(&catalog.recipe(&id)?);
    if let Some(title) = args.title {
        draft.title = title;
    }
    if let Some(category) = args.category {
        draft.category_key = category;
    }
    if !args.ingredients.is_empty() {
        draft.ingredients = args.ingredients;
    }
    if !args.steps.is_empty() {
        draft.steps = args.steps;
    }
    if args.clear_image {
        draft.image = ImageRef::None;
    } else if args.image.image_uri.is_some() || args.image.image_key.is_some() {
        draft.image = ImageRef::from_parts(args.image.image_key, args.image.image_uri);
    }

    let outcome = catalog.update(&id, draft).await;
    Ok(exit_code(report(CatalogAction::Update, outcome, format).is_some()))
}

async fn cmd_delete(catalog: &Catalog, args: DeleteArgs, format: OutputFormat) -> anyhow::Result<ExitCode> {
    let id = resolve_id(&catalog.recipes(), &args.id)?;
    let outcome = catalog.delete(&id).await;
    Ok(exit_code(report(CatalogAction::Delete, outcome, format).is_some()))
}

fn cmd_categories(catalog: &Catalog, format: OutputFormat) -> anyhow::Result<()> {
    let categories = catalog.categories();
    if format == OutputFormat::Json {
        let origin = format!("{:?}", catalog.taxonomy().origin()).to_lowercase();
        println!("{}", json!({ "origin": origin, "categories": categories }));
        return Ok(());
    }

    for category in &categories {
        println!("  {:<12} {}", category.key.yellow(), category.label);
    }
    println!("{}", format!("({:?} list)", catalog.taxonomy().origin()).dimmed());
    Ok(())
}

async fn cmd_reset(catalog: &Catalog, args: ResetArgs) -> anyhow::Result<()> {
    if !args.yes {
        bail!("reset discards every stored recipe; pass --yes to confirm");
    }
    catalog.reset().await?;
    println!("{} Restored {} sample recipes.", "✓".green().bold(), catalog.recipes().len());
    Ok(())
}

/// Find the recipe `input` names: an exact id, or a prefix matching exactly
/// one recipe.
fn resolve_id(recipes: &[Recipe], input: &str) -> anyhow::Result<RecipeId> {
    let id = RecipeId::parse(input)?;
    if recipes.iter().any(|r| r.id == id) {
        return Ok(id);
    }
    let mut matches = recipes.iter().filter(|r| r.id.as_str().starts_with(id.as_str()));
    match (matches.next(), matches.next()) {
        (Some(recipe), None) => Ok(recipe.id.clone()),
        (Some(_), Some(_)) => bail!("recipe id {} is ambiguous", id),
        (None, _) => bail!("no recipe with id {}", id),
    }
}

fn describe_image(image: &ImageRef) -> Option<String> {
    match image {
        ImageRef::None => None,
        ImageRef::Bundled(key) => Some(format!("{key} (bundled)")),
        ImageRef::Uri(uri) => Some(uri.clone()),
    }
}

/// Print the notice for `outcome` and hand back the value on success.
///
/// In JSON mode the notice and the resulting value (if any) are one object,
/// so scripts can pick up e.g. the id of a new recipe.
fn report<T: Serialize>(action: CatalogAction, outcome: SdkResult<T>, format: OutputFormat) -> Option<T> {
    let notice = Notice::for_outcome(action, &outcome);
    match format {
        OutputFormat::Json => {
            let payload = outcome.as_ref().ok().and_then(|value| serde_json::to_value(value).ok());
            println!("{}", notice_json(&notice, payload));
        }
        OutputFormat::Text => match notice.level {
            NoticeLevel::Success => println!("{} {}", "✓".green().bold(), notice),
            NoticeLevel::Error => eprintln!("{} {}", "✗".red().bold(), notice),
            NoticeLevel::Info => println!("{notice}"),
        },
    }
    if let Err(e) = &outcome {
        tracing::debug!(error = %e, "catalog action failed");
    }
    outcome.ok()
}

fn notice_json(notice: &Notice, payload: Option<Value>) -> Value {
    let mut out = json!(notice);
    if let Some(recipe) = payload.filter(|v| !v.is_null()) {
        out["recipe"] = recipe;
    }
    out
}

fn exit_code(succeeded: bool) -> ExitCode {
    if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
