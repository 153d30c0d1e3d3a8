// src/main.rs

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use pyway::{BridgeConfig, RecipeBridge, ValueSet};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "pyway")]
#[command(author, version, about = "Run Python recipes against JSON values", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a recipe and print the updated values as JSON
    Run {
        #[command(flatten)]
        input: RecipeInput,

        /// Bridge configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Interpreter to run the recipe with (overrides the config file)
        #[arg(short, long)]
        interpreter: Option<String>,

        /// Kill the recipe after this many seconds (overrides the config file)
        #[arg(short, long)]
        timeout: Option<u64>,
    },
    /// Check that the recipe uses every value, without running it
    Check {
        #[command(flatten)]
        input: RecipeInput,
    },
    /// Print the program that would be run
    Render {
        #[command(flatten)]
        input: RecipeInput,
    },
}

#[derive(Args)]
struct RecipeInput {
    /// Path to the recipe file ("-" for stdin)
    recipe: String,

    /// Values as a JSON object, or @path to a JSON file
    #[arg(short, long, default_value = "{}")]
    values: String,

    /// Comma-separated names the recipe is expected to update
    #[arg(short, long, value_delimiter = ',')]
    mutable: Vec<String>,
}

impl RecipeInput {
    fn load(&self) -> Result<(String, ValueSet)> {
        let recipe = read_recipe(&self.recipe)?;
        let values = parse_values(&self.values)?;
        Ok((recipe, values))
    }
}

fn read_recipe(source: &str) -> Result<String> {
    if source == "-" {
        let mut recipe = String::new();
        std::io::stdin()
            .read_to_string(&mut recipe)
            .context("Failed to read recipe from stdin")?;
        return Ok(recipe);
    }

    std::fs::read_to_string(source).with_context(|| format!("Failed to read recipe: {}", source))
}

fn parse_values(arg: &str) -> Result<ValueSet> {
    let text = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read values file: {}", path))?,
        None => arg.to_string(),
    };

    let value: serde_json::Value =
        serde_json::from_str(&text).context("Values must be valid JSON")?;
    match value {
        serde_json::Value::Object(map) => Ok(map.into_iter().collect()),
        other => bail!("Values must be a JSON object, got: {}", other),
    }
}

fn load_config(
    path: Option<&Path>,
    interpreter: Option<String>,
    timeout: Option<u64>,
) -> Result<BridgeConfig> {
    let mut config = match path {
        Some(path) => BridgeConfig::from_file(path)?,
        None => BridgeConfig::default(),
    };

    if let Some(interpreter) = interpreter {
        config = config.with_interpreter(interpreter);
    }
    if let Some(secs) = timeout {
        if secs == 0 {
            bail!("--timeout must be greater than zero");
        }
        config = config.with_timeout(Duration::from_secs(secs));
    }

    Ok(config)
}

/// Print values with sorted keys so output is stable
fn print_values(values: ValueSet) -> Result<()> {
    let sorted: serde_json::Map<String, serde_json::Value> = values.into_iter().collect();
    println!("{}", serde_json::to_string_pretty(&sorted)?);
    Ok(())
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the JSON result
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run {
            input,
            config,
            interpreter,
            timeout,
        }) => {
            let config = load_config(config.as_deref(), interpreter, timeout)?;
            let (recipe, mut values) = input.load()?;
            info!("Running recipe {} with {}", input.recipe, config.interpreter);

            RecipeBridge::new(config)
                .execute(&recipe, &mut values, &input.mutable)
                .context("Recipe failed")?;

            print_values(values)
        }
        Some(Commands::Check { input }) => {
            let (recipe, values) = input.load()?;
            pyway::check(&recipe, &values, &input.mutable).context("Recipe check failed")?;
            println!("Recipe uses all {} value(s)", values.len());
            Ok(())
        }
        Some(Commands::Render { input }) => {
            let (recipe, values) = input.load()?;
            let program = RecipeBridge::new(BridgeConfig::default())
                .render(&recipe, &values, &input.mutable)
                .context("Recipe check failed")?;
            print!("{}", program);
            Ok(())
        }
        None => {
            // No command provided, show help
            println!("pyway v{}", env!("CARGO_PKG_VERSION"));
            println!("Run 'pyway --help' for usage information");
            Ok(())
        }
    }
}
