// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: recipe path
fn recipe_arg() -> Arg {
    Arg::new("recipe")
        .required(true)
        .value_name("RECIPE")
        .help("Path to the recipe file (\"-\" for stdin)")
}

/// Common argument: input values
fn values_arg() -> Arg {
    Arg::new("values")
        .short('v')
        .long("values")
        .value_name("JSON")
        .default_value("{}")
        .help("Values as a JSON object, or @path to a JSON file")
}

/// Common argument: mutable names
fn mutable_arg() -> Arg {
    Arg::new("mutable")
        .short('m')
        .long("mutable")
        .value_name("NAMES")
        .value_delimiter(',')
        .help("Comma-separated names the recipe is expected to update")
}

fn build_cli() -> Command {
    Command::new("pyway")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Run Python recipes against JSON values")
        .subcommand(
            Command::new("run")
                .about("Run a recipe and print the updated values as JSON")
                .arg(recipe_arg())
                .arg(values_arg())
                .arg(mutable_arg())
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .value_name("PATH")
                        .help("Bridge configuration file (TOML)"),
                )
                .arg(
                    Arg::new("interpreter")
                        .short('i')
                        .long("interpreter")
                        .value_name("PATH")
                        .help("Interpreter to run the recipe with (overrides the config file)"),
                )
                .arg(
                    Arg::new("timeout")
                        .short('t')
                        .long("timeout")
                        .value_name("SECS")
                        .help("Kill the recipe after this many seconds (overrides the config file)"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Check that the recipe uses every value, without running it")
                .arg(recipe_arg())
                .arg(values_arg())
                .arg(mutable_arg()),
        )
        .subcommand(
            Command::new("render")
                .about("Print the program that would be run")
                .arg(recipe_arg())
                .arg(values_arg())
                .arg(mutable_arg()),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory - use CARGO_MANIFEST_DIR which is always set by cargo
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("pyway.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
