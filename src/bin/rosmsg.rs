//! Definition Inspector CLI
//!
//! Prints fingerprints, canonical text and resolved specs of ROS message
//! and service definitions.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use rosmsg_schemas::fingerprint;
use rosmsg_schemas::{OutputFormat, RosmsgConfig, SchemaError, SchemaRegistry};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rosmsg")]
#[command(about = "Inspect ROS message and service definitions")]
struct Cli {
    /// Config file layered over the default locations
    #[arg(short, long)]
    config: Option<String>,

    /// Package root, may be repeated (overrides configuration and ROS_PACKAGE_PATH)
    #[arg(short = 'p', long = "package-path")]
    package_path: Vec<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Msg,
    Srv,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the md5sum of a definition
    Md5 {
        kind: Kind,
        /// Full name, e.g. std_msgs/String
        name: String,
        /// Read the definition from this file instead of the package index
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Print the canonical text of a definition, or the resolved spec as JSON
    Show {
        kind: Kind,
        name: String,
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Print the resolved spec as JSON
        #[arg(long)]
        json: bool,
    },

    /// List indexed definitions
    List {
        /// Only list this kind
        kind: Option<Kind>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config =
        RosmsgConfig::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    if !cli.package_path.is_empty() {
        config.registry.package_path = cli.package_path;
    }

    let mut registry = SchemaRegistry::from_config(&config)?;

    let result = match cli.command {
        Commands::Md5 { kind, name, file } => print_md5(&mut registry, kind, &name, file),
        Commands::Show {
            kind,
            name,
            file,
            json,
        } => {
            let json = json || config.output.format == OutputFormat::Json;
            print_show(&mut registry, kind, &name, file, json)
        }
        Commands::List { kind } => {
            if matches!(kind, None | Some(Kind::Msg)) {
                for name in registry.message_names() {
                    println!("{}", name);
                }
            }
            if matches!(kind, None | Some(Kind::Srv)) {
                for name in registry.service_names() {
                    println!("{}", name);
                }
            }
            Ok(())
        }
    };

    if let Err(e) = &result {
        if let Some(SchemaError::NotFound { full_name, .. }) = e.downcast_ref::<SchemaError>() {
            let suggestions = registry.suggest(full_name, 5);
            if !suggestions.is_empty() {
                eprintln!("Did you mean:");
                for suggestion in suggestions {
                    eprintln!("  {}", suggestion);
                }
            }
        }
    }

    result
}

fn print_md5(
    registry: &mut SchemaRegistry,
    kind: Kind,
    name: &str,
    file: Option<PathBuf>,
) -> anyhow::Result<()> {
    match kind {
        Kind::Msg => {
            let spec = match file {
                Some(path) => registry.load_msg_from_file(&path, name)?,
                None => registry.load_msg(name)?,
            };
            if let Some(md5sum) = &spec.md5sum {
                println!("{}", md5sum);
            }
        }
        Kind::Srv => {
            let spec = match file {
                Some(path) => registry.load_srv_from_file(&path, name)?,
                None => registry.load_srv(name)?,
            };
            println!("{}", spec.md5sum);
        }
    }
    Ok(())
}

fn print_show(
    registry: &mut SchemaRegistry,
    kind: Kind,
    name: &str,
    file: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    match kind {
        Kind::Msg => {
            let spec = match file {
                Some(path) => registry.load_msg_from_file(&path, name)?,
                None => registry.load_msg(name)?,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&*spec)?);
            } else {
                println!("{}", fingerprint::md5_text(&spec, registry)?);
            }
        }
        Kind::Srv => {
            let spec = match file {
                Some(path) => registry.load_srv_from_file(&path, name)?,
                None => registry.load_srv(name)?,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&spec)?);
            } else {
                println!("{}", fingerprint::md5_text(&spec.request, registry)?);
                println!("---");
                println!("{}", fingerprint::md5_text(&spec.response, registry)?);
            }
        }
    }
    Ok(())
}
