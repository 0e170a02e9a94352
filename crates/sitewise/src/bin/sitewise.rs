use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use sitewise::{logging, Site, SiteConfig, ViewListing};
use sitewise_dispatch::OutputSink;

#[derive(Parser, Debug)]
#[command(name = "sitewise", version, about = "Render layered sites from views and templates")]
struct Cli {
    /// Site configuration file
    #[arg(short, long, global = true, default_value = "site.yaml")]
    config: PathBuf,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a request path
    Render {
        #[arg(default_value = "/")]
        path: String,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the main views and the tier each comes from
    Views {
        #[arg(long)]
        json: bool,
    },
    /// Show which view and classes serve a request path
    Resolve {
        #[arg(default_value = "/")]
        path: String,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose).map_err(|e| anyhow::anyhow!(e))?;

    let config = SiteConfig::load(&cli.config)
        .with_context(|| format!("cannot load {}", cli.config.display()))?;

    match cli.command {
        Command::Render { path, output } => {
            let mut builder = Site::builder(config);
            if let Some(file) = output {
                builder = builder.sink(OutputSink::File(file));
            }
            let site = builder.build();
            site.dispatcher(&path)
                .run()
                .with_context(|| format!("cannot render {}", path))?;
        }
        Command::Views { json } => {
            let site = Site::builder(config).build();
            let resolver = site.resolver();
            if json {
                println!("{}", serde_json::to_string_pretty(resolver.main_views())?);
            } else {
                print!("{}", ViewListing(resolver.main_views()));
            }
        }
        Command::Resolve { path, json } => {
            let site = Site::builder(config).build();
            let resolution = site
                .resolve(&path)
                .with_context(|| format!("cannot resolve {}", path))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&resolution)?);
            } else {
                print!("{}", resolution);
            }
        }
    }

    Ok(())
}
