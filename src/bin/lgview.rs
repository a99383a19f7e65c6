#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use clap::{Parser, Subcommand};
use lgview::{LgAction, LgviewConfig, OutputFormat, Store, View};
use tracing::{debug, Level};

mod commands;

use commands::lg::LgArgs;
use commands::lookup::LookupArgs;
use commands::peers::PeersArgs;
use commands::prefixes::PrefixesArgs;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// configuration file path, by default $HOME/.lgview/lgview.toml is used
    #[clap(short, long)]
    config: Option<String>,

    /// Print debug information
    #[clap(long, global = true)]
    debug: bool,

    /// Output format: table (default), markdown, json, json-pretty, json-line, psv
    #[clap(short, long, global = true, default_value = "table")]
    format: OutputFormat,

    /// Looking-glass API base URL, overrides the configured one
    #[clap(long, global = true)]
    api_url: Option<String>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show server information: version, prefix count and freshness
    Info,

    /// List peer ASNs with their announced prefix counts
    Peers(PeersArgs),

    /// List the prefixes announced by an ASN, one page at a time
    Prefixes(PrefixesArgs),

    /// Look up a prefix or IP address
    Lookup(LookupArgs),

    /// Ping a host from the looking glass
    Ping(LgArgs),

    /// Traceroute to a host from the looking glass
    Trace(LgArgs),

    /// Show the active configuration and routes
    Config,
}

impl Commands {
    /// The view a command belongs to, if it is gated by one
    fn view(&self) -> Option<View> {
        match self {
            Commands::Peers(_) => Some(View::AsnList),
            Commands::Prefixes(_) => Some(View::PrefixList),
            Commands::Lookup(_) | Commands::Ping(_) | Commands::Trace(_) => {
                Some(View::LookingGlass)
            }
            Commands::Info | Commands::Config => None,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt()
            // filter spans/events with level DEBUG or higher.
            .with_max_level(Level::DEBUG)
            .init();
    }

    let mut config = match LgviewConfig::new(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    debug!("using looking-glass API at {}", config.api_url);

    if let Some(view) = cli.command.view() {
        if !config.is_routed(view) {
            eprintln!(
                "ERROR: the {} view is disabled, enable it with show_lg/show_peerapp",
                view
            );
            std::process::exit(1);
        }
    }

    let output_format = cli.format;
    let store = Store::from_config(&config);

    match cli.command {
        Commands::Info => commands::info::run(&store, output_format).await,
        Commands::Peers(args) => commands::peers::run(&store, args, output_format).await,
        Commands::Prefixes(args) => commands::prefixes::run(&store, args, output_format).await,
        Commands::Lookup(args) => commands::lookup::run(&store, args, output_format).await,
        Commands::Ping(args) => {
            commands::lg::run(&store, LgAction::Ping, args, output_format).await
        }
        Commands::Trace(args) => {
            commands::lg::run(&store, LgAction::Trace, args, output_format).await
        }
        Commands::Config => commands::config::run(&config, output_format),
    }
}
