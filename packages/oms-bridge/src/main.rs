use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use oms_bridge::{demo, logging, BridgeConfig, ConfigLayer, Error};
use oms_client::ObjectMemoryStore;

/// oms-bridge - browse an object memory server as an address space
#[derive(Parser, Debug)]
#[command(name = "oms-bridge")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (default: <config dir>/oms-bridge/config.toml)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Root URL of the object memory server
    #[arg(long)]
    oms_url: Option<String>,

    /// Namespace URI of the root folder
    #[arg(long)]
    namespace_uri: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Levels to walk below the root folder
    #[arg(long)]
    depth: Option<usize>,

    /// Hide the "Delete Block" method on block nodes
    #[arg(long)]
    no_block_delete: bool,

    /// Browse built-in sample memories instead of a server
    #[arg(long)]
    demo: bool,

    /// Log at debug level
    #[arg(long, short)]
    verbose: bool,
}

impl Args {
    fn flags(&self) -> ConfigLayer {
        ConfigLayer {
            oms_url: self.oms_url.clone(),
            namespace_uri: self.namespace_uri.clone(),
            request_timeout_secs: self.timeout,
            block_deletable: self.no_block_delete.then_some(false),
            walk_depth: self.depth,
        }
    }
}

fn run(args: &Args) -> Result<(), Error> {
    let config = BridgeConfig::load(args.config.as_deref(), &args.flags())?;
    tracing::info!(
        oms_url = %config.oms_url,
        namespace_uri = %config.namespace_uri,
        demo = args.demo,
        "starting bridge"
    );

    let store: Arc<dyn ObjectMemoryStore> = if args.demo {
        Arc::new(demo::seeded_store()?)
    } else {
        oms_bridge::connect(&config)?
    };

    print!("{}", oms_bridge::inspect(&config, store)?);
    Ok(())
}

fn main() {
    let args = Args::parse();
    logging::init(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
