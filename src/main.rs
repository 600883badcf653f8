use anyhow::Result;
use clap::{Parser, Subcommand};
use token_scout::config::Config;
use token_scout::output::{
    OutputFormat, format_addresses, format_creations, format_listings, format_profiles,
};
use token_scout::pipeline::Pipeline;
use token_scout::rpc::RpcClient;
use tracing::info;

#[derive(Parser)]
#[command(name = "scout")]
#[command(about = "Discover and price newly deployed tokens straight from chain state", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "table")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List contract-creation transactions in the trailing block window
    CreatedContracts {
        #[arg(long, default_value = "1000")]
        blocks: u64,
    },
    /// List newly deployed contracts that look like fungible tokens
    NewTokens {
        #[arg(long, default_value = "1000")]
        blocks: u64,
    },
    /// List new tokens that have a pool against the reference asset
    NewPairs {
        #[arg(long, default_value = "1000")]
        blocks: u64,
    },
    /// Full profiles (metadata + spot price) for new priced tokens
    Profiles {
        #[arg(long, default_value = "1000")]
        blocks: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let cli = Cli::parse();
    let format = OutputFormat::from(cli.format.as_str());

    let config = Config::from_env()?;
    info!(
        "RPC URLs: {} endpoint(s) configured",
        config.json_rpc_urls.len()
    );
    info!("Reference asset: {:?}", config.reference_asset);
    info!("AMM factory: {:?}", config.factory_address);

    let client = RpcClient::new(&config.json_rpc_urls)?;
    let pipeline = Pipeline::new(client, config);

    match cli.command {
        Commands::CreatedContracts { blocks } => {
            let creations = pipeline.scan_creations(blocks).await?;
            println!("{}", format_creations(&creations, &format));
        }
        Commands::NewTokens { blocks } => {
            let tokens = pipeline.discover_tokens(blocks).await?;
            println!("{}", format_addresses(&tokens, &format));
        }
        Commands::NewPairs { blocks } => {
            let listings = pipeline.discover_listings(blocks).await?;
            println!("{}", format_listings(&listings, &format));
        }
        Commands::Profiles { blocks } => {
            let profiles = pipeline.build_profiles(blocks).await?;
            println!("{}", format_profiles(&profiles, &format));
        }
    }

    Ok(())
}
