#[macro_use]
extern crate tracing;

use clap::Parser;
use eyre::Result;
use fund_me::{FundMeController, RpcWallet, TransactionWatcher};
use std::sync::Arc;

mod args;
mod console;
mod handler;
mod page;

use args::{FundMeArgs, FundMeSubcommand};
use page::TerminalPage;

fn main() -> Result<()> {
    handler::install();
    load_dotenv();
    subscriber();
    let args = FundMeArgs::parse();
    main_args(args)
}

#[tokio::main]
async fn main_args(args: FundMeArgs) -> Result<()> {
    let config = args.eth.load_config()?;
    trace!(?config, "loaded config");
    let contract = config.contract()?;

    let wallet = match &config.rpc_url {
        Some(url) => {
            let signer = args.eth.wallet.signer(config.sender)?;
            Some(Arc::new(RpcWallet::connect(url, signer, config.poll_interval()).await?))
        }
        None => {
            debug!("no rpc url configured, running without a wallet");
            None
        }
    };

    let page = Arc::new(TerminalPage::new());
    let watcher = TransactionWatcher::new(config.transaction_timeout());
    let controller = FundMeController::new(wallet, page.clone(), contract, watcher);

    let status = match args.cmd {
        FundMeSubcommand::Connect => controller.connect().await,
        FundMeSubcommand::Balance => controller.get_balance().await,
        FundMeSubcommand::Fund { amount } => {
            page.set_amount(amount);
            controller.fund().await
        }
        FundMeSubcommand::Withdraw => controller.withdraw().await,
        FundMeSubcommand::Console => return console::run(Arc::new(controller)).await,
    };

    if !status.is_success() {
        eyre::bail!("action {status}");
    }
    Ok(())
}

/// Loads a `.env` file from the current directory, if any.
fn load_dotenv() {
    if let Err(err) = dotenvy::dotenv()
        && !err.not_found()
    {
        anstream::eprintln!("failed to load .env file: {err}");
    }
}

/// Initializes a tracing subscriber writing to stderr, filtered by `RUST_LOG`.
fn subscriber() {
    tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}
