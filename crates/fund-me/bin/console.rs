//! A long-lived page driven from standard input.
//!
//! Every line is one click. Clicks run concurrently, so funding twice in a row while the first
//! transaction is still pending shows the second one as already in progress.

use crate::page::TerminalPage;
use eyre::Result;
use fund_me::{ActionStatus, FundMeController, WalletProvider};
use std::{str::FromStr, sync::Arc};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    task::JoinSet,
};

const HELP: &str = "actions: connect | balance | fund <AMOUNT> | withdraw | help | quit";

/// A single line of console input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Click {
    Connect,
    Balance,
    Fund(String),
    Withdraw,
    Help,
    Quit,
}

impl FromStr for Click {
    type Err = eyre::Report;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let click = match words.next().unwrap_or_default() {
            "connect" | "c" => Self::Connect,
            "balance" | "b" => Self::Balance,
            "fund" | "f" => Self::Fund(words.next().unwrap_or_default().to_string()),
            "withdraw" | "w" => Self::Withdraw,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => eyre::bail!("unknown action `{other}`"),
        };
        if let Some(extra) = words.next() {
            eyre::bail!("unexpected argument `{extra}`");
        }
        Ok(click)
    }
}

/// Reads clicks until `quit` or end of input, then waits for pending actions to finish.
pub async fn run<W>(controller: Arc<FundMeController<W, Arc<TerminalPage>>>) -> Result<()>
where
    W: WalletProvider + ?Sized + 'static,
{
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut actions = JoinSet::new();
    anstream::println!("{HELP}");

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let click = match line.parse::<Click>() {
            Ok(click) => click,
            Err(err) => {
                anstream::eprintln!("{err}\n{HELP}");
                continue;
            }
        };
        trace!(?click, "click");

        let controller = controller.clone();
        match click {
            Click::Connect => {
                actions.spawn(async move { ("connect", controller.connect().await) });
            }
            Click::Balance => {
                actions.spawn(async move { ("balance", controller.get_balance().await) });
            }
            Click::Fund(amount) => {
                actions.spawn(async move { ("fund", controller.fund_amount(&amount).await) });
            }
            Click::Withdraw => {
                actions.spawn(async move { ("withdraw", controller.withdraw().await) });
            }
            Click::Help => anstream::println!("{HELP}"),
            Click::Quit => break,
        }

        // Report whatever finished meanwhile without blocking on the rest.
        while let Some(done) = actions.try_join_next() {
            report(done?);
        }
    }

    while let Some(done) = actions.join_next().await {
        report(done?);
    }
    Ok(())
}

fn report((action, status): (&str, ActionStatus)) {
    match status {
        ActionStatus::Busy | ActionStatus::NoWallet => anstream::eprintln!("{action}: {status}"),
        status => debug!(action, %status, "action finished"),
    }
}
