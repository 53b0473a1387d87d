//! Error reports of the `fund-me` binary.

use eyre::EyreHandler;
use fund_me::WalletError;
use itertools::Itertools;
use std::{error::Error, fmt, iter};

/// Reports errors on a single line.
///
/// A request the user declined in their wallet is reported in the wallet's own words, without
/// the transport errors around it. Anything else prints its chain of causes.
struct Handler {
    /// The `color-eyre` report, used instead when `FUND_ME_DEBUG` is set.
    verbose: Option<Box<dyn EyreHandler>>,
}

fn causes<'a>(
    error: &'a (dyn Error + 'static),
) -> impl Iterator<Item = &'a (dyn Error + 'static)> {
    iter::successors(Some(error), |&err: &&'a (dyn Error + 'static)| err.source())
}

/// Renders `error` as one line.
fn summary(error: &(dyn Error + 'static)) -> String {
    let rejection = causes(error)
        .filter_map(|err| err.downcast_ref::<WalletError>())
        .find(|err| err.is_rejection());
    if let Some(rejection) = rejection {
        return rejection.to_string();
    }

    // Wrapping errors often repeat their source in their own message.
    let mut messages: Vec<String> = Vec::new();
    for err in causes(error) {
        let message = err.to_string();
        if !messages.last().is_some_and(|last| last.contains(&message)) {
            messages.push(message);
        }
    }
    messages.iter().format(": ").to_string()
}

impl EyreHandler for Handler {
    fn display(&self, error: &(dyn Error + 'static), f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&summary(error))
    }

    fn debug(&self, error: &(dyn Error + 'static), f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.verbose {
            Some(verbose) => verbose.debug(error, f),
            None if f.alternate() => fmt::Debug::fmt(error, f),
            None => f.write_str(&summary(error)),
        }
    }

    fn track_caller(&mut self, location: &'static std::panic::Location<'static>) {
        if let Some(verbose) = &mut self.verbose {
            verbose.track_caller(location);
        }
    }
}

/// Installs the panic hook and the [`eyre`] hook.
pub fn install() {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .panic_section("This is a bug in fund-me, please report it.")
        .into_hooks();
    panic_hook.install();

    let eyre_hook = eyre_hook.into_eyre_hook();
    let verbose = std::env::var_os("FUND_ME_DEBUG").is_some();
    if let Err(err) = eyre::set_hook(Box::new(move |e| {
        Box::new(Handler { verbose: verbose.then(|| eyre_hook(e)) })
    })) {
        debug!("failed to install eyre error hook: {err}");
    }
}
