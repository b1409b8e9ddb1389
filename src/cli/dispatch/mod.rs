use crate::cli::actions::{server::Args, Action};
use anyhow::{Context, Result};

/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let store = matches
        .get_one::<String>("store")
        .cloned()
        .context("missing required argument: --store")?;
    let issuer = matches
        .get_one::<String>("issuer")
        .cloned()
        .context("missing required argument: --issuer")?;

    Ok(Action::Server(Args {
        port,
        store: store.into(),
        issuer,
    }))
}
