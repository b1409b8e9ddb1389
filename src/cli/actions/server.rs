use crate::{api, mfa::MfaService, store::FileStore, totp::TotpEngine};
use anyhow::{Context, Result};
use std::{path::PathBuf, sync::Arc};
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub store: PathBuf,
    pub issuer: String,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the store cannot be opened or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let store = FileStore::open(&args.store)
        .await
        .with_context(|| format!("could not open credential store {}", args.store.display()))?;

    let service = Arc::new(MfaService::new(
        Arc::new(store),
        TotpEngine::new(&args.issuer),
    ));

    api::serve(args.port, service).await
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("store", args.store.display().to_string()),
        ("issuer", args.issuer.clone()),
    ];
    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!(
        "{} {}\n\nStartup configuration:",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
    for (key, value) in &entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    info!("{message}");
}
