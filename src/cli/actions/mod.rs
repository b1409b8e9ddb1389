pub mod server;

// The match over `Action` lives in its own module to keep this one small.
mod run;

/// What the CLI resolved to. Serving is the only action today; the
/// `openapi` binary bypasses the CLI entirely.
#[derive(Debug)]
pub enum Action {
    Server(server::Args),
}

impl Action {
    // Convenience wrapper so call sites can do `action.execute().await`.
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
