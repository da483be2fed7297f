use crate::Result;

/// Initialize logging/tracing for the bot.
pub fn init() -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    // Default to info everywhere; override with `RUST_LOG`.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .init();

    Ok(())
}
