use tracing_subscriber::EnvFilter;

/// Initializes structured logging for the process.
///
/// Verbosity comes from `RUST_LOG` and defaults to `info`:
/// - `RUST_LOG=info` - store lifecycle, optimization runs, notifications
/// - `RUST_LOG=debug` - every store request with its payload, each simulator step
/// - `RUST_LOG=fleet_dispatch=debug,fleet_actor=info` - per-crate levels
///
/// Output is the compact format without module targets; the structured fields
/// (`entity_type`, `id`, `carrier`, counts) carry the context.
pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
