const DEFAULT_FILTER: &str = "aitryst_invoker=info";

/// Installs an `env_logger` backend honoring `RUST_LOG`, falling back to
/// info-level output for this crate. Safe to call more than once.
pub fn init() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_FILTER))
        .format_timestamp_millis()
        .try_init();
}
