//! Logging initialization

/// Initialize the logging system
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable.
///
/// # Example
/// ```
/// gpu_grass::core::logging::init();
/// log::info!("Grass renderer starting");
/// ```
pub fn init() {
    // try_init: tests and embedding hosts may already own the logger
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    )
    .format_timestamp_millis()
    .try_init();
}
