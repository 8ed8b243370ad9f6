//! Logger setup for the engine and its demo binaries

/// Initialize env_logger for terrain streaming
///
/// Defaults to `info`, which reports once per chunk crossing; set
/// `RUST_LOG=debug` to watch individual streaming passes and dropped
/// mesh results. Timestamps carry milliseconds so tick costs can be
/// read straight off the log.
///
/// # Example
/// ```
/// cubeland::core::logging::init();
/// log::info!("engine starting");
/// ```
pub fn init() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}
