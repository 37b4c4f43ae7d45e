use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "workua_job_archiver=info";

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs a fmt subscriber filtered by `RUST_LOG`. Later calls are no-ops.
pub fn init() {
    let _ = tracing_subscriber::fmt().with_env_filter(filter()).with_target(false).try_init();
}
