use env_logger::{Builder, Env};

/// `info` unless `RUST_LOG` says otherwise.
pub fn init_logger() {
    let _ = Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .try_init();
}
