//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system with a default filter such as `"debug"` or
/// `"blueprint_graph=trace"`; directives in `RUST_LOG` are applied on top.
///
/// Does nothing if a logger is already installed, so tests may call it
/// repeatedly.
pub fn init_with_filter(filter: &str) {
    let mut builder = env_logger::Builder::new();
    builder.parse_filters(filter);
    if let Ok(directives) = std::env::var("RUST_LOG") {
        builder.parse_filters(&directives);
    }
    let _ = builder.is_test(cfg!(test)).try_init();
}
