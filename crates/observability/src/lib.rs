//! Tracing/logging setup shared by every binary in the workspace.

pub mod tracing;

pub use self::tracing::{LogFormat, TracingConfig};

/// Initialize process-wide tracing in `format`, filtered by `RUST_LOG` (or `info`).
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init(format: LogFormat) {
    self::tracing::init(&TracingConfig {
        format,
        ..TracingConfig::default()
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init(LogFormat::Pretty);
        init(LogFormat::Json);
        ::tracing::info!("still logging after a second init");
    }
}
