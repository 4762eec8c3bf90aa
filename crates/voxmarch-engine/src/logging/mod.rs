//! Logger setup.
//!
//! Everything logs through the `log` facade; `init_logging` installs
//! `env_logger` once, honoring `RUST_LOG` and quieting the wgpu stack.

mod init;

pub use init::{init_logging, LoggingConfig};
