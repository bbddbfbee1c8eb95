use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "MediTrack";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default bind address for the REST API, overridable via `MEDITRACK_ADDR`.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info"
}

/// Get the application data directory
/// ~/MediTrack/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("MediTrack")
}

/// Get the medication database path
pub fn database_path() -> PathBuf {
    app_data_dir().join("meditrack.db")
}

/// Resolve the bind address from `MEDITRACK_ADDR`, falling back to the default.
pub fn bind_address() -> SocketAddr {
    let raw = std::env::var("MEDITRACK_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    raw.parse().unwrap_or_else(|_| {
        tracing::warn!("Invalid MEDITRACK_ADDR {raw:?}, falling back to {DEFAULT_BIND_ADDR}");
        DEFAULT_BIND_ADDR
            .parse()
            .expect("default bind address parses")
    })
}
