//! TLS setup for the `wss://` feed connection.
//!
//! rustls needs a process-wide crypto provider before the first handshake;
//! this crate uses the `ring` backend.

use tracing::debug;

/// Installs the `ring` crypto provider as the process default.
///
/// Calling it more than once, or after another provider was installed, is
/// harmless.
pub fn install_crypto_provider() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("A rustls crypto provider was already installed");
    }
}
