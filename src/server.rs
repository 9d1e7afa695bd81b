// SPDX-License-Identifier: MIT
//
// Telnet listener.
//
// One OS thread per caller. A session blocks on its socket most of the time
// and the board serves a handful of callers, not thousands, so threads keep
// the session code a plain read loop.

use std::io;
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;

use tracing::{info, info_span, warn};

use crate::config::Config;
use crate::registry::SessionRegistry;
use crate::session;

/// Accept callers until the listener fails.
///
/// # Errors
///
/// Binding the listening socket failed.
pub fn run(config: Arc<Config>) -> io::Result<()> {
    let telnet = &config.servers.telnet;
    let listener = TcpListener::bind((telnet.bind.as_str(), telnet.port))?;
    info!(addr = %listener.local_addr()?, "listening for connections");

    let registry = SessionRegistry::new();
    loop {
        let (stream, peer) = match listener.accept() {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(error = %e, "accept failed");
                continue;
            }
        };

        let guard = registry.register(peer);
        let id = guard.id();
        info!(id, %peer, online = guard.online(), "caller connected");

        let config = Arc::clone(&config);
        let spawned = thread::Builder::new()
            .name(format!("session-{id}"))
            .spawn(move || {
                let _span = info_span!("session", id, %peer).entered();
                match session::serve(&stream, &config) {
                    Ok(()) => info!("caller disconnected"),
                    Err(e) => warn!(error = %e, "session ended"),
                }
                drop(guard);
            });
        if let Err(e) = spawned {
            warn!(id, error = %e, "cannot start session thread");
        }
    }
}
