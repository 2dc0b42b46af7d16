//! Ctrl-C handling: interrupting a dispatch cancels it instead of killing herd.

use fanout::CancelToken;

/// Route Ctrl-C to `cancel`.
///
/// The handler can only be installed once per process; later calls keep
/// the first token and log at debug level.
pub fn install(cancel: &CancelToken) {
    let token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        log::info!("received Ctrl-C, cancelling");
        token.cancel();
    }) {
        log::debug!("could not set Ctrl-C handler: {}", e);
    }
}
