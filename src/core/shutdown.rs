//! # Termination-signal wait for the supervision loop.
//!
//! [`wait_for_termination`] resolves once the operating system asks the
//! supervisor to stop, and names the signal that did it. The supervisor
//! attaches that name to the shutdown event, so logs show why the grace
//! drain in `graceful_shutdown` began.
//!
//! On Unix the stop requests are SIGINT (terminal Ctrl-C), SIGTERM
//! (systemd/Kubernetes), and SIGQUIT; elsewhere only Ctrl-C is observable.
//! Listeners are registered fresh on every call.

/// Resolves when a stop request arrives, returning the signal's name.
///
/// Errors only when listener registration fails; the caller should treat
/// that as a stop request too rather than keep running jobs it can no
/// longer be told to release.
#[cfg(unix)]
pub async fn wait_for_termination() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut quit = signal(SignalKind::quit())?;

    let name = tokio::select! {
        _ = interrupt.recv() => "SIGINT",
        _ = terminate.recv() => "SIGTERM",
        _ = quit.recv() => "SIGQUIT",
    };
    Ok(name)
}

/// Resolves when a stop request arrives, returning the signal's name.
///
/// Non-Unix hosts only observe Ctrl-C.
#[cfg(not(unix))]
pub async fn wait_for_termination() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("ctrl-c")
}
