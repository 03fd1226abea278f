//! End-to-End Tests for the Lifeline Runtime
//!
//! Scenario tests that drive the public coupling surface the way a host
//! application would: an owner actor managing children through links,
//! monitors, and trap-exit. Shared fixtures live here; the scenarios are in
//! `tests/`.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use lifeline_runtime::{ActorContext, ActorId, ActorSystem, Envelope};

/// Install a test subscriber honoring `RUST_LOG`; safe to call repeatedly
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// An actor that idles in its receive loop until terminated
pub async fn idle(mut ctx: ActorContext) {
    while ctx.recv().await.is_some() {}
}

/// Spawn an actor that forwards every envelope it receives out to the test
/// body, so assertions can observe a mailbox from the outside
pub fn spawn_probe(system: &ActorSystem) -> (ActorId, mpsc::UnboundedReceiver<Envelope>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let id = system.spawn(move |mut ctx: ActorContext| async move {
        while let Some(envelope) = ctx.recv().await {
            if tx.send(envelope).is_err() {
                break;
            }
        }
    });
    (id, rx)
}

/// Next envelope a probe forwarded, failing the test after two seconds
pub async fn next_envelope(rx: &mut mpsc::UnboundedReceiver<Envelope>) -> Envelope {
    timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for an envelope")
        .expect("probe terminated before delivering")
}

/// Assert that no envelope arrives within a short window
pub async fn assert_silent(rx: &mut mpsc::UnboundedReceiver<Envelope>) {
    let outcome = timeout(Duration::from_millis(200), rx.recv()).await;
    assert!(
        outcome.is_err(),
        "expected silence, got {:?}",
        outcome.unwrap()
    );
}

/// Spin until `id` is no longer alive; the bookkeeping itself is
/// synchronous, this only waits out task scheduling
pub async fn wait_terminated(system: &ActorSystem, id: ActorId) {
    timeout(Duration::from_secs(2), async {
        while system.is_alive(id) {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("actor did not terminate in time");
}
