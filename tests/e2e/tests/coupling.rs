//! Link, monitor, and trap-exit behavior through the public surface

use assert_matches::assert_matches;

use lifeline_e2e_tests::{
    assert_silent, idle, init_tracing, next_envelope, spawn_probe, wait_terminated,
};
use lifeline_runtime::{ActorSystem, Envelope, ExitReason};

#[tokio::test]
async fn crash_propagates_over_link() {
    init_tracing();
    let system = ActorSystem::new();
    let (probe, mut rx) = spawn_probe(&system);

    let a = system.spawn(idle);
    let b = system.spawn(idle);
    system.link(a, b).unwrap();
    let reference = system.monitor(probe, b).unwrap();

    system.terminate(a, ExitReason::fault("crash")).unwrap();

    let envelope = next_envelope(&mut rx).await;
    assert_matches!(
        envelope,
        Envelope::Down { monitor, actor, reason }
            if monitor == reference && actor == b && reason == ExitReason::fault("crash")
    );
    assert_eq!(system.termination_reason(b), Some(ExitReason::fault("crash")));
}

#[tokio::test]
async fn trapping_partner_receives_exit_and_survives() {
    init_tracing();
    let system = ActorSystem::new();
    let (trapper, mut rx) = spawn_probe(&system);
    system.set_trap_exit(trapper, true).unwrap();

    let a = system.spawn(idle);
    system.link(a, trapper).unwrap();

    system.terminate(a, ExitReason::fault("crash")).unwrap();

    let envelope = next_envelope(&mut rx).await;
    assert_matches!(
        envelope,
        Envelope::Exit { source, reason }
            if source == a && reason == ExitReason::fault("crash")
    );
    assert!(system.is_alive(trapper));
}

#[tokio::test]
async fn normal_exit_leaves_partner_undisturbed() {
    init_tracing();
    let system = ActorSystem::new();
    let (probe, mut rx) = spawn_probe(&system);

    let a = system.spawn(idle);
    system.link(a, probe).unwrap();

    system.terminate(a, ExitReason::Normal).unwrap();

    assert_silent(&mut rx).await;
    assert!(system.is_alive(probe));
}

#[tokio::test]
async fn monitor_fires_exactly_once_for_any_reason() {
    init_tracing();
    let system = ActorSystem::new();
    let (watcher, mut rx) = spawn_probe(&system);

    let target = system.spawn(idle);
    let reference = system.monitor(watcher, target).unwrap();

    system.terminate(target, ExitReason::Normal).unwrap();

    let envelope = next_envelope(&mut rx).await;
    assert_matches!(
        envelope,
        Envelope::Down { monitor, actor, reason }
            if monitor == reference && actor == target && reason == ExitReason::Normal
    );

    // one-shot: nothing further, and the watcher is unharmed
    assert_silent(&mut rx).await;
    assert!(system.is_alive(watcher));
}

#[tokio::test]
async fn demonitor_suppresses_pending_notification() {
    init_tracing();
    let system = ActorSystem::new();
    let (watcher, mut rx) = spawn_probe(&system);

    let target = system.spawn(idle);
    let reference = system.monitor(watcher, target).unwrap();

    assert!(system.demonitor(reference));
    system.terminate(target, ExitReason::fault("gone")).unwrap();

    assert_silent(&mut rx).await;
    assert!(!system.demonitor(reference));
}

#[tokio::test]
async fn link_is_idempotent() {
    init_tracing();
    let system = ActorSystem::new();
    let a = system.spawn(idle);
    let b = system.spawn(idle);

    system.link(a, b).unwrap();
    system.link(a, b).unwrap();

    // a single unlink removes the relation entirely
    system.unlink(a, b).unwrap();
    assert!(!system.linked(a, b));

    system.terminate(a, ExitReason::fault("crash")).unwrap();
    assert!(system.is_alive(b));

    // unlink of a non-existent link stays a no-op
    system.unlink(a, b).unwrap();
}

#[tokio::test]
async fn worker_panic_reaches_the_watcher() {
    init_tracing();
    let system = ActorSystem::new();
    let (watcher, mut rx) = spawn_probe(&system);

    let worker = system.spawn::<_, _, ()>(|_ctx| async move {
        panic!("division by zero in scoring");
    });
    let reference = system.monitor(watcher, worker).unwrap();

    let envelope = next_envelope(&mut rx).await;
    assert_matches!(
        envelope,
        Envelope::Down { monitor, actor, reason }
            if monitor == reference
                && actor == worker
                && reason == ExitReason::fault("division by zero in scoring")
    );
    wait_terminated(&system, worker).await;
}
