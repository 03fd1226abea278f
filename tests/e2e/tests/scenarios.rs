//! Owner/child scenarios: a match coordinator managing a countdown timer

use std::time::Duration;

use assert_matches::assert_matches;

use lifeline_e2e_tests::{idle, init_tracing, next_envelope, spawn_probe, wait_terminated};
use lifeline_runtime::{ActorSystem, Envelope, ExitReason, TimerService};

/// The coordinator both links (coupled cleanup) and monitors (observability)
/// its child; with trap-exit on, a graceful child exit shows up as two
/// messages and the coordinator keeps running.
#[tokio::test]
async fn coordinator_sees_both_exit_and_down_for_graceful_child() {
    init_tracing();
    let system = ActorSystem::new();
    let (coordinator, mut rx) = spawn_probe(&system);
    system.set_trap_exit(coordinator, true).unwrap();

    let timer = system.spawn(idle);
    system.link(coordinator, timer).unwrap();
    let reference = system.monitor(coordinator, timer).unwrap();

    system.terminate(timer, ExitReason::Normal).unwrap();

    let mut saw_exit = false;
    let mut saw_down = false;
    for _ in 0..2 {
        match next_envelope(&mut rx).await {
            Envelope::Exit { source, reason } => {
                assert_eq!(source, timer);
                assert_eq!(reason, ExitReason::Normal);
                saw_exit = true;
            }
            Envelope::Down {
                monitor,
                actor,
                reason,
            } => {
                assert_eq!(monitor, reference);
                assert_eq!(actor, timer);
                assert_eq!(reason, ExitReason::Normal);
                saw_down = true;
            }
            other => panic!("unexpected envelope: {:?}", other),
        }
    }
    assert!(saw_exit && saw_down);
    assert!(system.is_alive(coordinator));
}

/// Without trap-exit the failure walks the whole link chain, carrying the
/// original reason at every hop.
#[tokio::test]
async fn cascade_carries_the_same_reason_transitively() {
    init_tracing();
    let system = ActorSystem::new();
    let (probe, mut rx) = spawn_probe(&system);

    let coordinator = system.spawn(idle);
    let scoreboard = system.spawn(idle);
    let timer = system.spawn(idle);
    system.link(coordinator, scoreboard).unwrap();
    system.link(coordinator, timer).unwrap();
    system.monitor(probe, scoreboard).unwrap();

    system.terminate(timer, ExitReason::fault("timeout")).unwrap();

    let envelope = next_envelope(&mut rx).await;
    assert_matches!(
        envelope,
        Envelope::Down { actor, reason, .. }
            if actor == scoreboard && reason == ExitReason::fault("timeout")
    );
    for id in [coordinator, scoreboard, timer] {
        assert_eq!(
            system.termination_reason(id),
            Some(ExitReason::fault("timeout"))
        );
    }
}

/// Full match flow: a countdown child announces progress through delayed
/// self-messages, finishes gracefully, and the trapping coordinator
/// observes the whole lifecycle without dying.
#[tokio::test(start_paused = true)]
async fn countdown_match_runs_to_completion() {
    init_tracing();
    let system = ActorSystem::new();
    let (coordinator, mut rx) = spawn_probe(&system);
    system.set_trap_exit(coordinator, true).unwrap();

    #[derive(Debug)]
    struct Tick;

    let timers = TimerService::new(system.clone());
    let announcements = system.clone();
    let countdown = system.spawn(move |mut ctx| async move {
        let me = ctx.actor_id();
        let mut remaining = 3u32;
        timers.schedule(Duration::from_secs(1), me, Tick);
        while remaining > 0 {
            let Some(envelope) = ctx.recv().await else {
                return ExitReason::fault("mailbox closed early");
            };
            if envelope.payload::<Tick>().is_some() {
                remaining -= 1;
                announcements.send(coordinator, remaining);
                if remaining > 0 {
                    timers.schedule(Duration::from_secs(1), me, Tick);
                }
            }
        }
        ExitReason::Normal
    });
    system.link(coordinator, countdown).unwrap();
    let reference = system.monitor(coordinator, countdown).unwrap();

    // three progress updates, one trapped exit, one down-notification;
    // signals may overtake the last update, so collect then classify
    let mut updates = Vec::new();
    let mut saw_exit = false;
    let mut saw_down = false;
    for _ in 0..5 {
        match next_envelope(&mut rx).await {
            Envelope::Exit { source, reason } => {
                assert_eq!(source, countdown);
                assert_eq!(reason, ExitReason::Normal);
                saw_exit = true;
            }
            Envelope::Down {
                monitor,
                actor,
                reason,
            } => {
                assert_eq!(monitor, reference);
                assert_eq!(actor, countdown);
                assert_eq!(reason, ExitReason::Normal);
                saw_down = true;
            }
            user => updates.push(*user.payload::<u32>().expect("progress update")),
        }
    }
    assert_eq!(updates, vec![2, 1, 0]);
    assert!(saw_exit && saw_down);
    assert!(system.is_alive(coordinator));
    wait_terminated(&system, countdown).await;
}

/// Owner crash takes its linked children with it.
#[tokio::test]
async fn spawn_linked_couples_child_to_owner() {
    init_tracing();
    let system = ActorSystem::new();

    let owner = system.spawn(idle);
    let child = system.spawn_linked(owner, idle).unwrap();
    assert!(system.linked(owner, child));

    system.terminate(owner, ExitReason::fault("abandoned")).unwrap();

    assert_eq!(
        system.termination_reason(child),
        Some(ExitReason::fault("abandoned"))
    );
}

/// System teardown ends every actor with the shutdown reason and leaves
/// consistent metrics behind.
#[tokio::test]
async fn shutdown_is_the_teardown_boundary() {
    init_tracing();
    let system = ActorSystem::new();

    let mut actors = Vec::new();
    for _ in 0..3 {
        actors.push(system.spawn(idle));
    }
    system.link(actors[0], actors[1]).unwrap();

    system.shutdown().await;

    assert!(system.live_actors().is_empty());
    for id in actors {
        assert_eq!(system.termination_reason(id), Some(ExitReason::Shutdown));
    }

    let stats = system.metrics().snapshot();
    assert_eq!(stats.actors_spawned, 3);
    assert_eq!(stats.actors_terminated, 3);
}
