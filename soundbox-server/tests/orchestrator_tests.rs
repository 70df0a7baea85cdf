//! Orchestrator behavior tests against a stub player backend
//!
//! These exercise the full playback lifecycle (spawn, displacement,
//! termination, reaping) without ever launching a real player process.

mod helpers;

use helpers::{exclusive_settings, local_sound, overlapping_settings, stub_orchestrator, StubPlayer};
use soundbox_common::Error;
use std::sync::atomic::Ordering;
use std::time::Duration;

#[tokio::test]
async fn play_spawns_one_process() {
    let (orch, backend) = stub_orchestrator(StubPlayer::new());
    let sound = local_sound("airhorn");
    let settings = overlapping_settings();

    let outcome = orch.play(&sound, &settings, false).await.unwrap();
    assert!(outcome.started);
    assert_eq!(backend.spawn_count(), 1);

    let playing = orch.now_playing().await;
    assert_eq!(playing.len(), 1);
    assert_eq!(playing[0].sound_id, sound.id);
    assert_eq!(playing[0].sound_name, "airhorn");
    assert!(playing[0].pid.is_some());
}

#[tokio::test]
async fn second_play_of_same_sound_is_a_noop() {
    let (orch, backend) = stub_orchestrator(StubPlayer::new());
    let sound = local_sound("airhorn");
    let settings = overlapping_settings();

    let first = orch.play(&sound, &settings, false).await.unwrap();
    let second = orch.play(&sound, &settings, false).await.unwrap();

    assert!(first.started);
    assert!(!second.started);
    assert_eq!(backend.spawn_count(), 1);
    assert_eq!(orch.now_playing().await.len(), 1);
}

#[tokio::test]
async fn concurrent_plays_of_same_sound_spawn_once() {
    let (orch, backend) = stub_orchestrator(StubPlayer::new());
    let sound = local_sound("airhorn");
    let settings = overlapping_settings();

    let (a, b) = tokio::join!(
        orch.play(&sound, &settings, false),
        orch.play(&sound, &settings, false),
    );
    let a = a.unwrap();
    let b = b.unwrap();

    // Exactly one of the racers wins the spawn.
    assert_eq!(a.started as usize + b.started as usize, 1);
    assert_eq!(backend.spawn_count(), 1);
    assert_eq!(orch.now_playing().await.len(), 1);
}

#[tokio::test]
async fn stop_kills_the_process() {
    let (orch, backend) = stub_orchestrator(StubPlayer::new());
    let sound = local_sound("airhorn");
    let settings = overlapping_settings();

    orch.play(&sound, &settings, false).await.unwrap();
    assert!(orch.stop(sound.id, &settings).await);

    let records = backend.records();
    assert!(records[0].killed.load(Ordering::SeqCst));
    assert!(orch.now_playing().await.is_empty());
}

#[tokio::test]
async fn stop_of_idle_sound_returns_false() {
    let (orch, backend) = stub_orchestrator(StubPlayer::new());
    let sound = local_sound("airhorn");
    let settings = overlapping_settings();

    assert!(!orch.stop(sound.id, &settings).await);
    assert_eq!(backend.spawn_count(), 0);
}

#[tokio::test]
async fn toggle_twice_returns_to_idle() {
    let (orch, backend) = stub_orchestrator(StubPlayer::new());
    let sound = local_sound("airhorn");
    let settings = overlapping_settings();

    let up = orch.toggle(&sound, &settings).await.unwrap();
    assert!(up.now_playing);
    assert!(up.entry.is_some());

    let down = orch.toggle(&sound, &settings).await.unwrap();
    assert!(!down.now_playing);
    assert!(down.entry.is_none());

    assert_eq!(backend.spawn_count(), 1);
    assert!(backend.records()[0].killed.load(Ordering::SeqCst));
    assert!(orch.now_playing().await.is_empty());
}

#[tokio::test]
async fn exclusive_policy_displaces_other_sounds() {
    let (orch, backend) = stub_orchestrator(StubPlayer::new());
    let a = local_sound("drum");
    let b = local_sound("bell");
    let c = local_sound("airhorn");

    // Build up two concurrent sounds under the permissive policy.
    let overlap = overlapping_settings();
    orch.play(&a, &overlap, false).await.unwrap();
    orch.play(&b, &overlap, false).await.unwrap();
    assert_eq!(orch.now_playing().await.len(), 2);

    let outcome = orch.play(&c, &exclusive_settings(), false).await.unwrap();
    assert!(outcome.started);

    let playing = orch.now_playing().await;
    assert_eq!(playing.len(), 1);
    assert_eq!(playing[0].sound_id, c.id);

    let records = backend.records();
    assert!(records[0].killed.load(Ordering::SeqCst));
    assert!(records[1].killed.load(Ordering::SeqCst));
    assert!(!records[2].killed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn overlapping_policy_lets_sounds_coexist() {
    let (orch, _backend) = stub_orchestrator(StubPlayer::new());
    let a = local_sound("drum");
    let b = local_sound("bell");
    let settings = overlapping_settings();

    orch.play(&a, &settings, false).await.unwrap();
    orch.play(&b, &settings, false).await.unwrap();

    let playing = orch.now_playing().await;
    assert_eq!(playing.len(), 2);
}

#[tokio::test]
async fn restart_respawns_from_trim_start() {
    let (orch, backend) = stub_orchestrator(StubPlayer::new());
    let mut sound = local_sound("intro");
    sound.trim_start_sec = Some(5.0);
    let settings = overlapping_settings();

    orch.play(&sound, &settings, false).await.unwrap();
    let outcome = orch.restart(&sound, &settings).await.unwrap();
    assert!(outcome.started);

    let records = backend.records();
    assert_eq!(records.len(), 2);
    assert!(records[0].killed.load(Ordering::SeqCst));
    assert_eq!(records[1].params.trim_start, Some(5.0));
    assert_eq!(orch.now_playing().await.len(), 1);
}

#[tokio::test]
async fn restart_of_idle_sound_just_starts_it() {
    let (orch, backend) = stub_orchestrator(StubPlayer::new());
    let sound = local_sound("airhorn");
    let settings = overlapping_settings();

    let outcome = orch.restart(&sound, &settings).await.unwrap();
    assert!(outcome.started);
    assert_eq!(backend.spawn_count(), 1);
}

#[tokio::test]
async fn restart_picks_up_fresh_settings() {
    let (orch, backend) = stub_orchestrator(StubPlayer::new());
    let sound = local_sound("airhorn");

    let mut settings = overlapping_settings();
    settings.default_volume = Some(40);
    orch.play(&sound, &settings, false).await.unwrap();

    settings.default_volume = Some(90);
    orch.restart(&sound, &settings).await.unwrap();

    let records = backend.records();
    assert_eq!(records[0].params.volume, Some(40));
    assert_eq!(records[1].params.volume, Some(90));
}

#[tokio::test]
async fn stop_all_kills_everything() {
    let (orch, backend) = stub_orchestrator(StubPlayer::new());
    let settings = overlapping_settings();
    for name in ["drum", "bell", "airhorn"] {
        orch.play(&local_sound(name), &settings, false).await.unwrap();
    }

    assert_eq!(orch.stop_all(&settings).await, 3);
    assert!(orch.now_playing().await.is_empty());
    for record in backend.records() {
        assert!(record.killed.load(Ordering::SeqCst));
    }

    // Already idle: nothing left to stop.
    assert_eq!(orch.stop_all(&settings).await, 0);
}

#[tokio::test]
async fn natural_exit_is_reaped() {
    let (orch, backend) = stub_orchestrator(StubPlayer::auto_exit(Duration::from_millis(20)));
    let sound = local_sound("blip");
    let settings = overlapping_settings();

    orch.play(&sound, &settings, false).await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(orch.now_playing().await.is_empty());
    assert!(!backend.records()[0].killed.load(Ordering::SeqCst));

    // The slot is free again, so the sound can be replayed.
    let outcome = orch.play(&sound, &settings, false).await.unwrap();
    assert!(outcome.started);
    assert_eq!(backend.spawn_count(), 2);
}

#[tokio::test]
async fn spawn_failure_leaves_registry_unchanged() {
    let (orch, backend) = stub_orchestrator(StubPlayer::failing());
    let sound = local_sound("airhorn");
    let settings = overlapping_settings();

    let err = orch.play(&sound, &settings, false).await.unwrap_err();
    assert!(matches!(err, Error::SpawnFailed(_)));

    assert!(orch.now_playing().await.is_empty());
    assert_eq!(backend.spawn_count(), 0);
    assert!(!orch.stop(sound.id, &settings).await);
}

#[tokio::test]
async fn sound_without_source_is_rejected_before_spawn() {
    let (orch, backend) = stub_orchestrator(StubPlayer::new());
    let mut sound = local_sound("broken");
    sound.local_path = None;
    let settings = overlapping_settings();

    let err = orch.play(&sound, &settings, false).await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    assert_eq!(backend.spawn_count(), 0);
}
