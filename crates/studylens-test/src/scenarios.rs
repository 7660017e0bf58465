//! End-to-end monitor scenarios

use std::time::Duration;

use proptest::prelude::*;

use studylens_core::{Device, StudyError, Timestamp};
use studylens_visual::{AttentionStatus, DoubtTransition};

use crate::{DeviceEvent, FakeHost, FrameSimulator, MonitorHarness, SceneConfig, Segment};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

fn started(host: &FakeHost) -> MonitorHarness {
    let mut harness = MonitorHarness::new(host.monitor());
    harness.start().unwrap();
    harness
}

fn play(harness: &mut MonitorHarness, sim: &mut FrameSimulator, script: &[Segment]) {
    let frames = sim.render(script);
    harness.feed(&frames);
}

fn sim() -> FrameSimulator {
    FrameSimulator::new(SceneConfig::default(), 1)
}

#[test]
fn steady_focus_earns_xp() {
    let host = FakeHost::new();
    let mut harness = started(&host);

    play(&mut harness, &mut sim(), &[Segment::focused(secs(12))]);

    let monitor = harness.monitor();
    assert_eq!(monitor.status(), AttentionStatus::Focused);
    assert_eq!(monitor.tracker().focused_seconds(), 11);
    assert_eq!(monitor.xp().xp(), 1);
    assert_eq!(monitor.xp().awards()[0].notification(), "+1 XP! (1 total)");
    assert_eq!(
        host.log().count(|e| matches!(e, DeviceEvent::Progress(_))),
        11
    );
    assert_eq!(monitor.snapshot().focus_time, "0m 11s");
}

#[test]
fn face_leaves_then_looking_away() {
    let host = FakeHost::new();
    let mut harness = started(&host);

    play(
        &mut harness,
        &mut sim(),
        &[Segment::focused(secs(2)), Segment::away(secs(6))],
    );

    let statuses: Vec<AttentionStatus> = harness.reports().iter().map(|r| r.status).collect();
    // Debounce and the looking-away threshold hold Focused for two extra ticks
    assert_eq!(&statuses[..3], &[AttentionStatus::Focused; 3]);
    assert_eq!(statuses[3], AttentionStatus::Focused);
    assert_eq!(statuses[4], AttentionStatus::LookingAway);

    let snapshot = harness.monitor().snapshot();
    assert_eq!(snapshot.status, AttentionStatus::LookingAway);
    assert_eq!(snapshot.message, "Focus on your studies");
    assert_eq!(snapshot.focused_seconds, 3);
    assert!(!snapshot.face_present);
    assert_eq!(host.log().alerts(), 0);
}

#[test]
fn stalled_classifier_becomes_distracted() {
    let host = FakeHost::new();
    let mut harness = started(&host);

    play(&mut harness, &mut sim(), &[Segment::focused(secs(1))]);
    harness.idle(secs(8));

    let monitor = harness.monitor();
    assert_eq!(monitor.status(), AttentionStatus::Distracted);
    assert_eq!(
        monitor.status().message(),
        "Stop talking and get back to studying!"
    );
    assert_eq!(monitor.tracker().focused_seconds(), 4);
    assert_eq!(monitor.tracker().distracted_seconds(), 3);
    assert_eq!(host.log().alerts(), 3);
}

#[test]
fn blocked_alerts_do_not_stop_tracking() {
    let host = FakeHost::new().alerts_blocked();
    let mut harness = started(&host);

    play(&mut harness, &mut sim(), &[Segment::focused(secs(1))]);
    harness.idle(secs(8));

    let monitor = harness.monitor();
    assert_eq!(monitor.status(), AttentionStatus::Distracted);
    assert_eq!(monitor.stats().alerts_blocked, 3);
    assert_eq!(host.log().alerts(), 0);
}

#[test]
fn held_hand_starts_one_voice_session() {
    let host = FakeHost::new();
    let mut harness = started(&host);

    play(
        &mut harness,
        &mut sim(),
        &[Segment::focused(ms(500)), Segment::hand_raised(secs(2))],
    );

    let log = host.log();
    assert!(harness.monitor().doubt_mode_active());
    assert_eq!(log.voice_starts(), 1);
    assert_eq!(log.live_voice(), 1);
}

#[test]
fn second_raise_restarts_voice() {
    let host = FakeHost::new();
    let mut harness = started(&host);

    play(
        &mut harness,
        &mut sim(),
        &[
            Segment::hand_raised(ms(500)),
            Segment::hand_lowered(ms(500)),
            Segment::hand_raised(ms(500)),
        ],
    );

    assert_eq!(
        host.log().device_events(),
        vec![
            DeviceEvent::CameraStart,
            DeviceEvent::VoiceStart(1),
            DeviceEvent::VoiceStop(1),
            DeviceEvent::VoiceStart(2),
        ]
    );
    assert_eq!(host.log().max_live_voice(), 1);
}

#[test]
fn denied_microphone_keeps_doubt_mode() {
    let host = FakeHost::new().microphone_denied();
    let mut harness = started(&host);

    play(&mut harness, &mut sim(), &[Segment::hand_raised(ms(300))]);

    let monitor = harness.monitor();
    assert!(monitor.doubt_mode_active());
    assert!(!monitor.voice().is_active());
    assert_eq!(monitor.stats().voice_errors, 1);
    assert_eq!(
        monitor.stats().last_error.as_deref(),
        Some("microphone access denied")
    );
}

#[test]
fn manual_toggle_needs_camera() {
    let host = FakeHost::new();
    let mut harness = MonitorHarness::new(host.monitor());

    assert_eq!(
        harness.monitor_mut().toggle_doubt_mode(),
        Err(StudyError::CameraInactive)
    );
    assert!(!harness.monitor().doubt_mode_active());
    assert!(host.log().events().is_empty());
}

#[test]
fn manual_toggle_then_gestures() {
    let host = FakeHost::new();
    let mut harness = started(&host);
    let mut sim = sim();

    assert_eq!(
        harness.monitor_mut().toggle_doubt_mode(),
        Ok(DoubtTransition::Entered)
    );

    // Raising while already active is absorbed; lowering ends the mode
    play(&mut harness, &mut sim, &[Segment::hand_raised(ms(300))]);
    assert_eq!(host.log().voice_starts(), 1);
    play(&mut harness, &mut sim, &[Segment::hand_lowered(ms(300))]);

    assert!(!harness.monitor().doubt_mode_active());
    assert_eq!(
        host.log().device_events(),
        vec![
            DeviceEvent::CameraStart,
            DeviceEvent::VoiceStart(1),
            DeviceEvent::VoiceStop(1),
        ]
    );
}

#[test]
fn stop_releases_everything_once() {
    let host = FakeHost::new();
    let mut harness = started(&host);
    let mut sim = sim();
    play(&mut harness, &mut sim, &[Segment::hand_raised(ms(300))]);

    assert!(harness.monitor_mut().stop());
    assert!(!harness.monitor_mut().stop());

    assert_eq!(
        host.log().device_events(),
        vec![
            DeviceEvent::CameraStart,
            DeviceEvent::VoiceStart(1),
            DeviceEvent::VoiceStop(1),
            DeviceEvent::CameraStop,
        ]
    );

    // Frames after stop are ignored and no ticks fire
    play(&mut harness, &mut sim, &[Segment::focused(secs(3))]);
    let snapshot = harness.monitor().snapshot();
    assert_eq!(snapshot.status, AttentionStatus::Off);
    assert_eq!(snapshot.message, "Webcam Off");
    assert!(!snapshot.camera_active);
    assert!(snapshot.stats.frames_ignored > 0);
    assert!(harness.reports().is_empty());
}

#[test]
fn restart_keeps_accumulators() {
    let host = FakeHost::new();
    let mut harness = started(&host);
    let mut sim = sim();

    play(&mut harness, &mut sim, &[Segment::focused(secs(3))]);
    let before = harness.monitor().tracker().focused_seconds();
    assert!(before > 0);

    harness.monitor_mut().stop();
    harness.start().unwrap();
    assert_eq!(harness.monitor().status(), AttentionStatus::LookingAway);

    play(&mut harness, &mut sim, &[Segment::focused(secs(3))]);
    assert!(harness.monitor().tracker().focused_seconds() > before);
}

#[test]
fn denied_camera_stays_off() {
    let host = FakeHost::new().camera_error(StudyError::PermissionDenied(Device::Camera));
    let mut harness = MonitorHarness::new(host.monitor());

    let err = harness.start().unwrap_err();
    assert!(err.is_device_error());
    assert_eq!(harness.monitor().status(), AttentionStatus::Off);

    harness.idle(secs(3));
    assert!(harness.reports().is_empty());
    assert!(host.log().events().is_empty());
}

#[tokio::test]
async fn transcript_reaches_collaborators() {
    let host = FakeHost::new();
    let mut harness = started(&host);
    play(&mut harness, &mut sim(), &[Segment::hand_raised(ms(300))]);

    harness.ask("what is osmosis").await;

    let monitor = harness.monitor();
    assert!(monitor.doubt_mode_active());
    assert_eq!(
        monitor.chat().last().unwrap().text,
        "Good question! Let's look at what is osmosis."
    );
    assert_eq!(monitor.recommendations().len(), 3);
    assert!(host
        .log()
        .events()
        .contains(&DeviceEvent::Search("what is osmosis".into())));
}

#[tokio::test]
async fn assistant_failure_becomes_apology() {
    let host = FakeHost::new().assistant_error("model overloaded");
    let mut harness = started(&host);
    play(&mut harness, &mut sim(), &[Segment::focused(secs(2))]);
    let status = harness.monitor().status();

    harness.ask("explain entropy").await;

    let monitor = harness.monitor();
    let apology = monitor.chat().last().unwrap();
    assert!(apology.failed);
    assert_eq!(
        apology.text,
        "Sorry, I encountered an error: model overloaded. Please try again."
    );
    assert_eq!(monitor.status(), status);
    assert!(!monitor.doubt_mode_active());
    assert_eq!(monitor.recommendations().len(), 3);
}

#[tokio::test]
async fn focus_keeps_counting_while_question_is_out() {
    let host = FakeHost::new();
    let mut harness = started(&host);
    let mut sim = sim();
    play(&mut harness, &mut sim, &[Segment::hand_raised(ms(300))]);

    let inquiry = harness
        .monitor_mut()
        .on_transcript_finalized("how do magnets work")
        .unwrap();
    play(&mut harness, &mut sim, &[Segment::hand_lowered(ms(200)), Segment::focused(secs(4))]);
    let focused = harness.monitor().tracker().focused_seconds();
    assert!(focused >= 3);
    assert_eq!(harness.monitor().snapshot().pending_inquiries, 1);

    let asked_at = harness.now();
    harness.answer(inquiry).await;

    let monitor = harness.monitor();
    assert_eq!(monitor.tracker().focused_seconds(), focused);
    assert_eq!(monitor.chat().len(), 2);
    assert_eq!(monitor.chat().last().unwrap().at, asked_at);
    assert_eq!(monitor.snapshot().pending_inquiries, 0);
}

#[tokio::test]
async fn search_failure_is_logged_only() {
    let host = FakeHost::new().search_fails();
    let mut harness = started(&host);

    harness.ask("cell division").await;

    let monitor = harness.monitor();
    assert!(monitor.recommendations().is_empty());
    assert_eq!(monitor.stats().search_errors, 1);
    assert_eq!(monitor.chat().len(), 2);
}

#[tokio::test]
async fn reply_read_aloud() {
    let host = FakeHost::new();
    let mut harness = started(&host);
    harness.ask("osmosis").await;

    harness.monitor_mut().read_aloud(1).unwrap();

    assert_eq!(
        host.log().events().last(),
        Some(&DeviceEvent::Speak(
            "Good question! Let's look at osmosis.".into()
        ))
    );
}

#[test]
fn malformed_hands_are_skipped() {
    let host = FakeHost::new();
    let mut harness = started(&host);

    play(&mut harness, &mut sim(), &[Segment::malformed_hand(secs(2))]);

    let monitor = harness.monitor();
    assert!(!monitor.doubt_mode_active());
    assert_eq!(monitor.gesture().malformed_hands(), 61);
    assert_eq!(monitor.status(), AttentionStatus::Focused);
    assert_eq!(host.log().voice_starts(), 0);
}

#[test]
fn host_stall_collapses_ticks() {
    let host = FakeHost::new();
    let mut harness = started(&host);
    play(&mut harness, &mut sim(), &[Segment::focused(secs(1))]);
    assert!(harness.reports().is_empty());

    harness.stall(secs(5));
    assert_eq!(harness.reports().len(), 1);

    harness.idle(secs(1));
    assert_eq!(harness.reports().len(), 2);
    assert_eq!(harness.monitor().status(), AttentionStatus::Distracted);
}

#[test]
fn noisy_camera_stays_focused() {
    let host = FakeHost::new();
    let mut harness = started(&host);
    let mut sim = FrameSimulator::new(SceneConfig::noisy(), 9);

    play(&mut harness, &mut sim, &[Segment::focused(secs(10))]);

    assert_eq!(harness.reports().len(), 9);
    assert!(harness
        .reports()
        .iter()
        .all(|r| r.status == AttentionStatus::Focused));
}

#[test]
fn snapshot_serializes() {
    let host = FakeHost::new();
    let mut harness = started(&host);
    play(&mut harness, &mut sim(), &[Segment::focused(secs(2))]);

    let json = serde_json::to_value(harness.monitor().snapshot()).unwrap();
    assert_eq!(json["status"], "Focused");
    assert_eq!(json["focused_seconds"], 1);
    assert_eq!(json["level"], 1);
    assert_eq!(harness.now(), Timestamp::from_millis(1_980));
}

fn segment(kind: u8, duration_ms: u64) -> Segment {
    let duration = ms(duration_ms);
    match kind {
        0 => Segment::focused(duration),
        1 => Segment::away(duration),
        2 => Segment::hand_raised(duration),
        3 => Segment::hand_lowered(duration),
        _ => Segment::malformed_hand(duration),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_voice_follows_doubt_mode(
        script in proptest::collection::vec((0u8..5, 100u64..3_000), 1..8),
        seed in any::<u64>(),
    ) {
        let host = FakeHost::new();
        let mut harness = started(&host);
        let mut sim = FrameSimulator::new(SceneConfig::noisy(), seed);

        let segments: Vec<Segment> = script.iter().map(|(k, d)| segment(*k, *d)).collect();
        play(&mut harness, &mut sim, &segments);

        let log = host.log();
        let monitor = harness.monitor();
        prop_assert!(log.max_live_voice() <= 1);
        prop_assert_eq!(log.live_voice() == 1, monitor.doubt_mode_active());
        prop_assert_eq!(monitor.doubt_mode_active(), monitor.gesture().hand_raised());

        let tracker = monitor.tracker();
        prop_assert!(
            tracker.focused_seconds() + tracker.distracted_seconds()
                <= harness.reports().len() as u64
        );
    }
}
