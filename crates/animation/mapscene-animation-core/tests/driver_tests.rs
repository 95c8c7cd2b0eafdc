use mapscene_animation_core::{
    AnimationDriver, AnimationOptions, Easing, FrameSnapshot, Keyframe, KeyframeError, LoopMode,
    PlaybackEvent, PlaybackState, SessionId,
};
use mapscene_api_core::LatLng;

fn approx(a: f64, b: f64, eps: f64) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn rot_key(stamp: f64, x: f64) -> Keyframe {
    Keyframe {
        stamp,
        frame: FrameSnapshot {
            rotation: Some([x, 0.0, 0.0]),
            ..Default::default()
        },
        transitions: None,
    }
}

fn start_frame(x: f64) -> FrameSnapshot {
    FrameSnapshot {
        rotation: Some([x, 0.0, 0.0]),
        ..Default::default()
    }
}

fn one_second() -> AnimationOptions {
    AnimationOptions {
        duration_ms: 1000,
        loop_mode: LoopMode::Once,
        easing: Easing::Linear,
    }
}

fn frame_events(events: &[PlaybackEvent]) -> Vec<(SessionId, f64, FrameSnapshot)> {
    events
        .iter()
        .filter_map(|e| match e {
            PlaybackEvent::Frame {
                session,
                progress,
                frame,
            } => Some((*session, *progress, *frame)),
            _ => None,
        })
        .collect()
}

/// it should interpolate from the implicit start frame toward the keyframes
#[test]
fn interpolates_from_current_state() {
    let mut driver = AnimationDriver::new();
    driver
        .start(vec![rot_key(1.0, 100.0)], &one_second(), start_frame(0.0))
        .unwrap();

    let events = driver.tick(0.25);
    let frames = frame_events(&events);
    assert_eq!(frames.len(), 1);
    approx(frames[0].1, 0.25, 1e-9);
    approx(frames[0].2.rotation.unwrap()[0], 25.0, 1e-9);
}

/// it should deliver the final frame at progress 1.0 and then end
#[test]
fn once_ends_with_final_frame() {
    let mut driver = AnimationDriver::new();
    driver
        .start(vec![rot_key(1.0, 90.0)], &one_second(), start_frame(0.0))
        .unwrap();
    let id = driver.current_session().unwrap();

    let events = driver.tick(2.0);
    let frames = frame_events(&events);
    assert_eq!(frames.len(), 1);
    approx(frames[0].1, 1.0, 0.0);
    approx(frames[0].2.rotation.unwrap()[0], 90.0, 1e-9);
    assert_eq!(*events.last().unwrap(), PlaybackEvent::Ended { session: id });
    assert!(!driver.is_active());
    assert!(driver.tick(0.016).is_empty());
}

/// it should wrap looping sessions, counting iterations
#[test]
fn infinite_loop_wraps_and_counts() {
    let mut driver = AnimationDriver::new();
    let options = AnimationOptions {
        loop_mode: LoopMode::Infinite,
        ..one_second()
    };
    driver
        .start(vec![rot_key(1.0, 100.0)], &options, start_frame(0.0))
        .unwrap();
    let id = driver.current_session().unwrap();

    // 2.25 seconds: two wraps, then a frame at phase 0.25.
    let events = driver.tick(2.25);
    let loops: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            PlaybackEvent::Looped { iteration, .. } => Some(*iteration),
            _ => None,
        })
        .collect();
    assert_eq!(loops, vec![1, 2]);
    let frames = frame_events(&events);
    assert_eq!(frames[0].0, id);
    approx(frames[0].1, 0.25, 1e-9);
    assert!(driver.is_active());
}

/// it should end a Repeat(n) session after n passes
#[test]
fn repeat_ends_after_count() {
    let mut driver = AnimationDriver::new();
    let options = AnimationOptions {
        loop_mode: LoopMode::Repeat(2),
        ..one_second()
    };
    driver
        .start(vec![rot_key(1.0, 10.0)], &options, start_frame(0.0))
        .unwrap();

    let first = driver.tick(1.0);
    assert!(first
        .iter()
        .any(|e| matches!(e, PlaybackEvent::Looped { iteration: 1, .. })));
    assert!(driver.is_active());

    let second = driver.tick(1.0);
    assert!(second
        .iter()
        .any(|e| matches!(e, PlaybackEvent::Ended { .. })));
    assert!(!driver.is_active());
}

/// it should suspend frame delivery on pause and retain elapsed progress
#[test]
fn pause_retains_progress() {
    let mut driver = AnimationDriver::new();
    driver
        .start(vec![rot_key(1.0, 100.0)], &one_second(), start_frame(0.0))
        .unwrap();
    driver.tick(0.4);

    let paused = driver.pause().unwrap();
    assert!(matches!(paused, PlaybackEvent::Paused { .. }));
    assert_eq!(driver.state(), Some(PlaybackState::Paused));
    assert!(driver.tick(10.0).is_empty());
    approx(driver.progress().unwrap(), 0.4, 1e-9);

    // Second pause is a no-op.
    assert!(driver.pause().is_none());

    let resumed = driver.resume().unwrap();
    assert!(matches!(resumed, PlaybackEvent::Resumed { .. }));
    let events = driver.tick(0.1);
    approx(frame_events(&events)[0].1, 0.5, 1e-9);
}

/// it should deliver zero further events tagged with a superseded session
#[test]
fn superseding_cancels_previous_session() {
    let mut driver = AnimationDriver::new();
    driver
        .start(vec![rot_key(1.0, 100.0)], &one_second(), start_frame(0.0))
        .unwrap();
    let first = driver.current_session().unwrap();
    driver.tick(0.3);

    let events = driver
        .start(vec![rot_key(1.0, -100.0)], &one_second(), start_frame(0.0))
        .unwrap();
    assert_eq!(events, vec![PlaybackEvent::Stopped { session: first }]);
    let second = driver.current_session().unwrap();
    assert_ne!(first, second);

    // Every subsequent event belongs to the new session, which starts from
    // elapsed zero.
    for _ in 0..5 {
        for e in driver.tick(0.1) {
            let session = match e {
                PlaybackEvent::Frame { session, .. }
                | PlaybackEvent::Looped { session, .. }
                | PlaybackEvent::Ended { session }
                | PlaybackEvent::Stopped { session }
                | PlaybackEvent::Paused { session }
                | PlaybackEvent::Resumed { session } => session,
            };
            assert_eq!(session, second);
        }
    }
}

/// it should keep the active session running when a new start fails validation
#[test]
fn invalid_start_leaves_active_session() {
    let mut driver = AnimationDriver::new();
    driver
        .start(vec![rot_key(1.0, 100.0)], &one_second(), start_frame(0.0))
        .unwrap();
    let id = driver.current_session().unwrap();

    let err = driver
        .start(vec![rot_key(1.5, 0.0)], &one_second(), start_frame(0.0))
        .unwrap_err();
    assert!(matches!(err, KeyframeError::StampOutOfRange { .. }));
    assert_eq!(driver.current_session(), Some(id));
    assert!(!frame_events(&driver.tick(0.1)).is_empty());
}

/// it should stop idempotently
#[test]
fn stop_is_idempotent() {
    let mut driver = AnimationDriver::new();
    assert!(driver.stop().is_none());
    driver
        .start(vec![rot_key(1.0, 1.0)], &one_second(), start_frame(0.0))
        .unwrap();
    assert!(matches!(
        driver.stop(),
        Some(PlaybackEvent::Stopped { .. })
    ));
    assert!(driver.stop().is_none());
    assert!(driver.pause().is_none());
    assert!(driver.resume().is_none());
}

/// it should animate position and scale simultaneously with rotation
#[test]
fn multi_field_frames() {
    let mut driver = AnimationDriver::new();
    let keys = vec![Keyframe {
        stamp: 1.0,
        frame: FrameSnapshot {
            position: Some(LatLng::new(40.0, 117.0)),
            rotation: Some([0.0, 90.0, 0.0]),
            scale: Some([2.0; 3]),
            anchor: None,
        },
        transitions: None,
    }];
    let start = FrameSnapshot {
        position: Some(LatLng::new(39.0, 116.0)),
        rotation: Some([0.0, 0.0, 0.0]),
        scale: Some([1.0; 3]),
        anchor: None,
    };
    driver.start(keys, &one_second(), start).unwrap();

    let frames = frame_events(&driver.tick(0.5));
    let frame = frames[0].2;
    approx(frame.position.unwrap().lat, 39.5, 1e-9);
    approx(frame.position.unwrap().lng, 116.5, 1e-9);
    approx(frame.rotation.unwrap()[1], 45.0, 1e-9);
    approx(frame.scale.unwrap()[0], 1.5, 1e-9);
    assert!(frame.anchor.is_none());
}

/// it should run a fixture-defined sequence end to end
#[test]
fn fixture_sequence_plays() {
    let json = mapscene_test_fixtures::animations::json("hover-loop").unwrap();
    let (keys, options) = mapscene_animation_core::parse_animation_json(&json).unwrap();
    assert_eq!(options.loop_mode, LoopMode::Infinite);

    let mut driver = AnimationDriver::new();
    driver.start(keys, &options, start_frame(0.0)).unwrap();
    let events = driver.tick(f64::from(options.duration_ms) / 1000.0 * 1.5);
    assert!(events
        .iter()
        .any(|e| matches!(e, PlaybackEvent::Looped { .. })));
}
