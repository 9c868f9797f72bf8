use doc_live_capture::capture::{
    CaptureConfig, DeviceError, Frame, MediaDevice, MockDevice, PermissionMode, SdkMetadata,
};
use doc_live_capture::permission::{PermissionGate, PreGranted};
use doc_live_capture::session::{
    CaptureError, CaptureHost, CaptureResult, CaptureSession, SessionState,
};
use doc_live_capture::timing::ManualClock;
use std::time::Duration;

#[derive(Debug, Default)]
struct RecordingHost {
    captures: Vec<CaptureResult>,
    errors: Vec<CaptureError>,
}

impl CaptureHost for RecordingHost {
    fn on_capture(&mut self, result: CaptureResult) {
        self.captures.push(result);
    }

    fn on_error(&mut self, error: &CaptureError) {
        self.errors.push(error.clone());
    }
}

type Session = CaptureSession<MockDevice, RecordingHost>;

fn deferred_session(config: CaptureConfig) -> (Session, ManualClock) {
    let clock = ManualClock::new();
    let mut device = MockDevice::new().deferred();
    device.open(&config).expect("mock opens");
    let session = CaptureSession::new(config, device, RecordingHost::default())
        .expect("valid config")
        .with_clock(clock.clone());
    (session, clock)
}

#[test]
fn ready_capture_delivers_exactly_one_result() {
    let (mut session, _clock) = deferred_session(CaptureConfig::for_document("passport"));

    session.on_device_ready();
    assert_eq!(session.state(), &SessionState::Ready);
    assert!(session.render_hints().watchdog_armed);

    assert!(session.request_capture());
    assert_eq!(session.state(), &SessionState::Capturing);

    let bytes = vec![0xFF, 0xD8, 0x01, 0x02, 0xFF, 0xD9];
    session.on_frame(Frame::new(bytes.clone(), SdkMetadata::at(1000), "image/jpeg"));

    assert_eq!(session.state(), &SessionState::Ready);
    let captures = &session.host().captures;
    assert_eq!(captures.len(), 1);
    assert_eq!(captures[0].filename(), "document_capture.jpeg");
    assert!(captures[0].is_preview_cropped());
    assert_eq!(captures[0].metadata().timestamp_ms, 1000);
    assert_eq!(captures[0].image_bytes(), bytes.as_slice());
    assert!(session.host().errors.is_empty());
}

#[test]
fn second_frame_for_one_trigger_is_dropped() {
    let (mut session, _clock) = deferred_session(CaptureConfig::default());
    session.on_device_ready();
    session.request_capture();

    session.on_frame(Frame::new(vec![1], SdkMetadata::at(1), "image/jpeg"));
    session.on_frame(Frame::new(vec![2], SdkMetadata::at(2), "image/jpeg"));

    assert_eq!(session.host().captures.len(), 1);
    assert_eq!(session.host().captures[0].image_bytes(), &[1]);
}

#[test]
fn device_ready_is_idempotent() {
    let (mut session, clock) = deferred_session(CaptureConfig::default());
    session.on_device_ready();

    clock.advance(Duration::from_secs(6));
    session.on_device_ready();

    // The original deadline still applies.
    clock.advance(Duration::from_secs(4));
    assert!(session.tick());
    assert!(matches!(session.state(), SessionState::Inactive(_)));
}

#[test]
fn inactivity_after_ten_seconds() {
    let (mut session, clock) = deferred_session(CaptureConfig::default());
    session.on_device_ready();

    clock.advance(Duration::from_secs(10));
    session.tick();

    assert_eq!(
        session.state(),
        &SessionState::Inactive(CaptureError::Inactivity {
            fallback_available: true
        })
    );
    let slot = session.render_hints().error.expect("error slot filled");
    assert!(slot.dismissible);
    assert_eq!(slot.code, "CAMERA_INACTIVE");
    assert_eq!(session.host().errors, vec![CaptureError::inactivity(false)]);
    assert!(session.host().captures.is_empty());
}

#[test]
fn inactivity_without_upload_fallback() {
    let mut config = CaptureConfig::default();
    config.upload_fallback_disabled = true;
    let (mut session, clock) = deferred_session(config);
    session.on_device_ready();

    clock.advance(Duration::from_secs(11));
    session.tick();

    let slot = session.render_hints().error.expect("error slot filled");
    assert_eq!(slot.code, "CAMERA_INACTIVE_NO_FALLBACK");
}

#[test]
fn watchdog_does_not_fire_after_capture_started() {
    let (mut session, clock) = deferred_session(CaptureConfig::default());
    session.on_device_ready();
    session.request_capture();

    clock.advance(Duration::from_secs(30));
    assert!(!session.tick());
    session.on_watchdog_fired();

    assert_eq!(session.state(), &SessionState::Capturing);
    assert!(session.host().errors.is_empty());
}

#[test]
fn late_timer_after_completed_capture_is_ignored() {
    let (mut session, clock) = deferred_session(CaptureConfig::default());
    session.on_device_ready();
    session.request_capture();
    session.on_frame(Frame::new(vec![1], SdkMetadata::at(1), "image/jpeg"));
    assert_eq!(session.state(), &SessionState::Ready);

    clock.advance(Duration::from_secs(30));
    session.on_watchdog_fired();
    assert!(!session.tick());

    assert_eq!(session.state(), &SessionState::Ready);
    assert!(session.host().errors.is_empty());
    assert!(session.render_hints().capture_enabled);
}

#[test]
fn late_timer_after_dismiss_is_ignored() {
    let (mut session, clock) = deferred_session(CaptureConfig::default());
    session.on_device_ready();
    clock.advance(Duration::from_secs(10));
    assert!(session.tick());
    assert!(session.dismiss_error());

    session.on_watchdog_fired();
    clock.advance(Duration::from_secs(10));
    session.tick();

    assert_eq!(session.state(), &SessionState::Ready);
    assert_eq!(session.host().errors, vec![CaptureError::inactivity(false)]);
}

#[test]
fn overflowing_watchdog_window_is_rejected() {
    let mut config = CaptureConfig::default();
    config.watchdog_secs = u64::MAX;
    assert!(config.validate().is_err());
    assert!(CaptureSession::new(config, MockDevice::new(), RecordingHost::default()).is_err());
}

#[test]
fn late_watchdog_after_device_error_is_ignored() {
    let (mut session, _clock) = deferred_session(CaptureConfig::default());
    session.on_device_ready();
    session.on_device_error(DeviceError::Disconnected);

    session.on_watchdog_fired();

    assert!(matches!(session.state(), SessionState::DeviceError(_)));
    assert_eq!(session.host().errors.len(), 1);
}

#[test]
fn device_error_while_capturing() {
    let (mut session, _clock) = deferred_session(CaptureConfig::default());
    session.on_device_ready();
    session.request_capture();

    session.on_device_error(DeviceError::Disconnected);

    assert!(matches!(session.state(), SessionState::DeviceError(_)));
    assert_eq!(session.host().errors.len(), 1);
    assert!(!session.render_hints().capture_enabled);
    assert!(!session.device().has_pending());

    // A frame from the abandoned grab must not reach the host.
    session.on_frame(Frame::new(vec![1], SdkMetadata::at(1), "image/jpeg"));
    assert!(!session.request_capture());
    session.on_device_error(DeviceError::Disconnected);

    assert!(session.host().captures.is_empty());
    assert_eq!(session.host().errors.len(), 1);
}

#[test]
fn no_capture_after_teardown_with_grab_in_flight() {
    let (mut session, _clock) = deferred_session(CaptureConfig::default());
    session.on_device_ready();
    session.request_capture();

    session.teardown();
    session.on_frame(Frame::new(vec![1], SdkMetadata::at(1), "image/jpeg"));

    assert!(session.host().captures.is_empty());
    assert!(!session.render_hints().spinner);
}

#[test]
fn permission_denied_surfaces_as_non_dismissible() {
    let mut session = CaptureSession::new(
        CaptureConfig::default(),
        MockDevice::new().denying_permission(),
        RecordingHost::default(),
    )
    .unwrap();

    session.start();

    assert_eq!(
        session.state(),
        &SessionState::DeviceError(CaptureError::PermissionDenied)
    );
    assert_eq!(session.host().errors, vec![CaptureError::PermissionDenied]);
    assert!(!session.dismiss_error());
    assert_eq!(session.stats().permission_denials, 1);
}

#[test]
fn negotiation_falls_back_to_lower_resolution() {
    let mut session = CaptureSession::new(
        CaptureConfig::default(),
        MockDevice::new().with_max_height(720),
        RecordingHost::default(),
    )
    .unwrap();

    session.start();

    assert_eq!(session.state(), &SessionState::Ready);
    assert_eq!(session.device().active_height(), Some(720));
}

#[test]
fn pre_granted_failures_reach_substituted_handler() {
    let mut config = CaptureConfig::default();
    config.permission_mode = PermissionMode::PreGranted;
    let mut session = CaptureSession::new(config, MockDevice::new(), RecordingHost::default())
        .unwrap()
        .with_permission_gate(PermissionGate::new(PreGranted::new()));

    session.start();
    assert_eq!(session.state(), &SessionState::Ready);
    assert_eq!(session.device().open_calls(), 0);

    // The mock was never opened, so the grab fails.
    session.request_capture();

    assert!(matches!(session.state(), SessionState::DeviceError(_)));
    let log = session.permission_gate().hook_log().expect("stub records calls");
    assert_eq!(log.user_media_calls, 1);
    assert_eq!(log.failures.len(), 1);
    assert_eq!(session.host().errors, log.failures);
}
