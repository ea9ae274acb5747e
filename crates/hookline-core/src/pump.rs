//! The hardware-event task: wait, read a batch, reconcile, repeat.

use std::time::Duration;

use tracing::{error, info, trace, warn};

use crate::backend::{EventSource, HidBackend};
use crate::error::Result;
use crate::event::{EVENT_BATCH, EVENT_RECORD_SIZE, HidEvent};
use crate::session::Session;

/// Run the event loop until shutdown is requested or the event stream fails.
///
/// Each wake-up reads up to [`EVENT_BATCH`] records in one go. Failures of
/// individual reconciliations are logged and skipped; a failed wait, a failed
/// read or a read shorter than one record is fatal: shutdown is requested for
/// the whole session and the error returned.
///
/// # Errors
/// Returns the error that ended the loop.
pub fn run_event_pump<D>(session: &Session<D>, poll_interval: Duration) -> Result<()>
where
    D: HidBackend + EventSource,
{
    let mut buf = [0u8; EVENT_BATCH * EVENT_RECORD_SIZE];
    info!(poll_ms = poll_interval.as_millis(), "Event loop started");

    while session.is_running() {
        if let Err(e) = pump_once(session, &mut buf, poll_interval) {
            error!(error = %e, "Event stream failed");
            session.request_shutdown();
            return Err(e);
        }
    }

    info!("Event loop stopped");
    Ok(())
}

fn pump_once<D>(session: &Session<D>, buf: &mut [u8], poll_interval: Duration) -> Result<()>
where
    D: HidBackend + EventSource,
{
    if !session.device().wait_readable(poll_interval)? {
        return Ok(());
    }

    let read = session.device().read_events(buf)?;
    let events = HidEvent::decode_batch(&buf[..read])?;
    trace!(count = events.len(), "Events received");

    for event in &events {
        if let Err(e) = session.reconcile(event) {
            warn!(usage = %event.usage(), value = event.value, error = %e, "Event not applied");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use assert_matches::assert_matches;

    use super::*;
    use crate::error::Error;
    use crate::fake::FakeHeadset;
    use crate::state::CallState;
    use crate::usage::{LED_OFF_HOOK, LED_RING, TEL_HOOK_SWITCH, TEL_PHONE_MUTE, TEL_RINGER};

    const TICK: Duration = Duration::from_millis(10);

    #[test]
    fn test_batch_is_reconciled_then_short_read_stops_session() {
        let device = FakeHeadset::new();
        device.push_events(&[
            HidEvent::new(TEL_HOOK_SWITCH, 1),
            HidEvent::new(TEL_PHONE_MUTE, 1),
            HidEvent::new(TEL_PHONE_MUTE, 0),
        ]);
        device.push_raw(vec![0x20, 0x00, 0x0B]);
        let session = Session::new(device);

        let err = run_event_pump(&session, TICK).unwrap_err();

        assert_matches!(err, Error::ShortRead { got: 3, .. });
        assert!(!session.is_running());
        assert_eq!(session.store().snapshot(), CallState { mute: true, hook: true, ring: false });
    }

    #[test]
    fn test_pickup_event_scenario() {
        let device = FakeHeadset::new();
        device.push_events(&[HidEvent::new(TEL_HOOK_SWITCH, 1)]);
        device.push_raw(Vec::new());
        let session = Session::new(device);

        assert!(run_event_pump(&session, TICK).is_err());

        let device = session.device();
        assert_eq!(device.committed(LED_RING), Some(0));
        assert_eq!(device.committed(TEL_RINGER), Some(0));
        assert_eq!(device.committed(LED_OFF_HOOK), Some(1));
        assert!(session.store().hook());
    }

    #[test]
    fn test_failed_reconcile_does_not_stop_loop() {
        let device = FakeHeadset::new();
        device.remove(LED_OFF_HOOK);
        device.push_events(&[HidEvent::new(TEL_HOOK_SWITCH, 1)]);
        device.push_events(&[HidEvent::new(TEL_PHONE_MUTE, 1)]);
        device.push_raw(Vec::new());
        let session = Session::new(device);

        assert_matches!(run_event_pump(&session, TICK), Err(Error::ShortRead { got: 0, .. }));
        assert!(session.store().mute());
        assert!(!session.store().hook());
    }

    #[test]
    fn test_shutdown_flag_stops_idle_loop() {
        let session = Arc::new(Session::new(FakeHeadset::new()));
        let pump = {
            let session = Arc::clone(&session);
            thread::spawn(move || run_event_pump(&session, TICK))
        };

        thread::sleep(Duration::from_millis(30));
        session.request_shutdown();

        assert!(pump.join().unwrap().is_ok());
    }
}
