//! # Shutdown
//!
//! Brings the follower to a halt before the executable exits. The parameter watcher is stopped
//! first, then a single stop command is published and given a bounded time to reach the drive
//! system.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::Utc;
use log::info;
use std::thread;
use std::time::Duration;

use comms_if::eqpt::car::CarCmd;

use crate::params_watcher::ParamsWatcher;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Anything commands can be published to.
pub trait CmdSink {
    type Error;

    fn publish(&self, cmd: &CarCmd) -> Result<(), Self::Error>;
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Stop `watcher`, publish one stop command on `sink` and wait `drain` for it to be delivered.
///
/// Returns the published command. If publishing fails the drain is skipped.
pub fn shutdown<S: CmdSink>(
    watcher: &mut ParamsWatcher,
    sink: &S,
    drain: Duration
) -> Result<CarCmd, S::Error> {
    info!("Shutting down");

    watcher.stop();

    let cmd = CarCmd::stop(Utc::now());
    sink.publish(&cmd)?;
    info!("Stop command published, draining for {:?}", drain);

    thread::sleep(drain);

    Ok(cmd)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::time::Instant;

    use crate::follow_ctrl::Params;
    use crate::params_watcher::ParamSource;
    use util::params::LoadError;

    struct FixedSource;

    impl ParamSource for FixedSource {
        fn fetch(&self) -> Result<Params, LoadError> {
            Ok(Params::default())
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        sent: RefCell<Vec<CarCmd>>,
        fail: bool,
    }

    impl CmdSink for RecordingSink {
        type Error = &'static str;

        fn publish(&self, cmd: &CarCmd) -> Result<(), Self::Error> {
            if self.fail {
                return Err("sink closed");
            }
            self.sent.borrow_mut().push(*cmd);
            Ok(())
        }
    }

    #[test]
    fn test_single_stop_then_drain() {
        let mut watcher = ParamsWatcher::spawn(
            FixedSource,
            Params::default(),
            Duration::from_millis(10)
        );
        assert!(watcher.is_running());

        let sink = RecordingSink::default();
        let drain = Duration::from_millis(50);

        let before = Utc::now();
        let start = Instant::now();
        let cmd = shutdown(&mut watcher, &sink, drain).unwrap();
        let elapsed = start.elapsed();
        let after = Utc::now();

        let sent = sink.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], cmd);
        assert!(cmd.is_stop());
        assert!(cmd.timestamp >= before && cmd.timestamp <= after);

        assert!(elapsed >= drain);
        assert!(!watcher.is_running());
    }

    #[test]
    fn test_publish_failure_is_returned() {
        let mut watcher = ParamsWatcher::spawn(
            FixedSource,
            Params::default(),
            Duration::from_millis(10)
        );
        let sink = RecordingSink { fail: true, ..Default::default() };

        assert_eq!(shutdown(&mut watcher, &sink, Duration::from_secs(10)), Err("sink closed"));
        assert!(sink.sent.borrow().is_empty());
        assert!(!watcher.is_running());
    }
}
