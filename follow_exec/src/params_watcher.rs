//! # Parameter watcher
//!
//! Re-reads the follow control parameters in a background thread, so that gains and limits can be
//! tuned while the vehicle is running.
//!
//! The parameters are shared as an immutable snapshot. The watcher builds a new snapshot on every
//! period and swaps it in, readers clone the current `Arc` once per cycle and so always see a
//! consistent set of values.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::mpsc::{channel, RecvTimeoutError, Sender};
use std::sync::{Arc, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

// Internal
use crate::follow_ctrl::Params;
use util::params::{self, LoadError};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A store from which the latest parameters can be fetched.
pub trait ParamSource {
    fn fetch(&self) -> Result<Params, LoadError>;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A TOML parameter file.
#[derive(Debug, Clone)]
pub struct TomlFileSource {
    path: PathBuf,
}

/// Shared handle to the current parameter snapshot.
#[derive(Debug, Clone)]
pub struct ParamsHandle {
    current: Arc<RwLock<Arc<Params>>>,
}

/// Background thread periodically refreshing a `ParamsHandle` from a `ParamSource`.
pub struct ParamsWatcher {
    handle: ParamsHandle,
    stop_sender: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TomlFileSource {
    /// Source reading the given path, relative to the parameters directory.
    pub fn new(param_file_path: &str) -> Result<Self, LoadError> {
        Ok(Self {
            path: params::resolve(param_file_path)?,
        })
    }
}

impl ParamSource for TomlFileSource {
    fn fetch(&self) -> Result<Params, LoadError> {
        let params_str = std::fs::read_to_string(&self.path)
            .map_err(LoadError::FileLoadError)?;

        params::parse(&params_str)
    }
}

impl ParamsHandle {
    pub fn new(initial: Params) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(initial))),
        }
    }

    /// Get the current parameter snapshot.
    pub fn snapshot(&self) -> Arc<Params> {
        // Writers only ever assign a whole Arc, so a poisoned lock still holds a valid snapshot
        match self.current.read() {
            Ok(p) => p.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn replace(&self, new: Params) {
        let new = Arc::new(new);

        match self.current.write() {
            Ok(mut p) => *p = new,
            Err(poisoned) => *poisoned.into_inner() = new,
        }
    }
}

impl ParamsWatcher {
    /// Start watching `source`, checking it once every `period`.
    pub fn spawn<S>(source: S, initial: Params, period: Duration) -> Self
    where
        S: ParamSource + Send + 'static,
    {
        let handle = ParamsHandle::new(initial);
        let (stop_sender, stop_receiver) = channel::<()>();

        let thread_handle = handle.clone();
        let thread = thread::spawn(move || {
            debug!("Parameter watcher started");

            loop {
                match stop_receiver.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => (),
                    _ => break,
                }

                if let Err(e) = refresh(&thread_handle, &source) {
                    warn!("Could not refresh the FollowCtrl parameters: {}", e);
                }
            }

            debug!("Parameter watcher stopped");
        });

        Self {
            handle,
            stop_sender: Some(stop_sender),
            thread: Some(thread),
        }
    }

    /// Get a handle to the watched parameters.
    pub fn handle(&self) -> ParamsHandle {
        self.handle.clone()
    }

    /// True until the watcher has been stopped.
    pub fn is_running(&self) -> bool {
        self.thread.is_some()
    }

    /// Stop the watcher thread and wait for it to exit.
    pub fn stop(&mut self) {
        // Dropping the sender wakes the thread up
        self.stop_sender.take();

        if let Some(jh) = self.thread.take() {
            if jh.join().is_err() {
                warn!("Parameter watcher thread panicked");
            }
        }
    }
}

impl Drop for ParamsWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Fetch the parameters from `source` and publish them through `handle`.
///
/// Every changed field is logged. The new snapshot is always published, even if nothing changed.
/// Returns whether anything changed.
pub fn refresh<S: ParamSource + ?Sized>(
    handle: &ParamsHandle,
    source: &S,
) -> Result<bool, LoadError> {
    let new = source.fetch()?;

    let changes = handle.snapshot().changes(&new);
    for change in changes.iter() {
        info!("FollowCtrl parameter changed: {}", change);
    }

    handle.replace(new);

    Ok(!changes.is_empty())
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
