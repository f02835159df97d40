//! Re-running the injector when the bundler rewrites its manifest.
//!
//! A single `notify` watcher observes the directory holding the manifest and forwards
//! matching events over a channel. The watch loop owns a [`Debouncer`], so a burst of
//! writes results in one run once the manifest has been quiet for the configured interval.

use std::ffi::OsString;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::Settings;
use crate::injector::Injector;
use crate::report;

/// Message consumed by the watch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchSignal {
  /// The manifest was created, modified or removed.
  ManifestChanged,
  /// Stop the loop, dropping any pending run.
  Shutdown,
}

/// Cancellable single-shot timer. Scheduling again replaces the pending deadline.
#[derive(Debug, Clone)]
pub struct Debouncer {
  delay: Duration,
  deadline: Option<Instant>,
}

impl Debouncer {
  /// Create an idle debouncer.
  pub fn new(delay: Duration) -> Self {
    Self {
      delay,
      deadline: None,
    }
  }

  /// Schedule a run `delay` after `now`, superseding any pending one.
  pub fn schedule(&mut self, now: Instant) {
    self.deadline = Some(now + self.delay);
  }

  /// Drop the pending run, if any.
  pub fn cancel(&mut self) {
    self.deadline = None;
  }

  /// Whether a run is scheduled.
  pub fn is_pending(&self) -> bool {
    self.deadline.is_some()
  }

  /// Time left until the pending run is due.
  pub fn remaining(&self, now: Instant) -> Option<Duration> {
    self
      .deadline
      .map(|deadline| deadline.saturating_duration_since(now))
  }

  /// Consume the pending run when it is due at `now`.
  pub fn fire(&mut self, now: Instant) -> bool {
    match self.deadline {
      Some(deadline) if deadline <= now => {
        self.deadline = None;
        true
      }
      _ => false,
    }
  }
}

/// Cloneable handle for feeding or stopping a running watch loop.
#[derive(Debug, Clone)]
pub struct WatchHandle {
  sender: Sender<WatchSignal>,
}

impl WatchHandle {
  /// Create a handle together with the receiver a watch loop consumes.
  pub fn channel() -> (Self, Receiver<WatchSignal>) {
    let (sender, receiver) = mpsc::channel();
    (Self { sender }, receiver)
  }

  /// Stop the loop; a run that has not fired yet is cancelled.
  pub fn shutdown(&self) {
    let _ = self.sender.send(WatchSignal::Shutdown);
  }

  /// Report a manifest change as if the filesystem had.
  pub fn trigger(&self) {
    let _ = self.sender.send(WatchSignal::ManifestChanged);
  }
}

/// Filesystem watcher bound to the directory of a manifest file.
pub struct ManifestWatcher {
  _watcher: RecommendedWatcher,
  receiver: Receiver<WatchSignal>,
  handle: WatchHandle,
  debounce: Duration,
}

impl ManifestWatcher {
  /// Start watching the directory that contains `settings.manifest`.
  ///
  /// The whole directory is observed so that deleting and recreating the manifest keeps
  /// being noticed.
  pub fn new(settings: &Settings) -> Result<Self> {
    let manifest_path = std::path::absolute(&settings.manifest)
      .with_context(|| format!("failed to resolve {}", settings.manifest.display()))?;
    let watch_dir = manifest_path
      .parent()
      .ok_or_else(|| anyhow!("manifest path {} has no parent", manifest_path.display()))?
      .to_path_buf();
    let manifest_name = manifest_path
      .file_name()
      .ok_or_else(|| anyhow!("manifest path {} has no file name", manifest_path.display()))?
      .to_os_string();

    let (handle, receiver) = WatchHandle::channel();
    let events = handle.sender.clone();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
      Ok(event) if touches_file(&event, &manifest_name) => {
        let _ = events.send(WatchSignal::ManifestChanged);
      }
      Ok(_) => {}
      Err(err) => tracing::error!("file watch error: {err}"),
    })
    .context("failed to create file watcher")?;
    watcher
      .watch(&watch_dir, RecursiveMode::NonRecursive)
      .with_context(|| format!("failed to watch {}", watch_dir.display()))?;
    tracing::debug!(dir = %watch_dir.display(), "watching manifest directory");

    Ok(Self {
      _watcher: watcher,
      receiver,
      handle,
      debounce: settings.debounce(),
    })
  }

  /// Handle for stopping the loop from another thread.
  pub fn handle(&self) -> WatchHandle {
    self.handle.clone()
  }

  /// Block, calling `on_change` after each debounced manifest change until shut down.
  pub fn run<F: FnMut()>(self, on_change: F) {
    run_loop(&self.receiver, Debouncer::new(self.debounce), on_change);
  }
}

/// Drive `debouncer` from `signals`, invoking `on_fire` whenever a scheduled run comes due.
///
/// Returns on [`WatchSignal::Shutdown`] or once every sender is gone.
pub fn run_loop<F: FnMut()>(signals: &Receiver<WatchSignal>, mut debouncer: Debouncer, mut on_fire: F) {
  loop {
    let signal = match debouncer.remaining(Instant::now()) {
      Some(wait) => match signals.recv_timeout(wait) {
        Ok(signal) => Some(signal),
        Err(RecvTimeoutError::Timeout) => None,
        Err(RecvTimeoutError::Disconnected) => return,
      },
      None => match signals.recv() {
        Ok(signal) => Some(signal),
        Err(_) => return,
      },
    };

    match signal {
      Some(WatchSignal::ManifestChanged) => debouncer.schedule(Instant::now()),
      Some(WatchSignal::Shutdown) => {
        debouncer.cancel();
        return;
      }
      None => {
        if debouncer.fire(Instant::now()) {
          on_fire();
        }
      }
    }
  }
}

/// One watch cycle: inject and print each page, or print the failure and carry on.
///
/// Returns whether the cycle succeeded.
pub fn rebuild(injector: &mut Injector) -> bool {
  match injector.run_with(report::print_destination) {
    Ok(_) => true,
    Err(err) => {
      tracing::debug!("rebuild failed: {err:#}");
      report::print_error(&err);
      false
    }
  }
}

fn touches_file(event: &Event, file_name: &OsString) -> bool {
  // Reading the manifest ourselves must not schedule another run.
  if matches!(event.kind, EventKind::Access(_)) {
    return false;
  }
  event
    .paths
    .iter()
    .any(|path| path.file_name() == Some(file_name.as_os_str()))
}
