//! The periodic tick: reload, derive, notify, re-render.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use sysinfo::{Pid, ProcessesToUpdate, Signal, System};
use tokio::time::{MissedTickBehavior, interval};

use crate::clock::{Clock, Now};
use crate::error::{ServiceError, ServiceResult};
use crate::notify::{DispatchOutcome, Notifier, dispatch_due};
use crate::render;
use crate::schedule::derive;
use crate::store::PlanStore;
use crate::types::ScheduleItem;

#[derive(Clone, Debug)]
pub struct TickReport {
    pub now: Now,
    pub schedule: Vec<ScheduleItem>,
    pub dispatch: DispatchOutcome,
    /// First tick of a new minute.
    pub minute_changed: bool,
}

pub struct Watcher<C, N> {
    store: PlanStore,
    clock: C,
    notifier: N,
    last_stamp: Option<String>,
}

impl<C: Clock, N: Notifier> Watcher<C, N> {
    pub fn new(store: PlanStore, clock: C, notifier: N) -> Self {
        Self {
            store,
            clock,
            notifier,
            last_stamp: None,
        }
    }

    pub fn store(&self) -> &PlanStore {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn tick(&mut self) -> TickReport {
        self.store.reload();
        let now = self.clock.now();
        let schedule = derive(self.store.plan(), &now);

        let (dispatch, stamped) = dispatch_due(self.store.plan(), &schedule, &now, &self.notifier);
        if let Some(plan) = stamped {
            self.store.replace(plan);
        }

        let stamp = now.minute_stamp();
        let minute_changed = self.last_stamp.as_deref() != Some(stamp.as_str());
        self.last_stamp = Some(stamp);

        TickReport {
            now,
            schedule,
            dispatch,
            minute_changed,
        }
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
                return;
            }
            Err(e) => tracing::warn!(error = %e, "cannot listen for SIGTERM"),
        }
    }
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for ctrl-c");
    }
}

/// Runs until interrupted. The pid file lets `stop` find this process.
pub async fn run<C: Clock, N: Notifier>(
    mut watcher: Watcher<C, N>,
    tick: Duration,
    pid_file: &Path,
) -> ServiceResult<()> {
    if let Some(parent) = pid_file.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(pid_file, std::process::id().to_string())?;
    tracing::info!(tick_secs = tick.as_secs(), pid_file = %pid_file.display(), "watching schedule");

    let mut ticker = interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = watcher.tick();
                if report.minute_changed {
                    println!(
                        "[{}] {}",
                        report.now.minute,
                        render::headline(watcher.store().plan(), &report.schedule)
                    );
                }
            }
            _ = &mut shutdown => {
                tracing::info!("shutting down");
                break;
            }
        }
    }

    remove_pid_file(pid_file);
    Ok(())
}

fn remove_pid_file(pid_file: &Path) {
    match fs::remove_file(pid_file) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(error = %e, "failed to remove pid file"),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped(u32),
    NotRunning,
}

/// Terminates a running `watch` recorded in `pid_file`.
pub fn stop(pid_file: &Path) -> ServiceResult<StopOutcome> {
    let raw = match fs::read_to_string(pid_file) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StopOutcome::NotRunning),
        Err(e) => return Err(e.into()),
    };
    let pid: u32 = raw
        .trim()
        .parse()
        .map_err(|_| ServiceError::Other(format!("pid file {} is corrupt", pid_file.display())))?;

    let sys_pid = Pid::from_u32(pid);
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[sys_pid]), true);

    let outcome = match system.process(sys_pid) {
        Some(process) => {
            let sent = process.kill_with(Signal::Term).unwrap_or_else(|| process.kill());
            if !sent {
                return Err(ServiceError::Other(format!("could not signal process {pid}")));
            }
            StopOutcome::Stopped(pid)
        }
        None => {
            tracing::debug!(pid, "stale pid file");
            StopOutcome::NotRunning
        }
    };
    remove_pid_file(pid_file);
    Ok(outcome)
}
