//! Liveness probing: the probe-send and ack-wait timers.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::config::LivenessCallback;
use crate::message::{Payload, PING};
use crate::transport::TransportHandle;

/// Timer slots, shared with the spawned timer tasks so a fired probe can arm
/// the ack-wait timer in place. The epoch invalidates tasks that fire
/// concurrently with a cancel.
struct Timers {
    epoch: u64,
    probe: Option<JoinHandle<()>>,
    ack: Option<JoinHandle<()>>,
}

impl Timers {
    fn cancel(&mut self) {
        self.epoch += 1;
        if let Some(timer) = self.probe.take() {
            timer.abort();
        }
        if let Some(timer) = self.ack.take() {
            timer.abort();
        }
    }
}

/// Probes connection liveness over a borrowed transport handle.
///
/// `start` arms a one-shot probe timer; when it fires, the probe text is sent
/// and the ack-wait timer is armed. If the ack-wait timer expires the handle
/// is asked to close (destruction flows back through the close transition)
/// and the optional failure callback runs. `reset` is the sole ack path.
pub(crate) struct HeartbeatMonitor {
    probe_interval: Duration,
    ack_timeout: Duration,
    on_failure: Option<LivenessCallback>,
    timers: Arc<Mutex<Timers>>,
}

impl HeartbeatMonitor {
    pub(crate) fn new(
        probe_interval: Duration,
        ack_timeout: Duration,
        on_failure: Option<LivenessCallback>,
    ) -> Self {
        Self {
            probe_interval,
            ack_timeout,
            on_failure,
            timers: Arc::new(Mutex::new(Timers {
                epoch: 0,
                probe: None,
                ack: None,
            })),
        }
    }

    /// Arm the probe timer, cancelling both timers first.
    pub(crate) fn start(&self, handle: Arc<dyn TransportHandle>) {
        let mut timers = self.timers.lock().unwrap();
        timers.cancel();
        let epoch = timers.epoch;
        timers.probe = Some(spawn_probe(
            Arc::clone(&self.timers),
            epoch,
            self.probe_interval,
            self.ack_timeout,
            self.on_failure.clone(),
            handle,
        ));
    }

    /// Ack received: cancel both timers and re-arm the probe.
    pub(crate) fn reset(&self, handle: Arc<dyn TransportHandle>) {
        self.start(handle);
    }

    /// Cancel both timers. Safe when nothing is armed.
    pub(crate) fn stop(&self) {
        self.timers.lock().unwrap().cancel();
    }

    #[cfg(test)]
    fn armed(&self) -> (bool, bool) {
        let timers = self.timers.lock().unwrap();
        (timers.probe.is_some(), timers.ack.is_some())
    }
}

impl Drop for HeartbeatMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

fn spawn_probe(
    timers: Arc<Mutex<Timers>>,
    epoch: u64,
    probe_interval: Duration,
    ack_timeout: Duration,
    on_failure: Option<LivenessCallback>,
    handle: Arc<dyn TransportHandle>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        sleep(probe_interval).await;

        let mut slots = timers.lock().unwrap();
        if slots.epoch != epoch {
            // Cancelled while firing.
            return;
        }
        tracing::trace!("sending liveness probe");
        handle.send(Payload::Text(PING.to_owned()));
        slots.ack = Some(spawn_ack(
            Arc::clone(&timers),
            epoch,
            ack_timeout,
            on_failure,
            handle,
        ));
    })
}

fn spawn_ack(
    timers: Arc<Mutex<Timers>>,
    epoch: u64,
    ack_timeout: Duration,
    on_failure: Option<LivenessCallback>,
    handle: Arc<dyn TransportHandle>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        sleep(ack_timeout).await;

        {
            let slots = timers.lock().unwrap();
            if slots.epoch != epoch {
                return;
            }
        }
        tracing::warn!("liveness ack not received in time; closing transport");
        handle.close();
        if let Some(cb) = &on_failure {
            cb();
        }
    })
}
