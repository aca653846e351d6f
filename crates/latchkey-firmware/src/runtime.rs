//! Async runtime driving the controller.
//!
//! Two tickers share one task: the reader poll and the scheduler tick. The
//! loop never sleeps outside `select!`, so buzzer and relay timing is
//! unaffected by how long a card takes to read.

use latchkey_hardware::{CardReader, Indicator, RelayOutput, ToneOutput};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::TimingConfig;
use crate::controller::{AccessController, PollOutcome};
use crate::error::Result;

/// Counters collected over one [`run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub polls: u64,
    pub granted: u64,
    pub denied: u64,
    pub read_failures: u64,
}

impl RunSummary {
    fn record(&mut self, outcome: PollOutcome) {
        self.polls += 1;
        match outcome {
            PollOutcome::NoCard => {}
            PollOutcome::ReadFailed => self.read_failures += 1,
            PollOutcome::Granted(_) => self.granted += 1,
            PollOutcome::Denied(_) => self.denied += 1,
        }
    }
}

/// Run the firmware until `shutdown` is cancelled.
///
/// Performs the startup sequence first and the shutdown sequence on the way
/// out, so the relay is never left energized.
///
/// # Errors
///
/// Returns an error only if the startup sequence fails. Errors from
/// individual poll iterations are logged and the loop carries on.
pub async fn run<Rd, I, T, R>(
    controller: &mut AccessController<Rd, I, T, R>,
    timing: &TimingConfig,
    shutdown: CancellationToken,
) -> Result<RunSummary>
where
    Rd: CardReader,
    I: Indicator,
    T: ToneOutput + 'static,
    R: RelayOutput + 'static,
{
    controller.start(Instant::now().into_std())?;

    let mut tick = time::interval(timing.tick_interval());
    let mut poll = time::interval(timing.poll_interval());
    poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        poll_ms = timing.poll_interval_ms,
        tick_ms = timing.tick_interval_ms,
        "access loop running"
    );

    let mut summary = RunSummary::default();
    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                debug!("shutdown requested");
                break;
            }

            now = tick.tick() => {
                controller.tick(now.into_std());
            }

            now = poll.tick() => {
                match controller.poll(now.into_std()) {
                    Ok(outcome) => summary.record(outcome),
                    Err(e) => error!(error = %e, "decision loop iteration failed"),
                }
            }
        }
    }

    controller.shutdown();
    info!(
        polls = summary.polls,
        granted = summary.granted,
        denied = summary.denied,
        read_failures = summary.read_failures,
        "access loop stopped"
    );
    Ok(summary)
}
