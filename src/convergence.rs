//! Incremental loading loop.
//!
//! The library page renders ads lazily as it is scrolled. The controller
//! scrolls in fixed steps, re-counts the rendered ads every few steps and
//! stops when the target is met, when the count stops growing, or when the
//! scroll budget runs out. A controller lives for exactly one scrape.

use crate::config::{ConvergenceConfig, TimingConfig};
use crate::error::SessionError;
use crate::extract::SnapshotParser;
use crate::results::AdRecord;
use crate::session::RenderSession;
use std::collections::HashSet;

/// Why the loading loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Enough ads were rendered
    TargetReached,
    /// The count did not grow for `stall_limit` consecutive measurements
    Stalled,
    /// The scroll budget was used up
    BudgetExhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Loading,
    Scrolling,
    Measuring,
    Done(StopReason),
}

/// Result of one loading run
#[derive(Debug, Clone)]
pub struct ConvergenceOutcome {
    /// Final records, truncated to the target
    pub records: Vec<AdRecord>,
    pub stop_reason: StopReason,
    pub scrolls: u32,
    pub measurements: u32,

    /// Count seen at the last measurement
    pub last_count: usize,

    /// Result count printed by the page, if found
    pub reported_total: Option<u64>,
}

/// Drives a rendering session until the rendered ad count converges
pub struct ConvergenceController<'a> {
    parser: &'a SnapshotParser,
    timing: &'a TimingConfig,
    policy: &'a ConvergenceConfig,
    scrolls: u32,
    measurements: u32,
    previous_count: usize,
    stalls: u32,
}

impl<'a> ConvergenceController<'a> {
    pub fn new(
        parser: &'a SnapshotParser,
        timing: &'a TimingConfig,
        policy: &'a ConvergenceConfig,
    ) -> Self {
        Self {
            parser,
            timing,
            policy,
            scrolls: 0,
            measurements: 0,
            previous_count: 0,
            stalls: 0,
        }
    }

    /// Loads `url` and scrolls until the ad count converges
    ///
    /// The scroll budget is `min(ceil(target / ads_per_scroll), max_scrolls)`.
    /// The final parse inserts every returned id into `seen`.
    pub async fn run(
        mut self,
        session: &mut dyn RenderSession,
        url: &str,
        target: usize,
        seen: &mut HashSet<String>,
    ) -> Result<ConvergenceOutcome, SessionError> {
        let budget = self.policy.scroll_budget(target);
        let measure_every = self.policy.measure_every.max(1);
        ::log::debug!(
            "Converging on {} ads with a budget of {} scrolls",
            target,
            budget
        );

        let mut state = State::Loading;
        let stop_reason = loop {
            state = match state {
                State::Loading => {
                    self.load(session, url).await?;
                    State::Scrolling
                }
                State::Scrolling => {
                    if self.scrolls >= budget {
                        State::Done(StopReason::BudgetExhausted)
                    } else {
                        session.advance_content().await?;
                        session.wait(self.timing.scroll_delay()).await;
                        self.scrolls += 1;
                        ::log::trace!("Scroll {}/{}", self.scrolls, budget);

                        if self.scrolls % measure_every == 0 {
                            State::Measuring
                        } else {
                            State::Scrolling
                        }
                    }
                }
                State::Measuring => {
                    let snapshot = session.current_snapshot().await?;
                    let count = self.parser.count(&snapshot);
                    self.measure(count, target)
                }
                State::Done(reason) => break reason,
            };
        };

        let snapshot = session.current_snapshot().await?;
        let records = self.parser.parse(&snapshot, seen, target);
        let reported_total = self.parser.reported_total(&snapshot);

        if let Some(total) = reported_total {
            ::log::info!("Library reports {} ads in total", total);
        }
        ::log::info!(
            "Stopped ({:?}) after {} scrolls, {} ads extracted",
            stop_reason,
            self.scrolls,
            records.len()
        );

        Ok(ConvergenceOutcome {
            records,
            stop_reason,
            scrolls: self.scrolls,
            measurements: self.measurements,
            last_count: self.previous_count,
            reported_total,
        })
    }

    async fn load(&self, session: &mut dyn RenderSession, url: &str) -> Result<(), SessionError> {
        ::log::info!("Opening {}", url);
        session
            .navigate(url, self.timing.navigation_timeout_ms)
            .await?;
        session.wait(self.timing.settle()).await;

        if session
            .dismiss_consent_if_present(self.timing.consent_timeout_ms)
            .await
        {
            ::log::info!("Cookie banner dismissed");
        } else {
            ::log::debug!("No cookie banner to dismiss");
        }
        Ok(())
    }

    /// Applies the stop policy to a fresh count
    fn measure(&mut self, count: usize, target: usize) -> State {
        self.measurements += 1;

        if count >= target {
            ::log::debug!("Measured {} ads, target {} reached", count, target);
            self.previous_count = count;
            return State::Done(StopReason::TargetReached);
        }

        if count == self.previous_count {
            self.stalls += 1;
            ::log::debug!(
                "Measured {} ads, no growth ({}/{})",
                count,
                self.stalls,
                self.policy.stall_limit
            );
            if self.stalls >= self.policy.stall_limit {
                return State::Done(StopReason::Stalled);
            }
        } else {
            ::log::debug!("Measured {} ads (was {})", count, self.previous_count);
            self.stalls = 0;
            self.previous_count = count;
        }

        State::Scrolling
    }
}
