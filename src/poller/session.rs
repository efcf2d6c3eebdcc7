//! Polling session: counters, the tick loop and per-action failure handling.

use std::time::{Duration, Instant};

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use super::client::UserApi;
use super::schedule::{pick_sample_user, plan_tick, Action, TickPlan};
use crate::error::ClientError;
use crate::metrics;

/// State of one polling client process.
///
/// `cycle` counts timer ticks, `requests` counts every outbound call attempt
/// (successful, failed or abandoned). Both start at zero.
#[derive(Debug)]
pub struct PollSession<A> {
    api: A,
    interval: Duration,
    cycle: u64,
    requests: u64,
}

impl<A: UserApi> PollSession<A> {
    /// Create a session that ticks every `interval`.
    pub fn new(api: A, interval: Duration) -> Self {
        Self {
            api,
            interval,
            cycle: 0,
            requests: 0,
        }
    }

    /// Ticks processed so far.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Outbound calls attempted so far.
    pub fn requests(&self) -> u64 {
        self.requests
    }

    /// The underlying client.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Run until `token` is cancelled.
    ///
    /// Performs one health check immediately, then one tick per interval. The
    /// token is raced against every wait and every tick, so cancellation
    /// drops an in-flight call instead of waiting for it.
    pub async fn run(&mut self, token: CancellationToken) {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                self.log_stopped();
                return;
            }
            _ = self.perform(Action::HealthCheck) => {}
        }

        let start = tokio::time::Instant::now() + self.interval;
        let mut ticker = tokio::time::interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = self.tick() => {}
            }
        }

        self.log_stopped();
    }

    /// Advance the cycle counter and perform its planned actions in order.
    pub async fn tick(&mut self) -> TickPlan {
        self.cycle += 1;
        metrics::inc_client_cycles();

        let plan = plan_tick(self.cycle);
        for action in plan.iter().copied() {
            self.perform(action).await;
        }
        plan
    }

    /// Perform one call. Failures are logged and swallowed; returns whether it succeeded.
    #[instrument(skip(self), fields(cycle = self.cycle))]
    pub async fn perform(&mut self, action: Action) -> bool {
        self.requests += 1;
        let request = self.requests;
        let label = action.to_string();
        metrics::inc_client_requests(&label);

        let start = Instant::now();
        let outcome = self.call(action, request).await;
        metrics::record_client_latency(start, &label);

        match outcome {
            Ok(()) => true,
            Err(e) => {
                metrics::inc_client_failures(&label);
                warn!(
                    "Request #{} - {} failed: {}",
                    request,
                    describe(action),
                    e
                );
                false
            }
        }
    }

    async fn call(&self, action: Action, request: u64) -> Result<(), ClientError> {
        match action {
            Action::Fetch => {
                let list = self.api.list_users().await?;
                info!("Request #{} - Users fetched: {} users", request, list.count);
                if let Some(first) = list.users.first() {
                    info!("  -> Sample user: {}", first.summary());
                }
            }
            Action::Create => {
                let sample = pick_sample_user();
                let user = self.api.create_user(&sample).await?;
                info!("Request #{} - Created user: {} (id {})", request, user.name, user.id);
            }
            Action::HealthCheck => {
                let health = self.api.health().await?;
                info!(
                    "Request #{} - Health check: {} {} at {}",
                    request, health.service, health.status, health.timestamp
                );
            }
        }
        Ok(())
    }

    fn log_stopped(&self) {
        info!(
            cycles = self.cycle,
            "Polling stopped. Total requests made: {}",
            self.requests
        );
    }
}

fn describe(action: Action) -> &'static str {
    match action {
        Action::Fetch => "fetching users",
        Action::Create => "creating user",
        Action::HealthCheck => "health check",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poller::mock::MockUserApi;
    use crate::store::{HealthStatus, NewUser, User, UserList};
    use pretty_assertions::assert_eq;
    use tokio_test::{assert_err, assert_ok};

    const INTERVAL: Duration = Duration::from_secs(10);

    /// Health checks answer; list and create never complete.
    struct StallingApi;

    impl UserApi for StallingApi {
        async fn health(&self) -> Result<HealthStatus, ClientError> {
            Ok(HealthStatus::now())
        }

        async fn list_users(&self) -> Result<UserList, ClientError> {
            std::future::pending().await
        }

        async fn create_user(&self, _user: &NewUser) -> Result<User, ClientError> {
            std::future::pending().await
        }
    }

    /// Health checks fail; list and create never complete.
    struct FailingThenStallingApi;

    impl UserApi for FailingThenStallingApi {
        async fn health(&self) -> Result<HealthStatus, ClientError> {
            Err(ClientError::Status {
                status: 503,
                reason: "Service Unavailable".to_string(),
            })
        }

        async fn list_users(&self) -> Result<UserList, ClientError> {
            std::future::pending().await
        }

        async fn create_user(&self, _user: &NewUser) -> Result<User, ClientError> {
            std::future::pending().await
        }
    }

    async fn run_for(session: &mut PollSession<impl UserApi>, duration: Duration) {
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::join!(session.run(token), async move {
            tokio::time::sleep(duration).await;
            canceller.cancel();
        });
    }

    #[tokio::test]
    async fn tick_follows_schedule() {
        let mut session = PollSession::new(MockUserApi::new(), INTERVAL);

        for _ in 0..15 {
            session.tick().await;
        }

        assert_eq!(session.cycle(), 15);
        // 15 create-or-fetch calls plus health checks at 5, 10 and 15.
        assert_eq!(session.requests(), 18);

        let calls = session.api().calls();
        assert_eq!(calls[2], Action::Create);
        assert_eq!(&calls[4..6], &[Action::Fetch, Action::HealthCheck]);
        assert_eq!(&calls[16..], &[Action::Create, Action::HealthCheck]);

        // Five sample users created on top of the three seeded ones.
        assert_eq!(session.api().store().count().await, 8);
    }

    #[tokio::test]
    async fn perform_counts_failures_as_requests() {
        let mut session = PollSession::new(MockUserApi::failing(), INTERVAL);

        assert!(!session.perform(Action::Fetch).await);
        assert!(!session.perform(Action::HealthCheck).await);
        assert_eq!(session.requests(), 2);
        assert_eq!(session.cycle(), 0);
    }

    #[tokio::test]
    async fn perform_reports_success() {
        let mut session = PollSession::new(MockUserApi::new(), INTERVAL);
        assert!(session.perform(Action::Create).await);
        assert_ok!(session.api().store().get(4).await);
        assert_err!(session.api().store().get(5).await);
    }

    #[tokio::test(start_paused = true)]
    async fn run_checks_health_first_then_ticks_each_interval() {
        let mut session = PollSession::new(MockUserApi::new(), INTERVAL);

        run_for(&mut session, Duration::from_secs(55)).await;

        assert_eq!(session.cycle(), 5);
        assert_eq!(session.requests(), 7);
        assert_eq!(
            session.api().calls(),
            vec![
                Action::HealthCheck,
                Action::Fetch,
                Action::Fetch,
                Action::Create,
                Action::Fetch,
                Action::Fetch,
                Action::HealthCheck,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unreachable_store_does_not_stop_ticks() {
        let mut session = PollSession::new(MockUserApi::failing(), INTERVAL);

        run_for(&mut session, Duration::from_secs(55)).await;

        assert_eq!(session.cycle(), 5);
        assert_eq!(session.requests(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_abandons_in_flight_call() {
        let mut session = PollSession::new(StallingApi, INTERVAL);

        // First tick at 10s hangs on fetch; cancel at 15s.
        run_for(&mut session, Duration::from_secs(15)).await;

        assert_eq!(session.cycle(), 1);
        assert_eq!(session.requests(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_mid_tick_keeps_failed_and_abandoned_calls_counted() {
        let mut session = PollSession::new(FailingThenStallingApi, INTERVAL);

        // Startup health check fails, the fetch at 10s hangs, cancel at 12s.
        run_for(&mut session, Duration::from_secs(12)).await;

        assert_eq!(session.cycle(), 1);
        assert_eq!(session.requests(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failing_store_cancelled_mid_run_counts_every_attempt() {
        let mut session = PollSession::new(MockUserApi::failing(), INTERVAL);

        // Ticks at 10, 20 and 30s; cancellation lands between ticks.
        run_for(&mut session, Duration::from_secs(35)).await;

        assert_eq!(session.cycle(), 3);
        assert_eq!(session.requests(), 4);
        assert_eq!(
            session.api().calls(),
            vec![
                Action::HealthCheck,
                Action::Fetch,
                Action::Fetch,
                Action::Create,
            ]
        );
        assert_eq!(session.api().store().count().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_before_start_makes_no_calls() {
        let mut session = PollSession::new(MockUserApi::new(), INTERVAL);
        let token = CancellationToken::new();
        token.cancel();

        session.run(token).await;

        assert_eq!(session.requests(), 0);
        assert!(session.api().calls().is_empty());
    }
}
