//! Tick scheduling for the polling client.
//!
//! The decision of what a cycle does depends only on the cycle number, so it
//! lives here as a pure function and is tested without any network.

use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use strum::{Display, EnumString};

use crate::store::NewUser;

/// Every n-th cycle creates a sample user instead of fetching.
pub const CREATE_EVERY: u64 = 3;

/// Every n-th cycle additionally performs a health check.
pub const HEALTH_EVERY: u64 = 5;

/// One outbound call kind.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    /// List all users.
    Fetch,
    /// Create one user from the sample pool.
    Create,
    /// Call the health endpoint.
    HealthCheck,
}

/// Actions for one cycle, in execution order.
pub type TickPlan = SmallVec<[Action; 2]>;

/// Map a cycle number to its actions.
///
/// Create on multiples of [`CREATE_EVERY`], otherwise Fetch; then a health
/// check on multiples of [`HEALTH_EVERY`]. Cycle numbering starts at 1 for
/// the first timer tick.
pub fn plan_tick(cycle: u64) -> TickPlan {
    let mut plan = TickPlan::new();

    if cycle % CREATE_EVERY == 0 {
        plan.push(Action::Create);
    } else {
        plan.push(Action::Fetch);
    }

    if cycle % HEALTH_EVERY == 0 {
        plan.push(Action::HealthCheck);
    }

    plan
}

/// The fixed pool sample users are drawn from.
pub fn sample_pool() -> [NewUser; 3] {
    [
        NewUser::new("Demo User 1", "demo1@example.com", "User"),
        NewUser::new("Demo User 2", "demo2@example.com", "Admin"),
        NewUser::new("Demo User 3", "demo3@example.com", "User"),
    ]
}

/// Pick a sample user uniformly at random.
pub fn pick_sample_user() -> NewUser {
    let pool = sample_pool();
    pool.choose(&mut rand::rng())
        .cloned()
        .unwrap_or_else(|| pool[0].clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_cycles_fetch() {
        for cycle in [1, 2, 4, 7, 8] {
            assert_eq!(plan_tick(cycle).as_slice(), &[Action::Fetch], "cycle {}", cycle);
        }
    }

    #[test]
    fn every_third_cycle_creates() {
        assert_eq!(plan_tick(3).as_slice(), &[Action::Create]);
        assert_eq!(plan_tick(6).as_slice(), &[Action::Create]);
    }

    #[test]
    fn every_fifth_cycle_adds_health_check() {
        assert_eq!(
            plan_tick(5).as_slice(),
            &[Action::Fetch, Action::HealthCheck]
        );
        assert_eq!(
            plan_tick(10).as_slice(),
            &[Action::Fetch, Action::HealthCheck]
        );
    }

    #[test]
    fn fifteenth_cycle_creates_and_checks_health() {
        assert_eq!(
            plan_tick(15).as_slice(),
            &[Action::Create, Action::HealthCheck]
        );
    }

    #[test]
    fn first_fifteen_cycles_count() {
        let plans: Vec<TickPlan> = (1..=15).map(plan_tick).collect();
        let count = |action: Action| {
            plans
                .iter()
                .flat_map(|p| p.iter())
                .filter(|a| **a == action)
                .count()
        };

        assert_eq!(count(Action::Create), 5);
        assert_eq!(count(Action::Fetch), 10);
        assert_eq!(count(Action::HealthCheck), 3);
    }

    #[test]
    fn action_names_round_trip_through_strum() {
        assert_eq!(Action::HealthCheck.to_string(), "health_check");
        assert_eq!("fetch".parse::<Action>().unwrap(), Action::Fetch);
    }

    #[test]
    fn sample_user_comes_from_pool() {
        let pool = sample_pool();
        for _ in 0..20 {
            let user = pick_sample_user();
            assert!(pool.contains(&user));
        }
    }
}
