//! Single-flight coordination for token refreshes.
//!
//! A [`RefreshCoordinator`] is owned by one gateway. Callers that hit a `401` ask it to
//! [`join_or_start`](RefreshCoordinator::join_or_start): the first becomes the [`FlightLeader`]
//! and performs the refresh, everyone arriving while that refresh is in flight gets a
//! [`FlightTicket`] and waits for the leader's outcome. Settlement hands the same outcome
//! (success or failure) to every waiter in the order they joined, then clears the queue.

// std
use std::mem;
// crates.io
use tokio::sync::oneshot;
// self
use crate::{_prelude::*, error::RefreshError, token::AccessToken};

/// Result shared with every participant of a refresh flight.
pub type RefreshOutcome = Result<AccessToken, RefreshError>;

type Waiter = Box<dyn FnOnce(RefreshOutcome) + Send>;

/// Which side of a flight a caller ended up on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlightRole {
	/// Caller started the refresh.
	Leader,
	/// Caller waited on a refresh started by someone else.
	Joined,
}
impl FlightRole {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlightRole::Leader => "leader",
			FlightRole::Joined => "joined",
		}
	}
}
impl Display for FlightRole {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[derive(Default)]
struct FlightState {
	in_flight: bool,
	waiters: Vec<Waiter>,
}

/// Join-or-start coordinator guaranteeing at most one refresh in flight.
#[derive(Default)]
pub struct RefreshCoordinator {
	state: Mutex<FlightState>,
}
impl RefreshCoordinator {
	/// Returns `true` while a refresh is in flight.
	pub fn is_refreshing(&self) -> bool {
		self.state.lock().in_flight
	}

	/// Number of waiters queued behind the current flight.
	pub fn queued(&self) -> usize {
		self.state.lock().waiters.len()
	}

	/// Claims the flight when none is running, otherwise enqueues the caller.
	///
	/// The check and the claim happen under one lock, so two callers can never both lead.
	pub fn join_or_start(&self) -> Flight<'_> {
		let mut state = self.state.lock();

		if state.in_flight {
			let (tx, rx) = oneshot::channel();

			state.waiters.push(Box::new(move |outcome| {
				let _ = tx.send(outcome);
			}));

			Flight::Joined(FlightTicket(rx))
		} else {
			state.in_flight = true;

			Flight::Leader(FlightLeader { coordinator: self, settled: false })
		}
	}

	/// Runs `refresh` as the leader, or waits on the in-flight refresh.
	pub async fn run<F, Fut>(&self, refresh: F) -> (FlightRole, RefreshOutcome)
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = RefreshOutcome>,
	{
		match self.join_or_start() {
			Flight::Leader(leader) => {
				let outcome = refresh().await;

				leader.settle(outcome.clone());

				(FlightRole::Leader, outcome)
			},
			Flight::Joined(ticket) => (FlightRole::Joined, ticket.wait().await),
		}
	}

	fn settle(&self, outcome: RefreshOutcome) {
		let waiters = {
			let mut state = self.state.lock();

			state.in_flight = false;

			mem::take(&mut state.waiters)
		};

		// Outside the lock so a waiter may start the next flight.
		for waiter in waiters {
			waiter(outcome.clone());
		}
	}
}
impl Debug for RefreshCoordinator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let state = self.state.lock();

		f.debug_struct("RefreshCoordinator")
			.field("in_flight", &state.in_flight)
			.field("queued", &state.waiters.len())
			.finish()
	}
}

/// Result of [`RefreshCoordinator::join_or_start`].
#[derive(Debug)]
pub enum Flight<'a> {
	/// Caller owns the flight and must settle it.
	Leader(FlightLeader<'a>),
	/// Caller is queued behind another caller's flight.
	Joined(FlightTicket),
}

/// Exclusive right to perform the in-flight refresh.
///
/// Dropping the leader without calling [`settle`](FlightLeader::settle) settles the flight with
/// [`RefreshError::Abandoned`], so waiters never stall on a cancelled refresh.
pub struct FlightLeader<'a> {
	coordinator: &'a RefreshCoordinator,
	settled: bool,
}
impl FlightLeader<'_> {
	/// Publishes the outcome to every waiter, in join order, and ends the flight.
	pub fn settle(mut self, outcome: RefreshOutcome) {
		self.settled = true;
		self.coordinator.settle(outcome);
	}
}
impl Debug for FlightLeader<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("FlightLeader(..)")
	}
}
impl Drop for FlightLeader<'_> {
	fn drop(&mut self) {
		if !self.settled {
			self.coordinator.settle(Err(RefreshError::Abandoned));
		}
	}
}

/// Handle awaiting the outcome of a flight led by another caller.
#[derive(Debug)]
pub struct FlightTicket(oneshot::Receiver<RefreshOutcome>);
impl FlightTicket {
	/// Waits for the leader to settle the flight.
	pub async fn wait(self) -> RefreshOutcome {
		self.0.await.unwrap_or(Err(RefreshError::Abandoned))
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;

	fn leader(coordinator: &RefreshCoordinator) -> FlightLeader<'_> {
		match coordinator.join_or_start() {
			Flight::Leader(leader) => leader,
			Flight::Joined(_) => panic!("Idle coordinator should hand out leadership."),
		}
	}

	fn enqueue(coordinator: &RefreshCoordinator, waiter: impl 'static + Send + FnOnce(RefreshOutcome)) {
		let mut state = coordinator.state.lock();

		assert!(state.in_flight, "Waiters can only queue behind a running flight.");

		state.waiters.push(Box::new(waiter));
	}

	fn ticket(coordinator: &RefreshCoordinator) -> FlightTicket {
		match coordinator.join_or_start() {
			Flight::Joined(ticket) => ticket,
			Flight::Leader(_) => panic!("Busy coordinator should queue the caller."),
		}
	}

	#[test]
	fn waiters_are_settled_in_insertion_order() {
		let coordinator = RefreshCoordinator::default();
		let leader = leader(&coordinator);
		let order = Arc::new(Mutex::new(Vec::new()));

		for idx in 0..3 {
			let order = order.clone();

			enqueue(&coordinator, move |outcome| {
				assert!(outcome.is_ok());
				order.lock().push(idx);
			});
		}

		assert!(coordinator.is_refreshing());
		assert_eq!(coordinator.queued(), 3);

		leader.settle(Ok(AccessToken::new("xyz123")));

		assert_eq!(*order.lock(), vec![0, 1, 2]);
		assert!(!coordinator.is_refreshing());
		assert_eq!(coordinator.queued(), 0);
	}

	#[tokio::test]
	async fn joined_callers_observe_failures() {
		let coordinator = RefreshCoordinator::default();
		let leader = leader(&coordinator);
		let first = ticket(&coordinator);
		let second = ticket(&coordinator);

		leader.settle(Err(RefreshError::Rejected { status: 500 }));

		assert!(matches!(first.wait().await, Err(RefreshError::Rejected { status: 500 })));
		assert!(matches!(second.wait().await, Err(RefreshError::Rejected { status: 500 })));
		assert!(!coordinator.is_refreshing());
	}

	#[tokio::test]
	async fn dropped_leader_abandons_flight() {
		let coordinator = RefreshCoordinator::default();
		let waiting = {
			let _leader = leader(&coordinator);

			ticket(&coordinator)
		};

		assert!(matches!(waiting.wait().await, Err(RefreshError::Abandoned)));
		assert!(!coordinator.is_refreshing());
		assert!(matches!(coordinator.join_or_start(), Flight::Leader(_)));
	}

	#[tokio::test]
	async fn concurrent_runs_share_one_refresh() {
		let coordinator = RefreshCoordinator::default();
		let counter = AtomicUsize::new(0);
		let calls = &counter;
		let refresh = move || async move {
			calls.fetch_add(1, Ordering::SeqCst);
			tokio::time::sleep(std::time::Duration::from_millis(50)).await;

			Ok(AccessToken::new("shared"))
		};
		let (a, b, c) =
			tokio::join!(coordinator.run(refresh), coordinator.run(refresh), coordinator.run(refresh));

		assert_eq!(calls.load(Ordering::SeqCst), 1);
		assert_eq!(a.0, FlightRole::Leader);
		assert_eq!(b.0, FlightRole::Joined);
		assert_eq!(c.0, FlightRole::Joined);

		for (_, outcome) in [a, b, c] {
			assert_eq!(outcome.expect("Shared refresh should succeed.").expose(), "shared");
		}

		let (role, _) = coordinator.run(refresh).await;

		assert_eq!(role, FlightRole::Leader);
		assert_eq!(calls.load(Ordering::SeqCst), 2);
	}
}
