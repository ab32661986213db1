// self
use crate::{obs::Outcome, singleflight::FlightRole};

/// Records a settled refresh participation via the global metrics recorder (when enabled).
pub fn record_refresh_outcome(role: FlightRole, outcome: Outcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"auth_gateway_refresh_total",
			"role" => role.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (role, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_refresh_outcome_noop_without_recorder() {
		record_refresh_outcome(FlightRole::Joined, Outcome::Failure);
	}
}
