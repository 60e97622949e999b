// self
use crate::obs::AcquisitionOutcome;

/// Records an acquisition outcome via the global metrics recorder (when enabled).
pub fn record_acquisition(outcome: AcquisitionOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("oauth2_gate_acquisition_total", "outcome" => outcome.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_acquisition_is_safe_without_recorder() {
		record_acquisition(AcquisitionOutcome::Failure);
	}
}
