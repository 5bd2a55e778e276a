// self
use crate::obs::{HandshakeFlow, HandshakeOutcome};

/// Records a handshake outcome via the global metrics recorder (when enabled).
pub fn record_handshake_outcome(flow: HandshakeFlow, outcome: HandshakeOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"signin_relay_handshake_total",
			"flow" => flow.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (flow, outcome);
	}
}
