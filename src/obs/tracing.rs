// self
use crate::{
	error::{Error, ExchangeError},
	obs::HandshakeFlow,
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by relay flows.
#[derive(Clone, Debug)]
pub struct HandshakeSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl HandshakeSpan {
	/// Creates a new span tagged with the provided flow + stage.
	pub fn new(flow: HandshakeFlow, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("signin_relay.flow", flow = flow.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (flow, stage);

			Self {}
		}
	}

	/// Enters the span for synchronous sections.
	pub fn entered(self) -> HandshakeSpanGuard {
		#[cfg(feature = "tracing")]
		{
			HandshakeSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			HandshakeSpanGuard {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: std::future::Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// RAII guard returned by [`HandshakeSpan::entered`].
pub struct HandshakeSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl std::fmt::Debug for HandshakeSpanGuard {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.write_str("HandshakeSpanGuard(..)")
	}
}

/// The remote portal returned an `error` query parameter; informational only, the
/// callback keeps processing.
pub(crate) fn remote_error_reported(error: &str) {
	#[cfg(feature = "tracing")]
	tracing::debug!(error, "Remote portal reported an error.");
	#[cfg(not(feature = "tracing"))]
	let _ = error;
}

/// The `state` parameter was missing or failed validation.
pub(crate) fn state_rejected() {
	#[cfg(feature = "tracing")]
	tracing::debug!("State parameter was rejected; request does not belong to this handshake.");
}

/// The user-information exchange failed; the failure class is carried as a field.
pub(crate) fn exchange_failed(err: &ExchangeError) {
	#[cfg(feature = "tracing")]
	tracing::warn!(kind = err.kind(), error = %err, "User information exchange failed.");
	#[cfg(not(feature = "tracing"))]
	let _ = err;
}

/// The exchange response carried no usable access token.
pub(crate) fn access_token_missing() {
	#[cfg(feature = "tracing")]
	tracing::warn!("Access token was not found.");
}

/// The processor failed before a ticket could be produced; dispatch answers with a
/// server error.
pub(crate) fn processor_failed(err: &Error) {
	#[cfg(feature = "tracing")]
	tracing::warn!(error = %err, "Callback processor failed before a ticket was produced.");
	#[cfg(not(feature = "tracing"))]
	let _ = err;
}
