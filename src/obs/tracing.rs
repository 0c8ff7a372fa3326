// self
use crate::{
	_prelude::*,
	obs::{Phase, PhaseOutcome},
};

/// Span covering one strategy phase; inert unless the `tracing` feature is enabled.
#[derive(Clone, Debug)]
pub struct PhaseSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl PhaseSpan {
	/// Opens an `auth_provider.phase` span for `phase` at the named call site.
	pub fn new(phase: Phase, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			Self { span: tracing::info_span!("auth_provider.phase", phase = phase.as_str(), stage) }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (phase, stage);

			Self {}
		}
	}

	/// Runs a synchronous section inside the span.
	pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
		#[cfg(feature = "tracing")]
		{
			self.span.in_scope(f)
		}
		#[cfg(not(feature = "tracing"))]
		{
			f()
		}
	}

	/// Attaches the span to `fut` so it is entered on every poll.
	pub fn instrument<Fut>(&self, fut: Fut) -> impl Future<Output = Fut::Output> + use<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			tracing::Instrument::instrument(fut, self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}

	/// Emits a debug event carrying the final outcome.
	pub fn record_outcome(&self, outcome: PhaseOutcome) {
		#[cfg(feature = "tracing")]
		self.span.in_scope(|| tracing::debug!(outcome = outcome.as_str(), "phase finished"));
		#[cfg(not(feature = "tracing"))]
		let _ = outcome;
	}
}
