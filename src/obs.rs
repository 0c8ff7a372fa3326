//! Optional observability helpers for strategy phases.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `auth_provider.phase` with the `phase` and
//!   `stage` (call site) fields.
//! - Enable `metrics` to increment the `auth_provider_phase_total` counter for every
//!   attempt/success/failure, labeled by `phase` + `outcome`.
//!
//! [`observe`] and [`observe_sync`] wrap a phase body with both.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Strategy phases observed by the adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
	/// Building the authorize redirect.
	Request,
	/// Handling the provider callback and exchanging the code.
	Callback,
	/// Fetching the user-info document.
	UserInfo,
}
impl Phase {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Phase::Request => "request",
			Phase::Callback => "callback",
			Phase::UserInfo => "user_info",
		}
	}
}
impl Display for Phase {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseOutcome {
	/// Entry to a strategy phase.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the host.
	Failure,
}
impl PhaseOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			PhaseOutcome::Attempt => "attempt",
			PhaseOutcome::Success => "success",
			PhaseOutcome::Failure => "failure",
		}
	}

	/// Maps a result onto the success/failure label.
	pub fn of<T, E>(result: &Result<T, E>) -> Self {
		if result.is_ok() { PhaseOutcome::Success } else { PhaseOutcome::Failure }
	}
}
impl Display for PhaseOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs an async phase body inside its span and records the attempt and outcome.
pub async fn observe<T, Fut>(phase: Phase, stage: &'static str, body: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = PhaseSpan::new(phase, stage);

	record_phase_outcome(phase, PhaseOutcome::Attempt);

	let result = span.instrument(body).await;

	finish(&span, phase, &result);

	result
}

/// Synchronous counterpart of [`observe`].
pub fn observe_sync<T>(
	phase: Phase,
	stage: &'static str,
	body: impl FnOnce() -> Result<T>,
) -> Result<T> {
	let span = PhaseSpan::new(phase, stage);

	record_phase_outcome(phase, PhaseOutcome::Attempt);

	let result = span.in_scope(body);

	finish(&span, phase, &result);

	result
}

fn finish<T>(span: &PhaseSpan, phase: Phase, result: &Result<T>) {
	let outcome = PhaseOutcome::of(result);

	span.record_outcome(outcome);
	record_phase_outcome(phase, outcome);
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn labels_are_stable() {
		assert_eq!(Phase::UserInfo.to_string(), "user_info");
		assert_eq!(PhaseOutcome::of(&Ok::<_, ()>(1)), PhaseOutcome::Success);
		assert_eq!(PhaseOutcome::of(&Err::<(), _>("boom")), PhaseOutcome::Failure);
	}

	#[test]
	fn observe_sync_passes_results_through() {
		assert_eq!(observe_sync(Phase::Request, "ok", || Ok(3)).expect("Body succeeds."), 3);
		assert!(matches!(
			observe_sync::<()>(Phase::Request, "err", || Err(Error::MissingCode)),
			Err(Error::MissingCode)
		));
	}

	#[tokio::test]
	async fn observe_passes_results_through() {
		let value = observe(Phase::Callback, "ok", async { Ok("hash") })
			.await
			.expect("Body succeeds.");

		assert_eq!(value, "hash");
	}
}
