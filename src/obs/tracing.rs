// std
#[cfg(not(feature = "tracing"))] use std::marker::PhantomData;
// self
use crate::{_prelude::*, obs::FlowKind};

/// Instrumented future when tracing is enabled, the bare future otherwise.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Instrumented future when tracing is enabled, the bare future otherwise.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// Span wrapping one assertion or polling flow.
///
/// The span carries `flow` and `stage` from construction; `subject` is recorded afterwards
/// through [`FlowSpan::with_subject`].
#[derive(Clone, Debug)]
pub struct FlowSpan {
	kind: FlowKind,
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Opens a span for `kind` at `stage`.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"gce_auth_ops.flow",
				flow = kind.as_str(),
				stage,
				subject = tracing::field::Empty
			);

			Self { kind, span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = stage;

			Self { kind }
		}
	}

	/// Records what the flow acts on: a call site or an operation id.
	pub fn with_subject(self, subject: &dyn Display) -> Self {
		#[cfg(feature = "tracing")]
		self.span.record("subject", tracing::field::display(subject));
		#[cfg(not(feature = "tracing"))]
		let _ = subject;

		self
	}

	/// Flow kind the span was opened for.
	pub fn kind(&self) -> FlowKind {
		self.kind
	}

	/// Enters the span for a synchronous section.
	pub fn enter(&self) -> FlowSpanGuard<'_> {
		#[cfg(feature = "tracing")]
		{
			FlowSpanGuard { _entered: self.span.enter() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			FlowSpanGuard { _entered: PhantomData }
		}
	}

	/// Runs `fut` inside the span without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
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
}

/// Guard returned by [`FlowSpan::enter`]; the span is exited on drop.
pub struct FlowSpanGuard<'a> {
	#[cfg(feature = "tracing")]
	_entered: tracing::span::Entered<'a>,
	#[cfg(not(feature = "tracing"))]
	_entered: PhantomData<&'a FlowSpan>,
}
impl Debug for FlowSpanGuard<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("FlowSpanGuard")
	}
}
