// crates.io
use tracing::instrument::Instrumented;
// self
use crate::{_prelude::*, obs::Operation};

/// Span attached to one controller operation.
#[derive(Clone, Debug)]
pub struct OperationSpan {
	span: tracing::Span,
}
impl OperationSpan {
	/// Creates a span tagged with the operation and the stage that opened it.
	pub fn new(operation: Operation, stage: &'static str) -> Self {
		let span =
			tracing::info_span!("session_client.operation", operation = operation.as_str(), stage);

		Self { span }
	}

	/// Runs `fut` inside the span; the span is entered on every poll only.
	pub fn in_span<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		// crates.io
		use tracing::Instrument;

		fut.instrument(self.span.clone())
	}
}
