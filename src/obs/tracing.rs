// self
use crate::{_prelude::*, http::HttpMethod, obs::CallKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// A span builder used by the call pipeline.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a new span tagged with the provided call kind + endpoint path.
	pub fn new(kind: CallKind, endpoint: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("ft_api.call", kind = kind.as_str(), endpoint);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, endpoint);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
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

/// Emits the per-request diagnostic line right before dispatch.
///
/// Token calls pass `redact_query = true` so the client secret never reaches the log.
pub fn log_dispatch(method: HttpMethod, url: &Url, redact_query: bool) {
	#[cfg(feature = "tracing")]
	{
		if redact_query {
			tracing::info!(method = method.as_str(), url = url.path(), "Dispatching API call.");
		} else {
			tracing::info!(method = method.as_str(), url = url.as_str(), "Dispatching API call.");
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (method, url, redact_query);
	}
}

/// Emits a warning-level diagnostic (no-op without the `tracing` feature).
pub fn log_warning(message: &str, detail: &dyn Display) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(%detail, "{message}");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (message, detail);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn log_dispatch_noop_without_tracing() {
		let url = Url::parse("https://api.example.com/v2/campus?page[size]=100&")
			.expect("Fixture URL should parse.");

		log_dispatch(HttpMethod::Get, &url, false);
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = CallSpan::new(CallKind::Resource, "/v2/campus");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
