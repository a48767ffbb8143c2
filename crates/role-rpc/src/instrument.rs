//! # Call Instrumentation
//!
//! Every dispatched action and every outbound call is wrapped in a [`Timing`]: a trace
//! line when it starts and one `<name>.exec_time` measurement when it ends. The
//! measurement goes to a [`Counters`] sink; the default sink forwards to the `metrics`
//! facade so whichever recorder the host installs picks it up.

use crate::error::RpcResult;
use crate::message::Params;
use crate::transport::BoxFuture;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::trace;

/// Receives timing measurements.
pub trait Counters: Send + Sync {
    fn record_timing(&self, name: &str, elapsed: Duration);
}

/// Records timings as `metrics` histograms, in milliseconds.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsCounters;

impl Counters for MetricsCounters {
    fn record_timing(&self, name: &str, elapsed: Duration) {
        metrics::histogram!(format!("{name}.exec_time")).record(elapsed.as_secs_f64() * 1000.0);
    }
}

/// A running time measurement.
///
/// Ends exactly once: either through [`Timing::end_timing`] or, if the owner never
/// gets there (early return, cancelled future), when it is dropped.
pub struct Timing {
    name: String,
    start: Instant,
    counters: Arc<dyn Counters>,
    ended: bool,
}

impl Timing {
    fn begin(name: &str, counters: Arc<dyn Counters>) -> Self {
        Self {
            name: name.to_string(),
            start: Instant::now(),
            counters,
            ended: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn end_timing(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;
        let elapsed = self.start.elapsed();
        trace!(name = %self.name, elapsed_ms = elapsed.as_millis() as u64, "Timing ended");
        self.counters.record_timing(&self.name, elapsed);
    }
}

impl Drop for Timing {
    fn drop(&mut self) {
        self.finish();
    }
}

/// Starts timings against a shared counters sink.
#[derive(Clone)]
pub struct Instrumentation {
    counters: Arc<dyn Counters>,
}

impl Default for Instrumentation {
    fn default() -> Self {
        Self::new(Arc::new(MetricsCounters))
    }
}

impl Instrumentation {
    pub fn new(counters: Arc<dyn Counters>) -> Self {
        Self { counters }
    }

    /// Logs the start of `name` and begins timing it.
    pub fn instrument(&self, correlation_id: &str, name: &str) -> Timing {
        trace!(correlation_id, "Executing {} method", name);
        Timing::begin(name, self.counters.clone())
    }

    /// Wraps an action handler so every invocation is timed as `name`.
    pub fn timed<F, Fut>(
        &self,
        name: &str,
        handler: F,
    ) -> impl Fn(String, Params) -> BoxFuture<RpcResult<Value>> + Send + Sync + 'static
    where
        F: Fn(String, Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RpcResult<Value>> + Send + 'static,
    {
        let instrumentation = self.clone();
        let name = name.to_string();
        move |correlation_id: String, params: Params| -> BoxFuture<RpcResult<Value>> {
            let timing = instrumentation.instrument(&correlation_id, &name);
            let call = handler(correlation_id, params);
            Box::pin(async move {
                let result = call.await;
                timing.end_timing();
                result
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockCounters;

    #[test]
    fn timing_is_recorded_once_when_ended() {
        let counters = Arc::new(MockCounters::default());
        let instrumentation = Instrumentation::new(counters.clone());

        let timing = instrumentation.instrument("123", "dummy.get_dummies");
        assert_eq!(timing.name(), "dummy.get_dummies");
        timing.end_timing();

        assert_eq!(counters.timings(), vec!["dummy.get_dummies".to_string()]);
    }

    #[test]
    fn dropped_timing_is_still_recorded() {
        let counters = Arc::new(MockCounters::default());
        let instrumentation = Instrumentation::new(counters.clone());

        drop(instrumentation.instrument("123", "dummy.create_dummy"));

        assert_eq!(counters.count("dummy.create_dummy"), 1);
    }

    #[tokio::test]
    async fn timed_handler_records_failures_too() {
        let counters = Arc::new(MockCounters::default());
        let instrumentation = Instrumentation::new(counters.clone());
        let handler = instrumentation.timed("dummy.delete_dummy", |_, _| async {
            Err(crate::error::RpcError::Application("gone".into()))
        });

        assert!(handler("123".into(), Params::new()).await.is_err());
        assert_eq!(counters.count("dummy.delete_dummy"), 1);
    }
}
