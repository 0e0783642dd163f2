use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

/// Progress of one sequence run. Every event carries the run id; `index` is the position of
/// the call in `rest_calls`.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    SequenceStarted {
        run_id: Uuid,
        calls: usize,
    },
    SequenceFinished {
        run_id: Uuid,
        succeeded: bool,
    },
    CallStarted {
        run_id: Uuid,
        index: usize,
        method: String,
        url: String,
    },
    HostFailed {
        run_id: Uuid,
        index: usize,
        host: String,
        error: String,
    },
    CallSucceeded {
        run_id: Uuid,
        index: usize,
        host: String,
        status: u16,
    },
    CallFailed {
        run_id: Uuid,
        index: usize,
        error: String,
        recoverable: bool,
    },
}

impl Event {
    pub fn run_id(&self) -> Uuid {
        match self {
            Event::SequenceStarted { run_id, .. }
            | Event::SequenceFinished { run_id, .. }
            | Event::CallStarted { run_id, .. }
            | Event::HostFailed { run_id, .. }
            | Event::CallSucceeded { run_id, .. }
            | Event::CallFailed { run_id, .. } => *run_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Event::SequenceStarted { .. } => "sequence.started",
            Event::SequenceFinished { .. } => "sequence.finished",
            Event::CallStarted { .. } => "call.started",
            Event::HostFailed { .. } => "host.failed",
            Event::CallSucceeded { .. } => "call.succeeded",
            Event::CallFailed { .. } => "call.failed",
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let run_id = self.run_id().to_string();
        let kind = self.kind();
        match self {
            Event::SequenceStarted { calls, .. } => {
                json!({ "type": kind, "run_id": run_id, "calls": calls })
            }
            Event::SequenceFinished { succeeded, .. } => {
                json!({ "type": kind, "run_id": run_id, "succeeded": succeeded })
            }
            Event::CallStarted {
                index, method, url, ..
            } => {
                json!({ "type": kind, "run_id": run_id, "index": index, "method": method, "url": url })
            }
            Event::HostFailed {
                index, host, error, ..
            } => {
                json!({ "type": kind, "run_id": run_id, "index": index, "host": host, "error": error })
            }
            Event::CallSucceeded {
                index, host, status, ..
            } => {
                json!({ "type": kind, "run_id": run_id, "index": index, "host": host, "status": status })
            }
            Event::CallFailed {
                index,
                error,
                recoverable,
                ..
            } => {
                json!({ "type": kind, "run_id": run_id, "index": index, "error": error, "recoverable": recoverable })
            }
        }
    }
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: Event);
}

pub struct CompositeEventSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl Default for CompositeEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeEventSink {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add(&mut self, sink: Arc<dyn EventSink>) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[async_trait]
impl EventSink for CompositeEventSink {
    async fn emit(&self, event: Event) {
        for sink in &self.sinks {
            sink.emit(event.clone()).await;
        }
    }
}

/// One JSON object per line on stdout.
pub struct StdoutEventSink;

#[async_trait]
impl EventSink for StdoutEventSink {
    async fn emit(&self, event: Event) {
        println!("{}", event.to_json());
    }
}

/// Forwards events to `tracing`; failures are logged at warn level, the rest at info.
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn emit(&self, event: Event) {
        let run_id = event.run_id();
        let kind = event.kind();
        let details = event.to_json();
        match &event {
            Event::HostFailed { .. }
            | Event::CallFailed { .. }
            | Event::SequenceFinished {
                succeeded: false, ..
            } => tracing::warn!(%run_id, event = kind, %details),
            _ => tracing::info!(%run_id, event = kind, %details),
        }
    }
}

pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: Event) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorder(Arc<Mutex<Vec<&'static str>>>);

    #[async_trait]
    impl EventSink for Recorder {
        async fn emit(&self, event: Event) {
            self.0.lock().unwrap().push(event.kind());
        }
    }

    #[tokio::test]
    async fn composite_forwards_to_every_sink() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut sink = CompositeEventSink::new();
        sink.add(Arc::new(Recorder(seen.clone())));
        sink.add(Arc::new(NoOpEventSink));
        sink.add(Arc::new(Recorder(seen.clone())));
        sink.emit(Event::SequenceStarted {
            run_id: Uuid::nil(),
            calls: 2,
        })
        .await;
        assert_eq!(*seen.lock().unwrap(), vec!["sequence.started"; 2]);
    }

    #[test]
    fn serializes_events_with_type_and_run_id() {
        let json = Event::CallFailed {
            run_id: Uuid::nil(),
            index: 1,
            error: "boom".to_string(),
            recoverable: true,
        }
        .to_json();
        assert_eq!(json["type"], "call.failed");
        assert_eq!(json["run_id"], Uuid::nil().to_string());
        assert_eq!(json["index"], 1);
        assert_eq!(json["recoverable"], true);
    }
}
