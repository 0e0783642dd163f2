pub mod dispatch;
pub mod events;
pub mod http;
mod result;
mod sequencer;
mod types;

pub use dispatch::{dispatch, DispatchError, Dispatched, HostFailure};
pub use events::{
    CompositeEventSink, Event, EventSink, NoOpEventSink, StdoutEventSink, TracingEventSink,
};
pub use http::{HttpClient, HttpError, HttpRequestParts, HttpResponseParts, ReqwestHttpClient};
pub use result::ProcessError;
pub use sequencer::Executor;
pub use types::ExecutorConfig;
