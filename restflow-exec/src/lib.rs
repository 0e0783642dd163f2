#![forbid(unsafe_code)]

//! Runtime for declarative REST call sequences: host failover, the call sequencer and run
//! events. Template parsing, rendering, validation and translation live in `restflow-core`.

pub mod executor;

use std::sync::Arc;

use restflow_core::{ParamMap, RequestProps, ResultMap};

pub use crate::executor::{Executor, ExecutorConfig, ProcessError};

/// Run `template` with the default HTTP client and no event sink.
pub async fn process(
    params: &ParamMap,
    template: &str,
    props: &RequestProps,
) -> Result<ResultMap, ProcessError> {
    let client = executor::ReqwestHttpClient::try_new().map_err(ProcessError::Client)?;
    Executor::new(Arc::new(client))
        .process(params, template, props)
        .await
}

/// [`process`] on a private current-thread runtime. Inside an async runtime this fails with
/// [`ProcessError::Runtime`]; use [`process`] there.
pub fn process_blocking(
    params: &ParamMap,
    template: &str,
    props: &RequestProps,
) -> Result<ResultMap, ProcessError> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(ProcessError::Runtime(
            "process_blocking called from within an async runtime".to_string(),
        ));
    }
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| ProcessError::Runtime(e.to_string()))?;
    runtime.block_on(process(params, template, props))
}
