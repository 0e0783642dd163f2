use std::sync::Arc;

use restflow_core::{
    decode_body, extract, merge_scope, parse_template_document, render_call, validate_response,
    AnyValue, ParamMap, RequestProps, ResultMap, TemplateDocument,
};
use uuid::Uuid;

use crate::executor::dispatch::{dispatch, DispatchError, HostFailure};
use crate::executor::events::{Event, EventSink, NoOpEventSink};
use crate::executor::http::HttpClient;
use crate::executor::result::ProcessError;
use crate::executor::types::ExecutorConfig;

/// Runs the calls of a template in order.
///
/// Every call is rendered with the parameters overlaid by all results extracted so far, so a
/// value stored by one call's `response_translation` is visible to every later call. The
/// first failing call ends the run.
pub struct Executor {
    client: Arc<dyn HttpClient>,
    events: Arc<dyn EventSink>,
    config: ExecutorConfig,
}

impl Executor {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self {
            client,
            events: Arc::new(NoOpEventSink),
            config: ExecutorConfig::default(),
        }
    }

    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn with_config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Parse `template` and run its `rest_calls`. Blank text runs nothing and yields an empty
    /// result map.
    pub async fn process(
        &self,
        params: &ParamMap,
        template: &str,
        props: &RequestProps,
    ) -> Result<ResultMap, ProcessError> {
        let doc = parse_template_document(template)?;
        self.process_document(params, &doc, props).await
    }

    pub async fn process_document(
        &self,
        params: &ParamMap,
        doc: &TemplateDocument,
        props: &RequestProps,
    ) -> Result<ResultMap, ProcessError> {
        let run_id = Uuid::new_v4();
        self.events
            .emit(Event::SequenceStarted {
                run_id,
                calls: doc.rest_calls.len(),
            })
            .await;

        let mut results = ResultMap::new();
        for (index, template) in doc.rest_calls.iter().enumerate() {
            if let Err(err) = self
                .run_call(run_id, index, template, params, props, &mut results)
                .await
            {
                tracing::debug!(%run_id, index, error = %err, "call failed");
                self.events
                    .emit(Event::CallFailed {
                        run_id,
                        index,
                        error: err.to_string(),
                        recoverable: err.is_recoverable(),
                    })
                    .await;
                self.events
                    .emit(Event::SequenceFinished {
                        run_id,
                        succeeded: false,
                    })
                    .await;
                return Err(err);
            }
        }

        self.events
            .emit(Event::SequenceFinished {
                run_id,
                succeeded: true,
            })
            .await;
        Ok(results)
    }

    async fn run_call(
        &self,
        run_id: Uuid,
        index: usize,
        template: &AnyValue,
        params: &ParamMap,
        props: &RequestProps,
        results: &mut ResultMap,
    ) -> Result<(), ProcessError> {
        let scope = merge_scope(params, results);
        let call = render_call(template, &scope)?;
        let payload_format = call.payload_format()?;
        let response_format = call.response_format()?;
        let call_props = props.with_overrides(&call.request);
        tracing::debug!(%run_id, index, ?call, "rendered call");

        self.events
            .emit(Event::CallStarted {
                run_id,
                index,
                method: call.method.clone(),
                url: call.url.clone(),
            })
            .await;

        let dispatched = match dispatch(
            self.client.as_ref(),
            &self.config,
            &call,
            payload_format,
            &call_props,
        )
        .await
        {
            Ok(dispatched) => dispatched,
            Err(err) => {
                if let DispatchError::HostsExhausted { failures } = &err {
                    self.emit_host_failures(run_id, index, failures).await;
                }
                return Err(err.into());
            }
        };
        self.emit_host_failures(run_id, index, &dispatched.failed_hosts)
            .await;

        if let Some(body) = decode_body(response_format, &dispatched.response.body)? {
            validate_response(
                &body,
                call.response_expectation.as_ref(),
                call.response_unexpectation.as_ref(),
            )?;
            if let Some(translation) = &call.response_translation {
                extract(&body, translation, results)?;
            }
        }

        self.events
            .emit(Event::CallSucceeded {
                run_id,
                index,
                host: dispatched.host,
                status: dispatched.response.status,
            })
            .await;
        Ok(())
    }

    async fn emit_host_failures(&self, run_id: Uuid, index: usize, failures: &[HostFailure]) {
        for failure in failures {
            self.events
                .emit(Event::HostFailed {
                    run_id,
                    index,
                    host: failure.host.clone(),
                    error: failure.error.clone(),
                })
                .await;
        }
    }
}
