use std::path::Path;
use std::sync::Arc;

use restflow_core::{parse_template_document, ResultMap, Validate};
use restflow_exec::executor::ReqwestHttpClient;
use restflow_exec::Executor;
use serde::Serialize;

use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::{EventsMode, LimitArgs, OutputArgs, RequestArgs};

use super::config::{
    build_event_sink, build_executor_config, build_request_props, load_params, merge_set_params,
};

#[derive(Serialize)]
struct RunResult {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<ResultMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recoverable: Option<bool>,
}

pub async fn run_cmd(
    template_path: &Path,
    params_path: Option<&Path>,
    set_params: &[String],
    events: EventsMode,
    request: RequestArgs,
    limits: LimitArgs,
    output: OutputArgs,
) -> i32 {
    let content = match std::fs::read_to_string(template_path) {
        Ok(v) => v,
        Err(e) => {
            print_error(
                output.format,
                output.quiet,
                &format!("failed to read {}: {e}", template_path.display()),
            );
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let doc = match parse_template_document(&content) {
        Ok(doc) => doc,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::VALIDATION_FAILED;
        }
    };
    if let Err(err) = doc.validate() {
        for v in &err.violations {
            print_error(output.format, output.quiet, &format!("{}: {}", v.path, v.message));
        }
        return exit_codes::VALIDATION_FAILED;
    }

    let mut params = match load_params(params_path) {
        Ok(p) => p,
        Err(e) => {
            print_error(output.format, output.quiet, &e);
            return exit_codes::RUNTIME_ERROR;
        }
    };
    if let Err(e) = merge_set_params(&mut params, set_params) {
        print_error(output.format, output.quiet, &e);
        return exit_codes::RUNTIME_ERROR;
    }
    let props = match build_request_props(&request) {
        Ok(p) => p,
        Err(e) => {
            print_error(output.format, output.quiet, &e);
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let config = build_executor_config(&limits);
    let client = match ReqwestHttpClient::with_connect_timeout(config.connect_timeout) {
        Ok(c) => c,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::RUNTIME_ERROR;
        }
    };
    let executor = Executor::new(Arc::new(client))
        .with_event_sink(build_event_sink(events))
        .with_config(config);

    match executor.process_document(&params, &doc, &props).await {
        Ok(results) => {
            let result = RunResult {
                status: "succeeded",
                results: Some(results),
                error: None,
                recoverable: None,
            };
            print_result(output.format, output.quiet, &result);
            exit_codes::SUCCESS
        }
        Err(e) => {
            let recoverable = e.is_recoverable();
            if output.format == OutputFormat::Json {
                let result = RunResult {
                    status: "failed",
                    results: None,
                    error: Some(e.to_string()),
                    recoverable: Some(recoverable),
                };
                print_result(output.format, output.quiet, &result);
            } else {
                print_error(output.format, output.quiet, &e.to_string());
            }
            if recoverable {
                exit_codes::RUN_RECOVERABLE
            } else {
                exit_codes::RUN_FAILED
            }
        }
    }
}
