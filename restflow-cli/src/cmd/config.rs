use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use restflow_core::{AnyValue, ParamMap, RequestProps};
use restflow_exec::executor::{EventSink, NoOpEventSink, StdoutEventSink, TracingEventSink};
use restflow_exec::ExecutorConfig;

use crate::{EventsMode, LimitArgs, RequestArgs};

/// Read a JSON or YAML file.
fn load_value(path: &Path, what: &str) -> Result<AnyValue, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {what} {}: {e}", path.display()))?;
    if let Ok(v) = serde_json::from_str(&content) {
        return Ok(v);
    }
    serde_yaml::from_str(&content)
        .map_err(|_| format!("{what} file {} is neither valid JSON nor YAML", path.display()))
}

pub fn load_params(path: Option<&Path>) -> Result<ParamMap, String> {
    let Some(path) = path else {
        return Ok(ParamMap::new());
    };
    tracing::debug!(path = %path.display(), "loading params");
    match load_value(path, "params")? {
        AnyValue::Object(map) => Ok(map),
        AnyValue::Null => Ok(ParamMap::new()),
        _ => Err(format!("params file {} must hold a mapping", path.display())),
    }
}

/// `--set` values are strings; nested keys are not supported.
pub fn merge_set_params(params: &mut ParamMap, set_params: &[String]) -> Result<(), String> {
    for s in set_params {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| format!("--set expects KEY=VALUE, got '{s}'"))?;
        params.insert(k.to_string(), AnyValue::String(v.to_string()));
    }
    Ok(())
}

pub fn build_request_props(args: &RequestArgs) -> Result<RequestProps, String> {
    let mut props = match &args.props {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading request props");
            serde_json::from_value(load_value(path, "props")?)
                .map_err(|e| format!("invalid props file {}: {e}", path.display()))?
        }
        None => RequestProps::default(),
    };
    if !args.hosts.is_empty() {
        props.hosts = args.hosts.clone();
    }
    if let Some(port) = args.port {
        props.port = port;
    }
    if args.ssl {
        props.ssl = true;
    }
    if args.insecure {
        props.verify = false;
    }
    tracing::debug!(?props, "request props");
    Ok(props)
}

pub fn build_executor_config(limits: &LimitArgs) -> ExecutorConfig {
    ExecutorConfig {
        request_timeout: Duration::from_millis(limits.timeout),
        connect_timeout: Duration::from_millis(limits.connect_timeout),
        max_response_bytes: limits.max_response_bytes,
    }
}

pub fn build_event_sink(mode: EventsMode) -> Arc<dyn EventSink> {
    match mode {
        EventsMode::None => Arc::new(NoOpEventSink),
        EventsMode::Stdout => Arc::new(StdoutEventSink),
        EventsMode::Log => Arc::new(TracingEventSink),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn request_args() -> RequestArgs {
        RequestArgs {
            props: None,
            hosts: vec![],
            port: None,
            ssl: false,
            insecure: false,
        }
    }

    #[test]
    fn set_params_override_file_params() {
        let mut params: ParamMap = serde_json::from_str(r#"{"a": 1, "b": 2}"#).unwrap();
        merge_set_params(&mut params, &["b=x".to_string(), "c=a=b".to_string()]).unwrap();
        assert_eq!(params["a"], 1);
        assert_eq!(params["b"], "x");
        assert_eq!(params["c"], "a=b");
        assert!(merge_set_params(&mut params, &["novalue".to_string()]).is_err());
    }

    #[test]
    fn flags_override_props_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "hosts: [a, b]\nport: 8080\nsecure: true").unwrap();
        let mut args = request_args();
        args.props = Some(f.path().to_path_buf());

        let props = build_request_props(&args).unwrap();
        assert_eq!(props.hosts, vec!["a", "b"]);
        assert_eq!(props.port, 8080);
        assert!(props.ssl);
        assert!(props.verify);

        args.hosts = vec!["c".to_string()];
        args.port = Some(-1);
        args.insecure = true;
        let props = build_request_props(&args).unwrap();
        assert_eq!(props.hosts, vec!["c"]);
        assert_eq!(props.effective_port(), 443);
        assert!(!props.verify);
    }

    #[test]
    fn limits_map_to_executor_config() {
        let config = build_executor_config(&LimitArgs {
            timeout: 5000,
            connect_timeout: 250,
            max_response_bytes: 1024,
        });
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.connect_timeout, Duration::from_millis(250));
        assert_eq!(config.max_response_bytes, 1024);
    }

    #[test]
    fn params_file_must_be_a_mapping() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "- a\n- b").unwrap();
        assert!(load_params(Some(f.path())).is_err());
        assert!(load_params(None).unwrap().is_empty());
    }
}
