use super::types::ConfigFile;
use super::*;
use crate::args::RunnerArgs;
use crate::error::{AppError, ConfigError, ValidationError};
use crate::workload::{HttpVerb, Instance, RequestTemplate, Runner, User};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::tempdir;

const FULL_TOML: &str = r#"
iterations = 3
concurrency = 4
timeout = "5s"
connect_timeout = 2
redirect = 0
insecure = true
session_id = "nightly"
progress_interval = 25

[[instances]]
name = "staging"
base_url = "https://staging.api.test"
user_token = "u-tok"

[[instances]]
name = "prod"
base_url = "https://api.test"
session_id = "prod-session"
client_token = "c-tok"

[[users]]
user_name = "alice"
password = "secret"

[users.properties]
id = "42"

[[requests]]
path = "/users/{{UserName}}"
method = "get"

[[requests]]
path = "/items"
method = "MERGE"
body = '{"owner":"{{username}}"}'
requires_client_token = true
headers = ["X-Trace: on", "Accept: application/json"]

[output]
console = false
csv = "results.csv"
include_content = true
summary_json = "summary.json"
"#;

fn write_config(dir: &Path, name: &str, content: &str) -> Result<PathBuf, String> {
    let path = dir.join(name);
    std::fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;
    Ok(path)
}

fn minimal_config() -> ConfigFile {
    ConfigFile {
        iterations: Some(1),
        instances: vec![super::types::InstanceConfig {
            name: "local".to_owned(),
            base_url: Some("http://127.0.0.1:8080".to_owned()),
            ..Default::default()
        }],
        users: vec![super::types::UserConfig {
            user_name: "alice".to_owned(),
            ..Default::default()
        }],
        requests: vec![super::types::RequestConfig {
            path: "/health".to_owned(),
            method: HttpVerb::Get,
            body: None,
            requires_client_token: false,
            headers: Vec::new(),
        }],
        ..ConfigFile::default()
    }
}

#[test]
fn parse_toml_config() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = write_config(dir.path(), "restrun.toml", FULL_TOML)?;

    let config = load_config_file(&path).map_err(|err| err.to_string())?;
    if config.iterations != Some(3) || config.max_concurrency != Some(4) {
        return Err("Unexpected iteration/concurrency values".to_owned());
    }
    if config.instances.len() != 2 || config.users.len() != 1 || config.requests.len() != 2 {
        return Err("Unexpected list sizes".to_owned());
    }
    let merge = config.requests.get(1).ok_or("Missing second request")?;
    if merge.method != HttpVerb::Merge || !merge.requires_client_token || merge.headers.len() != 2 {
        return Err(format!("Unexpected request {:?}", merge));
    }
    let first = config.requests.first().ok_or("Missing first request")?;
    if first.method != HttpVerb::Get {
        return Err("Lower-case verbs should parse".to_owned());
    }
    let alice = config.users.first().ok_or("Missing user")?;
    if alice.properties.get("id").map(String::as_str) != Some("42") {
        return Err("Expected user properties".to_owned());
    }
    Ok(())
}

#[test]
fn parse_json_config() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let content = r#"{
        "iterations": 2,
        "max_concurrency": 8,
        "timeout": "750ms",
        "instances": [{ "name": "local", "base_url": "http://127.0.0.1:1" }],
        "users": [{ "user_name": "bob" }],
        "requests": [{ "path": "/ping" }]
    }"#;
    let path = write_config(dir.path(), "restrun.json", content)?;

    let config = load_config_file(&path).map_err(|err| err.to_string())?;
    let request = config.requests.first().ok_or("Missing request")?;
    if request.method != HttpVerb::Get {
        return Err("Method should default to GET".to_owned());
    }
    let plan = build_run_plan(&config, &RunnerArgs::default()).map_err(|err| err.to_string())?;
    if plan.client.timeout != Duration::from_millis(750) || plan.dispatch.max_concurrency != 8 {
        return Err(format!("Unexpected plan {:?}", plan));
    }
    Ok(())
}

#[test]
fn unknown_verb_is_rejected() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let content = r#"
iterations = 1
[[requests]]
path = "/x"
method = "FETCH"
"#;
    let path = write_config(dir.path(), "bad.toml", content)?;
    match load_config_file(&path) {
        Err(AppError::Config(ConfigError::ParseToml { .. })) => Ok(()),
        Err(err) => Err(format!("Unexpected error: {}", err)),
        Ok(_) => Err("Expected unknown verb to fail".to_owned()),
    }
}

#[test]
fn unsupported_extension_is_rejected() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let yaml = write_config(dir.path(), "restrun.yaml", "iterations: 1")?;
    match load_config_file(&yaml) {
        Err(AppError::Config(ConfigError::UnsupportedExtension { ext })) if ext == "yaml" => {}
        Err(err) => return Err(format!("Unexpected error: {}", err)),
        Ok(_) => return Err("Expected yaml to be rejected".to_owned()),
    }
    let bare = write_config(dir.path(), "restrun", "iterations = 1")?;
    match load_config_file(&bare) {
        Err(AppError::Config(ConfigError::MissingExtension)) => Ok(()),
        Err(err) => Err(format!("Unexpected error: {}", err)),
        Ok(_) => Err("Expected missing extension to be rejected".to_owned()),
    }
}

#[test]
fn explicit_missing_path_is_a_read_error() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let missing = dir.path().join("absent.toml");
    match load_config(missing.to_str()) {
        Err(AppError::Config(ConfigError::ReadConfig { .. })) => Ok(()),
        Err(err) => Err(format!("Unexpected error: {}", err)),
        Ok(_) => Err("Expected read error".to_owned()),
    }
}

#[test]
fn plan_from_full_config() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = write_config(dir.path(), "restrun.toml", FULL_TOML)?;
    let config = load_config_file(&path).map_err(|err| err.to_string())?;
    let plan = build_run_plan(&config, &RunnerArgs::default()).map_err(|err| err.to_string())?;

    if plan.iterations != 3 || plan.dispatch.max_concurrency != 4 {
        return Err(format!("Unexpected plan {:?}", plan));
    }
    if plan.dispatch.progress_interval != 25 || !plan.dispatch.capture_content {
        return Err("Unexpected dispatch settings".to_owned());
    }
    if plan.client.timeout != Duration::from_secs(5)
        || plan.client.connect_timeout != Duration::from_secs(2)
        || plan.client.redirect_limit != 0
        || !plan.client.insecure
    {
        return Err(format!("Unexpected client settings {:?}", plan.client));
    }
    if plan.output.console
        || plan.output.csv != Some(PathBuf::from("results.csv"))
        || plan.output.summary_json != Some(PathBuf::from("summary.json"))
    {
        return Err(format!("Unexpected output plan {:?}", plan.output));
    }

    let staging = plan.runner.instances.first().ok_or("Missing staging")?;
    let prod = plan.runner.instances.get(1).ok_or("Missing prod")?;
    if staging.session_id.as_deref() != Some("nightly")
        || prod.session_id.as_deref() != Some("prod-session")
    {
        return Err("Session ids should default per instance".to_owned());
    }
    let merge = plan.runner.requests.get(1).ok_or("Missing request")?;
    if merge.headers
        != vec![
            ("X-Trace".to_owned(), "on".to_owned()),
            ("Accept".to_owned(), "application/json".to_owned()),
        ]
    {
        return Err(format!("Unexpected headers {:?}", merge.headers));
    }
    Ok(())
}

#[test]
fn cli_overrides_config_values() -> Result<(), String> {
    let config = minimal_config();
    let args = RunnerArgs {
        iterations: Some(9),
        concurrency: Some(2),
        timeout: Some(Duration::from_secs(1)),
        csv: Some(PathBuf::from("cli.csv")),
        no_console: true,
        no_color: true,
        include_content: true,
        ..RunnerArgs::default()
    };
    let plan = build_run_plan(&config, &args).map_err(|err| err.to_string())?;
    if plan.iterations != 9 || plan.dispatch.max_concurrency != 2 {
        return Err(format!("CLI values not applied: {:?}", plan));
    }
    if plan.client.timeout != Duration::from_secs(1) || plan.client.connect_timeout != Duration::from_secs(10) {
        return Err("Unexpected timeouts".to_owned());
    }
    if plan.output.console || !plan.output.no_color || plan.output.csv != Some(PathBuf::from("cli.csv")) {
        return Err(format!("Unexpected output plan {:?}", plan.output));
    }
    Ok(())
}

#[test]
fn defaults_fill_unset_values() -> Result<(), String> {
    let plan = build_run_plan(&minimal_config(), &RunnerArgs::default())
        .map_err(|err| err.to_string())?;
    if plan.dispatch.max_concurrency != 10 || plan.dispatch.progress_interval != 10 {
        return Err(format!("Unexpected defaults {:?}", plan.dispatch));
    }
    if plan.client.timeout != Duration::from_secs(30) || plan.client.redirect_limit != 10 {
        return Err(format!("Unexpected client defaults {:?}", plan.client));
    }
    if !plan.output.console || plan.output.csv.is_some() || plan.output.include_content {
        return Err(format!("Unexpected output defaults {:?}", plan.output));
    }
    let instance = plan.runner.instances.first().ok_or("Missing instance")?;
    if instance.session_id.as_deref() != Some(default_session_id().as_str()) {
        return Err(format!("Unexpected session id {:?}", instance.session_id));
    }
    if !default_session_id().starts_with("restrun-") {
        return Err("Default session id should carry the tool prefix".to_owned());
    }
    Ok(())
}

#[test]
fn missing_iterations_is_an_error() -> Result<(), String> {
    let mut config = minimal_config();
    config.iterations = None;
    match build_run_plan(&config, &RunnerArgs::default()) {
        Err(AppError::Validation(ValidationError::MissingIterations)) => Ok(()),
        Err(err) => Err(format!("Unexpected error: {}", err)),
        Ok(_) => Err("Expected missing iterations error".to_owned()),
    }
}

#[test]
fn bad_header_and_duration_are_config_errors() -> Result<(), String> {
    let mut config = minimal_config();
    if let Some(request) = config.requests.first_mut() {
        request.headers.push("no-delimiter".to_owned());
    }
    match build_run_plan(&config, &RunnerArgs::default()) {
        Err(AppError::Config(ConfigError::InvalidHeader { path, .. })) if path == "/health" => {}
        Err(err) => return Err(format!("Unexpected error: {}", err)),
        Ok(_) => return Err("Expected invalid header error".to_owned()),
    }

    let mut slow_config = minimal_config();
    slow_config.timeout = Some(super::types::DurationValue::Text("fast".to_owned()));
    match build_run_plan(&slow_config, &RunnerArgs::default()) {
        Err(AppError::Config(ConfigError::InvalidDuration { field, .. })) if field == "timeout" => {
            Ok(())
        }
        Err(err) => Err(format!("Unexpected error: {}", err)),
        Ok(_) => Err("Expected invalid duration error".to_owned()),
    }
}

#[test]
fn validation_rules() -> Result<(), String> {
    let ok = Runner::new(
        vec![Instance::new("a", "https://a.test")],
        vec![User::new("u", "p")],
        vec![RequestTemplate::new(HttpVerb::Get, "/")],
    );
    validate_runner(&ok).map_err(|err| err.to_string())?;

    let cases: [(Runner, fn(&ValidationError) -> bool); 6] = [
        (
            Runner::new(Vec::new(), Vec::new(), vec![RequestTemplate::new(HttpVerb::Get, "/")]),
            |err| matches!(err, ValidationError::NoInstances),
        ),
        (
            Runner::new(vec![Instance::new("a", "https://a.test")], Vec::new(), Vec::new()),
            |err| matches!(err, ValidationError::NoRequests),
        ),
        (
            Runner::new(
                vec![Instance::new("a", "not a url")],
                Vec::new(),
                vec![RequestTemplate::new(HttpVerb::Get, "/")],
            ),
            |err| matches!(err, ValidationError::InvalidBaseUrl { .. }),
        ),
        (
            Runner::new(
                vec![Instance::new("a", "mailto:someone@a.test")],
                Vec::new(),
                vec![RequestTemplate::new(HttpVerb::Get, "/")],
            ),
            |err| matches!(err, ValidationError::BaseUrlNotAbsolute { .. }),
        ),
        (
            Runner::new(
                vec![Instance::new("n".repeat(MAX_INSTANCE_NAME_LENGTH.saturating_add(1)), "https://a.test")],
                Vec::new(),
                vec![RequestTemplate::new(HttpVerb::Get, "/")],
            ),
            |err| matches!(err, ValidationError::NameTooLong { .. }),
        ),
        (
            Runner::new(
                vec![Instance::new("a", "https://a.test")],
                Vec::new(),
                vec![RequestTemplate::new(
                    HttpVerb::Get,
                    "p".repeat(MAX_REQUEST_PATH_LENGTH.saturating_add(1)),
                )],
            ),
            |err| matches!(err, ValidationError::PathTooLong { .. }),
        ),
    ];
    for (runner, is_expected) in cases {
        match validate_runner(&runner) {
            Err(err) if is_expected(&err) => {}
            other => return Err(format!("Unexpected validation outcome {:?}", other)),
        }
    }

    let name_at_limit = Runner::new(
        vec![Instance::new("n".repeat(MAX_INSTANCE_NAME_LENGTH), "https://a.test")],
        Vec::new(),
        vec![RequestTemplate::new(HttpVerb::Get, "/")],
    );
    validate_runner(&name_at_limit).map_err(|err| err.to_string())
}
