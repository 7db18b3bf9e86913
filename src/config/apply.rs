use std::path::PathBuf;

use chrono::Local;

use crate::args::{RunnerArgs, parse_header};
use crate::dispatch::{DEFAULT_MAX_CONCURRENCY, DEFAULT_PROGRESS_INTERVAL, DispatchSettings};
use crate::error::{AppError, AppResult, ConfigError, ValidationError};
use crate::http::{ClientSettings, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REDIRECT_LIMIT, DEFAULT_TIMEOUT};
use crate::workload::{Instance, RequestTemplate, Runner, User};

use super::types::{ConfigFile, InstanceConfig, RequestConfig, UserConfig};
use super::validate::validate_runner;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPlan {
    pub console: bool,
    pub csv: Option<PathBuf>,
    pub include_content: bool,
    pub summary_json: Option<PathBuf>,
    pub no_color: bool,
}

/// Everything needed to run, after merging the config file with CLI overrides.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub runner: Runner,
    pub iterations: u64,
    pub dispatch: DispatchSettings,
    pub client: ClientSettings,
    pub output: OutputPlan,
}

/// Session id stamped on instances that do not carry their own.
#[must_use]
pub fn default_session_id() -> String {
    format!("restrun-{}", Local::now().format("%Y-%m-%d"))
}

/// Merges `config` with CLI overrides and validates the result.
///
/// # Errors
///
/// Returns an error when a value is missing or invalid, or the matrix fails validation.
pub fn build_run_plan(config: &ConfigFile, args: &RunnerArgs) -> AppResult<RunPlan> {
    let iterations = args
        .iterations
        .or(config.iterations)
        .ok_or(ValidationError::MissingIterations)?;
    if iterations == 0 {
        return Err(AppError::validation(ValidationError::ValueTooSmall {
            field: "iterations",
            min: 1,
        }));
    }

    let max_concurrency = args
        .concurrency
        .or(config.max_concurrency)
        .unwrap_or(DEFAULT_MAX_CONCURRENCY);
    if max_concurrency == 0 {
        return Err(AppError::validation(ValidationError::ValueTooSmall {
            field: "max_concurrency",
            min: 1,
        }));
    }

    let timeout = match (args.timeout, config.timeout.as_ref()) {
        (Some(timeout), _) => timeout,
        (None, Some(value)) => value.to_duration().map_err(|err| {
            AppError::config(ConfigError::InvalidDuration {
                field: "timeout",
                source: err,
            })
        })?,
        (None, None) => DEFAULT_TIMEOUT,
    };
    let connect_timeout = match (args.connect_timeout, config.connect_timeout.as_ref()) {
        (Some(timeout), _) => timeout,
        (None, Some(value)) => value.to_duration().map_err(|err| {
            AppError::config(ConfigError::InvalidDuration {
                field: "connect_timeout",
                source: err,
            })
        })?,
        (None, None) => DEFAULT_CONNECT_TIMEOUT,
    };

    let session_id = config.session_id.clone().unwrap_or_else(default_session_id);
    let instances = config
        .instances
        .iter()
        .map(|instance| build_instance(instance, &session_id))
        .collect();
    let users = config.users.iter().map(build_user).collect();
    let requests = config
        .requests
        .iter()
        .map(build_request)
        .collect::<AppResult<Vec<_>>>()?;
    let runner = Runner::new(instances, users, requests);
    validate_runner(&runner)?;

    let output_config = config.output.clone().unwrap_or_default();
    let include_content = args.include_content || output_config.include_content.unwrap_or(false);
    let output = OutputPlan {
        console: !args.no_console && output_config.console.unwrap_or(true),
        csv: args
            .csv
            .clone()
            .or_else(|| output_config.csv.map(PathBuf::from)),
        include_content,
        summary_json: args
            .summary_json
            .clone()
            .or_else(|| output_config.summary_json.map(PathBuf::from)),
        no_color: args.no_color || output_config.no_color.unwrap_or(false),
    };

    Ok(RunPlan {
        runner,
        iterations,
        dispatch: DispatchSettings {
            max_concurrency,
            progress_interval: config
                .progress_interval
                .unwrap_or(DEFAULT_PROGRESS_INTERVAL),
            capture_content: include_content,
        },
        client: ClientSettings {
            timeout,
            connect_timeout,
            redirect_limit: config.redirect.unwrap_or(DEFAULT_REDIRECT_LIMIT),
            insecure: args.insecure || config.insecure.unwrap_or(false),
            proxy: config.proxy.clone(),
            no_ua: config.no_ua.unwrap_or(false),
        },
        output,
    })
}

fn build_instance(config: &InstanceConfig, session_id: &str) -> Instance {
    Instance {
        name: config.name.clone(),
        base_url: config.base_url.clone(),
        session_id: Some(
            config
                .session_id
                .clone()
                .unwrap_or_else(|| session_id.to_owned()),
        ),
        user_token: config.user_token.clone(),
        client_token: config.client_token.clone(),
    }
}

fn build_user(config: &UserConfig) -> User {
    User {
        user_name: config.user_name.clone(),
        password: config.password.clone(),
        properties: config.properties.clone(),
    }
}

fn build_request(config: &RequestConfig) -> AppResult<RequestTemplate> {
    let mut request = RequestTemplate::new(config.method, config.path.clone());
    request.body = config.body.clone();
    request.requires_client_token = config.requires_client_token;
    for header in &config.headers {
        let (name, value) = parse_header(header).map_err(|err| {
            AppError::config(ConfigError::InvalidHeader {
                path: config.path.clone(),
                source: err,
            })
        })?;
        request.headers.push((name, value));
    }
    Ok(request)
}
