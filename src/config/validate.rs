use url::Url;

use crate::error::ValidationError;
use crate::workload::Runner;

pub const MAX_INSTANCE_NAME_LENGTH: usize = 100;
pub const MAX_REQUEST_PATH_LENGTH: usize = 2000;

/// Checks the matrix before anything is dispatched.
///
/// # Errors
///
/// Returns the first problem found: an empty instance or request list, an
/// over-long name or path, or a base URL that is not an absolute http(s) URL.
pub fn validate_runner(runner: &Runner) -> Result<(), ValidationError> {
    if runner.instances.is_empty() {
        return Err(ValidationError::NoInstances);
    }
    if runner.requests.is_empty() {
        return Err(ValidationError::NoRequests);
    }

    for instance in &runner.instances {
        if instance.name.chars().count() > MAX_INSTANCE_NAME_LENGTH {
            return Err(ValidationError::NameTooLong {
                name: instance.name.clone(),
                max: MAX_INSTANCE_NAME_LENGTH,
            });
        }
        let Some(base_url) = instance.base_url.as_deref() else {
            continue;
        };
        let parsed = Url::parse(base_url).map_err(|err| ValidationError::InvalidBaseUrl {
            name: instance.name.clone(),
            url: base_url.to_owned(),
            source: err,
        })?;
        if !matches!(parsed.scheme(), "http" | "https") || !parsed.has_host() {
            return Err(ValidationError::BaseUrlNotAbsolute {
                name: instance.name.clone(),
                url: base_url.to_owned(),
            });
        }
    }

    for request in &runner.requests {
        if request.path.chars().count() > MAX_REQUEST_PATH_LENGTH {
            return Err(ValidationError::PathTooLong {
                path: request.path.clone(),
                max: MAX_REQUEST_PATH_LENGTH,
            });
        }
    }
    Ok(())
}
