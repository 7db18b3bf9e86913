use std::time::Duration;

use crate::error::ValidationError;

/// Splits `Key: Value`, trimming both sides.
pub(crate) fn parse_header(s: &str) -> Result<(String, String), ValidationError> {
    match s.split_once(':') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_owned(), value.trim().to_owned()))
        }
        Some(_) | None => Err(ValidationError::InvalidHeaderFormat {
            value: s.to_owned(),
        }),
    }
}

pub(crate) fn parse_positive_u64(s: &str) -> Result<u64, ValidationError> {
    let value: u64 = s
        .trim()
        .parse()
        .map_err(|err| ValidationError::InvalidNumber { source: err })?;
    if value == 0 {
        return Err(ValidationError::ValueTooSmall {
            field: "value",
            min: 1,
        });
    }
    Ok(value)
}

pub(crate) fn parse_positive_usize(s: &str) -> Result<usize, ValidationError> {
    let value: usize = s
        .trim()
        .parse()
        .map_err(|err| ValidationError::InvalidNumber { source: err })?;
    if value == 0 {
        return Err(ValidationError::ValueTooSmall {
            field: "value",
            min: 1,
        });
    }
    Ok(value)
}

/// Parses `500ms`, `10s`, `2m`, `1h`; a bare number means seconds.
pub(crate) fn parse_duration_arg(s: &str) -> Result<Duration, ValidationError> {
    let value = s.trim();
    if value.is_empty() {
        return Err(ValidationError::DurationEmpty);
    }

    let digits_len = value.chars().take_while(char::is_ascii_digit).count();
    if digits_len == 0 {
        return Err(ValidationError::InvalidDurationFormat {
            value: value.to_owned(),
        });
    }
    let (num_part, unit_part) = value.split_at(digits_len);
    let number: u64 = num_part
        .parse()
        .map_err(|err| ValidationError::InvalidDurationNumber {
            value: value.to_owned(),
            source: err,
        })?;

    let unit = if unit_part.is_empty() { "s" } else { unit_part };
    let duration = match unit {
        "ms" => Duration::from_millis(number),
        "s" => Duration::from_secs(number),
        "m" => {
            let secs = number
                .checked_mul(60)
                .ok_or(ValidationError::DurationOverflow)?;
            Duration::from_secs(secs)
        }
        "h" => {
            let secs = number
                .checked_mul(60)
                .and_then(|seconds| seconds.checked_mul(60))
                .ok_or(ValidationError::DurationOverflow)?;
            Duration::from_secs(secs)
        }
        _ => {
            return Err(ValidationError::InvalidDurationUnit {
                unit: unit.to_owned(),
            });
        }
    };

    if duration.as_millis() == 0 {
        return Err(ValidationError::DurationZero);
    }

    Ok(duration)
}
