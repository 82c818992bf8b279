use crate::utils::error::{Result, TimefillError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(TimefillError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(TimefillError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(TimefillError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(TimefillError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(TimefillError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(TimefillError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TimefillError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(TimefillError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// The time increment must split an hour evenly, otherwise the sub-hour
/// offsets drift away from round clock values.
pub fn validate_time_increment(field_name: &str, minutes: u32) -> Result<()> {
    validate_range(field_name, minutes, 1, 60)?;
    if 60 % minutes != 0 {
        return Err(TimefillError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: minutes.to_string(),
            reason: "Increment must divide 60 evenly".to_string(),
        });
    }
    Ok(())
}

pub fn validate_hours_band(min_field: &str, min: f64, max_field: &str, max: f64) -> Result<()> {
    if !min.is_finite() || min <= 0.0 {
        return Err(TimefillError::InvalidConfigValueError {
            field: min_field.to_string(),
            value: min.to_string(),
            reason: "Value must be a positive number of hours".to_string(),
        });
    }
    if !max.is_finite() || max > 24.0 {
        return Err(TimefillError::InvalidConfigValueError {
            field: max_field.to_string(),
            value: max.to_string(),
            reason: "Value cannot exceed 24 hours".to_string(),
        });
    }
    if min >= max {
        return Err(TimefillError::ConfigValidationError {
            field: format!("{}/{}", min_field, max_field),
            message: format!("min ({}) must be strictly less than max ({})", min, max),
        });
    }
    Ok(())
}
