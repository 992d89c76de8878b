use chrono::Duration;
use lazy_static::lazy_static;
use regex::Regex;

/// the subset of ISO 8601 durations found in TransXChange RunTime and
/// WaitTime elements. components may be negative, which some published
/// documents use to claw back time added by an earlier link.
const DURATION_PATTERN: &str =
    r"^P((?P<days>-?\d+)D)?T((?P<hours>-?\d+)H)?((?P<minutes>-?\d+)M)?((?P<seconds>-?\d+)S)?$";

lazy_static! {
    static ref DURATION_REGEX: Regex = Regex::new(DURATION_PATTERN).unwrap();
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Not an ISO 8601 duration: '{0}'")]
pub struct DurationParseError(pub String);

/// reads a duration such as `PT2M` or `PT1H30M0S` into a [`chrono::Duration`].
/// a duration with no components, `PT`, is read as zero.
pub fn parse_duration(text: &str) -> Result<Duration, DurationParseError> {
    let captures = DURATION_REGEX
        .captures(text.trim())
        .ok_or_else(|| DurationParseError(text.to_string()))?;
    let mut seconds: i64 = 0;
    for (name, scale) in [
        ("days", 86_400),
        ("hours", 3_600),
        ("minutes", 60),
        ("seconds", 1),
    ] {
        if let Some(component) = captures.name(name) {
            let value: i64 = component
                .as_str()
                .parse()
                .map_err(|_| DurationParseError(text.to_string()))?;
            seconds += value * scale;
        }
    }
    Ok(Duration::seconds(seconds))
}
