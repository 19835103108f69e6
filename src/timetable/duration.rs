pub const DEFAULT_DURATION_MINUTES: u32 = 60;
pub const MAX_DURATION_MINUTES: u32 = 24 * 60;

/// Leading-integer read of free-text durations such as "60 mins" or "1 hour 30".
/// Only the first run of digits counts; a missing, zero, unreadable or
/// longer-than-a-day value yields `default`.
pub fn parse_duration_minutes(raw: Option<&str>, default: u32) -> u32 {
    let Some(raw) = raw else {
        return default;
    };
    let digits: String = raw
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    match digits.parse::<u32>() {
        Ok(n) if (1..=MAX_DURATION_MINUTES).contains(&n) => n,
        _ => default,
    }
}
