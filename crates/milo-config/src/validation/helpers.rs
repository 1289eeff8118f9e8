use std::fmt::Display;
use std::ops::RangeInclusive;

/// Record `name` as invalid when `value` falls outside `allowed`.
pub(crate) fn check_range<T>(errors: &mut Vec<String>, name: &str, value: T, allowed: RangeInclusive<T>)
where
    T: PartialOrd + Display,
{
    if !allowed.contains(&value) {
        errors.push(format!(
            "{name} must be within {}..={}, got {value}",
            allowed.start(),
            allowed.end()
        ));
    }
}
