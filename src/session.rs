//! Explicit per-call user context.
//!
//! Every flow and persistence call takes a `UserContext` instead of reading
//! ambient session state, so ownership of the namespace is visible at every
//! call site.

use chrono::NaiveDate;

/// The authenticated user a call operates on behalf of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    pub uid: String,
}

impl UserContext {
    pub fn new(uid: &str) -> Self {
        Self { uid: uid.to_string() }
    }
}

/// Calendar date key used for all per-day documents: `yyyy-MM-dd`.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Today's date key in local time, matching what the user sees.
pub fn today_key() -> String {
    date_key(chrono::Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_key_is_iso_day() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 3).unwrap();
        assert_eq!(date_key(date), "2026-08-03");
    }

    #[test]
    fn today_key_parses_back() {
        let key = today_key();
        assert!(NaiveDate::parse_from_str(&key, "%Y-%m-%d").is_ok());
    }
}
