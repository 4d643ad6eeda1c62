use chrono::{DateTime, NaiveDateTime, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Accepts RFC 3339 or a bare `YYYY-MM-DD HH:MM` taken as UTC.
pub fn parse_schedule(s: &str) -> anyhow::Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M")?;
    Ok(naive.and_utc())
}

pub fn display(dt: Option<DateTime<Utc>>) -> String {
    dt.map(|d| d.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_both_formats() {
        let expected = Utc.with_ymd_and_hms(2026, 11, 1, 9, 30, 0).unwrap();
        assert_eq!(parse_schedule("2026-11-01T15:00:00+05:30").unwrap(), expected);
        assert_eq!(parse_schedule("2026-11-01 09:30").unwrap(), expected);
        assert!(parse_schedule("tomorrow").is_err());
    }
}
