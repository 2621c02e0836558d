use chrono::{DateTime, Local, NaiveDate, NaiveTime};

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy)]
pub enum TimeFormat {
    /// YYYY-MM-DD
    YYYYMMDD,
    /// YYYY-MM-DD HH:MM:SS
    YYYYMMDD_HHMMSS,
    /// HH:MM
    HHMM,
}

impl TimeFormat {
    pub fn pattern(self) -> &'static str {
        match self {
            Self::YYYYMMDD => "%Y-%m-%d",
            Self::YYYYMMDD_HHMMSS => "%Y-%m-%d %H:%M:%S",
            Self::HHMM => "%H:%M",
        }
    }
    pub fn display(self) -> &'static str {
        match self {
            Self::YYYYMMDD => "YYYY-MM-DD",
            Self::YYYYMMDD_HHMMSS => "YYYY-MM-DD HH:MM:SS",
            Self::HHMM => "HH:MM",
        }
    }
    /// 校验字符串是否符合该格式
    pub fn matches(self, value: &str) -> bool {
        match self {
            Self::YYYYMMDD => NaiveDate::parse_from_str(value, self.pattern()).is_ok(),
            Self::HHMM => NaiveTime::parse_from_str(value, self.pattern()).is_ok(),
            Self::YYYYMMDD_HHMMSS => {
                chrono::NaiveDateTime::parse_from_str(value, self.pattern()).is_ok()
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TIME(DateTime<Local>);

impl TIME {
    pub fn now() -> Self {
        Self(Local::now())
    }
    pub fn naos(&self) -> i64 {
        self.0.timestamp_nanos_opt().unwrap_or_default()
    }
    pub fn format(&self, format: TimeFormat) -> String {
        self.0.format(format.pattern()).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_round_trip_through_matches() {
        let now = TIME::now();
        for f in [TimeFormat::YYYYMMDD, TimeFormat::YYYYMMDD_HHMMSS, TimeFormat::HHMM] {
            assert!(f.matches(&now.format(f)), "{}", f.display());
        }
    }

    #[test]
    fn rejects_impossible_values() {
        assert!(!TimeFormat::YYYYMMDD.matches("2024-02-30"));
        assert!(!TimeFormat::YYYYMMDD.matches("30/01/2024"));
        assert!(!TimeFormat::HHMM.matches("25:00"));
        assert!(TimeFormat::HHMM.matches("09:30"));
    }
}
