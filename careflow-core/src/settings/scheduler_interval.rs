use serde::{de::Error, Deserialize, Deserializer};

/// Interval written as a number with a unit suffix: `30s`, `5m` or `2h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerInterval {
    Seconds(u32),
    Minutes(u32),
    Hours(u32),
}

impl std::str::FromStr for SchedulerInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some(unit) = s.chars().last() else {
            return Err("Empty interval".to_string());
        };
        let num: u32 = s[..s.len() - unit.len_utf8()]
            .parse()
            .map_err(|e| format!("Invalid interval {s}: {e}"))?;
        if num == 0 {
            return Err(format!("Interval {s} must be positive"));
        }

        match unit {
            's' => Ok(SchedulerInterval::Seconds(num)),
            'm' => Ok(SchedulerInterval::Minutes(num)),
            'h' => Ok(SchedulerInterval::Hours(num)),
            _ => Err(format!("Invalid time unit in {s}, expected s, m or h")),
        }
    }
}

impl<'de> Deserialize<'de> for SchedulerInterval {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

impl From<SchedulerInterval> for clokwerk::Interval {
    fn from(val: SchedulerInterval) -> Self {
        match val {
            SchedulerInterval::Seconds(s) => clokwerk::Interval::Seconds(s),
            SchedulerInterval::Minutes(m) => clokwerk::Interval::Minutes(m),
            SchedulerInterval::Hours(h) => clokwerk::Interval::Hours(h),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_intervals() {
        assert_eq!("30s".parse(), Ok(SchedulerInterval::Seconds(30)));
        assert_eq!(" 5m".parse(), Ok(SchedulerInterval::Minutes(5)));
        assert_eq!("2h".parse(), Ok(SchedulerInterval::Hours(2)));
    }

    #[test]
    fn test_reject_invalid_intervals() {
        assert!("".parse::<SchedulerInterval>().is_err());
        assert!("5".parse::<SchedulerInterval>().is_err());
        assert!("0m".parse::<SchedulerInterval>().is_err());
        assert!("10d".parse::<SchedulerInterval>().is_err());
        assert!("xs".parse::<SchedulerInterval>().is_err());
    }

    #[test]
    fn test_deserialize_from_yaml_string() {
        let interval: SchedulerInterval = serde_json::from_str("\"15m\"").unwrap();
        assert_eq!(interval, SchedulerInterval::Minutes(15));
    }
}
