use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Day of the week a class session meets on.
///
/// Serialized as the upper-case English name (`"MONDAY"`), which is also the
/// value stored in `class_times.day`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Monday => "MONDAY",
            Day::Tuesday => "TUESDAY",
            Day::Wednesday => "WEDNESDAY",
            Day::Thursday => "THURSDAY",
            Day::Friday => "FRIDAY",
            Day::Saturday => "SATURDAY",
            Day::Sunday => "SUNDAY",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a day of the week")]
pub struct UnknownDay(pub String);

impl FromStr for Day {
    type Err = UnknownDay;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Day::ALL
            .into_iter()
            .find(|day| day.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownDay(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stored_names_case_insensitively() {
        assert_eq!("MONDAY".parse::<Day>(), Ok(Day::Monday));
        assert_eq!(" sunday ".parse::<Day>(), Ok(Day::Sunday));
        assert_eq!("Wednesday".parse::<Day>(), Ok(Day::Wednesday));
    }

    #[test]
    fn rejects_abbreviations() {
        assert!("MON".parse::<Day>().is_err());
        assert!("".parse::<Day>().is_err());
    }

    #[test]
    fn serde_uses_upper_case_names() {
        let json = serde_json::to_string(&Day::Thursday).unwrap();
        assert_eq!(json, "\"THURSDAY\"");
        let back: Day = serde_json::from_str("\"FRIDAY\"").unwrap();
        assert_eq!(back, Day::Friday);
    }
}
