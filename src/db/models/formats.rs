//! Wire formats for calendar dates (`2024-01-10`) and clock times (`09:00`).

time::serde::format_description!(pub iso_date, Date, "[year]-[month]-[day]");

/// Clock times are written as `HH:MM`; `HH:MM:SS` is accepted on input
/// because that is how PostgreSQL `TIME` values are usually rendered.
pub mod clock {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use time::format_description::FormatItem;
    use time::macros::format_description;
    use time::Time;

    const HOUR_MINUTE: &[FormatItem<'static>] = format_description!("[hour]:[minute]");
    const HOUR_MINUTE_SECOND: &[FormatItem<'static>] =
        format_description!("[hour]:[minute]:[second]");

    pub fn parse(value: &str) -> Result<Time, time::error::Parse> {
        Time::parse(value, HOUR_MINUTE_SECOND).or_else(|_| Time::parse(value, HOUR_MINUTE))
    }

    pub fn format(value: &Time) -> String {
        value
            .format(HOUR_MINUTE)
            .unwrap_or_else(|_| format!("{:02}:{:02}", value.hour(), value.minute()))
    }

    pub fn serialize<S: Serializer>(value: &Time, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Time, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(raw.trim()).map_err(de::Error::custom)
    }

    pub mod option {
        use serde::{de, Deserialize, Deserializer, Serializer};
        use time::Time;

        pub fn serialize<S: Serializer>(
            value: &Option<Time>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(time) => super::serialize(time, serializer),
                None => serializer.serialize_none(),
            }
        }

        /// Empty strings read as "not set", matching how form inputs are posted.
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Time>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) if !raw.trim().is_empty() => {
                    super::parse(raw.trim()).map(Some).map_err(de::Error::custom)
                }
                _ => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::clock;
    use time::macros::time;

    #[test]
    fn clock_accepts_both_precisions() {
        assert_eq!(clock::parse("09:00").unwrap(), time!(9:00));
        assert_eq!(clock::parse("17:30:00").unwrap(), time!(17:30));
        assert!(clock::parse("9am").is_err());
    }

    #[test]
    fn clock_formats_without_seconds() {
        assert_eq!(clock::format(&time!(8:05:59)), "08:05");
    }
}
