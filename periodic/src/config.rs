use crate::error::{Error, Result};

const DEFAULT_PERIOD: std::time::Duration = std::time::Duration::from_secs(1);
const DEFAULT_CANCEL_CAPACITY: usize = 1;

/// Settings for [`serve_with`](crate::serve::serve_with).
///
/// With the `serde` feature enabled, `period` is read and written in
/// human-readable form, e.g. `"250ms"` or `"1m 30s"`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Interval between task invocations.
    #[cfg_attr(feature = "serde", serde(with = "humantime_duration"))]
    pub period: std::time::Duration,
    /// Buffered slots of the cancel signal. Zero creates a rendezvous signal.
    pub cancel_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD,
            cancel_capacity: DEFAULT_CANCEL_CAPACITY,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.period.is_zero() {
            return Err(Error::InvalidPeriod);
        }
        Ok(())
    }

    pub(crate) fn period(&self) -> time::Duration {
        self.period.try_into().unwrap_or(time::Duration::MAX)
    }
}

#[cfg(feature = "serde")]
mod humantime_duration {
    pub fn serialize<S: serde::Serializer>(
        duration: &std::time::Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&humantime::format_duration(*duration))
    }

    pub fn deserialize<'de, D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<std::time::Duration, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.period(), time::Duration::seconds(1));
        assert_eq!(config.cancel_capacity, 1);
    }

    #[test]
    fn zero_period_is_rejected() {
        let config = Config {
            period: std::time::Duration::ZERO,
            cancel_capacity: 0,
        };
        assert!(matches!(config.validate(), Err(Error::InvalidPeriod)));
    }

    #[test]
    fn huge_period_saturates() {
        let config = Config {
            period: std::time::Duration::MAX,
            ..Default::default()
        };
        assert_eq!(config.period(), time::Duration::MAX);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn human_readable_period() {
        let config: Config = serde_json::from_str(r#"{ "period": "250ms" }"#).unwrap();
        assert_eq!(config.period, std::time::Duration::from_millis(250));
        assert_eq!(config.cancel_capacity, 1);

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""period":"250ms""#));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn malformed_period_is_rejected() {
        assert!(serde_json::from_str::<Config>(r#"{ "period": "soon" }"#).is_err());
    }
}
