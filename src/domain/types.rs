/// Core value types used throughout the domain layer
///
/// This module defines the identifier newtypes, the `Frequency` enum and the
/// `CalendarDate` value object that every date crossing the system boundary
/// is converted into.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::domain::DomainError;

/// Defines a UUID-backed identifier newtype.
///
/// Wrapping the UUID keeps ids type safe - you can't accidentally pass a
/// category ID where a habit ID is expected.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parse an ID from its string form (useful for database loading)
            pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
                Ok(Self(Uuid::parse_str(s.trim())?))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a habit
    HabitId
);

uuid_id!(
    /// Unique identifier for a user-defined category
    CategoryId
);

uuid_id!(
    /// Identity of the calling user, as established by the auth layer
    UserId
);

/// How often a habit is expected to be performed
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Once every calendar day
    #[default]
    Daily,
    /// Once every 7-day period
    Weekly,
}

impl Frequency {
    /// Lowercase wire name (`daily` / `weekly`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
        }
    }

    /// Length of one period in days
    pub fn period_days(&self) -> i64 {
        match self {
            Frequency::Daily => 1,
            Frequency::Weekly => 7,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            _ => Err(DomainError::UnsupportedFrequency(s.to_string())),
        }
    }
}

/// Earliest and latest years a calendar date may carry
const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2999;

/// A calendar day, always written as zero-padded `YYYY-MM-DD`
///
/// Dates are validated once when they enter the system. Ordering follows the
/// calendar, which for this format is also the lexicographic string order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Parse a strict `YYYY-MM-DD` string
    ///
    /// Unpadded components (`2024-1-5`), timestamps, impossible days such as
    /// `2023-02-29` and years outside 1900..=2999 are all rejected.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 10
            && bytes.iter().enumerate().all(|(i, b)| match i {
                4 | 7 => *b == b'-',
                _ => b.is_ascii_digit(),
            });

        if !well_formed {
            return Err(DomainError::InvalidDateFormat(s.to_string()));
        }

        let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| DomainError::InvalidDateFormat(s.to_string()))?;

        Self::from_naive(date)
    }

    /// Wrap an already-parsed date, enforcing the supported year range
    pub fn from_naive(date: NaiveDate) -> Result<Self, DomainError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
            return Err(DomainError::InvalidDateFormat(date.to_string()));
        }
        Ok(Self(date))
    }

    /// Current UTC calendar day
    pub fn today() -> Self {
        Self(Utc::now().date_naive())
    }

    /// Underlying chrono date
    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }

    /// Signed number of days from `self` to `later`
    pub fn days_until(&self, later: CalendarDate) -> i64 {
        (later.0 - self.0).num_days()
    }

    /// The date `days` days earlier
    ///
    /// Saturates at the start of the supported range.
    pub fn minus_days(&self, days: u32) -> Self {
        let shifted = self.0 - chrono::Duration::days(i64::from(days));
        if shifted.year() < MIN_YEAR {
            Self(NaiveDate::from_ymd_opt(MIN_YEAR, 1, 1).unwrap_or(self.0))
        } else {
            Self(shifted)
        }
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for CalendarDate {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
