//! Lot data model: identifiers, access enums, time of day and lot records.
//!
//! Parsing is case-insensitive everywhere. Canonical output forms are
//! `YELLOW` for lot types, `none` for permits and `Mon` for days.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParseError;

/// Unique lot identifier.
///
/// Accepts JSON strings and integers on the wire, always held as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LotId(String);

impl LotId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LotId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for LotId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl<'de> Deserialize<'de> for LotId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => LotId(s),
            RawId::Number(n) => LotId(n.to_string()),
        })
    }
}

/// Access class of a lot.
///
/// `Other` covers anything unclassified; the rule engine never grants it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LotType {
    Yellow,
    Red,
    Blue,
    Other,
}

impl LotType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yellow => "YELLOW",
            Self::Red => "RED",
            Self::Blue => "BLUE",
            Self::Other => "OTHER",
        }
    }

    /// Parse without rejecting: unrecognised types become `Other`.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or(Self::Other)
    }
}

impl FromStr for LotType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yellow" => Ok(Self::Yellow),
            "red" => Ok(Self::Red),
            "blue" => Ok(Self::Blue),
            "other" => Ok(Self::Other),
            _ => Err(ParseError::UnknownLotType(s.to_string())),
        }
    }
}

impl fmt::Display for LotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LotType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LotType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse_lenient(&raw))
    }
}

/// Permit held by the person looking for parking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Permit {
    #[default]
    None,
    Yellow,
    Red,
    Blue,
}

impl Permit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Yellow => "yellow",
            Self::Red => "red",
            Self::Blue => "blue",
        }
    }
}

impl FromStr for Permit {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "yellow" => Ok(Self::Yellow),
            "red" => Ok(Self::Red),
            "blue" => Ok(Self::Blue),
            _ => Err(ParseError::UnknownPermit(s.to_string())),
        }
    }
}

impl TryFrom<String> for Permit {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for Permit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Day {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Mon,
        Day::Tue,
        Day::Wed,
        Day::Thu,
        Day::Fri,
        Day::Sat,
        Day::Sun,
    ];

    pub fn is_weekday(&self) -> bool {
        !matches!(self, Self::Sat | Self::Sun)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mon => "Mon",
            Self::Tue => "Tue",
            Self::Wed => "Wed",
            Self::Thu => "Thu",
            Self::Fri => "Fri",
            Self::Sat => "Sat",
            Self::Sun => "Sun",
        }
    }
}

impl From<chrono::Weekday> for Day {
    fn from(weekday: chrono::Weekday) -> Self {
        match weekday {
            chrono::Weekday::Mon => Self::Mon,
            chrono::Weekday::Tue => Self::Tue,
            chrono::Weekday::Wed => Self::Wed,
            chrono::Weekday::Thu => Self::Thu,
            chrono::Weekday::Fri => Self::Fri,
            chrono::Weekday::Sat => Self::Sat,
            chrono::Weekday::Sun => Self::Sun,
        }
    }
}

impl FromStr for Day {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mon" | "monday" => Ok(Self::Mon),
            "tue" | "tuesday" => Ok(Self::Tue),
            "wed" | "wednesday" => Ok(Self::Wed),
            "thu" | "thursday" => Ok(Self::Thu),
            "fri" | "friday" => Ok(Self::Fri),
            "sat" | "saturday" => Ok(Self::Sat),
            "sun" | "sunday" => Ok(Self::Sun),
            _ => Err(ParseError::UnknownDay(s.to_string())),
        }
    }
}

impl TryFrom<String> for Day {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wall-clock time of day with minute resolution.
///
/// Parsed from `H:MM` or `HH:MM`; displayed as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    minutes: u16,
}

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay { minutes: 0 };
    pub const NINE_AM: TimeOfDay = TimeOfDay { minutes: 9 * 60 };

    pub fn from_hm(hours: u8, minutes: u8) -> Option<Self> {
        if hours > 23 || minutes > 59 {
            return None;
        }
        Some(Self {
            minutes: u16::from(hours) * 60 + u16::from(minutes),
        })
    }

    pub fn minutes_since_midnight(&self) -> u16 {
        self.minutes
    }

    pub fn hours(&self) -> u8 {
        (self.minutes / 60) as u8
    }

    pub fn minutes(&self) -> u8 {
        (self.minutes % 60) as u8
    }
}

impl FromStr for TimeOfDay {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidTimeFormat(s.to_string());

        let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;
        let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !digits(h) || h.len() > 2 || !digits(m) || m.len() != 2 {
            return Err(invalid());
        }

        let hours: u8 = h.parse().map_err(|_| invalid())?;
        let minutes: u8 = m.parse().map_err(|_| invalid())?;
        Self::from_hm(hours, minutes).ok_or_else(invalid)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hours(), self.minutes())
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Marker coordinates. Serialized as `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(f64, f64)", into = "(f64, f64)")]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

impl Position {
    pub fn new(lat: f64, lng: f64) -> Result<Self, ParseError> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        if !valid {
            return Err(ParseError::InvalidPosition { lat, lng });
        }
        Ok(Self { lat, lng })
    }
}

impl TryFrom<(f64, f64)> for Position {
    type Error = ParseError;

    fn try_from((lat, lng): (f64, f64)) -> Result<Self, Self::Error> {
        Self::new(lat, lng)
    }
}

impl From<Position> for (f64, f64) {
    fn from(p: Position) -> Self {
        (p.lat, p.lng)
    }
}

/// A lot as it appears on the wire.
///
/// `available` is present only when the data source computed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotRecord {
    pub id: LotId,
    pub name: String,
    #[serde(rename = "type")]
    pub lot_type: LotType,
    pub position: Position,
    #[serde(default)]
    pub restrictions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
}

impl LotRecord {
    pub fn new(
        id: impl Into<LotId>,
        name: impl Into<String>,
        lot_type: LotType,
        position: Position,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lot_type,
            position,
            restrictions: String::new(),
            available: None,
        }
    }

    pub fn with_restrictions(mut self, restrictions: impl Into<String>) -> Self {
        self.restrictions = restrictions.into();
        self
    }

    pub fn with_available(mut self, available: bool) -> Self {
        self.available = Some(available);
        self
    }
}

/// A lot with its availability resolved for the current filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lot {
    pub id: LotId,
    pub name: String,
    #[serde(rename = "type")]
    pub lot_type: LotType,
    pub position: Position,
    pub restrictions: String,
    pub available: bool,
}

impl Lot {
    pub fn from_record(record: LotRecord, available: bool) -> Self {
        Self {
            id: record.id,
            name: record.name,
            lot_type: record.lot_type,
            position: record.position,
            restrictions: record.restrictions,
            available,
        }
    }
}
