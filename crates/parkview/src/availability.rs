//! Availability rule engine.
//!
//! Maps (lot type, permit, day, time) to whether the permit holder may park.
//! Permits are exact-match: holding RED never grants BLUE or YELLOW access.
//! Yellow lots are open to everyone outside weekday business hours,
//! `[08:00, 17:00)`; 17:00 itself is open.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::filter::Filter;
use crate::lot::{Day, Lot, LotRecord, LotType, Permit, TimeOfDay};

/// First restricted minute on weekdays (08:00).
pub const RESTRICTED_FROM: u16 = 8 * 60;
/// First unrestricted minute after the weekday window (17:00).
pub const RESTRICTED_UNTIL: u16 = 17 * 60;

pub fn is_available(lot_type: LotType, permit: Permit, day: Day, time: TimeOfDay) -> bool {
    match lot_type {
        LotType::Red => permit == Permit::Red,
        LotType::Blue => permit == Permit::Blue,
        LotType::Yellow => match permit {
            Permit::Yellow => true,
            Permit::None => !in_restricted_window(day, time),
            Permit::Red | Permit::Blue => false,
        },
        LotType::Other => false,
    }
}

pub fn is_available_for(lot_type: LotType, filter: &Filter) -> bool {
    is_available(lot_type, filter.permit, filter.day, filter.time)
}

/// String-typed entry point. Any input that does not parse is unavailable.
pub fn evaluate(lot_type: &str, permit: &str, day: &str, time: &str) -> bool {
    let (Ok(permit), Ok(day), Ok(time)) = (
        permit.parse::<Permit>(),
        day.parse::<Day>(),
        time.parse::<TimeOfDay>(),
    ) else {
        tracing::debug!(lot_type, permit, day, time, "Unparseable availability query, failing closed");
        return false;
    };
    is_available(LotType::parse_lenient(lot_type), permit, day, time)
}

fn in_restricted_window(day: Day, time: TimeOfDay) -> bool {
    let minutes = time.minutes_since_midnight();
    day.is_weekday() && (RESTRICTED_FROM..RESTRICTED_UNTIL).contains(&minutes)
}

/// Where a lot's `available` flag comes from.
///
/// One mode applies to a whole evaluation pass; the two are never mixed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityMode {
    /// The rule engine decides every lot from the fetch's filter.
    Local,
    /// The data source decides; every record must carry `available`.
    #[default]
    Server,
}

impl AvailabilityMode {
    /// Turn fetched records into lots, all under this mode.
    pub fn resolve(self, records: Vec<LotRecord>, filter: &Filter) -> Result<Vec<Lot>, FetchError> {
        match self {
            Self::Server => records
                .into_iter()
                .map(|record| match record.available {
                    Some(available) => Ok(Lot::from_record(record, available)),
                    None => Err(FetchError::malformed(format!(
                        "lot '{}' has no availability flag",
                        record.id
                    ))),
                })
                .collect(),
            Self::Local => Ok(records
                .into_iter()
                .map(|record| {
                    let available = is_available_for(record.lot_type, filter);
                    if let Some(supplied) = record.available
                        && supplied != available
                    {
                        tracing::warn!(
                            lot_id = %record.id,
                            supplied,
                            computed = available,
                            "Supplied availability disagrees with local rules, using local value"
                        );
                    }
                    Lot::from_record(record, available)
                })
                .collect()),
        }
    }
}

impl FromStr for AvailabilityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "server" => Ok(Self::Server),
            other => Err(format!(
                "unknown availability mode '{other}', expected 'local' or 'server'"
            )),
        }
    }
}

impl fmt::Display for AvailabilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Local => "local",
            Self::Server => "server",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lot::Position;

    const PERMITS: [Permit; 4] = [Permit::None, Permit::Yellow, Permit::Red, Permit::Blue];

    fn every_minute() -> impl Iterator<Item = TimeOfDay> {
        (0..24u8).flat_map(|h| (0..60u8).filter_map(move |m| TimeOfDay::from_hm(h, m)))
    }

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    #[test]
    fn yellow_without_permit_closed_during_weekday_hours() {
        for day in Day::ALL.into_iter().filter(Day::is_weekday) {
            for time in every_minute() {
                let minutes = time.minutes_since_midnight();
                let expected = !(480..1020).contains(&minutes);
                assert_eq!(
                    is_available(LotType::Yellow, Permit::None, day, time),
                    expected,
                    "{day} {time}"
                );
            }
        }
    }

    #[test]
    fn yellow_window_boundaries() {
        assert!(is_available(LotType::Yellow, Permit::None, Day::Mon, t("07:59")));
        assert!(!is_available(LotType::Yellow, Permit::None, Day::Mon, t("08:00")));
        assert!(!is_available(LotType::Yellow, Permit::None, Day::Fri, t("16:59")));
        assert!(is_available(LotType::Yellow, Permit::None, Day::Fri, t("17:00")));
    }

    #[test]
    fn yellow_without_permit_open_all_weekend() {
        for day in [Day::Sat, Day::Sun] {
            for time in every_minute() {
                assert!(is_available(LotType::Yellow, Permit::None, day, time));
            }
        }
    }

    #[test]
    fn yellow_permit_always_open_and_other_permits_never() {
        for day in Day::ALL {
            for time in [t("00:00"), t("08:00"), t("12:30"), t("17:00"), t("23:59")] {
                assert!(is_available(LotType::Yellow, Permit::Yellow, day, time));
                assert!(!is_available(LotType::Yellow, Permit::Red, day, time));
                assert!(!is_available(LotType::Yellow, Permit::Blue, day, time));
            }
        }
    }

    #[test]
    fn red_and_blue_require_exact_permit() {
        for day in Day::ALL {
            for time in [t("03:00"), t("09:00"), t("17:00")] {
                for permit in PERMITS {
                    assert_eq!(
                        is_available(LotType::Red, permit, day, time),
                        permit == Permit::Red
                    );
                    assert_eq!(
                        is_available(LotType::Blue, permit, day, time),
                        permit == Permit::Blue
                    );
                }
            }
        }
    }

    #[test]
    fn unclassified_lots_fail_closed() {
        for permit in PERMITS {
            assert!(!is_available(LotType::Other, permit, Day::Sun, t("20:00")));
        }
    }

    #[test]
    fn evaluate_is_case_insensitive() {
        assert!(evaluate("yellow", "NONE", "sat", "10:00"));
        assert!(evaluate("Red", "red", "Mon", "10:00"));
        assert!(!evaluate("BLUE", "Red", "Mon", "10:00"));
        assert!(!evaluate("purple", "yellow", "Mon", "10:00"));
    }

    #[test]
    fn evaluate_fails_closed_on_malformed_input() {
        assert!(!evaluate("yellow", "yellow", "Mon", "25:00"));
        assert!(!evaluate("yellow", "yellow", "Mon", "noon"));
        assert!(!evaluate("yellow", "gold", "Mon", "10:00"));
        assert!(!evaluate("yellow", "yellow", "Someday", "10:00"));
    }

    #[test]
    fn evaluation_is_pure() {
        let first = evaluate("yellow", "none", "Tue", "12:00");
        for _ in 0..10 {
            assert_eq!(evaluate("yellow", "none", "Tue", "12:00"), first);
        }
    }

    fn record(id: &str, lot_type: LotType) -> LotRecord {
        LotRecord::new(id, id.to_uppercase(), lot_type, Position::new(40.0, -74.0).unwrap())
    }

    #[test]
    fn server_mode_uses_supplied_flag() {
        let filter = Filter::new(Permit::None, Day::Mon, t("10:00"));
        let records = vec![record("r", LotType::Red).with_available(true)];

        let lots = AvailabilityMode::Server.resolve(records, &filter).unwrap();
        assert!(lots[0].available);
    }

    #[test]
    fn server_mode_rejects_missing_flag() {
        let filter = Filter::new(Permit::None, Day::Mon, t("10:00"));
        let records = vec![
            record("a", LotType::Red).with_available(false),
            record("b", LotType::Yellow),
        ];

        let err = AvailabilityMode::Server.resolve(records, &filter).unwrap_err();
        assert!(matches!(err, FetchError::MalformedPayload(msg) if msg.contains("'b'")));
    }

    #[test]
    fn local_mode_computes_and_overrides_supplied_flag() {
        let filter = Filter::new(Permit::None, Day::Mon, t("10:00"));
        let records = vec![
            record("y", LotType::Yellow).with_available(true),
            record("s", LotType::Yellow),
        ];

        let lots = AvailabilityMode::Local.resolve(records, &filter).unwrap();
        assert!(!lots[0].available);
        assert!(!lots[1].available);
    }

    #[test]
    fn mode_parses() {
        assert_eq!("LOCAL".parse::<AvailabilityMode>(), Ok(AvailabilityMode::Local));
        assert_eq!("server".parse::<AvailabilityMode>(), Ok(AvailabilityMode::Server));
        assert!("hybrid".parse::<AvailabilityMode>().is_err());
    }
}
