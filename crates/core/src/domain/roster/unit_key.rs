use std::{fmt::Formatter, sync::LazyLock};

use regex::Regex;
use thiserror::Error;

static BUILDING_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s*동?$").expect("valid building pattern"));
static UNIT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s*호?$").expect("valid unit pattern"));

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitKeyError {
    #[error("building number is empty")]
    MissingBuilding,
    #[error("unit number is empty")]
    MissingUnit,
    #[error("building number {0:?} is not numeric")]
    InvalidBuilding(String),
    #[error("unit number {0:?} is not numeric")]
    InvalidUnit(String),
}

/// Identifies one household: building number plus unit number.
///
/// Both parts are canonicalized to plain integers, so `"0101동"` and `"101"`
/// produce the same key.
///
/// # Examples
/// ```
/// use roster_sync_core::domain::roster::UnitKey;
/// let key = UnitKey::parse(" 101동", "0203").unwrap();
/// assert_eq!(key.to_string(), "101-203");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitKey {
    building: u32,
    unit: u32,
}

impl UnitKey {
    pub fn new(building: u32, unit: u32) -> Self {
        Self { building, unit }
    }

    pub fn parse(building: &str, unit: &str) -> Result<Self, UnitKeyError> {
        let building_raw = building.trim();
        let unit_raw = unit.trim();

        if building_raw.is_empty() {
            return Err(UnitKeyError::MissingBuilding);
        }
        if unit_raw.is_empty() {
            return Err(UnitKeyError::MissingUnit);
        }

        let building = parse_part(&BUILDING_PATTERN, building_raw)
            .ok_or_else(|| UnitKeyError::InvalidBuilding(building_raw.to_owned()))?;
        let unit = parse_part(&UNIT_PATTERN, unit_raw)
            .ok_or_else(|| UnitKeyError::InvalidUnit(unit_raw.to_owned()))?;

        Ok(Self { building, unit })
    }

    pub fn building(&self) -> u32 {
        self.building
    }

    pub fn unit(&self) -> u32 {
        self.unit
    }
}

fn parse_part(pattern: &Regex, raw: &str) -> Option<u32> {
    pattern
        .captures(raw)
        .and_then(|captures| captures.get(1))
        .and_then(|digits| digits.as_str().parse::<u32>().ok())
}

impl std::fmt::Display for UnitKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.building, self.unit)
    }
}

impl std::fmt::Debug for UnitKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "UnitKey({})", self)
    }
}
