//! Season identifiers
//!
//! A [`SeasonId`] packs the game's progress into one integer:
//!
//! - `0`: world map, no active settlement
//! - `3n - 2`, `3n - 1`, `3n`: drizzle, clearance and storm of year `n`
//! - negative: invalid / unknown

use std::fmt;

use serde::{Deserialize, Serialize};

/// The three seasons of an in-game year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeasonPhase {
    Drizzle,
    Clearance,
    Storm,
}

impl SeasonPhase {
    /// Lowercase name as shown in backup listings
    pub fn name(self) -> &'static str {
        match self {
            Self::Drizzle => "drizzle",
            Self::Clearance => "clearance",
            Self::Storm => "storm",
        }
    }
}

impl fmt::Display for SeasonPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Integer encoding of in-game progress, see the module docs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeasonId(i64);

impl SeasonId {
    pub const INVALID: SeasonId = SeasonId(-1);
    pub const WORLD_MAP: SeasonId = SeasonId(0);

    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Encode a 1-based year and 0-based season index
    ///
    /// Years too large to encode yield [`SeasonId::INVALID`].
    pub fn from_year_and_season(year: i64, season_index: i64) -> Self {
        3i64.checked_mul(year)
            .and_then(|v| v.checked_sub(2))
            .and_then(|v| v.checked_add(season_index))
            .map_or(Self::INVALID, Self)
    }

    pub fn value(self) -> i64 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self.0 >= 0
    }

    pub fn is_world_map(self) -> bool {
        self.0 == 0
    }

    /// Season of the settlement, `None` on the world map or when invalid
    pub fn phase(self) -> Option<SeasonPhase> {
        if self.0 <= 0 {
            return None;
        }
        Some(match self.0 % 3 {
            1 => SeasonPhase::Drizzle,
            2 => SeasonPhase::Clearance,
            _ => SeasonPhase::Storm,
        })
    }

    pub fn is_early_phase(self) -> bool {
        self.phase() == Some(SeasonPhase::Drizzle)
    }

    pub fn is_mid_phase(self) -> bool {
        self.phase() == Some(SeasonPhase::Clearance)
    }

    pub fn is_late_phase(self) -> bool {
        self.phase() == Some(SeasonPhase::Storm)
    }

    /// 1-based settlement year, `None` on the world map or when invalid
    pub fn year(self) -> Option<u32> {
        if self.0 <= 0 {
            return None;
        }
        u32::try_from((self.0 - 1) / 3 + 1).ok()
    }
}

impl fmt::Display for SeasonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.year(), self.phase()) {
            (Some(year), Some(phase)) => write!(f, "Y{} {}", year, phase),
            _ if self.is_world_map() => f.write_str("world map"),
            _ => f.write_str("invalid"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding() {
        assert_eq!(SeasonId::from_year_and_season(1, 0).value(), 1);
        assert_eq!(SeasonId::from_year_and_season(1, 2).value(), 3);
        assert_eq!(SeasonId::from_year_and_season(2, 1).value(), 5);
    }

    #[test]
    fn test_year_two_clearance() {
        let sid = SeasonId::from_year_and_season(2, 1);
        assert!(sid.is_valid());
        assert!(!sid.is_world_map());
        assert!(sid.is_mid_phase());
        assert!(!sid.is_early_phase());
        assert!(!sid.is_late_phase());
        assert_eq!(sid.year(), Some(2));
        assert_eq!(sid.to_string(), "Y2 clearance");
    }

    #[test]
    fn test_phases_cycle() {
        let phases: Vec<_> = (1..=6).map(|v| SeasonId::new(v).phase().unwrap()).collect();
        assert_eq!(
            phases,
            vec![
                SeasonPhase::Drizzle,
                SeasonPhase::Clearance,
                SeasonPhase::Storm,
                SeasonPhase::Drizzle,
                SeasonPhase::Clearance,
                SeasonPhase::Storm,
            ]
        );
        assert_eq!(SeasonId::new(6).year(), Some(2));
        assert_eq!(SeasonId::new(7).year(), Some(3));
    }

    #[test]
    fn test_world_map_and_invalid() {
        assert!(SeasonId::WORLD_MAP.is_valid());
        assert!(SeasonId::WORLD_MAP.is_world_map());
        assert_eq!(SeasonId::WORLD_MAP.phase(), None);
        assert_eq!(SeasonId::WORLD_MAP.year(), None);
        assert_eq!(SeasonId::WORLD_MAP.to_string(), "world map");

        assert!(!SeasonId::INVALID.is_valid());
        assert!(!SeasonId::INVALID.is_late_phase());
        assert_eq!(SeasonId::INVALID.to_string(), "invalid");
    }

    #[test]
    fn test_out_of_range_values() {
        assert_eq!(
            SeasonId::from_year_and_season(4_000_000_000_000_000_000, 0),
            SeasonId::INVALID
        );
        assert_eq!(SeasonId::from_year_and_season(i64::MIN, 0), SeasonId::INVALID);

        let huge: SeasonId = serde_json::from_str("9223372036854775807").unwrap();
        assert_eq!(huge.year(), None);
        assert_eq!(huge.to_string(), "invalid");
        assert_eq!(SeasonId::new(i64::MIN).to_string(), "invalid");
    }

    #[test]
    fn test_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&SeasonId::new(5)).unwrap(), "5");
        let sid: SeasonId = serde_json::from_str("3").unwrap();
        assert!(sid.is_late_phase());
    }
}
