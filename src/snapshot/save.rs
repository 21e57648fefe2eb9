//! Save file parsing and season classification
//!
//! Only the few fields needed to label a backup are read from the game's
//! JSON save files; everything else is ignored.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::season::SeasonId;
use super::{META_SAVE_FILE, SAVE_FILE};
use crate::error::{AtssError, AtssResult};

/// `MetaSave.save`
#[derive(Debug, Deserialize)]
struct RawMetaSave {
    gameplay: Option<RawMetaGameplay>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMetaGameplay {
    has_active_game: Option<bool>,
}

/// `Save.save`
#[derive(Debug, Deserialize)]
struct RawSave {
    gameplay: Option<RawSaveGameplay>,
}

#[derive(Debug, Deserialize)]
struct RawSaveGameplay {
    /// 1-based
    year: Option<i64>,
    /// 0, 1, 2
    season: Option<i64>,
}

/// Settlement progress read from `Save.save`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementProgress {
    pub year: i64,
    pub season: i64,
}

/// The validated parts of a snapshot needed for classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeSave {
    pub has_active_game: bool,
    /// Only read when a game is active
    pub settlement: Option<SettlementProgress>,
}

impl CompositeSave {
    /// Season identifier of this save
    pub fn season_id(&self) -> SeasonId {
        if !self.has_active_game {
            return SeasonId::WORLD_MAP;
        }
        match self.settlement {
            Some(progress) => SeasonId::from_year_and_season(progress.year, progress.season),
            None => SeasonId::INVALID,
        }
    }
}

/// Parse and validate the save files in `dir`
///
/// `Save.save` is only consulted when `MetaSave.save` reports an active game.
pub fn read_save(dir: &Path) -> AtssResult<CompositeSave> {
    let meta_path = dir.join(META_SAVE_FILE);
    let meta: RawMetaSave = parse_save_file(&meta_path)?;
    let has_active_game = meta
        .gameplay
        .and_then(|g| g.has_active_game)
        .ok_or_else(|| missing_field(&meta_path, "gameplay.hasActiveGame"))?;

    if !has_active_game {
        return Ok(CompositeSave {
            has_active_game,
            settlement: None,
        });
    }

    let save_path = dir.join(SAVE_FILE);
    let save: RawSave = parse_save_file(&save_path)?;
    let gameplay = save
        .gameplay
        .ok_or_else(|| missing_field(&save_path, "gameplay"))?;
    let year = gameplay
        .year
        .ok_or_else(|| missing_field(&save_path, "gameplay.year"))?;
    let season = gameplay
        .season
        .ok_or_else(|| missing_field(&save_path, "gameplay.season"))?;

    if year < 1 {
        return Err(AtssError::Validation(format!(
            "'{}' has year {}, expected at least 1",
            save_path.display(),
            year
        )));
    }
    if !(0..=2).contains(&season) {
        return Err(AtssError::Validation(format!(
            "'{}' has season {}, expected 0, 1 or 2",
            save_path.display(),
            season
        )));
    }

    Ok(CompositeSave {
        has_active_game,
        settlement: Some(SettlementProgress { year, season }),
    })
}

/// Classify the snapshot in `dir`, yielding [`SeasonId::INVALID`] on any error
pub fn classify(dir: &Path) -> SeasonId {
    match read_save(dir) {
        Ok(save) => save.season_id(),
        Err(e) => {
            tracing::debug!("cannot classify save in '{}': {}", dir.display(), e);
            SeasonId::INVALID
        }
    }
}

fn parse_save_file<T: serde::de::DeserializeOwned>(path: &Path) -> AtssResult<T> {
    let content = fs::read(path)
        .map_err(|e| AtssError::Io(format!("Failed to read '{}': {}", path.display(), e)))?;
    let content = content
        .strip_prefix(b"\xEF\xBB\xBF".as_slice())
        .unwrap_or(&content);
    serde_json::from_slice(content)
        .map_err(|e| AtssError::Json(format!("Failed to parse '{}': {}", path.display(), e)))
}

fn missing_field(path: &Path, field: &str) -> AtssError {
    AtssError::Validation(format!(
        "'{}' is missing required field '{}'",
        path.display(),
        field
    ))
}
