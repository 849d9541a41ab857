//! CSV loading, cleaning, and derived columns
//!
//! The crowdstorming file has one row per player-referee dyad. Only the
//! ten columns the analysis needs are kept; everything else in the header
//! is ignored by serde. Rows missing either skin-tone rating are dropped
//! before `Observation`s are built.

use std::collections::HashSet;
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Deserializer};

use crate::Result;

/// Raw CSV row, field names matching the file header
#[derive(Debug, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "playerShort")]
    pub player_short: String,
    #[serde(rename = "refNum")]
    pub ref_num: u32,
    pub games: u32,
    pub goals: u32,
    #[serde(rename = "yellowCards")]
    pub yellow_cards: u32,
    #[serde(rename = "redCards")]
    pub red_cards: u32,
    #[serde(rename = "meanIAT", deserialize_with = "de_opt_f64")]
    pub mean_iat: Option<f64>,
    #[serde(rename = "meanExp", deserialize_with = "de_opt_f64")]
    pub mean_exp: Option<f64>,
    #[serde(deserialize_with = "de_opt_f64")]
    pub rater1: Option<f64>,
    #[serde(deserialize_with = "de_opt_f64")]
    pub rater2: Option<f64>,
}

/// Missing numeric cells appear as empty strings or the literal "NA"
fn de_opt_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "NA" {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(serde::de::Error::custom)
}

/// Four-level ordinal skin-tone bucket over the averaged rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SkinToneCategory {
    VeryLight,
    Light,
    Dark,
    VeryDark,
}

impl SkinToneCategory {
    pub const ALL: [SkinToneCategory; 4] = [
        SkinToneCategory::VeryLight,
        SkinToneCategory::Light,
        SkinToneCategory::Dark,
        SkinToneCategory::VeryDark,
    ];

    /// Bucket bounds (0, 0.25, 0.5, 0.75, 1.0], lowest bound inclusive
    pub fn from_score(skin_tone: f64) -> Self {
        if skin_tone <= 0.25 {
            SkinToneCategory::VeryLight
        } else if skin_tone <= 0.5 {
            SkinToneCategory::Light
        } else if skin_tone <= 0.75 {
            SkinToneCategory::Dark
        } else {
            SkinToneCategory::VeryDark
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SkinToneCategory::VeryLight => "Very Light",
            SkinToneCategory::Light => "Light",
            SkinToneCategory::Dark => "Dark",
            SkinToneCategory::VeryDark => "Very Dark",
        }
    }
}

/// One cleaned player-referee dyad with derived skin-tone columns
#[derive(Debug, Clone)]
pub struct Observation {
    pub player_short: String,
    pub ref_num: u32,
    pub games: u32,
    pub goals: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub mean_iat: Option<f64>,
    pub mean_exp: Option<f64>,
    pub rater1: f64,
    pub rater2: f64,
    /// (rater1 + rater2) / 2, in [0, 1] for valid ratings
    pub skin_tone: f64,
    pub category: SkinToneCategory,
    /// Strictly greater than 0.5; a 0.5 average counts as light
    pub dark_skin: bool,
}

impl Observation {
    fn from_raw(raw: RawRecord, rater1: f64, rater2: f64) -> Self {
        let skin_tone = (rater1 + rater2) / 2.0;
        Observation {
            player_short: raw.player_short,
            ref_num: raw.ref_num,
            games: raw.games,
            goals: raw.goals,
            yellow_cards: raw.yellow_cards,
            red_cards: raw.red_cards,
            mean_iat: raw.mean_iat,
            mean_exp: raw.mean_exp,
            rater1,
            rater2,
            skin_tone,
            category: SkinToneCategory::from_score(skin_tone),
            dark_skin: skin_tone > 0.5,
        }
    }
}

/// The cleaned in-memory table plus loading bookkeeping
#[derive(Debug)]
pub struct Dataset {
    pub observations: Vec<Observation>,
    /// Rows in the source file
    pub rows_read: usize,
    /// Rows dropped for a missing rater value
    pub rows_dropped: usize,
}

impl Dataset {
    /// Load the CSV at `path`, dropping rows with a missing rating
    pub fn load(path: &Path) -> Result<Dataset> {
        info!("Loading dataset from {}", path.display());

        let mut reader = csv::Reader::from_path(path)?;
        let mut observations = Vec::new();
        let mut rows_read = 0;
        let mut rows_dropped = 0;

        for record in reader.deserialize::<RawRecord>() {
            let raw = record?;
            rows_read += 1;
            match (raw.rater1, raw.rater2) {
                (Some(r1), Some(r2)) => observations.push(Observation::from_raw(raw, r1, r2)),
                _ => rows_dropped += 1,
            }
        }

        debug!(
            "Read {} rows, dropped {} with missing ratings",
            rows_read, rows_dropped
        );

        Ok(Dataset {
            observations,
            rows_read,
            rows_dropped,
        })
    }

    pub fn from_observations(observations: Vec<Observation>) -> Dataset {
        let rows_read = observations.len();
        Dataset {
            observations,
            rows_read,
            rows_dropped: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn distinct_players(&self) -> usize {
        self.observations
            .iter()
            .map(|o| o.player_short.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    // Column accessors for the statistics layer

    pub fn skin_tones(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.skin_tone).collect()
    }

    pub fn red_cards(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.red_cards as f64).collect()
    }

    pub fn games(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.games as f64).collect()
    }

    pub fn rater1(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.rater1).collect()
    }

    pub fn rater2(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.rater2).collect()
    }

    /// Red-card columns for the light and dark groups, in that order
    pub fn red_cards_by_group(&self) -> (Vec<f64>, Vec<f64>) {
        let mut light = Vec::new();
        let mut dark = Vec::new();
        for o in &self.observations {
            if o.dark_skin {
                dark.push(o.red_cards as f64);
            } else {
                light.push(o.red_cards as f64);
            }
        }
        (light, dark)
    }

    /// Observations in a given skin-tone category
    pub fn in_category(&self, category: SkinToneCategory) -> Vec<&Observation> {
        self.observations
            .iter()
            .filter(|o| o.category == category)
            .collect()
    }

    /// 2x2 contingency table: rows light/dark, columns no-red/any-red
    pub fn red_card_crosstab(&self) -> Vec<Vec<usize>> {
        let mut table = vec![vec![0usize; 2]; 2];
        for o in &self.observations {
            let row = usize::from(o.dark_skin);
            let col = usize::from(o.red_cards > 0);
            table[row][col] += 1;
        }
        table
    }
}

/// Synthetic observation for tests elsewhere in the crate
#[cfg(test)]
pub(crate) fn make_obs(rater1: f64, rater2: f64, red_cards: u32) -> Observation {
    let skin_tone = (rater1 + rater2) / 2.0;
    Observation {
        player_short: "p".into(),
        ref_num: 1,
        games: 10,
        goals: 1,
        yellow_cards: 0,
        red_cards,
        mean_iat: Some(0.3),
        mean_exp: Some(0.4),
        rater1,
        rater2,
        skin_tone,
        category: SkinToneCategory::from_score(skin_tone),
        dark_skin: skin_tone > 0.5,
    }
}
