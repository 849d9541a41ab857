//! Descriptive statistics over the cleaned table
//!
//! Pure computation into an `Exploration` value, rendered to text by the
//! report stage. Per-game rates use the sum/sum convention (total red
//! cards over total games within a group); a zero games total propagates
//! NaN into the printed output rather than raising.

use crowdstorm_stats::descriptive::{self, Summary};
use log::info;

use crate::data::{Dataset, SkinToneCategory};
use crate::Result;

/// Descriptives for one light/dark group
#[derive(Debug, Clone)]
pub struct GroupStats {
    pub label: &'static str,
    pub n: usize,
    pub total_red_cards: f64,
    pub mean_red_cards: f64,
    /// Share of rows with at least one red card
    pub share_with_red: f64,
    /// Total red cards over total games
    pub red_cards_per_game: f64,
    pub total_games: f64,
}

impl GroupStats {
    fn compute(label: &'static str, red_cards: &[f64], games: &[f64]) -> GroupStats {
        let total_red_cards: f64 = red_cards.iter().sum();
        let total_games: f64 = games.iter().sum();
        GroupStats {
            label,
            n: red_cards.len(),
            total_red_cards,
            mean_red_cards: descriptive::rate(total_red_cards, red_cards.len() as f64),
            share_with_red: descriptive::share_positive(red_cards),
            red_cards_per_game: descriptive::rate(total_red_cards, total_games),
            total_games,
        }
    }
}

/// Descriptives for one ordinal skin-tone bucket
#[derive(Debug, Clone)]
pub struct CategoryStats {
    pub category: SkinToneCategory,
    pub n: usize,
    pub total_red_cards: f64,
    pub mean_red_cards: f64,
    pub total_games: f64,
}

/// All descriptive outputs of the pipeline
#[derive(Debug, Clone)]
pub struct Exploration {
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub n_observations: usize,
    pub n_players: usize,
    pub skin_tone: Summary,
    pub red_cards: Summary,
    pub share_with_red: f64,
    pub light: GroupStats,
    pub dark: GroupStats,
    pub categories: Vec<CategoryStats>,
}

impl Exploration {
    /// Ratio of dark-group to light-group mean red cards (NaN when the
    /// light group is empty or has zero mean)
    pub fn mean_ratio(&self) -> f64 {
        descriptive::rate(self.dark.mean_red_cards, self.light.mean_red_cards)
    }
}

/// Compute every descriptive summary over the cleaned table
pub fn explore(dataset: &Dataset) -> Result<Exploration> {
    info!(
        "Exploring {} observations ({} players)",
        dataset.len(),
        dataset.distinct_players()
    );

    let skin_tone = descriptive::summarize(&dataset.skin_tones())?;
    let red_cards_col = dataset.red_cards();
    let red_cards = descriptive::summarize(&red_cards_col)?;
    let share_with_red = descriptive::share_positive(&red_cards_col);

    let (light_red, dark_red) = dataset.red_cards_by_group();
    let light_games: Vec<f64> = dataset
        .observations
        .iter()
        .filter(|o| !o.dark_skin)
        .map(|o| o.games as f64)
        .collect();
    let dark_games: Vec<f64> = dataset
        .observations
        .iter()
        .filter(|o| o.dark_skin)
        .map(|o| o.games as f64)
        .collect();

    let light = GroupStats::compute("Light", &light_red, &light_games);
    let dark = GroupStats::compute("Dark", &dark_red, &dark_games);

    let categories = SkinToneCategory::ALL
        .iter()
        .map(|&category| {
            let rows = dataset.in_category(category);
            let total_red_cards: f64 = rows.iter().map(|o| o.red_cards as f64).sum();
            let total_games: f64 = rows.iter().map(|o| o.games as f64).sum();
            CategoryStats {
                category,
                n: rows.len(),
                total_red_cards,
                mean_red_cards: descriptive::rate(total_red_cards, rows.len() as f64),
                total_games,
            }
        })
        .collect();

    Ok(Exploration {
        rows_read: dataset.rows_read,
        rows_dropped: dataset.rows_dropped,
        n_observations: dataset.len(),
        n_players: dataset.distinct_players(),
        skin_tone,
        red_cards,
        share_with_red,
        light,
        dark,
        categories,
    })
}

/// Render the descriptive section as printable text
pub fn render(e: &Exploration) -> String {
    let mut out = String::new();
    let push = |out: &mut String, line: String| {
        out.push_str(&line);
        out.push('\n');
    };

    push(&mut out, "=== Dataset ===".into());
    push(
        &mut out,
        format!(
            "Rows read: {}  dropped (missing rating): {}  analyzed: {}",
            e.rows_read, e.rows_dropped, e.n_observations
        ),
    );
    push(&mut out, format!("Distinct players: {}", e.n_players));
    push(&mut out, String::new());

    push(&mut out, "=== Skin tone distribution ===".into());
    push(
        &mut out,
        format!(
            "mean {:.4}  median {:.4}  std {:.4}  min {:.2}  max {:.2}",
            e.skin_tone.mean, e.skin_tone.median, e.skin_tone.std_dev, e.skin_tone.min,
            e.skin_tone.max
        ),
    );
    for c in &e.categories {
        push(
            &mut out,
            format!(
                "{:<11} n={:<7} red cards: total {:.0}  mean {:.4}",
                c.category.label(),
                c.n,
                c.total_red_cards,
                c.mean_red_cards
            ),
        );
    }
    push(&mut out, String::new());

    push(&mut out, "=== Red cards ===".into());
    push(
        &mut out,
        format!(
            "total {:.0}  mean/obs {:.4}  max {:.0}  share of rows with >=1: {:.2}%",
            e.red_cards.sum,
            e.red_cards.mean,
            e.red_cards.max,
            e.share_with_red * 100.0
        ),
    );
    push(&mut out, String::new());

    push(&mut out, "=== Group comparison (light vs dark) ===".into());
    for g in [&e.light, &e.dark] {
        push(
            &mut out,
            format!(
                "{:<6} n={:<7} red total {:.0}  mean {:.4}  share>=1 {:.2}%  per game {:.6}",
                g.label,
                g.n,
                g.total_red_cards,
                g.mean_red_cards,
                g.share_with_red * 100.0,
                g.red_cards_per_game
            ),
        );
    }
    push(
        &mut out,
        format!("Dark/light mean red-card ratio: {:.4}", e.mean_ratio()),
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::make_obs;

    #[test]
    fn test_all_zero_red_cards() {
        // Degenerate column keeps every rate at zero without raising
        let obs = vec![
            make_obs(0.0, 0.0, 0),
            make_obs(0.25, 0.25, 0),
            make_obs(0.75, 0.75, 0),
            make_obs(1.0, 1.0, 0),
        ];
        let ds = Dataset::from_observations(obs);
        let e = explore(&ds).unwrap();

        assert_eq!(e.red_cards.sum, 0.0);
        assert_eq!(e.red_cards.mean, 0.0);
        assert_eq!(e.share_with_red, 0.0);
        assert_eq!(e.light.mean_red_cards, 0.0);
        assert_eq!(e.dark.red_cards_per_game, 0.0);
    }

    #[test]
    fn test_group_split_counts() {
        let obs = vec![
            make_obs(0.0, 0.0, 1),
            make_obs(0.5, 0.5, 0), // boundary: light
            make_obs(0.75, 0.75, 2),
        ];
        let ds = Dataset::from_observations(obs);
        let e = explore(&ds).unwrap();

        assert_eq!(e.light.n, 2);
        assert_eq!(e.dark.n, 1);
        assert_eq!(e.light.total_red_cards, 1.0);
        assert_eq!(e.dark.total_red_cards, 2.0);
    }

    #[test]
    fn test_empty_group_rate_is_nan() {
        // All light: the dark group is empty and its rates are NaN
        let obs = vec![make_obs(0.0, 0.0, 1), make_obs(0.25, 0.25, 0)];
        let ds = Dataset::from_observations(obs);
        let e = explore(&ds).unwrap();

        assert_eq!(e.dark.n, 0);
        assert!(e.dark.mean_red_cards.is_nan());
        assert!(e.dark.red_cards_per_game.is_nan());
        // NaN renders without panicking
        let text = render(&e);
        assert!(text.contains("NaN"));
    }

    #[test]
    fn test_category_totals_partition_data() {
        let obs = vec![
            make_obs(0.0, 0.0, 1),
            make_obs(0.25, 0.5, 2),
            make_obs(0.5, 0.75, 0),
            make_obs(1.0, 1.0, 3),
        ];
        let ds = Dataset::from_observations(obs);
        let e = explore(&ds).unwrap();

        let n_total: usize = e.categories.iter().map(|c| c.n).sum();
        let red_total: f64 = e.categories.iter().map(|c| c.total_red_cards).sum();
        assert_eq!(n_total, 4);
        assert_eq!(red_total, 6.0);
    }

    #[test]
    fn test_render_contains_sections() {
        let obs = vec![make_obs(0.25, 0.25, 1), make_obs(0.75, 0.75, 0)];
        let ds = Dataset::from_observations(obs);
        let e = explore(&ds).unwrap();
        let text = render(&e);

        assert!(text.contains("Skin tone distribution"));
        assert!(text.contains("Group comparison"));
        assert!(text.contains("Light"));
        assert!(text.contains("Dark"));
    }
}
