//! Final textual report
//!
//! Deterministic formatting of the descriptive and inferential outputs
//! into one summary, with the conclusion gated on whether either count
//! model finds the skin-tone coefficient significant at alpha = 0.05.

use crate::explore::Exploration;
use crate::inference::Inference;

const ALPHA: f64 = 0.05;

/// Build the full report text
pub fn generate(exploration: &Exploration, inference: &Inference) -> String {
    let mut out = String::new();
    let push = |out: &mut String, line: &str| {
        out.push_str(line);
        out.push('\n');
    };

    push(&mut out, "============================================================");
    push(&mut out, "RED CARDS AND SKIN TONE: ANALYSIS REPORT");
    push(&mut out, "============================================================");
    push(&mut out, "");

    push(&mut out, "RESEARCH QUESTION");
    push(
        &mut out,
        "Do players with darker skin tone receive more red cards from referees?",
    );
    push(&mut out, "");

    push(&mut out, "METHODOLOGY");
    push(
        &mut out,
        &format!(
            "Analyzed {} player-referee dyads ({} players); skin tone is the mean of",
            exploration.n_observations, exploration.n_players
        ),
    );
    push(
        &mut out,
        "two independent ratings in [0, 1], split at 0.5 into light and dark groups.",
    );
    push(
        &mut out,
        "Group comparisons use nonparametric tests; card counts are modeled with",
    );
    push(
        &mut out,
        "Poisson and Negative Binomial regression (log link), controlling for games.",
    );
    push(&mut out, "");

    push(&mut out, "KEY FINDINGS");
    push(
        &mut out,
        &format!(
            "  Light group: n = {}, mean red cards = {:.4}, per game = {:.6}",
            exploration.light.n,
            exploration.light.mean_red_cards,
            exploration.light.red_cards_per_game
        ),
    );
    push(
        &mut out,
        &format!(
            "  Dark group:  n = {}, mean red cards = {:.4}, per game = {:.6}",
            exploration.dark.n,
            exploration.dark.mean_red_cards,
            exploration.dark.red_cards_per_game
        ),
    );
    push(
        &mut out,
        &format!(
            "  Dark/light mean ratio: {:.4}",
            exploration.mean_ratio()
        ),
    );
    push(&mut out, "");

    let mut models = vec![&inference.poisson, &inference.negbinomial];
    if let Some(ref m) = inference.interaction {
        models.push(m);
    }
    for m in &models {
        push(
            &mut out,
            &format!(
                "  {}: coef = {:.4}, p = {:.4e}, IRR = {:.4} ({:+.1}%){}",
                m.name,
                m.coefficient,
                m.p_value,
                m.irr,
                m.effect_percent(),
                if m.converged { "" } else { " [did not converge]" }
            ),
        );
    }
    push(&mut out, "");

    push(&mut out, "CONCLUSION");
    let significant =
        inference.poisson.p_value < ALPHA || inference.negbinomial.p_value < ALPHA;
    if significant {
        push(
            &mut out,
            "The data show a statistically significant association between player skin",
        );
        push(
            &mut out,
            &format!(
                "tone and red cards received (significant at alpha = {}).",
                ALPHA
            ),
        );
    } else {
        push(
            &mut out,
            "The data do not show a statistically significant association between",
        );
        push(
            &mut out,
            &format!(
                "player skin tone and red cards received (alpha = {}).",
                ALPHA
            ),
        );
    }
    push(&mut out, "");

    push(&mut out, "LIMITATIONS");
    push(
        &mut out,
        "Observational dyad-level data; no referee random effects; skin-tone",
    );
    push(
        &mut out,
        "ratings from two raters on photographs; association is not causation.",
    );

    out
}
