use crate::insights::stats::{money, pct_change, pct_one_decimal};
use crate::models::{Insight, SellerRankingRow, Severity};

/// Expects `ranked` already sorted by total, best first.
pub fn champion_insight(ranked: &[SellerRankingRow]) -> Option<Insight> {
    let top = ranked.first()?;

    let body = match ranked.get(1) {
        None => format!(
            "{} is the only seller in the period, with a total of {}.",
            top.seller_name,
            money(top.total_value)
        ),
        Some(runner_up) => {
            let lead = top.total_value - runner_up.total_value;
            let pct_clause = pct_change(top.total_value, runner_up.total_value)
                .map(|pct| format!("{}% ", pct_one_decimal(pct)))
                .unwrap_or_default();
            format!(
                "{} leads with {}, ahead by {} ({}over #2 {}).",
                top.seller_name,
                money(top.total_value),
                money(lead),
                pct_clause,
                runner_up.seller_name
            )
        }
    };

    Some(Insight {
        icon: "🏆",
        title: "Top seller".to_string(),
        body,
        severity: Severity::Good,
    })
}
