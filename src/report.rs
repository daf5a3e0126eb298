use std::fmt::Write;

use crate::insights::stats::money;
use crate::models::{CategoryTotal, Insight, Kpis, SellerRankingRow};

/// Plain-text listing used on stdout.
pub fn render_insights(insights: &[Insight]) -> String {
    let mut output = String::new();
    if insights.is_empty() {
        let _ = writeln!(output, "Not enough data for insights in this period.");
        return output;
    }

    for insight in insights {
        let _ = writeln!(
            output,
            "{} [{}] {}",
            insight.icon,
            insight.severity.as_str(),
            insight.title
        );
        let _ = writeln!(output, "   {}", insight.body);
    }
    output
}

pub struct ReportInput<'a> {
    pub dataset_name: &'a str,
    pub period: Option<(String, String)>,
    pub kpis: &'a Kpis,
    pub sellers: &'a [SellerRankingRow],
    pub categories: &'a [CategoryTotal],
    pub insights: &'a [Insight],
}

pub fn build_report(input: &ReportInput<'_>) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Sales Insights Report");
    match &input.period {
        Some((start, end)) => {
            let _ = writeln!(output, "Generated for {} ({} to {})", input.dataset_name, start, end);
        }
        None => {
            let _ = writeln!(output, "Generated for {} (full period)", input.dataset_name);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## KPIs");
    let kpis = input.kpis;
    let _ = writeln!(output, "- Total: {}", money(kpis.total_value));
    let _ = writeln!(output, "- Average per day: {}", money(kpis.avg_daily_value));
    let _ = writeln!(output, "- Days with sales: {}", kpis.days);
    if let Some(best) = &kpis.best_day {
        let _ = writeln!(output, "- Best day: {} ({})", best.date, money(best.value));
    }
    if let Some(worst) = &kpis.worst_day {
        let _ = writeln!(output, "- Worst day: {} ({})", worst.date, money(worst.value));
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Seller Ranking");
    if input.sellers.is_empty() {
        let _ = writeln!(output, "No seller activity recorded for this period.");
    } else {
        for (rank, seller) in input.sellers.iter().enumerate() {
            let _ = writeln!(
                output,
                "{}. {}: {} over {} days (avg {} per day)",
                rank + 1,
                seller.seller_name,
                money(seller.total_value),
                seller.days,
                money(seller.avg_daily_value)
            );
        }
    }

    if !input.categories.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Top Categories");
        for category in input.categories {
            let _ = writeln!(output, "- {}: {}", category.category, money(category.value));
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Insights");
    if input.insights.is_empty() {
        let _ = writeln!(output, "Not enough data for insights in this period.");
    } else {
        for insight in input.insights {
            let _ = writeln!(
                output,
                "- {} **{}** ({}): {}",
                insight.icon,
                insight.title,
                insight.severity.as_str(),
                insight.body
            );
        }
    }

    output
}
