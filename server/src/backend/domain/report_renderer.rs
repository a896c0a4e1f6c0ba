//! HTML rendering of an account summary for the report email body.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::backend::domain::report_aggregator::AccountSummary;

const NOT_APPLICABLE: &str = "N/A";
const AVERAGE_DECIMAL_PLACES: u32 = 2;

#[derive(Debug, Clone)]
pub struct ReportRenderer {
    logo_url: String,
}

impl ReportRenderer {
    pub fn new(logo_url: impl Into<String>) -> Self {
        Self {
            logo_url: logo_url.into(),
        }
    }

    /// Produce a self-contained HTML document for one account.
    pub fn render(&self, summary: &AccountSummary) -> String {
        let mut rows = vec![
            "<html>".to_string(),
            r#"<body style="font-family: Verdana, sans-serif; margin: 0; padding: 0;">"#.to_string(),
            "<h3>Historical summary</h3>".to_string(),
            format!("<p>Total balance is: {}</p>", summary.total_balance),
            format!(
                "<p>Average debit amount: {}</p>",
                format_average(summary.average_debit_amount)
            ),
            format!(
                "<p>Average credit amount: {}</p>",
                format_average(summary.average_credit_amount)
            ),
            "<h4>Monthly summary</h4>".to_string(),
            "<ul>".to_string(),
        ];

        for (month, count) in summary.monthly_counts() {
            rows.push(format!("<li>Number of transactions in {}: {}</li>", month, count));
        }

        rows.push("</ul>".to_string());
        rows.push("<p>You will find the latest processed report attached to this email</p>".to_string());
        rows.push("<hr>".to_string());
        rows.push(format!(
            r#"<p><img src="{}" alt="logo"></p>"#,
            escape_attribute(&self.logo_url)
        ));
        rows.push("</body>".to_string());
        rows.push("</html>".to_string());

        rows.concat()
    }
}

fn format_average(average: Option<Decimal>) -> String {
    match average {
        Some(value) => value
            .round_dp_with_strategy(AVERAGE_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
            .normalize()
            .to_string(),
        None => NOT_APPLICABLE.to_string(),
    }
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
