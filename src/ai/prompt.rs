use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::ledger::{BudgetCategory, BudgetItem, LedgerView};

/// Read-only ledger data handed to the text backend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiRequest {
    pub items: Vec<BudgetItem>,
    pub categories: Vec<BudgetCategory>,
    pub total_income: f64,
    pub total_expenses: f64,
}

impl From<&LedgerView> for AiRequest {
    fn from(view: &LedgerView) -> Self {
        Self {
            items: view.items.clone(),
            categories: view.categories.clone(),
            total_income: view.total_income,
            total_expenses: view.total_expenses,
        }
    }
}

/// One request to the text backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub model: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BlogStyle {
    #[default]
    Professional,
    Casual,
    Technical,
}

impl fmt::Display for BlogStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BlogStyle::Professional => "professional",
            BlogStyle::Casual => "casual",
            BlogStyle::Technical => "technical",
        })
    }
}

impl FromStr for BlogStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "professional" => Ok(BlogStyle::Professional),
            "casual" => Ok(BlogStyle::Casual),
            "technical" => Ok(BlogStyle::Technical),
            other => Err(format!("unknown blog style `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SummaryPeriod {
    Week,
    #[default]
    Month,
    Year,
}

impl SummaryPeriod {
    fn adjective(self) -> &'static str {
        match self {
            SummaryPeriod::Week => "weekly",
            SummaryPeriod::Month => "monthly",
            SummaryPeriod::Year => "yearly",
        }
    }
}

impl FromStr for SummaryPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" | "weekly" => Ok(SummaryPeriod::Week),
            "month" | "monthly" => Ok(SummaryPeriod::Month),
            "year" | "yearly" => Ok(SummaryPeriod::Year),
            other => Err(format!("unknown period `{other}`")),
        }
    }
}

const INSIGHT_SYSTEM: &str = "You are a financial advisor AI that provides actionable insights \
based on budget data. Always provide specific, actionable advice with confidence scores.";

const BLOG_SYSTEM: &str = "You are a financial blogger who creates engaging, informative content \
about personal finance and budgeting. Write in a clear, accessible style with practical advice.";

const SUMMARY_SYSTEM: &str =
    "You are a financial analyst. Provide clear, concise summaries of financial data.";

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "[]".into())
}

pub fn insight_completion(request: &AiRequest, model: &str) -> Completion {
    let prompt = format!(
        "Analyze this budget data and provide 3-5 actionable insights:\n\n\
         Budget Items: {items}\n\
         Categories: {categories}\n\
         Total Income: ${income}\n\
         Total Expenses: ${expenses}\n\n\
         For each insight, provide:\n\
         - Type (spending_pattern, budget_alert, saving_opportunity, trend_analysis)\n\
         - Title (brief, actionable)\n\
         - Description (detailed explanation)\n\
         - Confidence (0-100)\n\
         - Actionable (true/false)\n\
         - Action text (if actionable)\n\
         - Impact (low/medium/high)\n\n\
         Format as JSON array.",
        items = to_json(&request.items),
        categories = to_json(&request.categories),
        income = request.total_income,
        expenses = request.total_expenses,
    );
    Completion {
        system: INSIGHT_SYSTEM.into(),
        prompt,
        temperature: 0.7,
        max_tokens: 1000,
        model: model.into(),
    }
}

pub fn blog_completion(
    topic: &str,
    style: BlogStyle,
    request: &AiRequest,
    model: &str,
) -> Completion {
    #[derive(Serialize)]
    struct BudgetData<'a> {
        items: &'a [BudgetItem],
        categories: &'a [BudgetCategory],
    }

    let data = BudgetData {
        items: &request.items,
        categories: &request.categories,
    };
    let prompt = format!(
        "Write a {style} blog post about \"{topic}\" incorporating insights from this budget data:\n\n\
         Budget Data: {data}\n\n\
         Requirements:\n\
         - 800-1200 words\n\
         - Include practical tips\n\
         - Use real examples from the data\n\
         - Make it engaging and informative\n\
         - Include a compelling title\n\
         - Add relevant tags",
        data = to_json(&data),
    );
    Completion {
        system: BLOG_SYSTEM.into(),
        prompt,
        temperature: 0.8,
        max_tokens: 2000,
        model: model.into(),
    }
}

pub fn summary_completion(items: &[BudgetItem], period: SummaryPeriod, model: &str) -> Completion {
    Completion {
        system: SUMMARY_SYSTEM.into(),
        prompt: format!(
            "Generate a concise {} financial summary based on this budget data: {}",
            period.adjective(),
            to_json(items)
        ),
        temperature: 0.5,
        max_tokens: 500,
        model: model.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{ItemDraft, Ledger};
    use chrono::Utc;

    #[test]
    fn insight_prompt_embeds_totals_and_items() {
        let mut ledger = Ledger::new();
        ledger.add_item(ItemDraft::income("Salary", 1000.0, Utc::now()));
        let request = AiRequest::from(&ledger.view());
        let completion = insight_completion(&request, "gpt-test");

        assert!(completion.prompt.contains("Total Income: $1000"));
        assert!(completion.prompt.contains("\"name\":\"Salary\""));
        assert!(completion.prompt.contains("Format as JSON array."));
        assert_eq!(completion.max_tokens, 1000);
        assert_eq!(completion.model, "gpt-test");
    }

    #[test]
    fn blog_and_summary_settings() {
        let request = AiRequest::from(&Ledger::empty().view());
        let blog = blog_completion("Saving money", BlogStyle::Casual, &request, "m");
        assert!(blog.prompt.starts_with("Write a casual blog post about \"Saving money\""));
        assert_eq!(blog.temperature, 0.8);

        let summary = summary_completion(&[], SummaryPeriod::Year, "m");
        assert!(summary.prompt.contains("concise yearly financial summary"));
        assert_eq!(summary.max_tokens, 500);
    }

    #[test]
    fn parses_style_and_period() {
        assert_eq!("Technical".parse::<BlogStyle>(), Ok(BlogStyle::Technical));
        assert!("poetic".parse::<BlogStyle>().is_err());
        assert_eq!("week".parse::<SummaryPeriod>(), Ok(SummaryPeriod::Week));
    }
}
