use chrono::Utc;
use tracing::{info, warn};

use super::model::{ContentDraft, ContentKind, ContentStatus};
use super::parse::{extract_tags, extract_title, parse_insights};
use super::prompt::{
    blog_completion, insight_completion, summary_completion, AiRequest, BlogStyle, Completion,
    SummaryPeriod,
};
use super::state::AiState;
use super::AiError;
use crate::ledger::{BudgetItem, LedgerView};

const SUMMARY_FALLBACK: &str = "Unable to generate summary";

/// Text-completion backend. Implementations own transport and credentials.
pub trait InsightProvider {
    fn complete(&self, completion: &Completion) -> Result<String, AiError>;
}

/// Drives a provider and records results on an [`AiState`].
///
/// Every operation clears the previous error, toggles `is_analyzing` around
/// the backend call and stores failures as `state.error`.
pub struct AiService<P> {
    provider: P,
}

impl<P: InsightProvider> AiService<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Requests insights for the view and prepends them to the state.
    /// Returns the number of insights recorded.
    pub fn generate_insights(&self, state: &mut AiState, view: &LedgerView) -> usize {
        let request = AiRequest::from(view);
        let completion = insight_completion(&request, &state.model);
        let Some(content) = self.run(state, &completion) else {
            return 0;
        };
        let drafts = parse_insights(&content);
        let count = drafts.len();
        for draft in drafts {
            state.add_insight(draft);
        }
        state.last_analysis = Some(Utc::now());
        info!(count, "insights recorded");
        count
    }

    /// Generates a draft blog post and prepends it to the state's content.
    pub fn generate_blog_post(
        &self,
        state: &mut AiState,
        topic: &str,
        style: BlogStyle,
        view: &LedgerView,
    ) -> Option<uuid::Uuid> {
        let request = AiRequest::from(view);
        let completion = blog_completion(topic, style, &request, &state.model);
        let content = self.run(state, &completion)?;
        let draft = ContentDraft {
            kind: ContentKind::BlogPost,
            title: extract_title(&content),
            tags: extract_tags(topic),
            content,
            status: ContentStatus::Draft,
        };
        Some(state.add_content(draft))
    }

    /// Returns a summary text, or `None` when the request could not be made.
    pub fn generate_summary(
        &self,
        state: &mut AiState,
        items: &[BudgetItem],
        period: SummaryPeriod,
    ) -> Option<String> {
        let completion = summary_completion(items, period, &state.model);
        if !self.begin(state) {
            return None;
        }
        let result = self.provider.complete(&completion);
        state.is_analyzing = false;
        match result {
            Ok(text) if text.trim().is_empty() => Some(SUMMARY_FALLBACK.into()),
            Ok(text) => Some(text),
            Err(AiError::EmptyResponse) => Some(SUMMARY_FALLBACK.into()),
            Err(err) => {
                Self::record(state, err);
                None
            }
        }
    }

    fn begin(&self, state: &mut AiState) -> bool {
        if !state.is_ready() {
            Self::record(state, AiError::NotConfigured);
            return false;
        }
        state.error = None;
        state.is_analyzing = true;
        true
    }

    fn run(&self, state: &mut AiState, completion: &Completion) -> Option<String> {
        if !self.begin(state) {
            return None;
        }
        let result = self
            .provider
            .complete(completion)
            .and_then(|text| {
                if text.trim().is_empty() {
                    Err(AiError::EmptyResponse)
                } else {
                    Ok(text)
                }
            });
        state.is_analyzing = false;
        match result {
            Ok(text) => Some(text),
            Err(err) => {
                Self::record(state, err);
                None
            }
        }
    }

    fn record(state: &mut AiState, err: AiError) {
        warn!(error = %err, "AI request failed");
        state.error = Some(err.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{ItemDraft, Ledger};
    use std::cell::RefCell;

    struct Scripted {
        reply: Result<String, AiError>,
        seen: RefCell<Vec<Completion>>,
    }

    impl Scripted {
        fn replying(reply: Result<&str, AiError>) -> Self {
            Self {
                reply: reply.map(str::to_string),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl InsightProvider for Scripted {
        fn complete(&self, completion: &Completion) -> Result<String, AiError> {
            self.seen.borrow_mut().push(completion.clone());
            self.reply.clone()
        }
    }

    fn ready_state() -> AiState {
        AiState {
            enabled: true,
            api_key: Some("sk-test".into()),
            ..AiState::default()
        }
    }

    fn view() -> LedgerView {
        let mut ledger = Ledger::new();
        ledger.add_item(ItemDraft::expense("Pizza", 30.0, "Food & Dining", Utc::now()));
        ledger.view()
    }

    #[test]
    fn disabled_ai_records_error_without_calling_backend() {
        let service = AiService::new(Scripted::replying(Ok("[]")));
        let mut state = AiState::default();
        assert_eq!(service.generate_insights(&mut state, &view()), 0);
        assert_eq!(state.error.as_deref(), Some("AI not enabled or API key missing"));
        assert!(service.provider().seen.borrow().is_empty());
    }

    #[test]
    fn insights_are_recorded_and_analysis_stamped() {
        let service = AiService::new(Scripted::replying(Ok(
            r#"[{"type":"spending_pattern","title":"A"},{"type":"budget_alert","title":"B"}]"#,
        )));
        let mut state = ready_state();
        state.error = Some("stale".into());

        assert_eq!(service.generate_insights(&mut state, &view()), 2);
        assert_eq!(state.insights[0].title, "B");
        assert!(state.last_analysis.is_some());
        assert!(state.error.is_none());
        assert!(!state.is_analyzing);
    }

    #[test]
    fn backend_failure_leaves_insights_untouched() {
        let service = AiService::new(Scripted::replying(Err(AiError::Backend(
            "rate limited".into(),
        ))));
        let mut state = ready_state();
        assert_eq!(service.generate_insights(&mut state, &view()), 0);
        assert_eq!(state.error.as_deref(), Some("rate limited"));
        assert!(state.insights.is_empty());
        assert!(state.last_analysis.is_none());
    }

    #[test]
    fn blog_post_uses_heading_and_topic_tags() {
        let service = AiService::new(Scripted::replying(Ok("# Eat Well For Less\nbody")));
        let mut state = ready_state();
        let id = service
            .generate_blog_post(&mut state, "food budgets", BlogStyle::Casual, &view())
            .unwrap();
        let post = &state.generated_content[0];
        assert_eq!(post.id, id);
        assert_eq!(post.title, "Eat Well For Less");
        assert_eq!(post.tags.last().map(String::as_str), Some("food"));
        assert_eq!(post.status, ContentStatus::Draft);
    }

    #[test]
    fn empty_summary_falls_back_to_message() {
        let service = AiService::new(Scripted::replying(Ok("")));
        let mut state = ready_state();
        let summary = service.generate_summary(&mut state, &[], SummaryPeriod::Week);
        assert_eq!(summary.as_deref(), Some(SUMMARY_FALLBACK));
    }
}
