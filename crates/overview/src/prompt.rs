//! Prompt assembly for the overview chat calls.
//!
//! Templates live next to the crate in `prompts/` and are embedded at compile
//! time. Substitution is plain `{{placeholder}}` replacement; the templates
//! carry no logic.

use reviews::Review;

use crate::summarizer::AppContext;

const SYSTEM_TEMPLATE: &str = include_str!("../prompts/system.txt");
const USER_TEMPLATE: &str = include_str!("../prompts/user.txt");

/// System prompt carrying the fixed app context, identical for every batch.
pub(crate) fn system_prompt(ctx: &AppContext) -> String {
    SYSTEM_TEMPLATE
        .trim()
        .replace("{{app_name}}", &ctx.name)
        .replace("{{app_description}}", ctx.description.trim())
}

/// User prompt for one batch: the running summary plus the batch's reviews.
pub(crate) fn user_prompt(batch: &[Review], summary: &str) -> String {
    USER_TEMPLATE
        .trim()
        .replace("{{summary}}", summary)
        .replace("{{reviews}}", &format_reviews(batch))
}

fn format_reviews(batch: &[Review]) -> String {
    batch
        .iter()
        .map(|review| {
            format!(
                "- [{}/5, {}] {}",
                review.rating,
                review.country,
                review.review_text.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use reviews::ReviewSource;

    fn ctx() -> AppContext {
        AppContext {
            name: "Star Walker".into(),
            description: "A stargazing companion app.".into(),
        }
    }

    fn review(rating: u8, country: &str, text: &str) -> Review {
        Review::new(
            None,
            ReviewSource::AppStore,
            "tester",
            country,
            rating,
            text,
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn system_prompt_carries_app_context() {
        let prompt = system_prompt(&ctx());
        assert!(prompt.contains("Star Walker"));
        assert!(prompt.contains("stargazing companion"));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn empty_description_is_valid() {
        let prompt = system_prompt(&AppContext {
            name: "Star Walker".into(),
            description: String::new(),
        });
        assert!(!prompt.contains("{{app_description}}"));
    }

    #[test]
    fn user_prompt_lists_batch_and_summary() {
        let batch = vec![review(5, "us", "love it"), review(2, "de", "too slow")];
        let prompt = user_prompt(&batch, "**Key Findings**:\nprior summary");

        assert!(prompt.contains("- [5/5, us] love it"));
        assert!(prompt.contains("- [2/5, de] too slow"));
        assert!(prompt.contains("prior summary"));
        assert!(!prompt.contains("{{"));
    }
}
