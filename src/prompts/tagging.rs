const INTRO: &str = "You are an AI assistant that tags customer product reviews.";
const TAXONOMY_HEADER: &str = "Prefer tags from this list when they fit:";
const RESPONSE_FORMAT: &str = "Respond strictly with a JSON array of concise lowercase tags, for example [\"late_delivery\", \"refund_request\"].";
const RULES_HEADER: &str = "Rules:";
const RULES: &[&str] = &[
    "Output the JSON array only. No markdown, no extra text.",
    "Use lowercase words joined by underscores.",
    "Never repeat a tag.",
];

/// Build the classification prompt for one review.
///
/// Deterministic: the same review, taxonomy and limit always give the same
/// prompt.
pub fn build_tagging_prompt(review_text: &str, taxonomy: &[&str], max_tags: usize) -> String {
    let taxonomy_list = taxonomy
        .iter()
        .map(|tag| format!("- {}", tag))
        .collect::<Vec<_>>()
        .join("\n");

    let rules = RULES
        .iter()
        .map(|rule| format!("- {}", rule))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{intro}\n\nRead the following customer review and generate up to {max_tags} relevant tags.\n\nReview: \"{review}\"\n\n{taxonomy_header}\n{taxonomy_list}\n\n{response_format}\n\n{rules_header}\n- Return at most {max_tags} tags.\n{rules}\n",
        intro = INTRO,
        max_tags = max_tags,
        review = review_text,
        taxonomy_header = TAXONOMY_HEADER,
        taxonomy_list = taxonomy_list,
        response_format = RESPONSE_FORMAT,
        rules_header = RULES_HEADER,
        rules = rules
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_review_text() {
        let prompt = build_tagging_prompt("Arrived two weeks late", &[], 3);
        assert!(prompt.contains("Review: \"Arrived two weeks late\""));
    }

    #[test]
    fn prompt_lists_taxonomy_in_order() {
        let prompt = build_tagging_prompt("x", &["late_delivery", "pricing"], 3);
        let late = prompt.find("- late_delivery").unwrap();
        let pricing = prompt.find("- pricing").unwrap();
        assert!(late < pricing);
    }

    #[test]
    fn prompt_states_tag_limit() {
        let prompt = build_tagging_prompt("x", &[], 2);
        assert!(prompt.contains("up to 2 relevant tags"));
        assert!(prompt.contains("at most 2 tags"));
    }

    #[test]
    fn prompt_asks_for_json_array() {
        let prompt = build_tagging_prompt("x", &[], 3);
        assert!(prompt.contains("JSON array"));
        assert!(!prompt.contains("```"));
    }

    #[test]
    fn prompt_includes_rules() {
        let prompt = build_tagging_prompt("x", &[], 3);
        for rule in RULES {
            assert!(prompt.contains(rule));
        }
    }

    #[test]
    fn prompt_is_deterministic() {
        let a = build_tagging_prompt("same text", &["a", "b"], 3);
        let b = build_tagging_prompt("same text", &["a", "b"], 3);
        assert_eq!(a, b);
    }
}
