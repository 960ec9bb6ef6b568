//! Prompt text sent to the completion provider.
//!
//! Lists are rendered one item per line with a `- ` bullet so the model sees
//! each query or result as a separate entry.

/// System prompt for query interpretation.
pub const INTERPRET_SYSTEM: &str =
    "You are an expert at understanding search queries and suggesting improvements.";

/// System prompt for the diversity judgment.
pub const SIMILARITY_SYSTEM: &str = "You are an expert at analyzing query similarity. \
For each new query, respond with 'true' if it explores a sufficiently different aspect \
than all previous queries, or 'false' if it's too similar to any previous query. \
Respond with exactly one true/false per line.";

/// System prompt for proposing the next round's query.
pub const NEXT_QUERY_SYSTEM: &str = "You are an expert at analyzing search results and \
suggesting strategic follow-up queries. Based on ALL accumulated data so far, suggest a NEW \
search query that:\n\
1. Addresses gaps in the current information\n\
2. Builds on what we've already learned\n\
3. Stays focused on the original search goal\n\
4. Is significantly different from previous queries\n\
Return exactly ONE search query without any additional text or explanation.";

/// System prompt for follow-up query suggestions.
pub const FOLLOW_UP_SYSTEM: &str = "You are an expert at analyzing search results and \
suggesting diverse follow-up queries. Return exactly 3 search queries, one per line, without \
any additional text or explanation. Each query MUST stay within the user's core requirements \
and never suggest alternatives the user did not ask for. Focus on different aspects of their \
specific request.";

/// System prompt for the final summary.
pub const SUMMARY_SYSTEM: &str =
    "You are an expert at synthesizing information and creating comprehensive summaries.";

/// Render `items` as a bulleted block, or `(none)` when empty.
pub fn bullet_list(items: &[String]) -> String {
    if items.is_empty() {
        return "(none)".to_owned();
    }
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// User prompt asking for a JSON interpretation of `query`.
pub fn interpret_user(query: &str) -> String {
    format!(
        "Analyze this search query and suggest improvements: '{query}'\n\n\
         Return a JSON object with these fields:\n\
         - original_query: the original query\n\
         - interpreted_intent: what you think the user wants to know\n\
         - suggested_improvements: list of ways to improve the query\n\
         - search_keywords: list of important keywords to focus on"
    )
}

/// User prompt asking for one verdict per candidate.
pub fn similarity_user(candidates: &[String], prior: &[String]) -> String {
    format!(
        "Previous queries:\n{}\n\nNew queries to check:\n{}",
        bullet_list(prior),
        bullet_list(candidates)
    )
}

/// User prompt asking for the next round's query.
pub fn next_query_user(original_query: &str, used: &[String], results: &[String]) -> String {
    format!(
        "Original search goal: {original_query}\n\n\
         Previous queries that you should NOT repeat or be similar to:\n{}\n\n\
         ALL accumulated search results so far:\n{}\n\n\
         Based on this data, what's the most strategic NEW search query to help answer \
         the original question while exploring uncovered aspects?",
        bullet_list(used),
        bullet_list(results)
    )
}

/// User prompt asking for three follow-up queries.
pub fn follow_up_user(current_results: &[String], prior: &[String]) -> String {
    format!(
        "Based on these search results, suggest 3 NEW and DIFFERENT search queries that would \
         help gather more specific information while strictly adhering to the user's core \
         requirements. Each query should focus on a different aspect.\n\n\
         Previous queries that you should NOT repeat or be too similar to:\n{}\n\n\
         Current search results:\n{}",
        bullet_list(prior),
        bullet_list(current_results)
    )
}

/// User prompt asking for the final summary.
pub fn summary_user(original_query: &str, results: &[String]) -> String {
    format!(
        "Create a detailed summary answering this query: '{original_query}'\n\n\
         Based on all these search results:\n\n{}",
        bullet_list(results)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_renders_none() {
        assert_eq!(bullet_list(&[]), "(none)");
    }

    #[test]
    fn list_renders_one_bullet_per_line() {
        let items = vec!["a".to_string(), "b".to_string()];
        assert_eq!(bullet_list(&items), "- a\n- b");
    }

    #[test]
    fn similarity_prompt_lists_both_sides() {
        let prompt = similarity_user(&["new".into()], &["old".into()]);
        assert!(prompt.contains("Previous queries:\n- old"));
        assert!(prompt.contains("New queries to check:\n- new"));
    }

    #[test]
    fn next_query_prompt_carries_history() {
        let prompt = next_query_user(
            "best hiking boots",
            &["waterproof hiking boots".into()],
            &["A: x".into()],
        );
        assert!(prompt.contains("Original search goal: best hiking boots"));
        assert!(prompt.contains("- waterproof hiking boots"));
        assert!(prompt.contains("- A: x"));
    }

    #[test]
    fn interpret_prompt_names_all_fields() {
        let prompt = interpret_user("q");
        for field in [
            "original_query",
            "interpreted_intent",
            "suggested_improvements",
            "search_keywords",
        ] {
            assert!(prompt.contains(field), "{field}");
        }
    }
}
