use crate::groq_client::PromptMessage;
use crate::recommender::RecommendationRecord;

const GENERAL_SYSTEM_PROMPT: &str = "You are a helpful music assistant. You can recommend songs \
based on lyrics similarity. Ask the user for a song name if they want recommendations.";

const FORMAT_SYSTEM_PROMPT: &str =
    "You are a helpful music assistant. Format the following recommendations in a friendly way.";

pub fn general_chat(user_input: &str) -> Vec<PromptMessage> {
    vec![
        PromptMessage::system(GENERAL_SYSTEM_PROMPT),
        PromptMessage::user(user_input),
    ]
}

pub fn format_recommendations(user_input: &str, recommendations: &str) -> Vec<PromptMessage> {
    vec![
        PromptMessage::system(FORMAT_SYSTEM_PROMPT),
        PromptMessage::user(format!(
            "The user asked: {}\n\nRecommendations:\n{}",
            user_input, recommendations
        )),
    ]
}

/// One `- <song> by <artist>` line per record, in the order given.
pub fn render_list(records: &[RecommendationRecord]) -> String {
    records
        .iter()
        .map(|r| format!("- {} by {}\n", r.song, r.artist))
        .collect()
}
