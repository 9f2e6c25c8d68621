use serde::{Deserialize, Serialize};

/// Wording around the retrieved context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptTemplate {
    /// Sent as the system message.
    pub system_prompt: String,
    /// Heading placed above the retrieved passages.
    pub knowledge_label: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            system_prompt: "You answer questions using only the supplied knowledge. \
                            Name the specific places or sources it mentions and keep the answer under 300 characters."
                .into(),
            knowledge_label: "Knowledge".into(),
        }
    }
}

/// Render the user message: instruction, labelled knowledge block, the
/// question, then an answer cue.
pub fn build_prompt(query: &str, context: &str, template: &PromptTemplate) -> String {
    let mut prompt = String::with_capacity(context.len() + query.len() + 128);
    prompt.push_str("Answer the question using the information below.\n\n");
    prompt.push_str(&template.knowledge_label);
    prompt.push_str(":\n");
    prompt.push_str(context.trim());
    prompt.push_str("\n\nQuestion:\n");
    prompt.push_str(query.trim());
    prompt.push_str("\n\nAnswer:\n");
    prompt
}
