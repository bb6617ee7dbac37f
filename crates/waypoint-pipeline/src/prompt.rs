//! Prompt assembly: retrieved snippets and graph facts into a chat message list.

use std::collections::HashSet;
use std::fmt::Write as _;

use serde::Deserialize;

use waypoint_core::{ChatMessage, GraphFact, SemanticMatch, WaypointError};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a knowledgeable assistant helping users explore \
Vietnam travel insights. Use the semantic and graph context to answer factually and coherently. \
Avoid speculation. If unsure, state that clearly.";

/// `[pipeline.prompt]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptSettings {
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "default_snippet_chars")]
    pub snippet_chars: usize,
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_snippet_chars() -> usize {
    400
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            snippet_chars: default_snippet_chars(),
        }
    }
}

/// Builds the system + user message pair sent to the model.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    system_prompt: String,
    snippet_chars: usize,
}

impl PromptAssembler {
    pub fn new(settings: &PromptSettings) -> Self {
        Self {
            system_prompt: settings.system_prompt.clone(),
            snippet_chars: settings.snippet_chars,
        }
    }

    /// Assemble the message list for `query`.
    ///
    /// Empty `matches` or `facts` still yield a prompt, just with less
    /// context. A fact whose source is not one of the matches is rejected.
    pub fn assemble(
        &self,
        query: &str,
        matches: &[SemanticMatch],
        facts: &[GraphFact],
    ) -> Result<Vec<ChatMessage>, WaypointError> {
        let ids: HashSet<&str> = matches.iter().map(|m| m.id.as_str()).collect();
        if let Some(stray) = facts.iter().find(|f| !ids.contains(f.source_id.as_str())) {
            return Err(WaypointError::Assembly(format!(
                "graph fact source '{}' is not among the semantic matches",
                stray.source_id
            )));
        }

        let mut user = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(user, "User question: {query}\n");

        user.push_str("Relevant text snippets:\n");
        if matches.is_empty() {
            user.push_str("(none)\n");
        }
        for m in matches {
            let _ = writeln!(user, "- {}", self.snippet(m));
        }

        user.push_str("\nGraph relationships:\n");
        if facts.is_empty() {
            user.push_str("(none)\n");
        }
        for f in facts {
            let _ = writeln!(
                user,
                "- {} --({})--> {}: {}",
                f.source_id, f.relation, f.target_name, f.target_description
            );
        }

        user.push_str("\nAnswer concisely, using factual and contextual details where possible.");

        tracing::debug!(
            matches = matches.len(),
            facts = facts.len(),
            chars = user.len(),
            "Prompt assembled"
        );

        Ok(vec![
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(user),
        ])
    }

    fn snippet(&self, m: &SemanticMatch) -> String {
        match m.text() {
            Some(text) => text.chars().take(self.snippet_chars).collect(),
            None => match m.category() {
                Some(category) => format!("{} ({category})", m.id),
                None => m.id.clone(),
            },
        }
    }
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new(&PromptSettings::default())
    }
}
