//! Per-request planning context.
//!
//! Everything here is prepared before planning starts: the conversation
//! window snapshot, optional project context, and retrieved facts.

use goal_agent_core::types::{ConversationTurn, ConversationWindow, Fact};

/// Project the user is currently working in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    pub name: String,
    /// Free-text description or file listing.
    pub summary: String,
}

/// Context rendered into planner instructions.
#[derive(Debug, Clone, Default)]
pub struct PlanningContext {
    pub history: Vec<ConversationTurn>,
    pub project: Option<ProjectContext>,
    pub facts: Vec<Fact>,
}

impl PlanningContext {
    pub fn new(history: &ConversationWindow) -> Self {
        Self {
            history: history.to_vec(),
            project: None,
            facts: Vec::new(),
        }
    }

    pub fn with_project(mut self, project: Option<ProjectContext>) -> Self {
        self.project = project;
        self
    }

    pub fn with_facts(mut self, facts: Vec<Fact>) -> Self {
        self.facts = facts;
        self
    }

    /// Render the non-empty sections, each followed by a blank line.
    pub fn render(&self) -> String {
        let mut out = String::new();

        if !self.history.is_empty() {
            out.push_str("Recent conversation:\n");
            for turn in &self.history {
                out.push_str(&format!("{}: {}\n", turn.role, turn.content));
            }
            out.push('\n');
        }

        if let Some(project) = &self.project {
            out.push_str(&format!("Current project: {}\n", project.name));
            if !project.summary.trim().is_empty() {
                out.push_str(project.summary.trim());
                out.push('\n');
            }
            out.push('\n');
        }

        if !self.facts.is_empty() {
            out.push_str("Things I know that may be relevant:\n");
            for fact in &self.facts {
                out.push_str(&fact.render());
                out.push('\n');
            }
            out.push('\n');
        }

        out
    }
}

/// Lowercased whitespace-separated words of a goal, used as fact keywords.
pub fn goal_keywords(goal: &str) -> Vec<String> {
    goal.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_context_renders_nothing() {
        assert_eq!(PlanningContext::default().render(), "");
    }

    #[test]
    fn test_render_sections() {
        let mut window = ConversationWindow::new(5);
        window.record_exchange("hi", "hello!");

        let ctx = PlanningContext::new(&window)
            .with_project(Some(ProjectContext {
                name: "hangman".into(),
                summary: "A terminal word game".into(),
            }))
            .with_facts(vec![Fact::new("User likes Rust", "user_preference", "chat")]);

        let text = ctx.render();
        assert!(text.contains("user: hi\nassistant: hello!"));
        assert!(text.contains("Current project: hangman\nA terminal word game"));
        assert!(text.contains("- User likes Rust (Category: user_preference, Source: chat)"));
        assert!(text.ends_with("\n\n"));
    }

    #[test]
    fn test_goal_keywords() {
        assert_eq!(goal_keywords("Greet  JOHN please"), vec!["greet", "john", "please"]);
    }
}
