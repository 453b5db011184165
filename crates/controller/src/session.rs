//! Conversation session wrapper.

use std::sync::Arc;

use goal_agent_core::types::ConversationWindow;

use crate::context::ProjectContext;
use crate::orchestrator::Orchestrator;

/// A user session: one orchestrator plus the conversation window it carries
/// between requests.
pub struct Session {
    orchestrator: Arc<Orchestrator>,
    window: ConversationWindow,
    project: Option<ProjectContext>,
}

impl Session {
    /// Start a session keeping `max_turns` exchanges of history.
    pub fn new(orchestrator: Arc<Orchestrator>, max_turns: usize) -> Self {
        Self {
            orchestrator,
            window: ConversationWindow::new(max_turns),
            project: None,
        }
    }

    /// Set or clear the project the user is working in.
    pub fn set_project(&mut self, project: Option<ProjectContext>) {
        self.project = project;
    }

    /// Process a goal and record the exchange.
    pub async fn send(&mut self, goal: &str) -> (bool, String) {
        let (success, reply) = self
            .orchestrator
            .process_in_project(goal, &self.window, self.project.clone())
            .await;
        self.window.record_exchange(goal, reply.clone());
        (success, reply)
    }

    pub fn history(&self) -> &ConversationWindow {
        &self.window
    }

    pub fn clear_history(&mut self) {
        self.window.clear();
    }
}
