//! Editing the agent list.
//!
//! Every structural change keeps the output list positionally aligned with
//! the agent list. Positions are indices, not identities: removing an agent
//! shifts every later agent and output down by one.

use super::pipeline::PipelineState;
use crate::agents::defaults::new_agent;
use ar_protocol::{AgentConfig, AgentField, AgentOutput};

/// Mutable view over a [`PipelineState`] for configuration edits.
pub struct PipelineEditor<'a> {
    state: &'a mut PipelineState,
}

impl PipelineState {
    /// Borrow the state for editing.
    pub fn editor(&mut self) -> PipelineEditor<'_> {
        PipelineEditor { state: self }
    }
}

impl<'a> PipelineEditor<'a> {
    /// Append an agent with default settings and a zero-valued output slot.
    ///
    /// Returns the new agent's position.
    pub fn add_agent(&mut self) -> usize {
        let position = self.state.agents.len();
        self.add_agent_with(new_agent(position))
    }

    /// Append `agent` with a zero-valued output slot.
    pub fn add_agent_with(&mut self, agent: AgentConfig) -> usize {
        let position = self.state.agents.len();
        self.state.agents.push(agent);
        self.state.outputs.truncate(position);
        self.state.ensure_slot(position);
        position
    }

    /// Remove the agent and the output slot at `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position` is out of range.
    pub fn remove_agent(&mut self, position: usize) -> (AgentConfig, AgentOutput) {
        self.check(position);
        let agent = self.state.agents.remove(position);
        let output = if position < self.state.outputs.len() {
            self.state.outputs.remove(position)
        } else {
            AgentOutput::default()
        };
        (agent, output)
    }

    /// Replace one configuration field of the agent at `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position` is out of range.
    pub fn edit_field(&mut self, position: usize, field: AgentField) {
        self.check(position);
        field.apply(&mut self.state.agents[position]);
    }

    /// Overwrite the input fed to the agent at `position`.
    ///
    /// A later successful run of `position - 1` overwrites this edit again.
    ///
    /// # Panics
    ///
    /// Panics if `position` is out of range.
    pub fn set_input(&mut self, position: usize, text: impl Into<String>) {
        self.check(position);
        self.state.ensure_slot(position);
        self.state.outputs[position].input = text.into();
    }

    fn check(&self, position: usize) {
        assert!(
            position < self.state.agents.len(),
            "position {} out of range for pipeline of {} agents",
            position,
            self.state.agents.len()
        );
    }
}
