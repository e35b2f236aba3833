//! Test fixtures for agents, pipelines and project directories.

use ar_core::agents::new_agent;
use ar_core::state::PipelineState;
use ar_protocol::AgentConfig;
use tempfile::TempDir;

/// An agent named `name` using `model`, with an empty user prompt.
#[allow(dead_code)]
pub fn agent(name: &str, model: &str) -> AgentConfig {
    let mut agent = new_agent(0);
    agent.name = name.to_string();
    agent.model = model.to_string();
    agent.user_prompt = String::new();
    agent
}

/// A pipeline of `count` default-configured agents over `document`.
#[allow(dead_code)]
pub fn pipeline(count: usize, document: &str) -> PipelineState {
    let mut state = PipelineState::new((0..count).map(new_agent).collect());
    state.set_document_text(document);
    state
}

/// A project directory with a `.agent-relay/` holding two agents and a
/// pipeline over them.
///
/// Returns a TempDir that must be kept alive for the test duration.
#[allow(dead_code)]
pub fn create_test_project() -> std::io::Result<TempDir> {
    let temp_dir = tempfile::tempdir()?;
    let relay = temp_dir.path().join(".agent-relay");

    std::fs::create_dir_all(relay.join("agents"))?;
    std::fs::create_dir_all(relay.join("pipelines"))?;

    std::fs::write(relay.join("config.toml"), "substitute_delay_ms = 0\n")?;
    std::fs::write(
        relay.join("agents/extractor.md"),
        "---\nname: extractor\nmodel: gemini-2.5-flash\nuser-prompt: Extract:\n---\n\nExtract the key facts.\n",
    )?;
    std::fs::write(
        relay.join("agents/reporter.md"),
        "---\nname: reporter\nmodel: grok-3-mini\nuser-prompt: Report on:\n---\n\nWrite a short report.\n",
    )?;
    std::fs::write(
        relay.join("pipelines/review.yaml"),
        "name: review\nagents:\n  - extractor\n  - reporter\n",
    )?;

    Ok(temp_dir)
}
