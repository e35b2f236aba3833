//! Terminal rendering of events, pipeline snapshots and metrics.

use ar_protocol::{Event, MetricsSummary, PipelineSnapshot, Provider, RunStatus};
use colored::Colorize;

/// Width of the longest latency bar in the metrics view.
const BAR_WIDTH: f64 = 40.0;

/// One line describing a core event, or `None` for events that are shown
/// some other way.
pub fn event_line(event: &Event) -> Option<String> {
    let line = match event {
        Event::AgentAdded { position, name } => format!("added #{} {}", position, name),
        Event::AgentRemoved { position } => format!("removed #{}", position),
        Event::AgentEdited { position, field } => format!("#{} {} updated", position, field),
        Event::InputEdited { position } => format!("#{} input updated", position),
        Event::DocumentUpdated { length } => format!("document text set ({} chars)", length),
        Event::CredentialMissing { provider, .. } => format!(
            "{} API key missing, using a substitute result",
            provider
        )
        .yellow()
        .to_string(),
        Event::CredentialUpdated { provider, present } => {
            let state = if *present { "stored" } else { "cleared" };
            format!("{} key {}", provider, state)
        }
        Event::RunStarted { position, .. } => format!("#{} running...", position).cyan().to_string(),
        Event::RunCompleted {
            position, metric, ..
        } => format!(
            "#{} {} done in {:.2}s, {} tokens via {}",
            position, metric.agent, metric.latency_seconds, metric.token_count, metric.provider_label
        )
        .green()
        .to_string(),
        Event::RunRejected { position, reason } => {
            format!("run #{} refused: {}", position, reason).red().to_string()
        }
        Event::EditRejected { reason } => format!("edit refused: {}", reason).red().to_string(),
        Event::Snapshot { .. } => return None,
    };
    Some(line)
}

/// Compact listing of every agent and the state of its output slot.
pub fn pipeline_table(snapshot: &PipelineSnapshot) -> String {
    let mut lines = Vec::new();

    let status = match snapshot.status {
        RunStatus::Idle => "idle".to_string(),
        RunStatus::Running { position } => format!("running #{}", position),
    };
    lines.push(format!(
        "{} agents, document {} chars, {}",
        snapshot.agents.len(),
        snapshot.document_text.chars().count(),
        status
    ));

    for (position, agent) in snapshot.agents.iter().enumerate() {
        let provider = Provider::from_model_id(&agent.model);
        let mut line = format!(
            "#{:<2} {} [{} / {}]",
            position,
            agent.name.bold(),
            agent.model,
            provider
        );
        if let Some(output) = snapshot.outputs.get(position) {
            line.push_str(&format!(" in {} chars", output.input.chars().count()));
            if output.has_run() {
                line.push_str(&format!(
                    ", out {} chars, {:.2}s, {} tokens",
                    output.output.chars().count(),
                    output.elapsed_seconds,
                    output.token_count
                ));
            }
        }
        lines.push(line);
    }

    lines.join("\n")
}

/// Full configuration, input and output of the agent at `position`.
pub fn agent_detail(snapshot: &PipelineSnapshot, position: usize) -> Option<String> {
    let agent = snapshot.agents.get(position)?;
    let output = snapshot.outputs.get(position).cloned().unwrap_or_default();

    let mut text = format!(
        "#{} {}\n{}\nmodel {} ({}), temperature {}, top-p {}, max tokens {}\n",
        position,
        agent.name.bold(),
        agent.description.dimmed(),
        agent.model,
        Provider::from_model_id(&agent.model),
        agent.temperature,
        agent.top_p,
        agent.max_tokens
    );
    text.push_str(&format!("\n{}\n{}\n", "system".underline(), agent.system_prompt));
    text.push_str(&format!("\n{}\n{}\n", "user".underline(), agent.user_prompt));
    text.push_str(&format!("\n{}\n{}\n", "input".underline(), output.input));
    if output.has_run() {
        text.push_str(&format!(
            "\n{} ({}, {:.2}s, {} tokens)\n{}\n",
            "output".underline(),
            output.provider_label,
            output.elapsed_seconds,
            output.token_count,
            output.output
        ));
    }
    Some(text)
}

/// Run log summary with one latency bar per run.
pub fn metrics_view(summary: &MetricsSummary) -> String {
    let Some(mean) = summary.mean_latency_seconds() else {
        return "no runs yet".to_string();
    };

    let mut lines = vec![format!(
        "{} runs, {} tokens, mean latency {:.2}s",
        summary.run_count(),
        summary.total_tokens,
        mean
    )];

    let slowest = summary
        .runs
        .iter()
        .map(|run| run.latency_seconds)
        .fold(0.0_f64, f64::max);
    for run in &summary.runs {
        let width = if slowest > 0.0 {
            (run.latency_seconds / slowest * BAR_WIDTH).round() as usize
        } else {
            0
        };
        lines.push(format!(
            "  {:>7.2}s {} {}",
            run.latency_seconds,
            "#".repeat(width).blue(),
            run.agent
        ));
    }

    lines.push("by provider:".to_string());
    for (label, count) in &summary.runs_by_provider {
        lines.push(format!("  {:<10} {}", label, count));
    }

    lines.join("\n")
}

/// Known model identifiers grouped by provider.
pub fn model_list() -> String {
    Provider::CREDENTIALED
        .iter()
        .flat_map(|provider| {
            provider
                .models()
                .map(move |model| format!("{:<28} {}", model, provider))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Warning naming the providers without a key, or `None` when all have one.
pub fn missing_keys_line(missing: &[Provider]) -> Option<String> {
    if missing.is_empty() {
        return None;
    }
    let names: Vec<&str> = missing.iter().map(Provider::label).collect();
    Some(
        format!(
            "no API key for {}; their agents get substitute results",
            names.join(", ")
        )
        .yellow()
        .to_string(),
    )
}
