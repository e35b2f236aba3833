//! Parsing of interactive session commands.
//!
//! Each input line becomes either an [`Op`] for the core or a local action
//! handled by the session itself.

use ar_protocol::{AgentField, Op, Provider};
use color_eyre::eyre::{bail, eyre, Result};
use std::path::PathBuf;

/// A parsed session command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Forward to the core.
    Op(Op),
    /// Run the agent at a position, asking for a missing credential first.
    Run(usize),
    /// Replace the document text with a file's contents.
    Load(PathBuf),
    /// Print the pipeline, or one agent in full.
    Show(Option<usize>),
    Metrics,
    Models,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  add                          append an agent with default settings
  rm <pos>                     remove the agent at <pos>
  set <pos> <field> <value>    edit a field (name, description, system, user,
                               model, temperature, top-p, max-tokens)
  input <pos> <text>           overwrite the input of the agent at <pos>
  doc <text>                   replace the document text
  load <path>                  replace the document text from a file
  run <pos>                    run the agent at <pos>
  show [pos]                   print the pipeline, or one agent in full
  metrics                      run log summary
  key <provider> [secret]      store a credential (no secret clears it)
  models                       list known model identifiers
  help                         this text
  quit                         leave the session";

/// Parse one input line. Returns `Ok(None)` for a blank line.
pub fn parse_line(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "" => return Ok(None),
        "add" => Command::Op(Op::AddAgent),
        "rm" | "remove" => Command::Op(Op::RemoveAgent {
            position: position(rest)?,
        }),
        "set" => {
            let (pos, rest) = split_word(rest).ok_or_else(|| eyre!("usage: set <pos> <field> <value>"))?;
            let (field, value) = split_word(rest).ok_or_else(|| eyre!("usage: set <pos> <field> <value>"))?;
            Command::Op(Op::EditAgent {
                position: position(pos)?,
                field: parse_field(field, value)?,
            })
        }
        "input" => {
            let (pos, text) = split_word(rest).ok_or_else(|| eyre!("usage: input <pos> <text>"))?;
            Command::Op(Op::SetInput {
                position: position(pos)?,
                text: text.to_string(),
            })
        }
        "doc" => Command::Op(Op::SetDocumentText {
            text: rest.to_string(),
        }),
        "load" => {
            if rest.is_empty() {
                bail!("usage: load <path>");
            }
            Command::Load(PathBuf::from(rest))
        }
        "run" => Command::Run(position(rest)?),
        "show" => Command::Show(if rest.is_empty() {
            None
        } else {
            Some(position(rest)?)
        }),
        "metrics" => Command::Metrics,
        "key" => {
            let (name, secret) = split_word(rest).unwrap_or((rest, ""));
            let provider: Provider = name.parse()?;
            Command::Op(Op::SetCredential {
                provider,
                secret: secret.to_string(),
            })
        }
        "models" => Command::Models,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => bail!("unknown command '{}'; type 'help'", other),
    };

    Ok(Some(command))
}

/// Build the field edit for `name` from its textual `value`.
pub fn parse_field(name: &str, value: &str) -> Result<AgentField> {
    let value = value.to_string();
    let field = match name {
        "name" => AgentField::Name(value),
        "description" => AgentField::Description(value),
        "system" | "system-prompt" => AgentField::SystemPrompt(value),
        "user" | "user-prompt" => AgentField::UserPrompt(value),
        "model" => AgentField::Model(value),
        "temperature" => AgentField::Temperature(number(name, &value)?),
        "top-p" => AgentField::TopP(number(name, &value)?),
        "max-tokens" => AgentField::MaxTokens(number(name, &value)?),
        other => bail!("unknown field '{}'", other),
    };
    Ok(field)
}

fn split_word(text: &str) -> Option<(&str, &str)> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some(match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    })
}

fn position(text: &str) -> Result<usize> {
    text.trim()
        .parse()
        .map_err(|_| eyre!("expected a position, got '{}'", text.trim()))
}

fn number<T: std::str::FromStr>(field: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| eyre!("invalid value '{}' for {}", value.trim(), field))
}
