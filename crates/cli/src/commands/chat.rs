use std::io::{self, BufRead, Write};
use std::sync::Arc;

use pizzabot_agent::AgentRuntime;
use pizzabot_core::config::{AppConfig, LoadOptions};
use pizzabot_core::services::InMemoryPizzaService;
use tokio::runtime::Runtime;
use tracing::info;

const COMMAND: &str = "chat";

#[derive(Debug, Default)]
struct ChatSummary {
    turns: usize,
    ended: bool,
    order_id: Option<String>,
}

pub fn run(offline: bool) -> super::CommandResult {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_with_io(offline, stdin.lock(), stdout.lock())
}

/// Runs one conversation over the given line-oriented input and output.
pub fn run_with_io<R, W>(offline: bool, input: R, mut output: W) -> super::CommandResult
where
    R: BufRead,
    W: Write,
{
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return super::CommandResult::failure(COMMAND, "config_validation", error.to_string(), 2)
        }
    };

    let agent = if offline {
        AgentRuntime::offline(&config, Arc::new(InMemoryPizzaService::default()))
    } else {
        AgentRuntime::from_config(&config)
    };
    let agent = match agent {
        Ok(agent) => agent,
        Err(error) => {
            return super::CommandResult::failure(
                COMMAND,
                "runtime_init",
                format!("{error:#}"),
                3,
            )
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return super::CommandResult::failure(
                COMMAND,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            )
        }
    };

    match converse(&runtime, &agent, input, &mut output) {
        Ok(summary) => {
            info!(
                event_name = "cli.chat.finished",
                turns = summary.turns,
                ended = summary.ended,
                "chat session finished"
            );
            match summary.order_id {
                Some(order_id) => {
                    super::CommandResult::success(COMMAND, format!("order placed with id {order_id}"))
                }
                None if summary.ended => {
                    super::CommandResult::success(COMMAND, "conversation ended without an order")
                }
                None => super::CommandResult::success(
                    COMMAND,
                    "input closed before the conversation ended",
                ),
            }
        }
        Err(error) => super::CommandResult::failure(COMMAND, "io", error.to_string(), 4),
    }
}

fn converse<R, W>(
    runtime: &Runtime,
    agent: &AgentRuntime,
    mut input: R,
    output: &mut W,
) -> io::Result<ChatSummary>
where
    R: BufRead,
    W: Write,
{
    let (mut state, greeting) = agent.start_conversation();
    let mut summary = ChatSummary::default();
    writeln!(output, "bot> {greeting}")?;

    let mut line = String::new();
    loop {
        write!(output, "you> ")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            break;
        }
        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        let outcome = runtime.block_on(agent.handle_turn(&mut state, text));
        summary.turns += 1;
        for message in &outcome.messages {
            writeln!(output, "bot> {message}")?;
        }

        if outcome.ended {
            summary.ended = true;
            summary.order_id = outcome.order_id;
            break;
        }
    }

    output.flush()?;
    Ok(summary)
}
