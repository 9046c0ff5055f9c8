//! Bounded tool-calling exchange for diffs too large to send inline.
//!
//! The model sees only the changed-file list and pulls individual file
//! diffs through `get_file_diff`. Each request/dispatch cycle counts as one
//! iteration; the loop stops at the first reply without tool requests or
//! when the bound is reached.

use crate::constants::FILE_PATH_ARG;
use crate::llm::{AgentTurn, Conversation, ModelClient, ToolDeclaration, ToolKind, ToolRequest};
use crate::{TickerError, TickerResult};

enum LoopState {
    AwaitModel,
    Dispatch(AgentTurn),
    Done(AgentTurn),
    Exhausted,
}

pub struct ToolExchange<'a> {
    client: &'a dyn ModelClient,
    max_iterations: u32,
    tools: Vec<ToolDeclaration>,
}

impl<'a> ToolExchange<'a> {
    pub fn new(client: &'a dyn ModelClient, max_iterations: u32) -> Self {
        Self {
            client,
            max_iterations: max_iterations.max(1),
            tools: vec![ToolDeclaration::get_file_diff()],
        }
    }

    /// Drive `conversation` to a final answer. `file_diff` serves
    /// `get_file_diff` requests; its errors are reported to the model
    /// rather than returned.
    pub fn run<F>(&self, mut conversation: Conversation, mut file_diff: F) -> TickerResult<String>
    where
        F: FnMut(&str) -> TickerResult<String>,
    {
        if !self.client.supports_tools() {
            return Err(TickerError::Config(format!(
                "Model client '{}' cannot call tools; oversized diffs need tool support",
                self.client.name()
            )));
        }

        let mut state = LoopState::AwaitModel;
        loop {
            state = match state {
                LoopState::AwaitModel => {
                    let turn = self
                        .client
                        .invoke_with_tools(&conversation, &self.tools)
                        .map_err(|e| {
                            TickerError::Summarization(format!("Failed to generate commit summary: {}", e))
                        })?;
                    if turn.has_tool_requests() {
                        LoopState::Dispatch(turn)
                    } else {
                        LoopState::Done(turn)
                    }
                }
                LoopState::Dispatch(turn) => {
                    let results: Vec<(String, String)> = turn
                        .tool_requests
                        .iter()
                        .map(|req| (req.id.clone(), resolve(req, &mut file_diff)))
                        .collect();
                    conversation.push_agent(turn);
                    for (id, content) in results {
                        conversation.push_tool_result(id, content);
                    }
                    let iterations = conversation.record_iteration();
                    tracing::debug!(iteration = iterations, max = self.max_iterations, "Tool round complete");
                    if iterations < self.max_iterations {
                        LoopState::AwaitModel
                    } else {
                        LoopState::Exhausted
                    }
                }
                LoopState::Done(turn) => {
                    tracing::info!(iterations = conversation.iterations(), "Tool exchange finished");
                    return Ok(turn.content.normalize());
                }
                LoopState::Exhausted => {
                    tracing::warn!(max = self.max_iterations, "Tool exchange hit iteration bound");
                    return conversation
                        .last_agent_turn()
                        .map(|t| t.content.normalize())
                        .filter(|text| !text.trim().is_empty())
                        .ok_or(TickerError::ToolLoopExhausted(self.max_iterations));
                }
            };
        }
    }
}

fn resolve<F>(req: &ToolRequest, file_diff: &mut F) -> String
where
    F: FnMut(&str) -> TickerResult<String>,
{
    match ToolKind::from_name(&req.name) {
        ToolKind::GetFileDiff => {
            let path = req.string_arg(FILE_PATH_ARG).unwrap_or_default();
            match file_diff(path) {
                Ok(diff) => {
                    tracing::debug!(file = path, chars = diff.chars().count(), "Served file diff");
                    diff
                }
                Err(e) => {
                    tracing::warn!(file = path, error = %e, "File diff unavailable");
                    format!("Error getting diff for {}: {}", path, e)
                }
            }
        }
        ToolKind::Unrecognized(name) => {
            tracing::warn!(tool = %name, "Model requested unknown tool");
            format!("Unknown tool: {}", name)
        }
    }
}
