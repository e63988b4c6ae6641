//! Workers command implementation

use crate::api::{JoinCommandRequest, ServerId};
use crate::cli::output::format_join_command;
use crate::cli::WorkersCommandArgs;
use crate::dispatch::ActionDispatcher;
use crate::modal::{Clipboard, JoinCommandModal, JoinPhase};

/// Handle `fleet workers command`
///
/// With `--raw` the command goes through `clipboard` alone and the returned
/// text is empty, so the output can be piped.
pub async fn handle_workers_command(
    args: &WorkersCommandArgs,
    dispatcher: &ActionDispatcher,
    clipboard: &dyn Clipboard,
) -> Result<String, Box<dyn std::error::Error>> {
    let request = JoinCommandRequest {
        server_id: args.server.as_deref().map(ServerId::from),
        worker_name: args.name.clone(),
    };

    let mut modal = JoinCommandModal::new();
    let command = match modal.open_with(dispatcher, request).await {
        JoinPhase::Ready(command) => command.clone(),
        JoinPhase::Failed(message) => {
            return Err(format!("Could not load join command: {}", message).into())
        }
        JoinPhase::Closed | JoinPhase::Loading => {
            return Err("Join command was not loaded".into())
        }
    };

    if args.raw {
        modal.copy(clipboard)?;
        return Ok(String::new());
    }
    Ok(format_join_command(&command))
}
