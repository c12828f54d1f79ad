use crate::remote::{Gateway, GatewayError};
use crate::todo::models::{Todo, TodoId};
use std::fmt;
use tracing::{debug, warn};

/// A user intent that has passed local validation and is ready for the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create { content: String },
    /// `session` identifies the edit that produced this update.
    Update { id: TodoId, content: String, session: u64 },
    Delete { id: TodoId },
}

impl Command {
    pub fn verb(&self) -> &'static str {
        match self {
            Command::Create { .. } => "create",
            Command::Update { .. } => "update",
            Command::Delete { .. } => "delete",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Create { content } => write!(f, "create \"{}\"", content),
            Command::Update { id, content, .. } => {
                write!(f, "update {} to \"{}\"", id, content)
            }
            Command::Delete { id } => write!(f, "delete {}", id),
        }
    }
}

/// What the gateway said about a [`Command`], delivered back to the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Created(Todo),
    Updated { todo: Todo, session: u64 },
    Deleted(TodoId),
    Failed { command: Command, error: GatewayError },
}

/// Sends one command to the gateway and waits for its answer. Never retries.
pub async fn run(gateway: &dyn Gateway, command: Command) -> CommandOutcome {
    debug!(%command, "dispatching");
    let result = match command.clone() {
        Command::Create { content } => gateway.create(content).await.map(CommandOutcome::Created),
        Command::Update { id, content, session } => gateway
            .update(id, content)
            .await
            .map(|todo| CommandOutcome::Updated { todo, session }),
        Command::Delete { id } => gateway
            .delete(id.clone())
            .await
            .map(|()| CommandOutcome::Deleted(id)),
    };

    match result {
        Ok(outcome) => {
            debug!(%command, "confirmed");
            outcome
        }
        Err(error) => {
            warn!(%command, %error, "gateway rejected command");
            CommandOutcome::Failed { command, error }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::recording::{Call, RecordingGateway};

    #[tokio::test]
    async fn test_run_create_calls_gateway_once() {
        let gateway = RecordingGateway::new();
        let outcome = run(
            &gateway,
            Command::Create {
                content: "milk".to_string(),
            },
        )
        .await;

        assert!(matches!(outcome, CommandOutcome::Created(ref todo) if todo.content == "milk"));
        assert_eq!(gateway.calls(), vec![Call::Create("milk".to_string())]);
    }

    #[tokio::test]
    async fn test_run_update_carries_edit_session() {
        let gateway = RecordingGateway::new();
        let outcome = run(
            &gateway,
            Command::Update {
                id: TodoId::new("1"),
                content: "new".to_string(),
                session: 9,
            },
        )
        .await;

        assert_eq!(
            outcome,
            CommandOutcome::Updated {
                todo: Todo::new(TodoId::new("1"), "new".to_string()),
                session: 9,
            }
        );
    }

    #[tokio::test]
    async fn test_run_delete_reports_id() {
        let gateway = RecordingGateway::new();
        let id = TodoId::new("7");
        let outcome = run(&gateway, Command::Delete { id: id.clone() }).await;

        assert_eq!(outcome, CommandOutcome::Deleted(id.clone()));
        assert_eq!(gateway.calls(), vec![Call::Delete(id)]);
    }

    #[tokio::test]
    async fn test_run_failure_keeps_command() {
        let gateway = RecordingGateway::failing(GatewayError::Unavailable("offline".to_string()));
        let command = Command::Update {
            id: TodoId::new("1"),
            content: "x".to_string(),
            session: 1,
        };
        let outcome = run(&gateway, command.clone()).await;

        assert_eq!(
            outcome,
            CommandOutcome::Failed {
                command,
                error: GatewayError::Unavailable("offline".to_string()),
            }
        );
    }

    #[test]
    fn test_command_display() {
        let command = Command::Update {
            id: TodoId::new("3"),
            content: "walk dog".to_string(),
            session: 4,
        };
        assert_eq!(command.to_string(), "update 3 to \"walk dog\"");
        assert_eq!(command.verb(), "update");
    }
}
