use crate::sync::SyncStatus;
use crate::sync::commands::{Command, CommandOutcome};
use crate::todo::models::{Todo, TodoId, normalize_content};
use crate::tui::edit::TextInput;
use crate::tui::navigation::NavigationState;
use tracing::debug;

/// Which text entry, if any, receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Form,
    Edit,
}

/// Everything the todo screen shows.
///
/// `items` and `sync_status` change only through [`ViewState::apply_snapshot`]
/// and [`ViewState::mark_stale`]; the remaining fields belong to the command
/// handlers.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub items: Vec<Todo>,
    pub sync_status: SyncStatus,
    pub draft: TextInput,
    pub editing_id: Option<TodoId>,
    pub edit_draft: TextInput,
    /// Bumped by every [`ViewState::start_edit`]; tags update commands so a
    /// late answer cannot close a newer edit.
    pub edit_session: u64,
    pub form_visible: bool,
    pub notice: Option<String>,
    pub create_in_flight: bool,
    pub update_in_flight: Option<u64>,
    pub navigation: NavigationState,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            sync_status: SyncStatus::Connecting,
            draft: TextInput::new(),
            editing_id: None,
            edit_draft: TextInput::new(),
            edit_session: 0,
            form_visible: false,
            notice: None,
            create_in_flight: false,
            update_in_flight: None,
            navigation: NavigationState::new(),
        }
    }

    pub fn input_mode(&self) -> InputMode {
        if self.editing_id.is_some() {
            InputMode::Edit
        } else if self.form_visible {
            InputMode::Form
        } else {
            InputMode::Normal
        }
    }

    pub fn selected(&self) -> Option<&Todo> {
        self.items.get(self.navigation.selected_index)
    }

    pub fn is_editing(&self, id: &TodoId) -> bool {
        self.editing_id.as_ref() == Some(id)
    }

    pub fn in_flight(&self) -> bool {
        self.create_in_flight || self.update_in_flight.is_some()
    }

    /// Replaces the mirror with a pushed snapshot, as delivered.
    pub fn apply_snapshot(&mut self, items: Vec<Todo>) {
        debug!(items = items.len(), "applying snapshot");
        self.items = items;
        self.sync_status = SyncStatus::Live;
        self.navigation.clamp(self.items.len());
    }

    pub fn mark_stale(&mut self, reason: String) {
        self.sync_status = SyncStatus::Stale(reason);
    }

    pub fn mark_closed(&mut self) {
        self.sync_status = SyncStatus::Closed;
    }

    /// True when the row being edited is absent from the current snapshot.
    pub fn edit_target_missing(&self) -> bool {
        match &self.editing_id {
            Some(id) => !self.items.iter().any(|todo| &todo.id == id),
            None => false,
        }
    }

    pub fn toggle_form(&mut self) {
        self.form_visible = !self.form_visible;
    }

    /// Validates the new-todo draft. Blank drafts, or a create already
    /// waiting on the gateway, leave everything as it was.
    pub fn prepare_create(&mut self) -> Option<Command> {
        if self.create_in_flight {
            return None;
        }
        let content = normalize_content(self.draft.text())?;
        self.create_in_flight = true;
        Some(Command::Create { content })
    }

    /// Puts one row into edit mode, abandoning any other edit.
    pub fn start_edit(&mut self, id: TodoId, content: &str) {
        self.editing_id = Some(id);
        self.edit_draft = TextInput::with_text(content);
        self.edit_session += 1;
    }

    pub fn start_edit_selected(&mut self) {
        if let Some(todo) = self.selected().cloned() {
            self.start_edit(todo.id, &todo.content);
        }
    }

    /// Validates the edit draft; a blank draft keeps the row in edit mode.
    pub fn prepare_update(&mut self) -> Option<Command> {
        let id = self.editing_id.clone()?;
        let session = self.edit_session;
        if self.update_in_flight == Some(session) {
            return None;
        }
        let content = normalize_content(self.edit_draft.text())?;
        self.update_in_flight = Some(session);
        Some(Command::Update {
            id,
            content,
            session,
        })
    }

    pub fn cancel_edit(&mut self) {
        self.editing_id = None;
        self.edit_draft.clear();
    }

    pub fn prepare_delete(&self, id: TodoId) -> Command {
        Command::Delete { id }
    }

    pub fn prepare_delete_selected(&self) -> Option<Command> {
        self.selected().map(|todo| self.prepare_delete(todo.id.clone()))
    }

    /// Applies the gateway's answer to an earlier command. The list itself is
    /// left alone: confirmed changes arrive with the next snapshot.
    pub fn complete(&mut self, outcome: CommandOutcome) {
        match outcome {
            CommandOutcome::Created(_) => {
                self.create_in_flight = false;
                self.draft.clear();
                self.form_visible = false;
            }
            CommandOutcome::Updated { session, .. } => {
                self.finish_update(session);
                // Only the edit that sent this update ends here.
                if self.editing_id.is_some() && self.edit_session == session {
                    self.cancel_edit();
                }
            }
            CommandOutcome::Deleted(_) => {}
            CommandOutcome::Failed { command, error } => {
                match &command {
                    Command::Create { .. } => self.create_in_flight = false,
                    Command::Update { session, .. } => self.finish_update(*session),
                    Command::Delete { .. } => {}
                }
                self.notice = Some(format!("Could not {} todo: {}", command.verb(), error));
            }
        }
    }

    fn finish_update(&mut self, session: u64) {
        if self.update_in_flight == Some(session) {
            self.update_in_flight = None;
        }
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }
}
