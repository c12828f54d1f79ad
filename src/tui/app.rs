use crate::identity::{Identity, display_name};
use crate::remote::Gateway;
use crate::sync::commands::{self, Command, CommandOutcome};
use crate::sync::{SyncLoop, SyncUpdate};
use crate::tui::handlers::{HelpModeAction, InputModeAction, KeyHandler, NormalModeAction};
use crate::tui::state::{InputMode, ViewState};
use anyhow::Result;
use crossterm::event::KeyEvent;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Work that arrives without a key press.
#[derive(Debug)]
pub enum Background {
    Sync(SyncUpdate),
    Outcome(CommandOutcome),
}

pub struct App {
    pub state: ViewState,
    pub help_mode: bool,
    pub should_quit: bool,
    gateway: Arc<dyn Gateway>,
    identity: Box<dyn Identity>,
    sync: SyncLoop,
    outcomes_tx: mpsc::UnboundedSender<CommandOutcome>,
    outcomes_rx: mpsc::UnboundedReceiver<CommandOutcome>,
}

impl App {
    pub fn new(gateway: Arc<dyn Gateway>, identity: Box<dyn Identity>) -> Self {
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
        Self {
            state: ViewState::new(),
            help_mode: false,
            should_quit: false,
            gateway,
            identity,
            sync: SyncLoop::detached(),
            outcomes_tx,
            outcomes_rx,
        }
    }

    pub fn display_name(&self) -> String {
        display_name(self.identity.login_id().as_deref())
    }

    /// Opens the live query. A failure leaves the screen usable but stale.
    pub async fn mount(&mut self) {
        match SyncLoop::mount(self.gateway.as_ref()).await {
            Ok(sync) => self.sync = sync,
            Err(e) => {
                warn!(error = %e, "could not subscribe to todos");
                self.state.mark_stale(e.to_string());
            }
        }
    }

    pub fn unmount(&mut self) {
        self.sync.unmount();
        self.state.mark_closed();
    }

    #[cfg(test)]
    pub fn is_mounted(&self) -> bool {
        self.sync.is_mounted()
    }

    pub async fn next_background(&mut self) -> Background {
        tokio::select! {
            update = self.sync.next_update() => Background::Sync(update),
            Some(outcome) = self.outcomes_rx.recv() => Background::Outcome(outcome),
        }
    }

    pub fn handle_background(&mut self, background: Background) {
        match background {
            Background::Sync(update) => self.handle_sync_update(update),
            Background::Outcome(outcome) => self.state.complete(outcome),
        }
    }

    fn handle_sync_update(&mut self, update: SyncUpdate) {
        match update {
            // An edit in progress survives snapshots that lack its row.
            SyncUpdate::Snapshot(items) => self.state.apply_snapshot(items),
            SyncUpdate::Lost(reason) => self.state.mark_stale(reason),
        }
    }

    /// Hands a command to the gateway without blocking the screen; the
    /// answer comes back through [`App::next_background`].
    fn dispatch(&self, command: Command) {
        info!(%command, "sending to gateway");
        let gateway = Arc::clone(&self.gateway);
        let outcomes = self.outcomes_tx.clone();
        tokio::spawn(async move {
            let outcome = commands::run(gateway.as_ref(), command).await;
            // The receiver only goes away when the app is shutting down.
            let _ = outcomes.send(outcome);
        });
    }

    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> Result<()> {
        if self.help_mode {
            self.handle_help_mode_key(key_event);
            return Ok(());
        }

        match self.state.input_mode() {
            InputMode::Normal => self.handle_normal_mode_key(key_event)?,
            InputMode::Form | InputMode::Edit => self.handle_input_mode_key(key_event),
        }
        Ok(())
    }

    fn handle_help_mode_key(&mut self, key_event: KeyEvent) {
        match KeyHandler::handle_help_mode_key(key_event) {
            HelpModeAction::ExitHelpMode => self.help_mode = false,
            HelpModeAction::None => {}
        }
    }

    fn handle_normal_mode_key(&mut self, key_event: KeyEvent) -> Result<()> {
        match KeyHandler::handle_normal_mode_key(key_event) {
            NormalModeAction::Quit => self.should_quit = true,
            NormalModeAction::DismissNotice => self.state.dismiss_notice(),
            NormalModeAction::MoveSelectionUp => self.state.navigation.move_selection_up(),
            NormalModeAction::MoveSelectionDown => {
                let count = self.state.items.len();
                self.state.navigation.move_selection_down(count);
            }
            NormalModeAction::ToggleForm => self.state.toggle_form(),
            NormalModeAction::StartEdit => self.state.start_edit_selected(),
            NormalModeAction::DeleteSelected => {
                if let Some(command) = self.state.prepare_delete_selected() {
                    self.dispatch(command);
                }
            }
            NormalModeAction::SignOut => self.sign_out(),
            NormalModeAction::ToggleHelpMode => self.help_mode = true,
            NormalModeAction::None => {}
        }
        Ok(())
    }

    fn handle_input_mode_key(&mut self, key_event: KeyEvent) {
        let editing = self.state.input_mode() == InputMode::Edit;
        let action = KeyHandler::handle_input_mode_key(key_event);

        match action {
            InputModeAction::Quit => self.should_quit = true,
            InputModeAction::Cancel => {
                if editing {
                    self.state.cancel_edit();
                } else {
                    self.state.toggle_form();
                }
            }
            InputModeAction::Submit => {
                let command = if editing {
                    self.state.prepare_update()
                } else {
                    self.state.prepare_create()
                };
                if let Some(command) = command {
                    self.dispatch(command);
                }
            }
            InputModeAction::None => {}
            _ => {
                let input = if editing {
                    &mut self.state.edit_draft
                } else {
                    &mut self.state.draft
                };
                match action {
                    InputModeAction::Backspace => input.backspace(),
                    InputModeAction::Delete => input.delete(),
                    InputModeAction::DeleteWordBackward => input.delete_word_backward(),
                    InputModeAction::MoveCursorLeft => input.move_cursor_left(),
                    InputModeAction::MoveCursorRight => input.move_cursor_right(),
                    InputModeAction::MoveCursorHome => input.move_cursor_home(),
                    InputModeAction::MoveCursorEnd => input.move_cursor_end(),
                    InputModeAction::InsertChar(c) => input.insert_char(c),
                    _ => {}
                }
            }
        }
    }

    fn sign_out(&mut self) {
        match self.identity.sign_out() {
            Ok(()) => {
                self.unmount();
                self.should_quit = true;
            }
            Err(e) => {
                warn!(error = %e, "sign out failed");
                self.state.notice = Some(format!("Could not sign out: {}", e));
            }
        }
    }
}
