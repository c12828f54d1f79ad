use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub struct KeyHandler;

impl KeyHandler {
    pub fn handle_normal_mode_key(key_event: KeyEvent) -> NormalModeAction {
        match key_event.code {
            KeyCode::Char('q') => NormalModeAction::Quit,
            KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                NormalModeAction::Quit
            }
            KeyCode::Esc => NormalModeAction::DismissNotice,
            KeyCode::Up | KeyCode::Char('k') => NormalModeAction::MoveSelectionUp,
            KeyCode::Down | KeyCode::Char('j') => NormalModeAction::MoveSelectionDown,
            KeyCode::Char('+') | KeyCode::Char('a') => NormalModeAction::ToggleForm,
            KeyCode::Char('e') | KeyCode::Enter => NormalModeAction::StartEdit,
            KeyCode::Char('d') | KeyCode::Delete => NormalModeAction::DeleteSelected,
            KeyCode::Char('S') => NormalModeAction::SignOut,
            KeyCode::Char('?') => NormalModeAction::ToggleHelpMode,
            _ => NormalModeAction::None,
        }
    }

    pub fn handle_help_mode_key(key_event: KeyEvent) -> HelpModeAction {
        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc | KeyCode::Char('?') => {
                HelpModeAction::ExitHelpMode
            }
            _ => HelpModeAction::None,
        }
    }

    /// Keys while a text entry (new-todo form or inline edit) has focus.
    pub fn handle_input_mode_key(key_event: KeyEvent) -> InputModeAction {
        let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);
        match key_event.code {
            KeyCode::Char('c') if ctrl => InputModeAction::Quit,
            KeyCode::Char('w') if ctrl => InputModeAction::DeleteWordBackward,
            KeyCode::Esc => InputModeAction::Cancel,
            KeyCode::Enter => InputModeAction::Submit,
            KeyCode::Backspace => InputModeAction::Backspace,
            KeyCode::Delete => InputModeAction::Delete,
            KeyCode::Left => InputModeAction::MoveCursorLeft,
            KeyCode::Right => InputModeAction::MoveCursorRight,
            KeyCode::Home => InputModeAction::MoveCursorHome,
            KeyCode::End => InputModeAction::MoveCursorEnd,
            KeyCode::Char(c) => InputModeAction::InsertChar(c),
            _ => InputModeAction::None,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum NormalModeAction {
    None,
    Quit,
    DismissNotice,
    MoveSelectionUp,
    MoveSelectionDown,
    ToggleForm,
    StartEdit,
    DeleteSelected,
    SignOut,
    ToggleHelpMode,
}

#[derive(Debug, PartialEq)]
pub enum HelpModeAction {
    None,
    ExitHelpMode,
}

#[derive(Debug, PartialEq)]
pub enum InputModeAction {
    None,
    Quit,
    Cancel,
    Submit,
    Backspace,
    Delete,
    DeleteWordBackward,
    MoveCursorLeft,
    MoveCursorRight,
    MoveCursorHome,
    MoveCursorEnd,
    InsertChar(char),
}
