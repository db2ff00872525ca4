use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::cms::{AdminSession, EntryForm, FormMode, UpsertOutcome};
use crate::error::CmsError;
use crate::store::ContentStore;

use super::input::Input;

const TOAST_TTL: Duration = Duration::from_secs(4);

/// Creates and tears down admin sessions for the console.
pub(super) trait Connector<S> {
    fn connect(&self, token: &str) -> Result<AdminSession<S>>;
    fn disconnect(&self, session: AdminSession<S>) -> Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum ToastKind {
    Info,
    Success,
    Error,
}

#[derive(Clone, Debug)]
pub(super) struct Toast {
    pub(super) text: String,
    pub(super) kind: ToastKind,
    at: Instant,
}

impl Toast {
    pub(super) fn is_fresh(&self) -> bool {
        self.at.elapsed() < TOAST_TTL
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Field {
    Version,
    Date,
    Changes,
    Latest,
}

impl Field {
    fn next(self) -> Self {
        match self {
            Field::Version => Field::Date,
            Field::Date => Field::Changes,
            Field::Changes => Field::Latest,
            Field::Latest => Field::Version,
        }
    }

    fn prev(self) -> Self {
        match self {
            Field::Version => Field::Latest,
            Field::Date => Field::Version,
            Field::Changes => Field::Date,
            Field::Latest => Field::Changes,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Focus {
    List,
    Form(Field),
}

/// Work that talks to the remote. Queued by a key press and run after the next draw so
/// the "busy" state is on screen while it blocks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) enum Pending {
    Login(String),
    Save,
    Delete(usize),
    Reload,
    Logout,
}

pub(super) struct Editor<S> {
    pub(super) session: AdminSession<S>,
    pub(super) form: EntryForm,
    pub(super) version: Input,
    pub(super) date: Input,
    pub(super) changes: Input,
    pub(super) selected: usize,
    pub(super) focus: Focus,
    pub(super) confirm_delete: Option<usize>,
}

impl<S: ContentStore> Editor<S> {
    fn new(session: AdminSession<S>) -> Self {
        Self {
            session,
            form: EntryForm::new(),
            version: Input::default(),
            date: Input::default(),
            changes: Input::default(),
            selected: 0,
            focus: Focus::List,
            confirm_delete: None,
        }
    }

    fn entry_count(&self) -> usize {
        self.session.repository().len()
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.entry_count().saturating_sub(1));
    }

    fn sync_inputs_from_form(&mut self) {
        self.version = Input::with(&self.form.version);
        self.date = Input::with(&self.form.date);
        self.changes = Input::with(&self.form.changes);
    }

    fn sync_form_from_inputs(&mut self) {
        self.form.version = self.version.buf.clone();
        self.form.date = self.date.buf.clone();
        self.form.changes = self.changes.buf.clone();
    }

    fn start_new(&mut self) {
        self.form.cancel();
        self.sync_inputs_from_form();
        self.focus = Focus::Form(Field::Version);
    }

    fn start_edit(&mut self) {
        let Some(entry) = self.session.repository().get(self.selected).cloned() else {
            return;
        };
        self.form.begin_edit(self.selected, &entry);
        self.sync_inputs_from_form();
        self.focus = Focus::Form(Field::Version);
    }

    fn cancel_form(&mut self) {
        self.form.cancel();
        self.sync_inputs_from_form();
        self.focus = Focus::List;
    }

    /// Keeps the form and selection pointing at the same entries after a removal.
    fn entry_removed(&mut self, index: usize) {
        let was_editing = self.form.mode() == FormMode::Edit(index);
        self.form.entry_removed(index);
        if was_editing {
            self.sync_inputs_from_form();
            self.focus = Focus::List;
        }
        self.clamp_selection();
    }

    fn field_input(&mut self, field: Field) -> Option<&mut Input> {
        match field {
            Field::Version => Some(&mut self.version),
            Field::Date => Some(&mut self.date),
            Field::Changes => Some(&mut self.changes),
            Field::Latest => None,
        }
    }
}

pub(super) enum Screen<S> {
    Login { token: Input },
    Editor(Box<Editor<S>>),
}

pub(super) struct App<S> {
    pub(super) screen: Screen<S>,
    pub(super) pending: Option<Pending>,
    pub(super) toast: Option<Toast>,
    pub(super) quit: bool,
}

impl<S: ContentStore> App<S> {
    pub(super) fn login() -> Self {
        Self {
            screen: Screen::Login {
                token: Input::default(),
            },
            pending: None,
            toast: None,
            quit: false,
        }
    }

    pub(super) fn with_session(session: AdminSession<S>) -> Self {
        let mut app = Self::login();
        app.enter_editor(session);
        app
    }

    fn enter_editor(&mut self, mut session: AdminSession<S>) {
        let loaded = session.reload();
        let login = session.login().to_string();
        self.screen = Screen::Editor(Box::new(Editor::new(session)));
        match loaded {
            Ok(()) => self.notify(ToastKind::Success, format!("logged in as {}", login)),
            Err(err) => self.notify(ToastKind::Error, format!("load failed: {}", err)),
        }
    }

    pub(super) fn notify(&mut self, kind: ToastKind, text: impl Into<String>) {
        let text = text.into();
        match kind {
            ToastKind::Error => tracing::warn!("{}", text),
            _ => tracing::info!("{}", text),
        }
        self.toast = Some(Toast {
            text,
            kind,
            at: Instant::now(),
        });
    }

    pub(super) fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    fn queue(&mut self, pending: Pending) {
        if self.pending.is_none() {
            self.pending = Some(pending);
        }
    }

    pub(super) fn editor(&self) -> Option<&Editor<S>> {
        match &self.screen {
            Screen::Editor(e) => Some(e.as_ref()),
            Screen::Login { .. } => None,
        }
    }

    pub(super) fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit = true;
            return;
        }
        // Everything waits while a remote call is outstanding.
        if self.is_busy() {
            return;
        }

        match &mut self.screen {
            Screen::Login { token } => match key.code {
                KeyCode::Esc => self.quit = true,
                KeyCode::Enter => {
                    let t = token.buf.trim().to_string();
                    if t.is_empty() {
                        self.notify(ToastKind::Error, "please enter a token");
                    } else {
                        self.queue(Pending::Login(t));
                    }
                }
                KeyCode::Backspace => token.backspace(),
                KeyCode::Left => token.move_left(),
                KeyCode::Right => token.move_right(),
                KeyCode::Char(c) => token.insert_char(c),
                _ => {}
            },
            Screen::Editor(_) => self.handle_editor_key(key),
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        let Screen::Editor(ed) = &mut self.screen else {
            return;
        };

        if let Some(index) = ed.confirm_delete {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    ed.confirm_delete = None;
                    self.queue(Pending::Delete(index));
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    ed.confirm_delete = None;
                }
                _ => {}
            }
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('s') {
            if ed.focus != Focus::List {
                self.queue(Pending::Save);
            }
            return;
        }

        match ed.focus {
            Focus::List => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => self.quit = true,
                KeyCode::Up | KeyCode::Char('k') => ed.selected = ed.selected.saturating_sub(1),
                KeyCode::Down | KeyCode::Char('j') => {
                    ed.selected += 1;
                    ed.clamp_selection();
                }
                KeyCode::Char('n') => ed.start_new(),
                KeyCode::Char('e') | KeyCode::Enter => ed.start_edit(),
                KeyCode::Char('d') => {
                    if ed.selected < ed.entry_count() {
                        ed.confirm_delete = Some(ed.selected);
                    }
                }
                KeyCode::Char('r') => self.queue(Pending::Reload),
                KeyCode::Char('L') => self.queue(Pending::Logout),
                _ => {}
            },
            Focus::Form(field) => match key.code {
                KeyCode::Esc => ed.cancel_form(),
                KeyCode::Tab => ed.focus = Focus::Form(field.next()),
                KeyCode::BackTab => ed.focus = Focus::Form(field.prev()),
                KeyCode::Enter if field == Field::Changes => ed.changes.insert_char('\n'),
                KeyCode::Enter => ed.focus = Focus::Form(field.next()),
                KeyCode::Char(' ') if field == Field::Latest => {
                    ed.form.is_latest = !ed.form.is_latest;
                }
                code => {
                    if let Some(input) = ed.field_input(field) {
                        match code {
                            KeyCode::Char(c) => input.insert_char(c),
                            KeyCode::Backspace => input.backspace(),
                            KeyCode::Delete => input.delete(),
                            KeyCode::Left => input.move_left(),
                            KeyCode::Right => input.move_right(),
                            KeyCode::Home => input.home(),
                            KeyCode::End => input.end(),
                            _ => {}
                        }
                    }
                }
            },
        }
    }

    /// Runs the queued remote call, if any.
    pub(super) fn run_pending(&mut self, connector: &dyn Connector<S>) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        match pending {
            Pending::Login(token) => match connector.connect(&token) {
                Ok(session) => self.enter_editor(session),
                Err(err) => self.notify(ToastKind::Error, format!("login failed: {:#}", err)),
            },
            Pending::Logout => {
                let screen = std::mem::replace(
                    &mut self.screen,
                    Screen::Login {
                        token: Input::default(),
                    },
                );
                if let Screen::Editor(ed) = screen {
                    match connector.disconnect(ed.session) {
                        Ok(()) => self.notify(ToastKind::Info, "logged out"),
                        Err(err) => {
                            self.notify(ToastKind::Error, format!("logout failed: {:#}", err))
                        }
                    }
                }
            }
            Pending::Reload => self.reload(),
            Pending::Save => self.save(),
            Pending::Delete(index) => self.delete(index),
        }
    }

    fn reload(&mut self) {
        let Screen::Editor(ed) = &mut self.screen else {
            return;
        };
        let result = ed.session.reload();
        ed.clamp_selection();
        match result {
            Ok(()) => {
                let n = ed.entry_count();
                self.notify(ToastKind::Info, format!("reloaded {} entries", n));
            }
            Err(err) => self.notify(ToastKind::Error, format!("reload failed: {}", err)),
        }
    }

    fn save(&mut self) {
        let Screen::Editor(ed) = &mut self.screen else {
            return;
        };
        ed.sync_form_from_inputs();
        let submission = match ed.form.submit() {
            Ok(s) => s,
            Err(err) => {
                self.notify(ToastKind::Error, err.to_string());
                return;
            }
        };
        let version = submission.entry.version.clone();
        match ed.session.save_entry(submission) {
            Ok(outcome) => {
                ed.selected = match outcome {
                    UpsertOutcome::Created => 0,
                    UpsertOutcome::Updated(i) => i,
                };
                ed.cancel_form();
                let verb = match outcome {
                    UpsertOutcome::Created => "published",
                    UpsertOutcome::Updated(_) => "saved",
                };
                self.notify(ToastKind::Success, format!("{} {}", verb, version));
            }
            Err(err) => {
                // The upsert stays in memory; resubmitting would apply it twice.
                ed.cancel_form();
                ed.clamp_selection();
                self.notify(ToastKind::Error, save_failure(&err));
            }
        }
    }

    fn delete(&mut self, index: usize) {
        let Screen::Editor(ed) = &mut self.screen else {
            return;
        };
        let before = ed.entry_count();
        let result = ed.session.delete_entry(index);
        // A rejected commit still leaves the entry removed in memory.
        if ed.entry_count() < before {
            ed.entry_removed(index);
        }
        match result {
            Ok(removed) => self.notify(ToastKind::Success, format!("deleted {}", removed.version)),
            Err(err) => self.notify(ToastKind::Error, save_failure(&err)),
        }
    }
}

fn save_failure(err: &CmsError) -> String {
    if err.is_conflict() {
        "save failed: the changelog changed remotely; press r to reload, then reapply".to_string()
    } else {
        format!("save failed: {}", err)
    }
}

#[cfg(test)]
#[path = "../tests/tui_shell/app_tests.rs"]
mod tests;
