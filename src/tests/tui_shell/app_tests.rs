use std::cell::Cell;

use super::*;
use crate::cms::ChangelogRepository;
use crate::codec;
use crate::model::{ChangelogEntry, FileLocation};
use crate::remote::Identity;
use crate::store::MemoryStore;

fn loc() -> FileLocation {
    FileLocation::new("AfterlifeOS", "AfterlifeOS.github.io", "js/data_changelogs.js", "main")
}

fn seeded() -> MemoryStore {
    let store = MemoryStore::new();
    let entries = vec![
        ChangelogEntry::new("1.1", "Feb 1", true, "\n- second\n"),
        ChangelogEntry::new("1.0", "Jan 1", false, "\n- first\n"),
    ];
    store.insert(&loc(), &codec::encode_changelog(&entries).unwrap());
    store
}

struct FakeConnector<'a> {
    store: &'a MemoryStore,
    logouts: Cell<usize>,
}

impl<'a> Connector<&'a MemoryStore> for FakeConnector<'a> {
    fn connect(&self, token: &str) -> Result<AdminSession<&'a MemoryStore>> {
        if token != "good" {
            anyhow::bail!("unauthorized (HTTP 401)");
        }
        Ok(AdminSession::from_parts(
            Identity {
                login: "maintainer".to_string(),
                name: None,
            },
            ChangelogRepository::new(self.store, loc()),
        ))
    }

    fn disconnect(&self, _session: AdminSession<&'a MemoryStore>) -> Result<()> {
        self.logouts.set(self.logouts.get() + 1);
        Ok(())
    }
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

fn type_str<S: ContentStore>(app: &mut App<S>, s: &str) {
    for c in s.chars() {
        app.handle_key(key(KeyCode::Char(c)));
    }
}

fn logged_in<'a>(conn: &FakeConnector<'a>) -> App<&'a MemoryStore> {
    let mut app = App::login();
    type_str(&mut app, "good");
    app.handle_key(key(KeyCode::Enter));
    assert_eq!(app.pending, Some(Pending::Login("good".to_string())));
    app.run_pending(conn);
    assert!(app.editor().is_some());
    app
}

#[test]
fn rejected_token_stays_on_login_screen() {
    let store = seeded();
    let conn = FakeConnector {
        store: &store,
        logouts: Cell::new(0),
    };
    let mut app = App::login();

    app.handle_key(key(KeyCode::Enter));
    assert_eq!(app.pending, None);
    assert_eq!(app.toast.as_ref().unwrap().kind, ToastKind::Error);

    type_str(&mut app, "bad");
    app.handle_key(key(KeyCode::Enter));
    app.run_pending(&conn);
    assert!(app.editor().is_none());
    assert!(app.toast.as_ref().unwrap().text.contains("login failed"));
}

#[test]
fn create_entry_from_keyboard_publishes_release() {
    let store = seeded();
    let conn = FakeConnector {
        store: &store,
        logouts: Cell::new(0),
    };
    let mut app = logged_in(&conn);
    assert_eq!(app.editor().unwrap().session.repository().len(), 2);

    app.handle_key(key(KeyCode::Char('n')));
    type_str(&mut app, "2.0");
    app.handle_key(key(KeyCode::Tab));
    type_str(&mut app, "Mar 1");
    app.handle_key(key(KeyCode::Tab));
    type_str(&mut app, "- one");
    app.handle_key(key(KeyCode::Enter));
    type_str(&mut app, "- two");

    app.handle_key(ctrl('s'));
    assert!(app.is_busy());
    // A second save while the first is queued is ignored.
    app.handle_key(ctrl('s'));
    app.handle_key(key(KeyCode::Char('x')));
    assert_eq!(app.pending, Some(Pending::Save));

    app.run_pending(&conn);
    assert!(!app.is_busy());
    let ed = app.editor().unwrap();
    assert_eq!(ed.focus, Focus::List);
    assert_eq!(ed.selected, 0);
    let entries = ed.session.repository().entries();
    assert_eq!(entries[0].version, "2.0");
    assert_eq!(entries[0].changes, "\n- one\n- two\n");
    assert!(entries[0].is_latest);
    assert!(!entries[1].is_latest);
    assert_eq!(store.commits().last().unwrap().message, "[CMS] Release 2.0");
    assert_eq!(app.toast.as_ref().unwrap().kind, ToastKind::Success);
}

#[test]
fn empty_fields_are_reported_without_a_commit() {
    let store = seeded();
    let conn = FakeConnector {
        store: &store,
        logouts: Cell::new(0),
    };
    let mut app = logged_in(&conn);

    app.handle_key(key(KeyCode::Char('n')));
    type_str(&mut app, "2.0");
    app.handle_key(ctrl('s'));
    app.run_pending(&conn);

    assert!(store.commits().is_empty());
    assert!(app.toast.as_ref().unwrap().text.contains("please fill all fields"));
    assert_eq!(app.editor().unwrap().focus, Focus::Form(Field::Version));
}

#[test]
fn edit_toggles_latest_and_commits_update() {
    let store = seeded();
    let conn = FakeConnector {
        store: &store,
        logouts: Cell::new(0),
    };
    let mut app = logged_in(&conn);

    app.handle_key(key(KeyCode::Down));
    app.handle_key(key(KeyCode::Char('e')));
    {
        let ed = app.editor().unwrap();
        assert_eq!(ed.form.mode(), FormMode::Edit(1));
        assert_eq!(ed.version.buf, "1.0");
        assert_eq!(ed.changes.buf, "- first");
    }
    app.handle_key(key(KeyCode::BackTab));
    app.handle_key(key(KeyCode::Char(' ')));
    app.handle_key(ctrl('s'));
    app.run_pending(&conn);

    let entries = app.editor().unwrap().session.repository().entries().to_vec();
    assert!(entries[1].is_latest);
    assert!(!entries[0].is_latest);
    assert_eq!(store.commits().last().unwrap().message, "[CMS] Update 1.0");
}

#[test]
fn delete_asks_for_confirmation() {
    let store = seeded();
    let conn = FakeConnector {
        store: &store,
        logouts: Cell::new(0),
    };
    let mut app = logged_in(&conn);

    app.handle_key(key(KeyCode::Char('d')));
    app.handle_key(key(KeyCode::Char('n')));
    assert_eq!(app.pending, None);
    assert!(app.editor().unwrap().confirm_delete.is_none());

    app.handle_key(key(KeyCode::Char('d')));
    app.handle_key(key(KeyCode::Char('y')));
    assert_eq!(app.pending, Some(Pending::Delete(0)));
    app.run_pending(&conn);

    assert_eq!(app.editor().unwrap().session.repository().len(), 1);
    assert_eq!(store.commits()[0].message, "[CMS] Delete 1.1");
}

fn seeded_text() -> String {
    let entries = vec![
        ChangelogEntry::new("1.1", "Feb 1", true, "\n- second\n"),
        ChangelogEntry::new("1.0", "Jan 1", false, "\n- first\n"),
    ];
    codec::encode_changelog(&entries).unwrap()
}

fn remote_versions(store: &MemoryStore) -> Vec<String> {
    let text = store.get(&loc()).unwrap().text;
    codec::decode_changelog(&text)
        .unwrap()
        .into_iter()
        .map(|e| e.version)
        .collect()
}

#[test]
fn failed_create_closes_the_form_so_a_retry_cannot_duplicate() {
    let store = seeded();
    let conn = FakeConnector {
        store: &store,
        logouts: Cell::new(0),
    };
    let mut app = logged_in(&conn);
    store.insert(&loc(), "window.changelogsData = [];");

    app.handle_key(key(KeyCode::Char('n')));
    type_str(&mut app, "2.0");
    app.handle_key(key(KeyCode::Tab));
    type_str(&mut app, "Mar 1");
    app.handle_key(key(KeyCode::Tab));
    type_str(&mut app, "- x");
    app.handle_key(ctrl('s'));
    app.run_pending(&conn);

    let toast = app.toast.clone().unwrap();
    assert_eq!(toast.kind, ToastKind::Error);
    assert!(toast.text.contains("press r to reload"));
    {
        let ed = app.editor().unwrap();
        assert_eq!(ed.session.repository().len(), 3);
        assert_eq!(ed.form.mode(), FormMode::Create);
        assert_eq!(ed.focus, Focus::List);
        assert!(ed.version.buf.is_empty());
    }

    // The remote recovers; saving again must not prepend a second copy.
    store.insert(&loc(), &seeded_text());
    app.handle_key(ctrl('s'));
    assert_eq!(app.pending, None);

    app.handle_key(key(KeyCode::Char('e')));
    assert_eq!(app.editor().unwrap().form.mode(), FormMode::Edit(0));
    app.handle_key(ctrl('s'));
    app.run_pending(&conn);
    assert_eq!(remote_versions(&store), vec!["2.0", "1.1", "1.0"]);

    store.insert(&loc(), "window.changelogsData = [];");
    app.handle_key(key(KeyCode::Char('r')));
    app.run_pending(&conn);
    assert!(app.editor().unwrap().session.repository().is_empty());
}

#[test]
fn failed_delete_shifts_the_edit_in_progress() {
    let store = seeded();
    let conn = FakeConnector {
        store: &store,
        logouts: Cell::new(0),
    };
    let mut app = logged_in(&conn);

    {
        // An edit of 1.0 stays armed while the list has focus on 1.1.
        let Screen::Editor(ed) = &mut app.screen else {
            panic!("expected editor");
        };
        let entry = ed.session.repository().get(1).cloned().unwrap();
        ed.form.begin_edit(1, &entry);
        ed.sync_inputs_from_form();
        ed.selected = 0;
    }

    store.insert(&loc(), "window.changelogsData = [];");
    app.handle_key(key(KeyCode::Char('d')));
    app.handle_key(key(KeyCode::Char('y')));
    app.run_pending(&conn);
    assert_eq!(app.toast.as_ref().unwrap().kind, ToastKind::Error);
    {
        let ed = app.editor().unwrap();
        assert_eq!(ed.session.repository().len(), 1);
        assert_eq!(ed.form.mode(), FormMode::Edit(0));
        assert_eq!(ed.selected, 0);
    }

    store.insert(&loc(), &seeded_text());
    {
        let Screen::Editor(ed) = &mut app.screen else {
            panic!("expected editor");
        };
        ed.focus = Focus::Form(Field::Date);
        ed.date.end();
        ed.date.insert_char('!');
    }
    app.handle_key(ctrl('s'));
    app.run_pending(&conn);
    assert_eq!(app.toast.as_ref().unwrap().kind, ToastKind::Success);
    assert_eq!(remote_versions(&store), vec!["1.0"]);
    assert_eq!(store.get(&loc()).map(|f| f.text.contains("Jan 1!")), Some(true));
}

#[test]
fn logout_returns_to_login_and_quit_keys_work() {
    let store = seeded();
    let conn = FakeConnector {
        store: &store,
        logouts: Cell::new(0),
    };
    let mut app = logged_in(&conn);

    app.handle_key(key(KeyCode::Char('L')));
    app.run_pending(&conn);
    assert!(app.editor().is_none());
    assert_eq!(conn.logouts.get(), 1);

    app.handle_key(key(KeyCode::Esc));
    assert!(app.quit);
}
