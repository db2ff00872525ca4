use std::io::{self, IsTerminal};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::cms::{AdminSession, SessionStore};
use crate::config::CmsConfig;
use crate::remote::ContentStoreClient;
use crate::store::ContentStore;

mod app;
use app::{App, Connector, ToastKind};

mod input;

mod view;

/// Logs in against the configured content store and keeps the credential in the
/// session file.
struct GithubConnector {
    cfg: CmsConfig,
    sessions: SessionStore,
}

impl Connector<ContentStoreClient> for GithubConnector {
    fn connect(&self, token: &str) -> Result<AdminSession<ContentStoreClient>> {
        AdminSession::start(&self.cfg, token, &self.sessions)
    }

    fn disconnect(&self, session: AdminSession<ContentStoreClient>) -> Result<()> {
        session.logout(&self.sessions)
    }
}

pub(crate) fn run(cfg: CmsConfig, sessions: SessionStore) -> Result<()> {
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        anyhow::bail!("TUI requires an interactive terminal (TTY)");
    }

    // Resume before taking over the terminal so a slow identity check doesn't leave a
    // blank screen.
    let connector = GithubConnector { cfg, sessions };
    let mut app = match AdminSession::resume(&connector.cfg, &connector.sessions) {
        Ok(Some(session)) => App::with_session(session),
        Ok(None) => App::login(),
        Err(err) => {
            let mut app = App::login();
            app.notify(ToastKind::Error, format!("stored session rejected: {:#}", err));
            app
        }
    };

    let mut stdout = io::stdout();
    enable_raw_mode().context("enable raw mode")?;
    execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let res = run_loop(&mut terminal, &mut app, &connector);

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    res
}

fn run_loop<S: ContentStore>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<S>,
    connector: &dyn Connector<S>,
) -> Result<()> {
    loop {
        terminal.draw(|f| view::draw(f, app)).context("draw")?;

        if app.quit {
            return Ok(());
        }

        // The frame just drawn shows the busy state; now block on the remote.
        if app.is_busy() {
            app.run_pending(connector);
            continue;
        }

        if event::poll(Duration::from_millis(50)).context("poll events")?
            && let Event::Key(k) = event::read().context("read event")?
            && k.kind == KeyEventKind::Press
        {
            app.handle_key(k);
        }
    }
}
