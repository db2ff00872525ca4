use std::fs;
use std::io::{self, BufRead, IsTerminal, Read, Write};

use anyhow::{Context, Result};

use afterlife::cms::{AdminSession, EntryForm, UpsertOutcome};
use afterlife::model::ChangelogEntry;

use crate::cli_commands::AdminCommands;
use crate::cli_commands::admin::{AddArgs, ChangesArgs, EditArgs, LoginArgs, RemoveArgs};
use crate::cli_runtime::Ctx;

pub(super) fn handle_admin_command(ctx: &Ctx, command: AdminCommands) -> Result<()> {
    match command {
        AdminCommands::Login(args) => login(ctx, args),
        AdminCommands::Logout => {
            ctx.sessions()?.clear()?;
            println!("Logged out");
            Ok(())
        }
        AdminCommands::Whoami(args) => {
            let session = ctx.require_session()?;
            if args.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(session.identity())
                        .context("serialize identity json")?
                );
            } else {
                match &session.identity().name {
                    Some(name) => println!("{} ({})", session.login(), name),
                    None => println!("{}", session.login()),
                }
            }
            Ok(())
        }
        AdminCommands::List(args) => {
            let mut session = ctx.require_session()?;
            session.reload()?;
            let entries = session.repository().entries();
            if args.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(entries).context("serialize changelog json")?
                );
            } else if entries.is_empty() {
                println!("No releases published yet.");
            } else {
                for (i, e) in entries.iter().enumerate() {
                    println!("{}", list_line(i, e));
                }
            }
            Ok(())
        }
        AdminCommands::Add(args) => add(ctx, args),
        AdminCommands::Edit(args) => edit(ctx, args),
        AdminCommands::Remove(args) => remove(ctx, args),
        AdminCommands::Tui => afterlife::tui::run(ctx.cfg.cms.clone(), ctx.sessions()?),
    }
}

fn list_line(index: usize, e: &ChangelogEntry) -> String {
    let latest = if e.is_latest { "  (latest)" } else { "" };
    format!("{:>3}  {}  {}{}", index, e.version, e.date, latest)
}

fn login(ctx: &Ctx, args: LoginArgs) -> Result<()> {
    let token = match args.token {
        Some(t) => t,
        None => {
            if io::stdin().is_terminal() {
                eprint!("token: ");
                io::stderr().flush().ok();
            }
            let mut line = String::new();
            io::stdin()
                .lock()
                .read_line(&mut line)
                .context("read token from stdin")?;
            line
        }
    };

    let session = AdminSession::start(&ctx.cfg.cms, &token, &ctx.sessions()?)?;
    println!("Logged in as {}", session.login());
    Ok(())
}

fn read_changes(args: &ChangesArgs) -> Result<Option<String>> {
    if let Some(text) = &args.changes {
        return Ok(Some(text.clone()));
    }
    let Some(path) = &args.changes_file else {
        return Ok(None);
    };
    if path.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("read changes from stdin")?;
        return Ok(Some(text));
    }
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    Ok(Some(text))
}

fn save(session: &mut AdminSession, form: &EntryForm) -> Result<()> {
    let submission = form.submit()?;
    let version = submission.entry.version.clone();
    let outcome = session.save_entry(submission)?;
    let verb = match outcome {
        UpsertOutcome::Created => "Published",
        UpsertOutcome::Updated(_) => "Saved",
    };
    println!("{} {}", verb, version);
    if let Some(sha) = session.repository().sha() {
        println!("sha: {}", sha);
    }
    Ok(())
}

fn add(ctx: &Ctx, args: AddArgs) -> Result<()> {
    let mut session = ctx.require_session()?;
    session.reload()?;

    let mut form = EntryForm::new();
    form.version = args.version;
    form.date = args.date;
    form.changes = read_changes(&args.changes)?.unwrap_or_default();
    form.is_latest = !args.not_latest;
    save(&mut session, &form)
}

fn edit(ctx: &Ctx, args: EditArgs) -> Result<()> {
    let mut session = ctx.require_session()?;
    session.reload()?;

    let entry = session
        .repository()
        .get(args.index)
        .cloned()
        .with_context(|| format!("no entry at index {} (see `afterlife admin list`)", args.index))?;

    let mut form = EntryForm::new();
    form.begin_edit(args.index, &entry);
    if let Some(v) = args.version {
        form.version = v;
    }
    if let Some(d) = args.date {
        form.date = d;
    }
    if let Some(c) = read_changes(&args.changes)? {
        form.changes = c;
    }
    if args.latest {
        form.is_latest = true;
    } else if args.not_latest {
        form.is_latest = false;
    }
    save(&mut session, &form)
}

fn remove(ctx: &Ctx, args: RemoveArgs) -> Result<()> {
    let mut session = ctx.require_session()?;
    session.reload()?;

    let entry = session
        .repository()
        .get(args.index)
        .cloned()
        .with_context(|| format!("no entry at index {} (see `afterlife admin list`)", args.index))?;
    let (version, date) = entry.identity();

    if !args.yes {
        if !io::stdin().is_terminal() {
            anyhow::bail!("refusing to delete {} without --yes", version);
        }
        eprint!("Delete {} ({})? [y/N] ", version, date);
        io::stderr().flush().ok();
        let mut answer = String::new();
        io::stdin()
            .lock()
            .read_line(&mut answer)
            .context("read confirmation")?;
        if !matches!(answer.trim(), "y" | "Y" | "yes") {
            println!("Kept {}", version);
            return Ok(());
        }
    }

    let removed = session.delete_entry(args.index)?;
    println!("Deleted {} ({})", removed.version, removed.date);
    Ok(())
}
