#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

pub const TOKEN: &str = "dev";

pub struct StoreGuard {
    pub base_url: String,
    pub token: String,
    _dir: tempfile::TempDir,
    child: Child,
}

impl Drop for StoreGuard {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl StoreGuard {
    pub fn raw_base(&self) -> String {
        format!("{}/raw", self.base_url)
    }
}

/// Writes `<root>/<owner>/<repo>/<branch>/<path>`, the layout `--seed-dir` reads.
pub fn seed_file(root: &Path, owner: &str, repo: &str, branch: &str, path: &str, text: &str) {
    let full = root.join(owner).join(repo).join(branch).join(path);
    std::fs::create_dir_all(full.parent().unwrap()).unwrap();
    std::fs::write(full, text).unwrap();
}

pub fn spawn_store(seed_dir: Option<&Path>) -> Result<StoreGuard> {
    let dir = tempfile::tempdir().context("create store tempdir")?;
    let token = TOKEN.to_string();
    let addr_file = dir.path().join("addr.txt");

    let mut args = vec![
        "--addr".to_string(),
        "127.0.0.1:0".to_string(),
        "--addr-file".to_string(),
        addr_file.to_str().unwrap().to_string(),
        "--token".to_string(),
        token.clone(),
    ];
    if let Some(seed) = seed_dir {
        args.push("--seed-dir".to_string());
        args.push(seed.to_str().unwrap().to_string());
    }

    let child = Command::new(env!("CARGO_BIN_EXE_afterlife-store"))
        .args(&args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .context("spawn afterlife-store")?;

    let base_url = read_addr_file(&addr_file)?;
    wait_for_healthz(&base_url)?;

    Ok(StoreGuard {
        base_url,
        token,
        _dir: dir,
        child,
    })
}

fn read_addr_file(addr_file: &Path) -> Result<String> {
    let start = Instant::now();
    loop {
        if start.elapsed() > Duration::from_secs(5) {
            anyhow::bail!("addr file not written at {}", addr_file.display());
        }

        if let Ok(s) = std::fs::read_to_string(addr_file) {
            let s = s.trim();
            if !s.is_empty() {
                return Ok(format!("http://{}", s));
            }
        }
        thread::sleep(Duration::from_millis(10));
    }
}

pub fn wait_for_healthz(base_url: &str) -> Result<()> {
    let client = reqwest::blocking::Client::new();
    let start = Instant::now();
    loop {
        if start.elapsed() > Duration::from_secs(5) {
            anyhow::bail!("store did not become healthy at {}/healthz", base_url);
        }
        match client.get(format!("{}/healthz", base_url)).send() {
            Ok(resp) if resp.status().is_success() => return Ok(()),
            _ => {
                thread::sleep(Duration::from_millis(50));
            }
        }
    }
}

pub fn auth_header(token: &str) -> String {
    format!("token {}", token)
}

/// Runs the CLI from `cwd` so no stray `afterlife.toml` is picked up.
pub fn afterlife(cwd: &Path, args: &[&str]) -> Result<Output> {
    Command::new(env!("CARGO_BIN_EXE_afterlife"))
        .current_dir(cwd)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .with_context(|| format!("run afterlife {:?}", args))
}

/// Like [`afterlife`], failing with both streams when the command does.
pub fn afterlife_ok(cwd: &Path, args: &[&str]) -> Result<String> {
    let out = afterlife(cwd, args)?;
    if !out.status.success() {
        anyhow::bail!(
            "afterlife {:?} failed (status {:?})\nstdout:\n{}\nstderr:\n{}",
            args,
            out.status,
            String::from_utf8_lossy(&out.stdout),
            String::from_utf8_lossy(&out.stderr)
        );
    }
    Ok(String::from_utf8_lossy(&out.stdout).to_string())
}

pub fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).to_string()
}

pub fn session_path(dir: &Path) -> PathBuf {
    dir.join("session.json")
}
