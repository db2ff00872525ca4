use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::{Captures, Regex};

use crate::fsutil::write_atomic;

pub const IGNORED_DIRS: [&str; 3] = [".git", "node_modules", ".gemini"];

static ASSET_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(href="|src=")([^"\\]+\.(?:css|js))(\?v=[0-9a-zA-Z.]*)?(")"#)
        .expect("asset reference regex")
});

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CacheBustReport {
    pub version: String,
    pub scanned: usize,
    pub updated: Vec<PathBuf>,
}

/// Current unix time in seconds, the default version stamp.
pub fn timestamp_version() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
        .to_string()
}

/// Rewrites local `.css`/`.js` references; `http…` and `//…` references are left alone.
pub fn rewrite_asset_versions(html: &str, version: &str) -> String {
    ASSET_REF
        .replace_all(html, |caps: &Captures<'_>| {
            let file = &caps[2];
            if file.starts_with("http") || file.starts_with("//") {
                return caps[0].to_string();
            }
            format!("{}{}?v={}{}", &caps[1], file, version, &caps[4])
        })
        .into_owned()
}

fn ignore_set() -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for dir in IGNORED_DIRS {
        builder.add(Glob::new(dir).with_context(|| format!("invalid glob: {}", dir))?);
    }
    builder.build().context("build ignore set")
}

fn collect_html(dir: &Path, ignore: &GlobSet, out: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries: Vec<fs::DirEntry> = fs::read_dir(dir)
        .with_context(|| format!("read dir {}", dir.display()))?
        .collect::<std::result::Result<_, _>>()
        .with_context(|| format!("collect dir entries for {}", dir.display()))?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        let file_type = entry
            .file_type()
            .with_context(|| format!("stat {}", path.display()))?;
        if file_type.is_dir() {
            if ignore.is_match(entry.file_name()) {
                continue;
            }
            collect_html(&path, ignore, out)?;
        } else if file_type.is_file() && path.extension().is_some_and(|e| e == "html") {
            out.push(path);
        }
    }
    Ok(())
}

/// Rewrites every `.html` file under `root` in place. Files whose content does not
/// change are not rewritten.
pub fn bust_cache(root: &Path, version: &str) -> Result<CacheBustReport> {
    let ignore = ignore_set()?;
    let mut pages = Vec::new();
    collect_html(root, &ignore, &mut pages)?;

    let mut report = CacheBustReport {
        version: version.to_string(),
        scanned: pages.len(),
        updated: Vec::new(),
    };
    for page in pages {
        let html =
            fs::read_to_string(&page).with_context(|| format!("read {}", page.display()))?;
        let rewritten = rewrite_asset_versions(&html, version);
        if rewritten != html {
            write_atomic(&page, rewritten.as_bytes())?;
            tracing::debug!("updated {}", page.display());
            report.updated.push(page);
        }
    }
    tracing::info!(
        version,
        updated = report.updated.len(),
        scanned = report.scanned,
        "cache busting done"
    );
    Ok(report)
}

#[cfg(test)]
#[path = "../tests/site/cache_bust_tests.rs"]
mod tests;
