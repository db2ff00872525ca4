use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use super::catalog::{self, DEVICES_PATH, DeviceCard};
use super::detail::{self, DetailOutcome};
use super::fetch::{DataFetcher, DataSource};
use super::render;
use crate::codec::CHANGELOG_VARIABLE;
use crate::config::SiteConfig;
use crate::fsutil::write_atomic;
use crate::model::{ChangelogEntry, DevicesFile, TeamRoster, collect_maintainers};

#[derive(Debug, Default)]
pub struct BuildReport {
    pub pages: Vec<PathBuf>,
    pub devices: usize,
    pub changelog_entries: usize,
    /// Sections that failed to load and were rendered as an error fragment.
    pub warnings: Vec<String>,
}

pub struct SiteBuilder {
    /// Same-origin files: the changelog data file and the team roster.
    local: DataFetcher,
    /// The OTA repository: `devices.json` and per-device manifests.
    ota: DataFetcher,
    changelog_path: String,
    team_path: String,
}

impl SiteBuilder {
    pub fn new(local: DataFetcher, ota: DataFetcher) -> Self {
        let defaults = SiteConfig::default();
        Self {
            local,
            ota,
            changelog_path: defaults.site.changelog_path,
            team_path: defaults.site.team_path,
        }
    }

    /// `ota` overrides the configured raw-content root.
    pub fn from_config(cfg: &SiteConfig, ota: Option<DataSource>) -> Result<Self> {
        let ttl = Duration::from_secs(cfg.site.cache_ttl_secs);
        let local = DataFetcher::new(DataSource::Local(cfg.site.data_dir.clone()), ttl)?;
        let ota_source = ota.unwrap_or_else(|| DataSource::remote(&cfg.ota.raw_root()));
        let ota = DataFetcher::new(ota_source, ttl)?;
        Ok(Self {
            local,
            ota,
            changelog_path: cfg.site.changelog_path.clone(),
            team_path: cfg.site.team_path.clone(),
        })
    }

    pub fn build(&self, out_dir: &Path) -> Result<BuildReport> {
        let mut report = BuildReport::default();

        let html = match self
            .local
            .fetch_wrapped::<Vec<ChangelogEntry>>(&self.changelog_path, CHANGELOG_VARIABLE)
        {
            Ok(entries) => {
                report.changelog_entries = entries.len();
                render::render_changelog_timeline(&entries)
            }
            Err(err) => {
                report.warn("changelog", &err);
                render::render_load_error("Failed to load data. Please refresh.")
            }
        };
        write_page(out_dir, "changelogs.html", &html, &mut report)?;

        let (cards, html) = match catalog::load_catalog(&self.ota) {
            Ok(cards) => {
                let html = render::render_device_grid(&cards, None);
                (cards, html)
            }
            Err(err) => {
                report.warn("devices", &err);
                let html =
                    render::render_load_error("Failed to load devices. Please try again later.");
                (Vec::new(), html)
            }
        };
        write_page(out_dir, "downloads.html", &html, &mut report)?;
        report.devices = cards.len();
        for card in &cards {
            self.write_device_page(out_dir, card, &mut report)?;
        }

        let html = self.team_html(&mut report);
        write_page(out_dir, "team.html", &html, &mut report)?;

        tracing::info!(
            pages = report.pages.len(),
            devices = report.devices,
            warnings = report.warnings.len(),
            "site built into {}",
            out_dir.display()
        );
        Ok(report)
    }

    fn write_device_page(
        &self,
        out_dir: &Path,
        card: &DeviceCard,
        report: &mut BuildReport,
    ) -> Result<()> {
        let html = match detail::open_detail(&self.ota, card) {
            DetailOutcome::Ready(d) => detail::render_detail(&d),
            DetailOutcome::NoBuilds => {
                render::render_load_error("No builds available for this device yet.")
            }
        };
        let name = format!("devices/{}.html", card.device.codename);
        write_page(out_dir, &name, &html, report)
    }

    fn team_html(&self, report: &mut BuildReport) -> String {
        let mut html = match self.local.fetch_json::<TeamRoster>(&self.team_path) {
            Ok(roster) => render::render_team_page(&roster),
            Err(err) => {
                report.warn("team", &err);
                String::new()
            }
        };
        match self.ota.fetch_json::<DevicesFile>(DEVICES_PATH) {
            Ok(file) => html.push_str(&render::render_maintainers(&collect_maintainers(
                &file.devices,
            ))),
            Err(err) => {
                report.warn("maintainers", &err);
                html.push_str(&render::render_load_error("Failed to load maintainers."));
            }
        }
        html
    }
}

impl BuildReport {
    fn warn(&mut self, section: &str, err: &dyn std::fmt::Display) {
        tracing::warn!(section, error = %err, "section failed to load");
        self.warnings.push(format!("{}: {}", section, err));
    }
}

fn write_page(out_dir: &Path, name: &str, html: &str, report: &mut BuildReport) -> Result<()> {
    let path = out_dir.join(name);
    write_atomic(&path, html.as_bytes()).with_context(|| format!("write {}", path.display()))?;
    report.pages.push(path);
    Ok(())
}

#[cfg(test)]
#[path = "../tests/site/builder_tests.rs"]
mod tests;
