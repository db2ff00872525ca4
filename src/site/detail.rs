use std::fmt::Write as _;
use std::sync::LazyLock;

use html_escape::{encode_double_quoted_attribute as attr, encode_quoted_attribute, encode_text as text};
use regex::Regex;

use super::catalog::{DeviceCard, format_bytes, format_date, variant_label};
use super::fetch::DataFetcher;

/// Tried in order; the first one that exists wins.
pub const CHANGELOG_FILES: [&str; 3] = ["changelogs.md", "changelog.md", "changelog.txt"];

#[derive(Clone, Debug)]
pub struct DeviceDetail {
    pub card: DeviceCard,
    pub changelog: Option<String>,
}

#[derive(Clone, Debug)]
pub enum DetailOutcome {
    /// Neither build variants nor a download page exist yet.
    NoBuilds,
    Ready(DeviceDetail),
}

pub fn open_detail(fetcher: &DataFetcher, card: &DeviceCard) -> DetailOutcome {
    if !card.has_builds() && card.device.pling_id.is_none() {
        return DetailOutcome::NoBuilds;
    }
    let changelog = fetch_device_changelog(fetcher, &card.device.codename);
    DetailOutcome::Ready(DeviceDetail {
        card: card.clone(),
        changelog,
    })
}

pub fn fetch_device_changelog(fetcher: &DataFetcher, codename: &str) -> Option<String> {
    CHANGELOG_FILES
        .iter()
        .find_map(|file| fetcher.fetch_optional_text(&format!("{}/{}", codename, file)))
}

pub fn render_variant_info(card: &DeviceCard) -> String {
    let variants = card.variants();
    if variants.is_empty() {
        return "<p class=\"no-builds\">No build details available.</p>\n".to_string();
    }

    let mut out = String::from("<div class=\"variant-list\">\n");
    for (key, build) in variants {
        let _ = write!(
            out,
            concat!(
                "<div class=\"variant-item\">\n",
                "  <div class=\"variant-head\"><strong>{label}</strong><span class=\"version\">v{version}</span></div>\n",
                "  <dl>\n",
                "    <dt>Filename:</dt><dd class=\"filename\">{filename}</dd>\n",
                "    <dt>Size:</dt><dd>{size}</dd>\n",
                "    <dt>Date:</dt><dd>{date}</dd>\n",
                "    <dt>MD5:</dt><dd class=\"md5\">{md5}</dd>\n",
                "  </dl>\n",
                "</div>\n",
            ),
            label = text(&variant_label(key)),
            version = text(&build.version),
            filename = text(&build.filename),
            size = format_bytes(build.size_bytes()),
            date = format_date(build.built_at()),
            md5 = text(&build.md5),
        );
    }
    out.push_str("</div>\n");
    out
}

macro_rules! line_rule {
    ($name:ident, $re:expr) => {
        static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($re).expect($re));
    };
}

line_rule!(TITLE, r"(?m)^#[ \t]+.*\n?");
line_rule!(H2, r"(?m)^##[ \t]+(.*)$");
line_rule!(H3, r"(?m)^###[ \t]+(.*)$");
line_rule!(RULE, r"(?m)^---+[ \t]*$");
line_rule!(BULLET, r"(?m)^-[ \t]+(.*)$");
line_rule!(BOLD, r"\*\*(.*?)\*\*");
line_rule!(BREAK_AFTER_DIV, r"</div>(<br>\s*)+");
line_rule!(BREAK_AFTER_HR, r"<hr([^>]*)>(<br>\s*)+");

/// Escapes device changelog text and turns its light markdown into HTML. Top-level
/// `# ` titles are dropped.
pub fn format_changelog(raw: &str) -> String {
    let escaped = encode_quoted_attribute(raw).replace("\r\n", "\n");
    let s = TITLE.replace_all(&escaped, "");
    let s = H2.replace_all(&s, "<div class=\"cl-h2\">${1}</div>");
    let s = H3.replace_all(&s, "<div class=\"cl-h3\">${1}</div>");
    let s = RULE.replace_all(&s, "<hr class=\"cl-rule\">");
    let s = BULLET.replace_all(
        &s,
        "<div class=\"cl-item\"><span class=\"cl-bullet\">-</span><span>${1}</span></div>",
    );
    let s = BOLD.replace_all(&s, "<strong class=\"cl-bold\">${1}</strong>");
    let s = s.replace('\n', "<br>");
    let s = BREAK_AFTER_DIV.replace_all(&s, "</div>");
    BREAK_AFTER_HR.replace_all(&s, "<hr${1}>").into_owned()
}

pub fn render_detail(detail: &DeviceDetail) -> String {
    let d = &detail.card.device;
    let mut out = String::new();
    let _ = write!(
        out,
        "<h2>{}</h2>\n<p class=\"subtitle\">{} \u{2022} by {}</p>\n",
        text(&d.name),
        text(&d.codename),
        text(&d.maintainer),
    );

    out.push_str("<div class=\"download-action\">");
    match &d.pling_id {
        Some(id) => {
            let _ = write!(
                out,
                "<a href=\"https://www.pling.com/p/{}\" target=\"_blank\" class=\"btn btn-primary\">Download from Pling</a>",
                attr(id.trim())
            );
        }
        None => out.push_str("<button disabled class=\"btn\">Download link unavailable</button>"),
    }
    out.push_str("</div>\n");

    out.push_str("<section id=\"view-builds\">\n");
    out.push_str(&render_variant_info(&detail.card));
    out.push_str("</section>\n");

    if let Some(changelog) = &detail.changelog {
        let _ = writeln!(
            out,
            "<section id=\"view-changelog\"><div class=\"changelog-text\">{}</div></section>",
            format_changelog(changelog)
        );
    }
    out
}

#[cfg(test)]
#[path = "../tests/site/detail_tests.rs"]
mod tests;
