use std::fmt::Write as _;
use std::sync::LazyLock;

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use regex::Regex;

use super::catalog::DeviceCard;
use crate::model::{ChangelogEntry, DeviceStatus, Maintainer, TeamMember, TeamRoster};

pub const FALLBACK_IMAGE: &str = "/img/fallback.webp";

static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+[.)]|[-*+>•.])\s*").expect("list marker regex"));

/// One clean line per non-blank line of `block`, list markers removed.
pub fn parse_changes(block: &str) -> Vec<String> {
    block
        .split('\n')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| LIST_MARKER.replace(l, "").into_owned())
        .collect()
}

pub fn render_changes(block: &str) -> String {
    parse_changes(block).iter().fold(String::new(), |mut out, line| {
        let _ = write!(out, "<li>{}</li>", text(line));
        out
    })
}

pub fn render_changelog_timeline(entries: &[ChangelogEntry]) -> String {
    if entries.is_empty() {
        return render_load_error("No releases published yet.");
    }
    let mut out = String::from("<div class=\"timeline\">\n");
    for e in entries {
        let badge = if e.is_latest {
            " <span class=\"badge\">Latest</span>"
        } else {
            ""
        };
        let _ = write!(
            out,
            concat!(
                "<div class=\"timeline-item\">\n",
                "  <div class=\"timeline-dot\"></div>\n",
                "  <div class=\"timeline-date\">{date}</div>\n",
                "  <div class=\"card timeline-content\">\n",
                "    <h3 class=\"version-title\">{version}{badge}</h3>\n",
                "    <ul class=\"changelog-list\">{changes}</ul>\n",
                "  </div>\n",
                "</div>\n",
            ),
            date = text(&e.date),
            version = text(&e.version),
            badge = badge,
            changes = render_changes(&e.changes),
        );
    }
    out.push_str("</div>\n");
    out
}

pub fn render_load_error(message: &str) -> String {
    format!("<p class=\"load-error\">{}</p>\n", text(message))
}

fn image_or_fallback(url: &str) -> &str {
    if url.trim().is_empty() {
        FALLBACK_IMAGE
    } else {
        url
    }
}

/// `highlight` is the codename of the visitor's own device, if detected.
pub fn render_device_card(card: &DeviceCard, highlight: Option<&str>) -> String {
    let d = &card.device;
    let status_class = match d.status {
        DeviceStatus::Active => "status-active",
        DeviceStatus::Inactive => "status-inactive",
    };
    let highlighted = highlight == Some(d.codename.as_str());

    let mut badges = String::new();
    for label in card.variant_badges() {
        let class = if label == "Vanilla" {
            "variant-vanilla"
        } else {
            "variant-gms"
        };
        let _ = write!(badges, "<span class=\"variant {}\">{}</span>", class, label);
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "<div class=\"device-card{}\" data-brand=\"{}\" data-codename=\"{}\">",
        if highlighted { " your-device" } else { "" },
        attr(&d.brand.to_lowercase()),
        attr(&d.codename),
    );
    if highlighted {
        out.push_str("  <div class=\"your-device-badge\">Your Device</div>\n");
    }
    let _ = write!(
        out,
        concat!(
            "  <a href=\"devices/{link}.html\">\n",
            "    <img src=\"{img}\" alt=\"{alt}\" onerror=\"this.src='{fallback}'\">\n",
            "    <h3>{name}</h3>\n",
            "    <p class=\"codename\">{codename}</p>\n",
            "  </a>\n",
            "  <div class=\"badges\"><span class=\"status {status_class}\">{status}</span>{badges}</div>\n",
            "  <p class=\"maintainer\">{maintainer}</p>\n",
            "</div>\n",
        ),
        link = attr(&d.codename),
        img = attr(image_or_fallback(&d.image_url)),
        alt = attr(&d.name),
        fallback = FALLBACK_IMAGE,
        name = text(&d.name),
        codename = text(&d.codename),
        status_class = status_class,
        status = d.status.label(),
        badges = badges,
        maintainer = text(&d.maintainer),
    );
    out
}

pub fn render_device_grid<'a>(
    cards: impl IntoIterator<Item = &'a DeviceCard>,
    highlight: Option<&str>,
) -> String {
    let body: String = cards
        .into_iter()
        .map(|c| render_device_card(c, highlight))
        .collect();
    if body.is_empty() {
        return concat!(
            "<div class=\"downloads-grid\">\n",
            "<div class=\"empty\"><p>No devices found.</p></div>\n",
            "</div>\n",
        )
        .to_string();
    }
    format!("<div class=\"downloads-grid\">\n{}</div>\n", body)
}

/// Avatar and profile URL for a GitHub username; fallback image and `#` without one.
fn github_links(username: Option<&str>) -> Option<(String, String)> {
    username
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(|u| {
            (
                format!("https://github.com/{}.png", u),
                format!("https://github.com/{}", u),
            )
        })
}

fn render_member(member: &TeamMember, card_class: &str, avatar_class: &str) -> String {
    let links = github_links(member.github.as_deref());
    let avatar = links.as_ref().map_or(FALLBACK_IMAGE, |(a, _)| a.as_str());
    let social = match &links {
        Some((_, profile)) => format!("<a href=\"{}\" target=\"_blank\">GitHub</a>", attr(profile)),
        None => String::new(),
    };
    let card_class = if card_class.is_empty() {
        "card".to_string()
    } else {
        format!("card {}", card_class)
    };
    format!(
        concat!(
            "<div class=\"{card_class}\">\n",
            "  <div class=\"{avatar_class}\"><img src=\"{avatar}\" alt=\"{alt}\" onerror=\"this.src='{fallback}'\"></div>\n",
            "  <h3>{name}</h3>\n",
            "  <span class=\"role-badge\">{role}</span>\n",
            "  <p class=\"quote\">\"{quote}\"</p>\n",
            "  <div class=\"social-links\">{social}</div>\n",
            "</div>\n",
        ),
        card_class = card_class,
        avatar_class = avatar_class,
        avatar = attr(avatar),
        alt = attr(&member.name),
        fallback = FALLBACK_IMAGE,
        name = text(&member.name),
        role = text(&member.role),
        quote = text(&member.quote),
        social = social,
    )
}

pub fn render_team_section(
    id: &str,
    members: &[TeamMember],
    card_class: &str,
    avatar_class: &str,
) -> String {
    let body: String = members
        .iter()
        .map(|m| render_member(m, card_class, avatar_class))
        .collect();
    format!("<section id=\"{}\">\n{}</section>\n", attr(id), body)
}

pub fn render_team_page(roster: &TeamRoster) -> String {
    [
        render_team_section("lead-container", &roster.leads, "card-lead", "team-avatar-lg"),
        render_team_section("core-container", &roster.core, "", "team-avatar-md"),
        render_team_section("designers-container", &roster.designers, "", "team-avatar-md"),
        render_team_section(
            "contributors-container",
            &roster.contributors,
            "",
            "team-avatar-sm",
        ),
    ]
    .concat()
}

pub fn render_maintainers(maintainers: &[Maintainer]) -> String {
    let mut out = String::from("<div id=\"maintainers-grid\">\n");
    for m in maintainers {
        let links = github_links(m.username.as_deref());
        let (avatar, profile, target) = match &links {
            Some((a, p)) => (a.as_str(), p.as_str(), "_blank"),
            None => (FALLBACK_IMAGE, "#", "_self"),
        };
        let _ = writeln!(
            out,
            concat!(
                "<div class=\"card\"><a href=\"{profile}\" target=\"{target}\">",
                "<img src=\"{avatar}\" alt=\"{alt}\" onerror=\"this.src='{fallback}'\">",
                "<h4>{name}</h4><p>{devices}</p></a></div>",
            ),
            profile = attr(profile),
            target = target,
            avatar = attr(avatar),
            alt = attr(&m.name),
            fallback = FALLBACK_IMAGE,
            name = text(&m.name),
            devices = text(&m.devices.join(", ")),
        );
    }
    out.push_str("</div>\n");
    out
}

#[cfg(test)]
#[path = "../tests/site/render_tests.rs"]
mod tests;
