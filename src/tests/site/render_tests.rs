use std::collections::BTreeMap;

use super::*;
use crate::model::{Device, DeviceRecord, UpdateBuild, VariantBuild, collect_maintainers};

fn card(name: &str, codename: &str, image: &str, variants: &[&str]) -> DeviceCard {
    let device = Device::from_record(DeviceRecord {
        name: name.to_string(),
        codename: codename.to_string(),
        maintainer: "Jane <Doe>".to_string(),
        image_url: image.to_string(),
        ..DeviceRecord::default()
    });
    let build = (!variants.is_empty()).then(|| UpdateBuild {
        variants: variants
            .iter()
            .map(|k| (k.to_string(), Some(VariantBuild::default())))
            .collect::<BTreeMap<_, _>>(),
        ..UpdateBuild::default()
    });
    DeviceCard::new(device, build)
}

#[test]
fn change_lines_lose_markers_and_blank_lines() {
    let block = "\n  1. First\n2) Second\n\n- dash\n* star\n+ plus\n> quote\n• dot\n. period\n10.Tight\nplain - text\n";
    assert_eq!(
        parse_changes(block),
        vec![
            "First", "Second", "dash", "star", "plus", "quote", "dot", "period", "Tight",
            "plain - text"
        ]
    );
    assert!(parse_changes("").is_empty());
    assert!(parse_changes("\n \n\t\n").is_empty());
}

#[test]
fn only_one_leading_marker_is_removed() {
    assert_eq!(parse_changes("- - nested"), vec!["- nested"]);
    assert_eq!(parse_changes("1.5x faster"), vec!["5x faster"]);
}

#[test]
fn timeline_renders_badge_and_escapes() {
    let entries = vec![
        ChangelogEntry::new("2.0 <beta>", "Jan 2", true, "\n- Fix <script>\n- B & C\n"),
        ChangelogEntry::new("1.0", "Jan 1", false, "- old"),
    ];
    let html = render_changelog_timeline(&entries);

    assert_eq!(html.matches("class=\"timeline-item\"").count(), 2);
    assert_eq!(html.matches(">Latest<").count(), 1);
    assert!(html.contains("2.0 &lt;beta&gt; <span class=\"badge\">Latest</span>"));
    assert!(html.contains("<li>Fix &lt;script&gt;</li><li>B &amp; C</li>"));
    assert!(html.contains("<li>old</li>"));
    assert!(!html.contains("<script>"));
}

#[test]
fn empty_timeline_is_an_error_fragment() {
    let html = render_changelog_timeline(&[]);
    assert!(html.contains("load-error"));
    assert!(!html.contains("timeline-item"));
}

#[test]
fn device_card_uses_fallback_image_and_variant_badges() {
    let html = render_device_card(&card("Pixel 7", "panther", "", &["gapps", "vanilla"]), None);
    assert!(html.contains("src=\"/img/fallback.webp\""));
    assert!(html.contains(">Full</span>"));
    assert!(html.contains(">Vanilla</span>"));
    assert!(!html.contains(">Core</span>"));
    assert!(html.contains("status-active\">Active<"));
    assert!(html.contains("Jane &lt;Doe&gt;"));
    assert!(html.contains("data-brand=\"google\""));
    assert!(!html.contains("Your Device"));

    let html = render_device_card(
        &card("Pixel \"7\"", "panther", "https://img.test/p.png", &[]),
        Some("panther"),
    );
    assert!(html.contains("src=\"https://img.test/p.png\""));
    assert!(html.contains("alt=\"Pixel &quot;7&quot;\""));
    assert!(html.contains("Your Device"));
}

#[test]
fn empty_grid_says_so() {
    let html = render_device_grid(&Vec::<DeviceCard>::new(), None);
    assert!(html.contains("No devices found."));

    let cards = vec![card("A phone", "alpha", "", &[]), card("B phone", "bravo", "", &[])];
    let html = render_device_grid(&cards, None);
    assert_eq!(html.matches("class=\"device-card").count(), 2);
    assert!(!html.contains("No devices found."));
}

#[test]
fn team_members_link_github_only_when_known() {
    let roster = TeamRoster {
        leads: vec![TeamMember {
            name: "Lead".to_string(),
            role: "Founder".to_string(),
            quote: "Ship it".to_string(),
            github: Some("leaddev".to_string()),
        }],
        contributors: vec![TeamMember {
            name: "Anon".to_string(),
            role: "Tester".to_string(),
            quote: String::new(),
            github: None,
        }],
        ..TeamRoster::default()
    };
    let html = render_team_page(&roster);

    assert!(html.contains("<section id=\"lead-container\">"));
    assert!(html.contains("<section id=\"designers-container\">\n</section>"));
    assert!(html.contains("class=\"card card-lead\""));
    assert!(html.contains("src=\"https://github.com/leaddev.png\""));
    assert!(html.contains("href=\"https://github.com/leaddev\""));
    assert_eq!(html.matches("https://github.com/").count(), 2);
    assert!(html.contains("<div class=\"team-avatar-sm\"><img src=\"/img/fallback.webp\""));
}

#[test]
fn maintainer_grid_groups_devices() {
    let rows = vec![
        DeviceRecord {
            maintainer: "Jane".to_string(),
            codename: "panther".to_string(),
            github_username: "janedev".to_string(),
            ..DeviceRecord::default()
        },
        DeviceRecord {
            maintainer: "Bob".to_string(),
            codename: "marble".to_string(),
            ..DeviceRecord::default()
        },
        DeviceRecord {
            maintainer: "Jane".to_string(),
            codename: "cheetah".to_string(),
            ..DeviceRecord::default()
        },
    ];
    let html = render_maintainers(&collect_maintainers(&rows));

    assert!(html.contains("<h4>Jane</h4><p>panther, cheetah</p>"));
    assert!(html.contains("href=\"https://github.com/janedev\" target=\"_blank\""));
    assert!(html.contains("href=\"#\" target=\"_self\""));
    assert!(html.find("Jane").unwrap() < html.find("Bob").unwrap());
}
