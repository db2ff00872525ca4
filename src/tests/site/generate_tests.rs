use std::fs;
use std::time::Duration;

use super::*;
use crate::site::fetch::DataSource;

fn build(device: Option<&str>, oem: Option<&str>) -> UpdateBuild {
    UpdateBuild {
        device: device.map(str::to_string),
        oem: oem.map(str::to_string),
        github_username: Some(String::new()),
        ..UpdateBuild::default()
    }
}

#[test]
fn only_top_level_manifests_outside_ignored_folders_count() {
    let paths = [
        "README.md",
        "updates.json",
        "panther/updates.json",
        "panther/changelog.md",
        "templates/updates.json",
        ".github/updates.json",
        "deep/nested/updates.json",
        "oriole/updates.json",
    ];
    assert_eq!(
        device_codenames_from_tree(paths),
        vec!["panther".to_string(), "oriole".to_string()]
    );
}

#[test]
fn manifest_fields_win_and_metadata_fills_gaps() {
    let meta = DeviceRecord {
        name: "Old Name".to_string(),
        brand: "google".to_string(),
        maintainer: "Jane".to_string(),
        github_username: "jane".to_string(),
        support_group: "https://t.me/x".to_string(),
        pling_id: "99".to_string(),
        status: Some("Inactive".to_string()),
        ..DeviceRecord::default()
    };
    let merged = merge_device("panther", &build(Some("Pixel 7"), None), Some(&meta));

    assert_eq!(merged.name, "Pixel 7");
    assert_eq!(merged.codename, "panther");
    assert_eq!(merged.brand, "google");
    assert_eq!(merged.maintainer, "Jane");
    assert_eq!(merged.github_username, "jane");
    assert_eq!(merged.support_group, "https://t.me/x");
    assert_eq!(merged.pling_id, "99");
    assert_eq!(merged.image_url, "");
    assert_eq!(merged.status.as_deref(), Some("Active"));

    let bare = merge_device("x", &UpdateBuild::default(), None);
    assert_eq!(bare.name, "Unknown");
    assert_eq!(bare.brand, "Unknown");
    assert_eq!(bare.maintainer, "Unknown");
}

#[test]
fn index_skips_bad_manifests_and_sorts_by_brand_then_name() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path();
    for (codename, body) in [
        ("panther", r#"{"response":[{"device":"Pixel 7","oem":"google","variants":{}}]}"#),
        ("marble", r#"{"response":[{"device":"Poco F5","oem":"Xiaomi"}]}"#),
        ("cheetah", r#"{"response":[{"device":"Pixel 7 Pro","oem":"google"}]}"#),
        ("empty", r#"{"response":[]}"#),
        ("broken", "not json"),
    ] {
        fs::create_dir_all(p.join(codename)).unwrap();
        fs::write(p.join(codename).join("updates.json"), body).unwrap();
    }
    fs::write(
        p.join("devices.json"),
        r#"{"devices":[{"codename":"PANTHER","maintainer":"Jane","pling_id":"7"}]}"#,
    )
    .unwrap();

    let raw = DataFetcher::new(DataSource::Local(p.to_path_buf()), Duration::from_secs(60)).unwrap();
    let codenames: Vec<String> = ["panther", "marble", "cheetah", "empty", "broken", "ghost"]
        .iter()
        .map(|c| c.to_string())
        .collect();
    let index = build_devices_index(&raw, &codenames);

    let order: Vec<&str> = index.file.devices.iter().map(|d| d.codename.as_str()).collect();
    assert_eq!(order, vec!["marble", "panther", "cheetah"]);
    assert_eq!(index.skipped, vec!["empty", "broken", "ghost"]);

    let panther = &index.file.devices[1];
    assert_eq!(panther.maintainer, "Jane");
    assert_eq!(panther.pling_id, "7");

    let json = crate::codec::encode_pretty(&index.file).unwrap();
    assert!(json.starts_with("{\n    \"devices\": ["));
}
