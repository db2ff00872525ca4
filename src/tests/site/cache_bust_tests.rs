use super::*;

#[test]
fn local_assets_get_a_version_and_old_versions_are_replaced() {
    let html = r#"<link href="/css/style.css?v=1699.1"><script src="js/main.js"></script>"#;
    assert_eq!(
        rewrite_asset_versions(html, "1700000000"),
        r#"<link href="/css/style.css?v=1700000000"><script src="js/main.js?v=1700000000"></script>"#
    );
}

#[test]
fn external_and_other_assets_are_untouched() {
    let html = concat!(
        r#"<script src="https://cdn.test/lib.js"></script>"#,
        r#"<link href="//fonts.test/f.css">"#,
        r#"<img src="/img/logo.webp">"#,
        r#"<a href="/downloads.html">"#,
    );
    assert_eq!(rewrite_asset_versions(html, "2"), html);
}

#[test]
fn walks_site_skipping_ignored_directories() {
    let root = tempfile::tempdir().unwrap();
    let p = root.path();
    std::fs::create_dir_all(p.join("devices")).unwrap();
    std::fs::create_dir_all(p.join("node_modules/pkg")).unwrap();
    std::fs::create_dir_all(p.join(".git")).unwrap();

    std::fs::write(p.join("index.html"), r#"<script src="js/main.js"></script>"#).unwrap();
    std::fs::write(p.join("devices/x.html"), "<p>no assets</p>").unwrap();
    std::fs::write(p.join("node_modules/pkg/a.html"), r#"<script src="a.js"></script>"#).unwrap();
    std::fs::write(p.join(".git/b.html"), r#"<script src="b.js"></script>"#).unwrap();
    std::fs::write(p.join("notes.txt"), r#"src="c.js""#).unwrap();

    let report = bust_cache(p, "7").unwrap();
    assert_eq!(report.scanned, 2);
    assert_eq!(report.updated, vec![p.join("index.html")]);
    assert_eq!(
        std::fs::read_to_string(p.join("index.html")).unwrap(),
        r#"<script src="js/main.js?v=7"></script>"#
    );
    assert_eq!(
        std::fs::read_to_string(p.join("node_modules/pkg/a.html")).unwrap(),
        r#"<script src="a.js"></script>"#
    );

    // Same version again: nothing changes.
    assert!(bust_cache(p, "7").unwrap().updated.is_empty());
}

#[test]
fn timestamp_version_is_numeric() {
    let v = timestamp_version();
    assert!(v.parse::<u64>().unwrap() > 1_600_000_000);
}
