use std::collections::HashMap;

use super::catalog::DEVICES_PATH;
use super::fetch::DataFetcher;
use crate::config::OtaConfig;
use crate::error::CmsResult;
use crate::model::{DeviceRecord, DevicesFile, UpdateBuild, UpdateManifest};
use crate::remote::ContentStoreClient;

const IGNORED_FOLDERS: [&str; 2] = ["templates", ".git"];
const UNKNOWN: &str = "Unknown";

#[derive(Debug, Default)]
pub struct GeneratedIndex {
    pub file: DevicesFile,
    /// Codenames whose manifest was missing, unreadable or empty.
    pub skipped: Vec<String>,
}

/// Codenames with a top-level `{codename}/updates.json`, in tree order.
pub fn device_codenames_from_tree<'a>(paths: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    paths
        .into_iter()
        .filter_map(|path| {
            let (codename, file) = path.split_once('/')?;
            if file != "updates.json" || codename.is_empty() {
                return None;
            }
            if IGNORED_FOLDERS.contains(&codename) || codename.starts_with('.') {
                return None;
            }
            Some(codename.to_string())
        })
        .collect()
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.is_empty())
}

fn from_meta(meta: Option<&DeviceRecord>, pick: impl Fn(&DeviceRecord) -> &str) -> Option<String> {
    meta.map(pick)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Update manifest fields win over existing metadata; the result is always `Active`.
pub fn merge_device(codename: &str, build: &UpdateBuild, meta: Option<&DeviceRecord>) -> DeviceRecord {
    DeviceRecord {
        name: build
            .device
            .clone()
            .or_else(|| from_meta(meta, |m| m.name.as_str()))
            .unwrap_or_else(|| UNKNOWN.to_string()),
        codename: codename.to_string(),
        brand: build
            .oem
            .clone()
            .or_else(|| from_meta(meta, |m| m.brand.as_str()))
            .unwrap_or_else(|| UNKNOWN.to_string()),
        maintainer: build
            .maintainer
            .clone()
            .or_else(|| from_meta(meta, |m| m.maintainer.as_str()))
            .unwrap_or_else(|| UNKNOWN.to_string()),
        github_username: non_empty(&build.github_username)
            .or_else(|| from_meta(meta, |m| m.github_username.as_str()))
            .unwrap_or_default(),
        support_group: from_meta(meta, |m| m.support_group.as_str()).unwrap_or_default(),
        image_url: non_empty(&build.image_url)
            .or_else(|| from_meta(meta, |m| m.image_url.as_str()))
            .unwrap_or_default(),
        pling_id: non_empty(&build.pling_id)
            .or_else(|| from_meta(meta, |m| m.pling_id.as_str()))
            .unwrap_or_default(),
        status: Some("Active".to_string()),
    }
}

/// Builds the index for `codenames`, reading manifests and existing metadata through
/// `raw`. Existing metadata is optional.
pub fn build_devices_index(raw: &DataFetcher, codenames: &[String]) -> GeneratedIndex {
    let existing: HashMap<String, DeviceRecord> = match raw.fetch_json::<DevicesFile>(DEVICES_PATH)
    {
        Ok(file) => file
            .devices
            .into_iter()
            .filter(|d| !d.codename.is_empty())
            .map(|d| (d.codename.to_lowercase(), d))
            .collect(),
        Err(err) => {
            tracing::warn!(error = %err, "no existing device metadata");
            HashMap::new()
        }
    };

    let mut index = GeneratedIndex::default();
    for codename in codenames {
        let path = format!("{}/updates.json", codename);
        let first = match raw.fetch_json::<UpdateManifest>(&path) {
            Ok(manifest) => manifest.response.into_iter().next(),
            Err(err) => {
                tracing::debug!(codename = %codename, error = %err, "manifest unreadable");
                None
            }
        };
        let Some(build) = first else {
            tracing::warn!(codename = %codename, "invalid or empty updates.json; skipped");
            index.skipped.push(codename.clone());
            continue;
        };
        let meta = existing.get(&codename.to_lowercase());
        index.file.devices.push(merge_device(codename, &build, meta));
    }

    index
        .file
        .devices
        .sort_by(|a, b| (&a.brand, &a.name).cmp(&(&b.brand, &b.name)));
    tracing::info!(
        devices = index.file.devices.len(),
        skipped = index.skipped.len(),
        "device index generated"
    );
    index
}

/// Lists the OTA repository tree, then builds the index from its manifests.
pub fn generate_devices_index(
    client: &ContentStoreClient,
    raw: &DataFetcher,
    ota: &OtaConfig,
) -> CmsResult<GeneratedIndex> {
    let tree = client.list_tree(&ota.owner, &ota.repo, &ota.branch)?;
    let codenames = device_codenames_from_tree(
        tree.tree
            .iter()
            .filter(|item| item.kind == "blob")
            .map(|item| item.path.as_str()),
    );
    tracing::debug!(found = codenames.len(), "device folders with manifests");
    Ok(build_devices_index(raw, &codenames))
}

#[cfg(test)]
#[path = "../tests/site/generate_tests.rs"]
mod tests;
