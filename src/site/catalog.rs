use std::collections::HashSet;

use time::OffsetDateTime;
use time::macros::format_description;

use super::fetch::DataFetcher;
use crate::error::CmsResult;
use crate::model::{Device, DeviceRecord, DevicesFile, UpdateBuild, UpdateManifest, VariantBuild};

pub const DEVICES_PATH: &str = "devices.json";

/// Preferred display order of variant keys; anything else follows alphabetically.
const VARIANT_ORDER: [&str; 4] = ["gapps", "basicgapps", "coregapps", "vanilla"];

#[derive(Clone, Debug)]
pub struct DeviceCard {
    pub device: Device,
    pub build: Option<UpdateBuild>,
}

impl DeviceCard {
    pub fn new(device: Device, build: Option<UpdateBuild>) -> Self {
        Self { device, build }
    }

    /// Variants that carry build data, in display order.
    pub fn variants(&self) -> Vec<(&str, &VariantBuild)> {
        let Some(build) = &self.build else {
            return Vec::new();
        };
        let mut out: Vec<(&str, &VariantBuild)> = build
            .variants
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (k.as_str(), v)))
            .collect();
        out.sort_by_key(|(k, _)| {
            let rank = VARIANT_ORDER
                .iter()
                .position(|o| o == k)
                .unwrap_or(VARIANT_ORDER.len());
            (rank, k.to_string())
        });
        out
    }

    fn variant(&self, key: &str) -> Option<&VariantBuild> {
        self.build
            .as_ref()
            .and_then(|b| b.variants.get(key))
            .and_then(Option::as_ref)
    }

    /// Best GMS build: gapps, then basicgapps, then coregapps.
    pub fn gms(&self) -> Option<(&'static str, &VariantBuild)> {
        ["gapps", "basicgapps", "coregapps"]
            .into_iter()
            .find_map(|k| self.variant(k).map(|v| (k, v)))
    }

    pub fn vanilla(&self) -> Option<&VariantBuild> {
        self.variant("vanilla")
    }

    /// Short badges for the grid: Full, Basic, Core, Vanilla.
    pub fn variant_badges(&self) -> Vec<&'static str> {
        [
            ("gapps", "Full"),
            ("basicgapps", "Basic"),
            ("coregapps", "Core"),
            ("vanilla", "Vanilla"),
        ]
        .into_iter()
        .filter(|(k, _)| self.variant(k).is_some())
        .map(|(_, label)| label)
        .collect()
    }

    pub fn has_builds(&self) -> bool {
        !self.variants().is_empty()
    }
}

/// Normalizes raw rows and drops repeated codenames, keeping the first.
pub fn normalize_devices(records: Vec<DeviceRecord>) -> Vec<Device> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(r.codename.clone()))
        .map(Device::from_record)
        .collect()
}

/// First entry of `{codename}/updates.json`, or `None` when it is missing or unusable.
pub fn fetch_update_build(fetcher: &DataFetcher, codename: &str) -> Option<UpdateBuild> {
    let path = format!("{}/updates.json", codename);
    match fetcher.fetch_json::<UpdateManifest>(&path) {
        Ok(manifest) => manifest.response.into_iter().next(),
        Err(err) => {
            tracing::debug!(codename, error = %err, "no update manifest");
            None
        }
    }
}

/// `devices.json` plus each device's manifest. Only the roster itself is required.
pub fn load_catalog(fetcher: &DataFetcher) -> CmsResult<Vec<DeviceCard>> {
    let file: DevicesFile = fetcher.fetch_json(DEVICES_PATH)?;
    let cards: Vec<DeviceCard> = normalize_devices(file.devices)
        .into_iter()
        .map(|device| {
            let build = fetch_update_build(fetcher, &device.codename);
            DeviceCard::new(device, build)
        })
        .collect();
    tracing::debug!(devices = cards.len(), "device catalog loaded");
    Ok(cards)
}

/// Index of the first device named in `user_agent`, by codename (longer than three
/// characters) or full name.
pub fn detect_device(cards: &[DeviceCard], user_agent: &str) -> Option<usize> {
    let ua = user_agent.to_lowercase();
    if ua.trim().is_empty() {
        return None;
    }
    cards.iter().position(|c| {
        let codename = c.device.codename.to_lowercase();
        let name = c.device.name.to_lowercase();
        (codename.len() > 3 && ua.contains(&codename)) || (!name.is_empty() && ua.contains(&name))
    })
}

/// Moves the detected device to the front; returns its codename.
pub fn highlight_first(cards: &mut Vec<DeviceCard>, user_agent: &str) -> Option<String> {
    let idx = detect_device(cards, user_agent)?;
    let card = cards.remove(idx);
    let codename = card.device.codename.clone();
    cards.insert(0, card);
    Some(codename)
}

/// Human-readable size with one decimal, trailing `.0` dropped.
pub fn format_bytes(bytes: Option<u64>) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let Some(bytes) = bytes else {
        return "Unknown Size".to_string();
    };
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let mut num = format!("{:.1}", value);
    if let Some(trimmed) = num.strip_suffix(".0") {
        num = trimmed.to_string();
    }
    format!("{} {}", num, UNITS[unit])
}

/// `Month D, YYYY` in UTC.
pub fn format_date(unix_secs: Option<i64>) -> String {
    const UNKNOWN: &str = "Unknown Date";
    let Some(secs) = unix_secs.filter(|s| *s != 0) else {
        return UNKNOWN.to_string();
    };
    let Ok(at) = OffsetDateTime::from_unix_timestamp(secs) else {
        return UNKNOWN.to_string();
    };
    at.format(format_description!("[month repr:long] [day padding:none], [year]"))
        .unwrap_or_else(|_| UNKNOWN.to_string())
}

pub fn variant_label(key: &str) -> String {
    match key {
        "gapps" => "Full".to_string(),
        "basicgapps" => "BasicGApps".to_string(),
        "coregapps" => "CoreGApps".to_string(),
        "vanilla" => "Vanilla".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/site/catalog_tests.rs"]
mod tests;
