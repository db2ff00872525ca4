use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// `devices.json` as published next to the OTA manifests.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DevicesFile {
    #[serde(default)]
    pub devices: Vec<DeviceRecord>,
}

/// A device row exactly as stored; most fields are optional in the wild.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub codename: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub maintainer: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub github_username: String,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "String::is_empty"
    )]
    pub support_group: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub image_url: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub pling_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Metadata copied through by hand-edited tooling shows up as strings, numbers or null.
fn lenient_text<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Ok(lenient_opt_text(de)?.unwrap_or_default())
}

fn lenient_opt_text<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(de)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Active,
    Inactive,
}

impl DeviceStatus {
    pub fn label(self) -> &'static str {
        match self {
            DeviceStatus::Active => "Active",
            DeviceStatus::Inactive => "Inactive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Some(DeviceStatus::Active),
            "inactive" => Some(DeviceStatus::Inactive),
            _ => None,
        }
    }
}

/// A device ready for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Device {
    pub name: String,
    pub codename: String,
    pub brand: String,
    pub maintainer: String,
    pub github_username: String,
    pub support_group: String,
    pub image_url: String,
    pub pling_id: Option<String>,
    pub status: DeviceStatus,
}

impl Device {
    pub fn from_record(record: DeviceRecord) -> Self {
        let brand = if record.brand.trim().is_empty() {
            brand_from_name(&record.name).to_string()
        } else {
            record.brand
        };

        let status = match record.status.as_deref() {
            None => DeviceStatus::Active,
            Some(s) if s.eq_ignore_ascii_case("active") => DeviceStatus::Active,
            Some(_) => DeviceStatus::Inactive,
        };

        let github_username = if record.github_username.is_empty() {
            record
                .maintainer
                .split(' ')
                .next()
                .unwrap_or_default()
                .to_string()
        } else {
            record.github_username
        };

        let pling_id = Some(record.pling_id).filter(|p| !p.trim().is_empty());

        Self {
            name: record.name,
            codename: record.codename,
            brand,
            maintainer: record.maintainer,
            github_username,
            support_group: record.support_group,
            image_url: record.image_url,
            pling_id,
            status,
        }
    }
}

/// Best guess at a brand slug from a marketing name.
pub fn brand_from_name(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    let has = |needle: &str| lower.contains(needle);

    if has("pixel") {
        "google"
    } else if has("xiaomi") || has("redmi") || has("poco") {
        "xiaomi"
    } else if has("samsung") {
        "samsung"
    } else if has("oneplus") {
        "oneplus"
    } else if has("nothing") {
        "nothing"
    } else if has("motorola") {
        "motorola"
    } else if has("asus") {
        "asus"
    } else if has("realme") {
        "realme"
    } else {
        "other"
    }
}

/// `{codename}/updates.json`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdateManifest {
    #[serde(default)]
    pub response: Vec<UpdateBuild>,
}

impl UpdateManifest {
    pub fn first(&self) -> Option<&UpdateBuild> {
        self.response.first()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdateBuild {
    #[serde(default)]
    pub variants: BTreeMap<String, Option<VariantBuild>>,

    #[serde(
        default,
        deserialize_with = "lenient_opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub device: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub oem: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub maintainer: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub github_username: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_url: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub pling_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantBuild {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<NumberOrText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<NumberOrText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<NumberOrText>,
    #[serde(default)]
    pub md5: String,
}

impl VariantBuild {
    pub fn size_bytes(&self) -> Option<u64> {
        self.size.as_ref().and_then(NumberOrText::as_u64)
    }

    /// Build time in unix seconds, preferring `timestamp` over `datetime`.
    pub fn built_at(&self) -> Option<i64> {
        self.timestamp
            .as_ref()
            .and_then(NumberOrText::as_i64)
            .filter(|t| *t != 0)
            .or_else(|| self.datetime.as_ref().and_then(NumberOrText::as_i64))
    }
}

/// Manifests in the wild carry sizes and times both as JSON numbers and as strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(i64),
    Text(String),
}

impl NumberOrText {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            NumberOrText::Number(n) => Some(*n),
            NumberOrText::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.as_i64().and_then(|n| u64::try_from(n).ok())
    }
}
