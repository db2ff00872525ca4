use reqwest::Url;

use super::catalog::DeviceCard;
use crate::model::{Device, DeviceStatus};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceFilter {
    pub query: String,
    pub status: Option<DeviceStatus>,
    pub brand: Option<String>,
}

pub struct FilterOutcome<'a> {
    pub visible: Vec<&'a DeviceCard>,
    pub hidden: usize,
}

impl FilterOutcome<'_> {
    pub fn has_visible(&self) -> bool {
        !self.visible.is_empty()
    }
}

impl DeviceFilter {
    pub fn search(query: &str) -> Self {
        Self {
            query: query.to_string(),
            ..Self::default()
        }
    }

    /// Restores `search`, `status` and `brand` from a query string (leading `?` optional).
    /// Unknown keys and unparsable statuses are ignored.
    pub fn from_query_string(qs: &str) -> Self {
        let mut filter = Self::default();
        let Ok(url) = Url::parse(&format!("http://localhost/?{}", qs.trim_start_matches('?')))
        else {
            return filter;
        };
        for (k, v) in url.query_pairs() {
            match k.as_ref() {
                "search" => filter.query = v.into_owned(),
                "status" => filter.status = DeviceStatus::parse(&v),
                "brand" if !v.trim().is_empty() => filter.brand = Some(v.into_owned()),
                _ => {}
            }
        }
        filter
    }

    pub fn to_query_string(&self) -> String {
        let Ok(mut url) = Url::parse("http://localhost/") else {
            return String::new();
        };
        {
            let mut pairs = url.query_pairs_mut();
            if !self.query.trim().is_empty() {
                pairs.append_pair("search", self.query.trim());
            }
            if let Some(status) = self.status {
                pairs.append_pair("status", &status.label().to_lowercase());
            }
            if let Some(brand) = &self.brand {
                pairs.append_pair("brand", brand);
            }
        }
        url.query().unwrap_or_default().to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty() && self.status.is_none() && self.brand.is_none()
    }

    pub fn matches(&self, device: &Device) -> bool {
        let query = self.query.trim().to_lowercase();
        let text_ok = query.is_empty()
            || device.name.to_lowercase().contains(&query)
            || device.codename.to_lowercase().contains(&query);
        let status_ok = self.status.is_none_or(|s| s == device.status);
        let brand_ok = self
            .brand
            .as_deref()
            .is_none_or(|b| b.eq_ignore_ascii_case(&device.brand));
        text_ok && status_ok && brand_ok
    }

    pub fn apply<'a>(&self, cards: &'a [DeviceCard]) -> FilterOutcome<'a> {
        let visible: Vec<&DeviceCard> = cards.iter().filter(|c| self.matches(&c.device)).collect();
        let hidden = cards.len() - visible.len();
        FilterOutcome { visible, hidden }
    }
}

#[cfg(test)]
#[path = "../tests/site/filter_tests.rs"]
mod tests;
