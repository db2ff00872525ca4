use serde::{Deserialize, Serialize};

use super::DeviceRecord;

/// `team.json`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TeamRoster {
    #[serde(default)]
    pub leads: Vec<TeamMember>,
    #[serde(default)]
    pub core: Vec<TeamMember>,
    #[serde(default)]
    pub designers: Vec<TeamMember>,
    #[serde(default)]
    pub contributors: Vec<TeamMember>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub quote: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
}

/// A device maintainer with every codename they look after.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Maintainer {
    pub name: String,
    pub username: Option<String>,
    pub devices: Vec<String>,
}

/// Groups raw device rows by maintainer name, keeping first-seen order. Only an explicit
/// `github_username` is used; the username comes from the first row naming the maintainer.
pub fn collect_maintainers(devices: &[DeviceRecord]) -> Vec<Maintainer> {
    let mut out: Vec<Maintainer> = Vec::new();
    for d in devices {
        match out.iter_mut().find(|m| m.name == d.maintainer) {
            Some(m) => m.devices.push(d.codename.clone()),
            None => out.push(Maintainer {
                name: d.maintainer.clone(),
                username: Some(d.github_username.clone()).filter(|u| !u.is_empty()),
                devices: vec![d.codename.clone()],
            }),
        }
    }
    out
}
