use serde::{Deserialize, Serialize};

/// `GET /user`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Identity {
    pub login: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// `GET /repos/{owner}/{repo}/contents/{path}`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContentsResponse {
    #[serde(default)]
    pub path: String,
    pub sha: String,
    pub content: String,

    #[serde(default = "default_encoding")]
    pub encoding: String,
}

fn default_encoding() -> String {
    "base64".to_string()
}

/// `PUT /repos/{owner}/{repo}/contents/{path}`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PutContentsRequest {
    pub message: String,
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,

    pub branch: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PutContentsResponse {
    pub content: ContentRef,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContentRef {
    #[serde(default)]
    pub path: String,
    pub sha: String,
}

/// `GET /repos/{owner}/{repo}/git/trees/{branch}?recursive=1`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TreeResponse {
    #[serde(default)]
    pub sha: String,
    #[serde(default)]
    pub tree: Vec<TreeItem>,
    #[serde(default)]
    pub truncated: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TreeItem {
    pub path: String,

    #[serde(rename = "type", default = "default_item_type")]
    pub kind: String,
}

fn default_item_type() -> String {
    "blob".to_string()
}

/// Error body shape shared by the API and the development store.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiErrorBody {
    pub fn text(self) -> Option<String> {
        self.message.or(self.error)
    }
}
