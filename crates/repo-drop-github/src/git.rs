use repo_drop::{GitRef, TreeItem};
use serde::{Deserialize, Serialize};

/// Body of `POST /repos/{owner}/{repo}/git/blobs`.
#[derive(Debug, Serialize)]
pub struct CreateBlobRequest<'a> {
    pub content: &'a str,
    pub encoding: &'static str,
}

impl<'a> CreateBlobRequest<'a> {
    pub fn base64(content: &'a str) -> Self {
        Self {
            content,
            encoding: "base64",
        }
    }
}

/// Body of `POST /repos/{owner}/{repo}/git/trees`.
#[derive(Debug, Serialize)]
pub struct CreateTreeRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_tree: Option<&'a str>,
    pub tree: &'a [TreeItem],
}

/// Body of `POST /repos/{owner}/{repo}/git/commits`.
///
/// `parents` is left out entirely for a root commit.
#[derive(Debug, Serialize)]
pub struct CreateCommitRequest<'a> {
    pub message: &'a str,
    pub tree: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parents: Option<&'a [String]>,
}

/// Body of `PATCH /repos/{owner}/{repo}/git/refs/heads/{branch}`.
#[derive(Debug, Serialize)]
pub struct UpdateRefRequest<'a> {
    pub sha: &'a str,
    pub force: bool,
}

/// Body of `POST /repos/{owner}/{repo}/git/refs`.
#[derive(Debug, Serialize)]
pub struct CreateRefRequest<'a> {
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub sha: &'a str,
}

/// Any git object creation response; only the SHA is used.
#[derive(Debug, Deserialize)]
pub struct ObjectResponse {
    pub sha: String,
}

/// Response from the Git References API.
#[derive(Debug, Deserialize)]
pub struct RefResponse {
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub object: RefObject,
}

#[derive(Debug, Deserialize)]
pub struct RefObject {
    pub sha: String,
}

impl From<RefResponse> for GitRef {
    fn from(response: RefResponse) -> Self {
        Self {
            name: response.ref_name,
            sha: response.object.sha,
        }
    }
}

/// Body of `GET /git/refs/heads/{branch}`.
///
/// A missing branch that prefixes other refs (`feat` next to `feat-x`) comes
/// back as an array of those refs instead of a 404.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RefLookup {
    Single(RefResponse),
    Matches(Vec<RefResponse>),
}

impl RefLookup {
    /// Tip of exactly `ref_name`, if the lookup found it.
    pub fn tip(self, ref_name: &str) -> Option<String> {
        match self {
            Self::Single(reference) => {
                (reference.ref_name == ref_name).then_some(reference.object.sha)
            }
            Self::Matches(references) => references
                .into_iter()
                .find(|reference| reference.ref_name == ref_name)
                .map(|reference| reference.object.sha),
        }
    }
}
