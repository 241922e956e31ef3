//! Per-invocation task arguments

use serde::{Deserialize, Deserializer, Serialize};

/// Arguments for one pipeline run.
///
/// Hosts pass booleans either as JSON booleans or as strings, so `overwrite`
/// accepts both.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskArgs {
    /// Explicit Instagram post URL; wins over every other source
    #[serde(default, deserialize_with = "blank_as_none")]
    pub url: Option<String>,
    /// Replace existing title/date/url instead of filling blanks only
    #[serde(default, deserialize_with = "lenient_bool")]
    pub overwrite: bool,
    /// Instagram `sessionid` cookie value
    #[serde(default, deserialize_with = "blank_as_none")]
    pub ig_sessionid: Option<String>,
}

impl TaskArgs {
    /// Arguments used for hook-triggered runs: no explicit URL, no overwrite
    pub fn for_hook() -> Self {
        Self::default()
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.ig_sessionid = Some(session_id.into());
        self
    }
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolLike {
        Bool(bool),
        Text(String),
        Number(i64),
    }

    Ok(match Option::<BoolLike>::deserialize(deserializer)? {
        None => false,
        Some(BoolLike::Bool(b)) => b,
        Some(BoolLike::Number(n)) => n != 0,
        Some(BoolLike::Text(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "on"
        ),
    })
}
