//! Stash GraphQL client

use std::fmt;
use std::path::PathBuf;

use instameta_domain::{Item, ItemKind, ItemUpdate, TagRef};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};

use super::queries::{find_item_query, update_item_mutation, FIND_TAGS_BY_NAME, TAG_CREATE};
use super::{HostApi, HostError};
use crate::config::HostConfig;

const DEFAULT_SCHEME: &str = "http";
const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 9999;

/// Connection details passed by Stash in the plugin input
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ServerConnection {
    #[serde(rename = "Scheme", alias = "scheme")]
    pub scheme: String,
    #[serde(rename = "Host", alias = "host")]
    pub host: String,
    #[serde(rename = "Port", alias = "port", deserialize_with = "lenient_port")]
    pub port: u16,
    #[serde(rename = "SessionCookie", alias = "session_cookie")]
    pub session_cookie: Option<SessionCookie>,
    #[serde(rename = "ApiKey", alias = "api_key")]
    pub api_key: Option<String>,
}

#[derive(Clone, Deserialize)]
pub struct SessionCookie {
    #[serde(rename = "Name", alias = "name", default = "default_cookie_name")]
    pub name: String,
    #[serde(rename = "Value", alias = "value", default)]
    pub value: String,
}

fn default_cookie_name() -> String {
    "session".to_string()
}

fn lenient_port<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .and_then(|p| u16::try_from(p).ok())
            .ok_or_else(|| serde::de::Error::custom(format!("invalid port {}", n))),
        Value::String(s) if s.trim().is_empty() => Ok(DEFAULT_PORT),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid port {}", s))),
        Value::Null => Ok(DEFAULT_PORT),
        other => Err(serde::de::Error::custom(format!("invalid port {}", other))),
    }
}

impl Default for ServerConnection {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            session_cookie: None,
            api_key: None,
        }
    }
}

impl fmt::Debug for ServerConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConnection")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("session_cookie", &self.session_cookie.as_ref().map(|_| "<redacted>"))
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ServerConnection {
    /// GraphQL endpoint; a wildcard bind address is reached through localhost
    pub fn graphql_url(&self) -> String {
        let scheme = match self.scheme.trim() {
            "" => DEFAULT_SCHEME,
            s => s,
        };
        let host = match self.host.trim() {
            "" | "0.0.0.0" => DEFAULT_HOST,
            h => h,
        };
        format!("{}://{}:{}/graphql", scheme, host, self.port)
    }

    fn cookie_header(&self) -> Option<String> {
        self.session_cookie
            .as_ref()
            .filter(|c| !c.value.is_empty())
            .map(|c| format!("{}={}", c.name, c.value))
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }
}

#[derive(Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlErrorEntry>,
}

#[derive(Deserialize)]
struct GraphqlErrorEntry {
    message: String,
}

#[derive(Deserialize)]
struct RawItem {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    tags: Vec<TagRef>,
    #[serde(default)]
    files: Vec<RawFile>,
}

#[derive(Deserialize)]
struct RawFile {
    path: PathBuf,
}

impl RawItem {
    fn into_item(self, kind: ItemKind) -> Item {
        Item {
            id: self.id,
            kind,
            title: self.title,
            date: self.date,
            url: self.url,
            tags: self.tags,
            files: self.files.into_iter().map(|f| f.path).collect(),
        }
    }
}

#[derive(Deserialize)]
struct FindTagsData {
    #[serde(rename = "findTags")]
    find_tags: TagList,
}

#[derive(Deserialize)]
struct TagList {
    tags: Vec<TagRef>,
}

#[derive(Deserialize)]
struct TagCreateData {
    #[serde(rename = "tagCreate")]
    tag_create: TagRef,
}

/// Pick the tag for `name`: an exact match wins, otherwise a
/// case-insensitive one (the host rejects names differing only in case).
pub fn pick_tag(tags: Vec<TagRef>, name: &str) -> Option<TagRef> {
    let mut folded = None;
    for tag in tags {
        if tag.name == name {
            return Some(tag);
        }
        if folded.is_none() && tag.name.to_lowercase() == name.to_lowercase() {
            folded = Some(tag);
        }
    }
    folded
}

/// Host API over Stash's GraphQL endpoint
pub struct StashClient {
    client: Client,
    connection: ServerConnection,
    endpoint: String,
}

impl StashClient {
    pub fn new(connection: ServerConnection, config: &HostConfig) -> Result<Self, HostError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| HostError::Request(e.to_string()))?;
        let endpoint = connection.graphql_url();
        Ok(Self {
            client,
            connection,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn execute<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T, HostError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "query": query, "variables": variables }));
        if let Some(cookie) = self.connection.cookie_header() {
            request = request.header("Cookie", cookie);
        }
        if let Some(key) = self.connection.api_key() {
            request = request.header("ApiKey", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| HostError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| HostError::Request(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(HostError::Status {
                status,
                body: body.chars().take(300).collect(),
            });
        }

        let parsed: GraphqlResponse<T> =
            serde_json::from_str(&body).map_err(|e| HostError::Decode(e.to_string()))?;
        if !parsed.errors.is_empty() {
            let messages: Vec<String> = parsed.errors.into_iter().map(|e| e.message).collect();
            return Err(HostError::Graphql(messages.join("; ")));
        }
        parsed
            .data
            .ok_or_else(|| HostError::Decode("response has no data".to_string()))
    }
}

impl HostApi for StashClient {
    async fn find_item(&self, kind: ItemKind, id: &str) -> Result<Option<Item>, HostError> {
        let (query, field) = find_item_query(kind);
        let data: Value = self.execute(query, json!({ "id": id })).await?;
        match data.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(raw) => {
                let raw: RawItem = serde_json::from_value(raw.clone())
                    .map_err(|e| HostError::Decode(e.to_string()))?;
                Ok(Some(raw.into_item(kind)))
            }
        }
    }

    async fn update_item(&self, kind: ItemKind, update: &ItemUpdate) -> Result<(), HostError> {
        let _: Value = self
            .execute(update_item_mutation(kind), json!({ "input": update }))
            .await?;
        tracing::debug!("Updated {} {}", kind, update.id);
        Ok(())
    }

    async fn find_tag(&self, name: &str) -> Result<Option<TagRef>, HostError> {
        let data: FindTagsData = self
            .execute(FIND_TAGS_BY_NAME, json!({ "name": name }))
            .await?;
        Ok(pick_tag(data.find_tags.tags, name))
    }

    async fn create_tag(&self, name: &str) -> Result<TagRef, HostError> {
        let data: TagCreateData = self
            .execute(TAG_CREATE, json!({ "input": { "name": name } }))
            .await?;
        tracing::info!("Created tag {:?} (id {})", data.tag_create.name, data.tag_create.id);
        Ok(data.tag_create)
    }
}
