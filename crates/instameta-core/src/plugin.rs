//! Plugin input and output as exchanged with Stash over stdin/stdout

use std::fmt;
use std::str::FromStr;

use instameta_domain::{ItemKind, PostRecord, TaskArgs};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{InstametaError, Result};
use crate::host::ServerConnection;

/// Keys that name the target directly, with the kind they imply
const TARGET_ID_KEYS: &[(&str, ItemKind)] = &[
    ("sceneId", ItemKind::Scene),
    ("scene_id", ItemKind::Scene),
    ("sceneID", ItemKind::Scene),
    ("imageId", ItemKind::Image),
    ("image_id", ItemKind::Image),
    ("imageID", ItemKind::Image),
];

/// The item a run operates on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemTarget {
    pub kind: ItemKind,
    pub id: String,
}

impl ItemTarget {
    pub fn new(kind: ItemKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for ItemTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// Host hook events the plugin reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookEvent {
    SceneCreatePost,
    SceneUpdatePost,
    ImageCreatePost,
    ImageUpdatePost,
}

impl HookEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookEvent::SceneCreatePost => "Scene.Create.Post",
            HookEvent::SceneUpdatePost => "Scene.Update.Post",
            HookEvent::ImageCreatePost => "Image.Create.Post",
            HookEvent::ImageUpdatePost => "Image.Update.Post",
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            HookEvent::SceneCreatePost | HookEvent::SceneUpdatePost => ItemKind::Scene,
            HookEvent::ImageCreatePost | HookEvent::ImageUpdatePost => ItemKind::Image,
        }
    }
}

impl FromStr for HookEvent {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "Scene.Create.Post" => Ok(HookEvent::SceneCreatePost),
            "Scene.Update.Post" => Ok(HookEvent::SceneUpdatePost),
            "Image.Create.Post" => Ok(HookEvent::ImageCreatePost),
            "Image.Update.Post" => Ok(HookEvent::ImageUpdatePost),
            _ => Err(()),
        }
    }
}

/// What the host asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Manually triggered task with its arguments
    Task { target: ItemTarget, args: TaskArgs },
    /// One of the handled hook events
    Hook {
        event: HookEvent,
        target: ItemTarget,
        args: TaskArgs,
    },
    /// A hook this plugin does not handle
    IgnoredHook { hook_type: String },
}

/// Raw plugin input
#[derive(Debug, Clone, Default)]
pub struct PluginInput {
    pub server_connection: ServerConnection,
    pub args: Map<String, Value>,
    pub hook_context: Option<Map<String, Value>>,
}

impl PluginInput {
    /// Parse the JSON Stash writes to the plugin's stdin.
    ///
    /// Accepts `server_connection` or `serverConnection`, and args either at
    /// the top level or nested under `input`.
    pub fn parse(text: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(text)?;
        let root = root
            .as_object()
            .ok_or_else(|| InstametaError::Input("expected a JSON object".to_string()))?;

        let server_connection = match root
            .get("server_connection")
            .or_else(|| root.get("serverConnection"))
        {
            Some(Value::Null) | None => ServerConnection::default(),
            Some(value) => serde_json::from_value(value.clone())?,
        };

        let input = root.get("input").and_then(Value::as_object);
        let args = root
            .get("args")
            .or_else(|| input.and_then(|i| i.get("args")))
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let hook_context = args
            .get("hookContext")
            .or_else(|| input.and_then(|i| i.get("hookContext")))
            .or_else(|| root.get("hookContext"))
            .and_then(Value::as_object)
            .filter(|ctx| !ctx.is_empty())
            .cloned();

        Ok(Self {
            server_connection,
            args,
            hook_context,
        })
    }

    /// Task arguments from the `args` object
    pub fn task_args(&self) -> Result<TaskArgs> {
        let mut args = self.args.clone();
        args.remove("hookContext");
        Ok(serde_json::from_value(Value::Object(args))?)
    }

    /// Decide what to run
    pub fn invocation(&self) -> Result<Invocation> {
        let task_args = self.task_args()?;

        if let Some(ctx) = &self.hook_context {
            let hook_type = ctx
                .get("type")
                .and_then(Value::as_str)
                .map(str::trim)
                .unwrap_or_default();

            if let Ok(event) = hook_type.parse::<HookEvent>() {
                let id = ctx.get("id").and_then(id_string).ok_or(InstametaError::Target)?;
                let mut args = TaskArgs::for_hook();
                args.ig_sessionid = task_args.ig_sessionid;
                return Ok(Invocation::Hook {
                    event,
                    target: ItemTarget::new(event.kind(), id),
                    args,
                });
            }
            if hook_type.contains('.') {
                return Ok(Invocation::IgnoredHook {
                    hook_type: hook_type.to_string(),
                });
            }
        }

        let target = detect_target(self.hook_context.as_ref(), &self.args)?;
        Ok(Invocation::Task {
            target,
            args: task_args,
        })
    }
}

/// Find the target item: hook context first, then args
pub fn detect_target(
    hook_context: Option<&Map<String, Value>>,
    args: &Map<String, Value>,
) -> Result<ItemTarget> {
    if let Some(ctx) = hook_context {
        let kind = ctx
            .get("type")
            .or_else(|| ctx.get("__typename"))
            .and_then(Value::as_str)
            .and_then(|t| t.parse::<ItemKind>().ok());
        if let (Some(kind), Some(id)) = (kind, ctx.get("id").and_then(id_string)) {
            return Ok(ItemTarget::new(kind, id));
        }
        if let Some(target) = target_from_id_keys(ctx) {
            return Ok(target);
        }
    }

    let kind = args
        .get("target_type")
        .or_else(|| args.get("type"))
        .and_then(Value::as_str)
        .and_then(|t| t.parse::<ItemKind>().ok());
    let id = args
        .get("target_id")
        .or_else(|| args.get("id"))
        .and_then(id_string);
    if let (Some(kind), Some(id)) = (kind, id) {
        return Ok(ItemTarget::new(kind, id));
    }

    target_from_id_keys(args).ok_or(InstametaError::Target)
}

fn target_from_id_keys(object: &Map<String, Value>) -> Option<ItemTarget> {
    TARGET_ID_KEYS.iter().find_map(|(key, kind)| {
        let id = object.get(*key).and_then(id_string)?;
        Some(ItemTarget::new(*kind, id))
    })
}

/// Host ids arrive as strings or numbers
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The single JSON line written to stdout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginOutput {
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PluginOutput {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            output: message.into(),
            error: None,
        }
    }

    pub fn failure(err: &InstametaError) -> Self {
        let message = err.to_string();
        Self {
            output: message.clone(),
            error: Some(message),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{{\"output\":{:?}}}", self.output))
    }
}

/// Scraper result in the host's scraped-item shape
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScrapedFragment {
    #[serde(rename = "Title", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "Date", skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "URL", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "Tags", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<ScrapedTag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrapedTag {
    #[serde(rename = "Name")]
    pub name: String,
}

impl From<&PostRecord> for ScrapedFragment {
    fn from(post: &PostRecord) -> Self {
        let non_empty = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());
        Self {
            title: non_empty(&post.caption),
            date: Some(post.date_string()),
            url: non_empty(&post.permalink),
            tags: non_empty(&post.username)
                .map(|name| vec![ScrapedTag { name }])
                .unwrap_or_default(),
        }
    }
}

/// URL from scraper stdin: `{"url": ...}` (any case), a JSON string, or raw text
pub fn read_scrape_url(text: &str) -> Option<String> {
    let text = text.trim();
    let url = match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(object)) => ["url", "URL", "Url"]
            .iter()
            .find_map(|key| object.get(*key).and_then(Value::as_str))
            .map(str::to_string),
        Ok(Value::String(s)) => Some(s),
        Ok(_) => None,
        Err(_) => Some(text.to_string()),
    }?;
    Some(url.trim().to_string()).filter(|u| !u.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_parse_task_input() {
        let input = PluginInput::parse(
            &json!({
                "server_connection": {"Scheme": "http", "Host": "localhost", "Port": 9999},
                "args": {"scene_id": "42", "url": "https://instagram.com/p/XYZ/", "overwrite": "true"}
            })
            .to_string(),
        )
        .unwrap();
        match input.invocation().unwrap() {
            Invocation::Task { target, args } => {
                assert_eq!(target, ItemTarget::new(ItemKind::Scene, "42"));
                assert!(args.overwrite);
                assert_eq!(args.url.as_deref(), Some("https://instagram.com/p/XYZ/"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_hook_input() {
        let input = PluginInput::parse(
            &json!({
                "serverConnection": {"Port": 9999},
                "args": {
                    "url": "ignored",
                    "overwrite": true,
                    "ig_sessionid": "hook-sess",
                    "hookContext": {"id": 7, "type": "Image.Create.Post", "input": {}}
                }
            })
            .to_string(),
        )
        .unwrap();
        match input.invocation().unwrap() {
            Invocation::Hook { event, target, args } => {
                assert_eq!(event, HookEvent::ImageCreatePost);
                assert_eq!(target, ItemTarget::new(ItemKind::Image, "7"));
                assert_eq!(args.url, None);
                assert!(!args.overwrite);
                assert_eq!(args.ig_sessionid.as_deref(), Some("hook-sess"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unhandled_hook_is_ignored() {
        let input = PluginInput::parse(
            r#"{"args": {"hookContext": {"id": 3, "type": "Gallery.Update.Post"}}}"#,
        )
        .unwrap();
        assert_eq!(
            input.invocation().unwrap(),
            Invocation::IgnoredHook {
                hook_type: "Gallery.Update.Post".to_string()
            }
        );
    }

    #[test]
    fn test_legacy_nested_input() {
        let input = PluginInput::parse(
            r#"{"input": {"args": {"overwrite": true}, "hookContext": {"type": "Scene", "id": "5"}}}"#,
        )
        .unwrap();
        match input.invocation().unwrap() {
            Invocation::Task { target, args } => {
                assert_eq!(target, ItemTarget::new(ItemKind::Scene, "5"));
                assert!(args.overwrite);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_detect_target_from_args() {
        let args = json!({"target_type": "image", "target_id": 9});
        let target = detect_target(None, args.as_object().unwrap()).unwrap();
        assert_eq!(target, ItemTarget::new(ItemKind::Image, "9"));

        let args = json!({"imageID": "11"});
        let target = detect_target(None, args.as_object().unwrap()).unwrap();
        assert_eq!(target, ItemTarget::new(ItemKind::Image, "11"));

        let args = json!({"type": "Gallery", "id": "1"});
        assert!(matches!(
            detect_target(None, args.as_object().unwrap()),
            Err(InstametaError::Target)
        ));
    }

    #[test]
    fn test_bad_json_is_input_error() {
        assert!(matches!(
            PluginInput::parse("{not json"),
            Err(InstametaError::Input(_))
        ));
    }

    #[test]
    fn test_output_records() {
        assert_eq!(PluginOutput::success("done").to_json(), r#"{"output":"done"}"#);
        let failed = PluginOutput::failure(&InstametaError::NoUrlFound);
        assert!(failed.is_error());
        assert_eq!(failed.error.as_deref(), Some(failed.output.as_str()));
    }

    #[test]
    fn test_read_scrape_url() {
        assert_eq!(
            read_scrape_url(r#"{"URL": "https://instagram.com/p/A1/"}"#).as_deref(),
            Some("https://instagram.com/p/A1/")
        );
        assert_eq!(
            read_scrape_url(r#""https://instagram.com/p/A1/""#).as_deref(),
            Some("https://instagram.com/p/A1/")
        );
        assert_eq!(
            read_scrape_url("https://instagram.com/p/A1/\n").as_deref(),
            Some("https://instagram.com/p/A1/")
        );
        assert_eq!(read_scrape_url(r#"{"title": "x"}"#), None);
        assert_eq!(read_scrape_url("  "), None);
    }

    #[test]
    fn test_scraped_fragment_omits_empty_values() {
        let post = PostRecord {
            caption: String::new(),
            post_date: NaiveDate::from_ymd_opt(2022, 1, 2).unwrap(),
            permalink: "https://www.instagram.com/p/ABC123/".to_string(),
            username: "alice".to_string(),
            shortcode: "ABC123".to_string(),
        };
        let json = serde_json::to_value(ScrapedFragment::from(&post)).unwrap();
        assert_eq!(
            json,
            json!({
                "Date": "2022-01-02",
                "URL": "https://www.instagram.com/p/ABC123/",
                "Tags": [{"Name": "alice"}]
            })
        );
    }
}
