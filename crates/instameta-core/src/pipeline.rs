//! One enrichment run: resolve, extract, fetch, map, apply

use instameta_domain::{PostRecord, TaskArgs};
use instameta_identifiers::{extract_post_ref, resolve_post_url, UrlSource};

use crate::apply::{apply_post, ApplyOutcome};
use crate::error::{InstametaError, Result};
use crate::host::HostApi;
use crate::http::HttpTransport;
use crate::plugin::ItemTarget;
use crate::sources::{map_post, InstagramSource};

/// Fetch and map the post behind `url` without touching the host
pub async fn scrape_post<T: HttpTransport>(
    source: &InstagramSource<T>,
    url: &str,
    session_id: Option<&str>,
) -> Result<PostRecord> {
    let post_ref = extract_post_ref(url)?;
    tracing::debug!("Extracted {} from {}", post_ref, url);
    let payload = source.fetch(&post_ref, session_id).await?;
    map_post(&payload, &post_ref)
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub target: ItemTarget,
    pub source_url: String,
    pub post: PostRecord,
    pub outcome: ApplyOutcome,
}

impl RunReport {
    /// Summary line returned to the host
    pub fn summary(&self) -> String {
        format!(
            "Updated Instagram metadata: type={}, id={}, title={}, date={}, url={}, tag={}",
            self.target.kind,
            self.target.id,
            self.outcome.field_status("title"),
            self.post.date_string(),
            self.post.permalink,
            self.post.username,
        )
    }
}

/// Runs the enrichment for single items against a host and a source
pub struct Pipeline<'a, H, T> {
    host: &'a H,
    source: &'a InstagramSource<T>,
}

impl<'a, H: HostApi, T: HttpTransport> Pipeline<'a, H, T> {
    pub fn new(host: &'a H, source: &'a InstagramSource<T>) -> Self {
        Self { host, source }
    }

    /// Enrich one item. Any error aborts the run before the host is written.
    pub async fn run(&self, target: &ItemTarget, args: &TaskArgs) -> Result<RunReport> {
        let item = self
            .host
            .find_item(target.kind, &target.id)
            .await?
            .ok_or_else(|| InstametaError::ItemNotFound(target.kind, target.id.clone()))?;

        let resolved = resolve_post_url(args, &item)?;
        match &resolved.source {
            UrlSource::Argument => tracing::info!("Using URL from arguments: {}", resolved.url),
            UrlSource::ItemUrl => tracing::info!("Using item URL: {}", resolved.url),
            UrlSource::Sidecar(path) => {
                tracing::info!("Using URL from sidecar {}: {}", path.display(), resolved.url)
            }
        }

        let post = scrape_post(self.source, &resolved.url, args.ig_sessionid.as_deref()).await?;
        let outcome = apply_post(self.host, &item, &post, args.overwrite).await?;

        Ok(RunReport {
            target: target.clone(),
            source_url: resolved.url,
            post,
            outcome,
        })
    }
}
