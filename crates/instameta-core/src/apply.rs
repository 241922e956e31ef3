//! Applying a fetched post to a host item
//!
//! Field decisions are pure ([`plan_field_updates`]); only the tag lookup,
//! tag creation and the final update touch the host.

use instameta_domain::{Item, ItemUpdate, PostRecord, TagRef};

use crate::error::{InstametaError, Result};
use crate::host::HostApi;

/// One overwrite-guarded field copy from the post to the item
pub struct FieldRule {
    pub field: &'static str,
    current: fn(&Item) -> &str,
    proposed: fn(&PostRecord) -> String,
    assign: fn(&mut ItemUpdate, String),
}

/// Field rules in evaluation order; each is independent of the others
pub const FIELD_RULES: [FieldRule; 3] = [
    FieldRule {
        field: "title",
        current: Item::title_text,
        proposed: |post| post.caption.clone(),
        assign: |update, value| update.title = Some(value),
    },
    FieldRule {
        field: "date",
        current: Item::date_text,
        proposed: PostRecord::date_string,
        assign: |update, value| update.date = Some(value),
    },
    FieldRule {
        field: "url",
        current: Item::url_text,
        proposed: |post| post.permalink.clone(),
        assign: |update, value| update.url = Some(value),
    },
];

/// Whether `proposed` should replace `current`.
///
/// Empty values are never written and an unchanged value is never re-sent.
pub fn should_write(current: &str, proposed: &str, overwrite: bool) -> bool {
    if proposed.trim().is_empty() || proposed == current {
        return false;
    }
    overwrite || current.trim().is_empty()
}

/// Scalar field changes for `item`, without tags
pub fn plan_field_updates(item: &Item, post: &PostRecord, overwrite: bool) -> ItemUpdate {
    let mut update = ItemUpdate::new(item.id.clone());
    for rule in &FIELD_RULES {
        let current = (rule.current)(item);
        let proposed = (rule.proposed)(post);
        if should_write(current, &proposed, overwrite) {
            (rule.assign)(&mut update, proposed);
        } else {
            tracing::debug!("Keeping {} (overwrite={})", rule.field, overwrite);
        }
    }
    update
}

/// Names of the scalar fields `update` writes, in rule order
pub fn written_fields(update: &ItemUpdate) -> Vec<&'static str> {
    let set = [
        update.title.is_some(),
        update.date.is_some(),
        update.url.is_some(),
    ];
    FIELD_RULES
        .iter()
        .zip(set)
        .filter(|(_, written)| *written)
        .map(|(rule, _)| rule.field)
        .collect()
}

/// What the applier did to one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// The update sent to the host, if any
    pub update: Option<ItemUpdate>,
    pub tag: TagRef,
    pub tag_created: bool,
    pub tag_attached: bool,
}

impl ApplyOutcome {
    /// "set" when the field was written, "kept" otherwise
    pub fn field_status(&self, field: &str) -> &'static str {
        let written = self
            .update
            .as_ref()
            .is_some_and(|u| written_fields(u).iter().any(|f| *f == field));
        if written {
            "set"
        } else {
            "kept"
        }
    }

    pub fn changed(&self) -> bool {
        self.update.is_some()
    }
}

/// Write `post` onto `item` through `host`.
///
/// The username tag is found or created and attached additively whatever
/// `overwrite` says. No update is issued when nothing would change. A tag
/// created before a failed update is left in place.
pub async fn apply_post<H: HostApi>(
    host: &H,
    item: &Item,
    post: &PostRecord,
    overwrite: bool,
) -> Result<ApplyOutcome> {
    let mut update = plan_field_updates(item, post, overwrite);

    let (tag, tag_created) = match host
        .find_tag(&post.username)
        .await
        .map_err(InstametaError::Update)?
    {
        Some(tag) => (tag, false),
        None => {
            let tag = host
                .create_tag(&post.username)
                .await
                .map_err(InstametaError::Update)?;
            (tag, true)
        }
    };

    let tag_attached = !item.has_tag_id(&tag.id);
    if tag_attached {
        let mut ids = item.tag_ids();
        ids.push(tag.id.clone());
        update.tag_ids = Some(ids);
    }

    if update.is_empty() {
        tracing::info!("{} {} already up to date", item.kind, item.id);
        return Ok(ApplyOutcome {
            update: None,
            tag,
            tag_created,
            tag_attached,
        });
    }

    host.update_item(item.kind, &update)
        .await
        .map_err(InstametaError::Update)?;

    tracing::info!(
        "Updated {} {}: fields [{}], tag {:?}{}",
        item.kind,
        item.id,
        written_fields(&update).join(", "),
        tag.name,
        if tag_attached { " attached" } else { "" }
    );

    Ok(ApplyOutcome {
        update: Some(update),
        tag,
        tag_created,
        tag_attached,
    })
}
