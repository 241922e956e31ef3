//! Shared test helpers: fixtures and in-memory fakes of the host and HTTP layer

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::PathBuf;

use instameta_core::host::pick_tag;
use instameta_core::{
    HostApi, HostError, HttpError, HttpRequest, HttpResponse, HttpTransport, InstagramConfig,
    InstagramSource,
};
use instameta_domain::{Item, ItemKind, ItemUpdate, TagRef};

/// Get the path to a fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_fixtures")
        .join(name)
}

/// Load a mock Instagram response fixture
pub fn load_response_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(&format!("responses/{}", name)))
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", name))
}

/// HTTP transport answering from a queue and recording every request
#[derive(Default)]
pub struct FakeTransport {
    responses: RefCell<VecDeque<Result<HttpResponse, HttpError>>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: impl Into<String>) -> Self {
        self.responses
            .borrow_mut()
            .push_back(Ok(HttpResponse::new(status, body)));
        self
    }

    pub fn fail(self, error: HttpError) -> Self {
        self.responses.borrow_mut().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }
}

impl HttpTransport for FakeTransport {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        self.requests.borrow_mut().push(request.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(HttpResponse::new(599, "no response queued")))
    }
}

/// Instagram source over a fake transport with default endpoints
pub fn fake_source(transport: FakeTransport) -> InstagramSource<FakeTransport> {
    InstagramSource::new(transport, InstagramConfig::default())
}

/// Like [`fake_source`] with a configured fallback session credential
pub fn fake_source_with_session(
    transport: FakeTransport,
    session_id: &str,
) -> InstagramSource<FakeTransport> {
    let config = InstagramConfig {
        session_id: Some(session_id.to_string()),
        ..InstagramConfig::default()
    };
    InstagramSource::new(transport, config)
}

/// Host keeping items and tags in memory
#[derive(Default)]
pub struct FakeHost {
    items: RefCell<Vec<Item>>,
    tags: RefCell<Vec<TagRef>>,
    updates: RefCell<Vec<(ItemKind, ItemUpdate)>>,
    created_tags: RefCell<Vec<String>>,
    fail_updates: bool,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(self, item: Item) -> Self {
        self.items.borrow_mut().push(item);
        self
    }

    pub fn with_tag(self, tag: TagRef) -> Self {
        self.tags.borrow_mut().push(tag);
        self
    }

    pub fn failing_updates(mut self) -> Self {
        self.fail_updates = true;
        self
    }

    pub fn item(&self, kind: ItemKind, id: &str) -> Option<Item> {
        self.items
            .borrow()
            .iter()
            .find(|item| item.kind == kind && item.id == id)
            .cloned()
    }

    pub fn tags(&self) -> Vec<TagRef> {
        self.tags.borrow().clone()
    }

    pub fn updates(&self) -> Vec<(ItemKind, ItemUpdate)> {
        self.updates.borrow().clone()
    }

    pub fn created_tags(&self) -> Vec<String> {
        self.created_tags.borrow().clone()
    }
}

impl HostApi for FakeHost {
    async fn find_item(&self, kind: ItemKind, id: &str) -> Result<Option<Item>, HostError> {
        Ok(self.item(kind, id))
    }

    async fn update_item(&self, kind: ItemKind, update: &ItemUpdate) -> Result<(), HostError> {
        if self.fail_updates {
            return Err(HostError::Graphql("update rejected".to_string()));
        }
        self.updates.borrow_mut().push((kind, update.clone()));

        let tags = self.tags.borrow();
        let mut items = self.items.borrow_mut();
        let item = items
            .iter_mut()
            .find(|item| item.kind == kind && item.id == update.id)
            .ok_or_else(|| HostError::Graphql(format!("{} {} not found", kind, update.id)))?;
        if let Some(title) = &update.title {
            item.title = Some(title.clone());
        }
        if let Some(date) = &update.date {
            item.date = Some(date.clone());
        }
        if let Some(url) = &update.url {
            item.url = Some(url.clone());
        }
        if let Some(ids) = &update.tag_ids {
            item.tags = ids
                .iter()
                .filter_map(|id| tags.iter().find(|tag| &tag.id == id).cloned())
                .collect();
        }
        Ok(())
    }

    async fn find_tag(&self, name: &str) -> Result<Option<TagRef>, HostError> {
        Ok(pick_tag(self.tags(), name))
    }

    async fn create_tag(&self, name: &str) -> Result<TagRef, HostError> {
        let mut tags = self.tags.borrow_mut();
        let tag = TagRef::new(format!("t{}", tags.len() + 1), name);
        tags.push(tag.clone());
        self.created_tags.borrow_mut().push(name.to_string());
        Ok(tag)
    }
}
