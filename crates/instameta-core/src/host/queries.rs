//! GraphQL documents sent to Stash

use instameta_domain::ItemKind;

pub const FIND_SCENE: &str = r#"
query FindScene($id: ID!) {
  findScene(id: $id) {
    id title url date
    tags { id name }
    files { path }
  }
}
"#;

pub const FIND_IMAGE: &str = r#"
query FindImage($id: ID!) {
  findImage(id: $id) {
    id title url date
    tags { id name }
    files { path }
  }
}
"#;

pub const SCENE_UPDATE: &str = r#"
mutation SceneUpdate($input: SceneUpdateInput!) {
  sceneUpdate(input: $input) { id }
}
"#;

pub const IMAGE_UPDATE: &str = r#"
mutation ImageUpdate($input: ImageUpdateInput!) {
  imageUpdate(input: $input) { id }
}
"#;

pub const FIND_TAGS_BY_NAME: &str = r#"
query FindTagsByName($name: String!) {
  findTags(
    tag_filter: { name: { value: $name, modifier: EQUALS } }
    filter: { per_page: -1 }
  ) {
    tags { id name }
  }
}
"#;

pub const TAG_CREATE: &str = r#"
mutation TagCreate($input: TagCreateInput!) {
  tagCreate(input: $input) { id name }
}
"#;

/// Query and response field for reading an item
pub fn find_item_query(kind: ItemKind) -> (&'static str, &'static str) {
    match kind {
        ItemKind::Scene => (FIND_SCENE, "findScene"),
        ItemKind::Image => (FIND_IMAGE, "findImage"),
    }
}

/// Mutation for updating an item
pub fn update_item_mutation(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Scene => SCENE_UPDATE,
        ItemKind::Image => IMAGE_UPDATE,
    }
}
