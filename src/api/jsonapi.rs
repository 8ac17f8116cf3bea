//! JSON:API response documents
//!
//! Posts and tags are rendered as resource objects:
//!
//! ```json
//! {
//!   "data": {
//!     "type": "posts",
//!     "id": "1",
//!     "attributes": { "title": "...", "content": "...", "published": false,
//!                     "created-at": "...", "updated-at": "..." },
//!     "relationships": { "tags": { "data": [{ "type": "tags", "id": "2" }] } }
//!   },
//!   "included": [{ "type": "tags", "id": "2", "attributes": { "title": "News", ... } }]
//! }
//! ```
//!
//! `included` is omitted when no tags are referenced.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{PostWithTags, Tag, TagWithCount};

pub const POSTS_TYPE: &str = "posts";
pub const TAGS_TYPE: &str = "tags";

pub type PostDocument = Document<ResourceObject<PostAttributes>>;
pub type PostListDocument = Document<Vec<ResourceObject<PostAttributes>>>;
pub type TagDocument = Document<ResourceObject<TagAttributes>>;
pub type TagListDocument = Document<Vec<ResourceObject<TagAttributes>>>;

/// Top-level document
#[derive(Debug, Serialize)]
pub struct Document<D> {
    pub data: D,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<ResourceObject<TagAttributes>>,
}

#[derive(Debug, Serialize)]
pub struct ResourceObject<A> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub id: String,
    pub attributes: A,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationships: Option<PostRelationships>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct PostRelationships {
    pub tags: Relationship,
}

#[derive(Debug, Serialize)]
pub struct Relationship {
    pub data: Vec<ResourceIdentifier>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PostAttributes {
    pub title: String,
    pub content: String,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TagAttributes {
    pub title: String,
    /// Only known when the tag is the primary resource
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_count: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn post_resource(item: &PostWithTags) -> ResourceObject<PostAttributes> {
    let post = &item.post;
    let tags = item
        .tags
        .iter()
        .map(|tag| ResourceIdentifier {
            kind: TAGS_TYPE,
            id: tag.id.to_string(),
        })
        .collect();

    ResourceObject {
        kind: POSTS_TYPE,
        id: post.id.to_string(),
        attributes: PostAttributes {
            title: post.title.clone(),
            content: post.content.clone(),
            published: post.published,
            created_at: post.timestamps.created_at,
            updated_at: post.timestamps.updated_at,
        },
        relationships: Some(PostRelationships {
            tags: Relationship { data: tags },
        }),
    }
}

fn tag_resource(tag: &Tag, post_count: Option<i64>) -> ResourceObject<TagAttributes> {
    ResourceObject {
        kind: TAGS_TYPE,
        id: tag.id.to_string(),
        attributes: TagAttributes {
            title: tag.title.clone(),
            post_count,
            created_at: tag.timestamps.created_at,
            updated_at: tag.timestamps.updated_at,
        },
        relationships: None,
    }
}

/// Tags referenced by the posts, each once, ordered by ID
fn included_tags<'a>(posts: impl IntoIterator<Item = &'a PostWithTags>) -> Vec<ResourceObject<TagAttributes>> {
    let unique: BTreeMap<i64, &Tag> = posts
        .into_iter()
        .flat_map(|item| item.tags.iter())
        .map(|tag| (tag.id, tag))
        .collect();

    unique.values().map(|tag| tag_resource(tag, None)).collect()
}

pub fn post_document(item: &PostWithTags) -> PostDocument {
    Document {
        data: post_resource(item),
        included: included_tags([item]),
    }
}

pub fn posts_document(items: &[PostWithTags]) -> PostListDocument {
    Document {
        data: items.iter().map(post_resource).collect(),
        included: included_tags(items),
    }
}

pub fn tag_document(item: &TagWithCount) -> TagDocument {
    Document {
        data: tag_resource(&item.tag, Some(item.post_count)),
        included: Vec::new(),
    }
}

pub fn tags_document(items: &[TagWithCount]) -> TagListDocument {
    Document {
        data: items
            .iter()
            .map(|item| tag_resource(&item.tag, Some(item.post_count)))
            .collect(),
        included: Vec::new(),
    }
}
