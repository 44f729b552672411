//! Defines the [`PostRecord`] and [`PostIndex`] types, and the logic for
//! building the index from a content tree. The index is built once, before any
//! page is rendered, and then handed to the theme layer read-only (see
//! [`crate::config::define_config`]).

use crate::date;
use crate::discovery::{Discovery, Document, Result};
use crate::route;
use serde::Serialize;
use serde_yaml::Mapping;
use std::cmp::Reverse;
use std::ops::Deref;
use std::path::Path;
use tracing::info;

/// One document in the [`PostIndex`]. Fields the document didn't declare are
/// empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PostRecord {
    /// The logical URL path, e.g. `/posts/posts-1` or `/sponsor/`.
    pub path: String,

    pub date: String,

    pub title: String,

    pub author: String,

    pub template: String,

    pub keywords: Vec<String>,

    pub description: String,

    /// Every other declared frontmatter key.
    #[serde(flatten)]
    pub extra: Mapping,
}

impl From<Document> for PostRecord {
    fn from(document: Document) -> PostRecord {
        let frontmatter = document.frontmatter;
        PostRecord {
            path: route::post_path(&document.relative_path),
            date: frontmatter.date.unwrap_or_default(),
            title: frontmatter.title.unwrap_or_default(),
            author: frontmatter.author.unwrap_or_default(),
            template: frontmatter.template.unwrap_or_default(),
            keywords: frontmatter.keywords,
            description: frontmatter.description.unwrap_or_default(),
            extra: frontmatter.extra,
        }
    }
}

/// The posts of a site, most recent first. Posts whose date is missing or
/// unparseable come last, in discovery order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PostIndex(Vec<PostRecord>);

impl PostIndex {
    /// Discovers the documents under `content_directory` and indexes them.
    /// With `only_post`, only documents declaring `template: post` are
    /// indexed. Fails only if the content tree can't be read.
    pub fn build(content_directory: &Path, only_post: bool) -> Result<PostIndex> {
        let documents = Discovery::new(only_post).documents(content_directory)?;
        let index = PostIndex::from_records(documents.into_iter().map(PostRecord::from));
        info!(
            posts = index.len(),
            content_directory = %content_directory.display(),
            "indexed posts"
        );
        Ok(index)
    }

    /// Orders `records` by date, most recent first. The sort is stable, so
    /// records with equal (or equally missing) dates keep their relative
    /// order.
    pub fn from_records(records: impl IntoIterator<Item = PostRecord>) -> PostIndex {
        let mut dated: Vec<_> = records
            .into_iter()
            .map(|record| (date::parse(&record.date), record))
            .collect();
        dated.sort_by_key(|(date, _)| Reverse(*date));
        PostIndex(dated.into_iter().map(|(_, record)| record).collect())
    }

    /// Returns the post served from `path`, if any.
    pub fn find(&self, path: &str) -> Option<&PostRecord> {
        self.0.iter().find(|record| record.path == path)
    }

    /// Returns the names of the site's archive pages: every distinct keyword
    /// in the index, lowercased, in order of first appearance.
    pub fn archives(&self) -> Vec<String> {
        let mut archives: Vec<String> = Vec::new();
        for keyword in self.0.iter().flat_map(|record| record.keywords.iter()) {
            let archive = keyword.to_lowercase();
            if !archives.contains(&archive) {
                archives.push(archive);
            }
        }
        archives
    }
}

impl Deref for PostIndex {
    type Target = [PostRecord];

    fn deref(&self) -> &[PostRecord] {
        &self.0
    }
}

impl IntoIterator for PostIndex {
    type Item = PostRecord;
    type IntoIter = std::vec::IntoIter<PostRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
