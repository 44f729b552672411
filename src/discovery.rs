//! Enumerates the markdown documents under a content root and loads their
//! frontmatter. See [`discover`] for the matching rules and [`Discovery`] for
//! the post-only filter.

use crate::frontmatter::{self, Frontmatter};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

const MARKDOWN_EXTENSION: &str = "md";

/// The document at the content root which is never discovered. It is the
/// site's landing page rather than a post.
pub const ROOT_INDEX: &str = "index.md";

/// A discovered document with its frontmatter parsed.
#[derive(Clone, Debug)]
pub struct Document {
    /// The absolute path to the source file.
    pub path: PathBuf,

    /// The path of the source file relative to the content root.
    pub relative_path: PathBuf,

    pub frontmatter: Frontmatter,

    /// Everything after the frontmatter block.
    pub body: String,
}

impl Document {
    /// Reads and parses the document at `path`. Returns `Ok(None)` if the file
    /// isn't UTF-8 text, since such a file carries no metadata at all.
    pub fn load(root: &Path, path: &Path) -> Result<Option<Document>> {
        let bytes = std::fs::read(path).map_err(|err| Error::Io {
            path: path.to_owned(),
            err,
        })?;
        let contents = match String::from_utf8(bytes) {
            Ok(contents) => contents,
            Err(_) => {
                warn!(path = %path.display(), "skipping document that isn't UTF-8 text");
                return Ok(None);
            }
        };

        let (frontmatter, body) = frontmatter::parse(&contents);
        Ok(Some(Document {
            path: path.to_owned(),
            // `discover` only yields paths under `root`.
            relative_path: path.strip_prefix(root).unwrap_or(path).to_owned(),
            body: body.to_owned(),
            frontmatter,
        }))
    }
}

/// Loads documents from a content root. When `only_post` is set, only
/// documents declaring `template: post` are kept; otherwise every document
/// that could be read is kept, including those without frontmatter.
#[derive(Clone, Copy, Debug)]
pub struct Discovery {
    pub only_post: bool,
}

impl Discovery {
    pub fn new(only_post: bool) -> Discovery {
        Discovery { only_post }
    }

    /// Discovers (see [`discover`]) and loads the documents under `root`,
    /// applying the post-only filter.
    pub fn documents(&self, root: &Path) -> Result<Vec<Document>> {
        let root = canonical_root(root)?;
        let mut documents = Vec::new();
        for path in discover(&root)? {
            let document = match Document::load(&root, &path)? {
                Some(document) => document,
                None => continue,
            };
            if self.only_post && !document.frontmatter.is_post() {
                debug!(path = %path.display(), "skipping non-post document");
                continue;
            }
            documents.push(document);
        }
        Ok(documents)
    }
}

/// Returns the absolute paths of every `.md` file under `root` at any depth,
/// except `{root}/index.md`. Hidden files and directories are not searched.
/// Symbolic links are followed. The order of the result is unspecified.
pub fn discover(root: &Path) -> Result<Vec<PathBuf>> {
    let root = canonical_root(root)?;
    let mut paths = Vec::new();
    for result in WalkDir::new(&root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry))
    {
        let entry = result?;
        if !entry.file_type().is_file() || !is_markdown(entry.path()) {
            continue;
        }
        if entry.depth() == 1 && entry.file_name() == ROOT_INDEX {
            continue;
        }
        paths.push(entry.into_path());
    }
    Ok(paths)
}

/// Resolves `root` to an absolute path, failing if it doesn't exist.
pub fn canonical_root(root: &Path) -> Result<PathBuf> {
    root.canonicalize().map_err(|err| Error::Root {
        path: root.to_owned(),
        err,
    })
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .map(|extension| extension == MARKDOWN_EXTENSION)
        .unwrap_or(false)
}

/// The result of a fallible discovery operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failure to read the content tree. These are fatal: without the
/// content tree there is nothing to index.
#[derive(Debug)]
pub enum Error {
    /// Returned when the content root doesn't exist or can't be resolved.
    Root { path: PathBuf, err: std::io::Error },

    /// Returned when a document can't be read.
    Io { path: PathBuf, err: std::io::Error },

    /// Returned when walking the content tree fails.
    WalkDir(walkdir::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Root { path, err } => {
                write!(f, "Reading content root '{}': {}", path.display(), err)
            }
            Error::Io { path, err } => {
                write!(f, "Reading document '{}': {}", path.display(), err)
            }
            Error::WalkDir(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Root { path: _, err } => Some(err),
            Error::Io { path: _, err } => Some(err),
            Error::WalkDir(err) => Some(err),
        }
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator while walking the content tree.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}
