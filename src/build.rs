//! Exports the [`Build`] type, which owns the state of a single build, and the
//! [`build_site`] function which drives a whole build: indexing posts
//! ([`crate::post`]), running the capture hook over every page
//! ([`crate::hook`]) including the generated archive pages, and writing the
//! sitemap ([`crate::sitemap`]).

use crate::config::{define_config, Config};
use crate::discovery::{self, canonical_root, discover, Document, ROOT_INDEX};
use crate::frontmatter::Frontmatter;
use crate::hook::{CaptureHook, NoTransform, PageData, PageTransform};
use crate::sitemap::{self, SitemapAssembler, SitemapPage};
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

/// The file, relative to the output directory, holding the post index.
pub const POSTS_FILE: &str = "posts.yaml";

/// The directory, relative to the content root, under which archive pages are
/// served (`/archive/<keyword>`).
pub const ARCHIVE_DIRECTORY: &str = "archive";

/// The state of one build. A fresh `Build` starts with no captured pages, so
/// nothing carries over between builds.
///
/// Pages are captured through [`Build::capture_hook`], which borrows the
/// build mutably; the sitemap ([`Build::sitemap`]) borrows it shared, so it
/// can only be assembled once every hook has been dropped.
pub struct Build {
    pages: Vec<SitemapPage>,
    hostname: Option<Url>,
    not_found_marker: String,
}

impl Build {
    pub fn new(hostname: Option<Url>, not_found_marker: impl Into<String>) -> Build {
        Build {
            pages: Vec::new(),
            hostname,
            not_found_marker: not_found_marker.into(),
        }
    }

    pub fn from_config(config: &Config) -> Build {
        Build::new(config.hostname.clone(), config.not_found_marker.clone())
    }

    /// Returns the page hook for this build, wrapping `prior` if the caller
    /// has a transform of its own.
    pub fn capture_hook<P: PageTransform>(&mut self, prior: Option<P>) -> CaptureHook<'_, P> {
        CaptureHook::new(&mut self.pages, &self.not_found_marker, prior)
    }

    /// The pages captured so far, in capture order.
    pub fn pages(&self) -> &[SitemapPage] {
        &self.pages
    }

    /// Returns the sitemap assembler, or `None` if no hostname is configured.
    pub fn sitemap(&self) -> Option<SitemapAssembler<'_>> {
        self.hostname
            .as_ref()
            .map(|hostname| SitemapAssembler::new(&self.pages, hostname))
    }
}

/// Builds the site described by `config`: indexes the posts and writes them to
/// [`POSTS_FILE`], runs the capture hook over every page under the content
/// root (the root `index.md` included) and over one archive page per keyword
/// in the index, and writes the sitemap when a hostname is configured. Page
/// bodies are passed through unrendered.
pub fn build_site(config: Config) -> Result<()> {
    let config = define_config(config)?;

    std::fs::create_dir_all(&config.output_directory).map_err(|err| Error::Io {
        path: config.output_directory.clone(),
        err,
    })?;

    let posts_path = config.output_directory.join(POSTS_FILE);
    serde_yaml::to_writer(create(&posts_path)?, &config.theme.all_posts)?;
    info!(path = %posts_path.display(), "wrote post index");

    let root = canonical_root(&config.content_directory)?;
    let mut build = Build::from_config(&config);
    {
        let mut hook = build.capture_hook::<NoTransform>(None);
        for path in pages(&root)? {
            let document = match Document::load(&root, &path)? {
                Some(document) => document,
                None => continue,
            };
            let page = PageData {
                relative_path: slash_path(&document.relative_path),
                frontmatter: document.frontmatter,
            };
            capture(&mut hook, &document.body, &document.path.to_string_lossy(), &page);
        }

        for archive in config.theme.all_posts.archives() {
            let page = archive_page(&archive);
            if root.join(&page.relative_path).is_file() {
                debug!(archive = %archive, "archive page exists on disk; not generating it");
                continue;
            }
            capture(&mut hook, "", &page.relative_path, &page);
        }
    }
    info!(pages = build.pages().len(), "captured pages");

    match build.sitemap() {
        Some(sitemap) => {
            let sitemap_path = config.output_directory.join(&config.sitemap_file);
            sitemap.write_xml(create(&sitemap_path)?)?;
            info!(path = %sitemap_path.display(), "wrote sitemap");
        }
        None => info!("no hostname configured; skipping sitemap"),
    }

    Ok(())
}

/// Every page under the content root: the discovered documents plus the root
/// index, which discovery leaves out.
fn pages(root: &Path) -> discovery::Result<Vec<PathBuf>> {
    let mut pages = discover(root)?;
    let root_index = root.join(ROOT_INDEX);
    if root_index.is_file() {
        pages.push(root_index);
    }
    pages.sort();
    Ok(pages)
}

/// The page listing the posts filed under `archive`. These pages have no
/// source document of their own.
fn archive_page(archive: &str) -> PageData {
    PageData {
        relative_path: format!("{}/{}.md", ARCHIVE_DIRECTORY, archive),
        frontmatter: Frontmatter {
            title: Some(archive.to_owned()),
            template: Some(String::from("archive")),
            ..Frontmatter::default()
        },
    }
}

fn capture(hook: &mut CaptureHook<'_>, code: &str, id: &str, page: &PageData) {
    match hook.transform_page(code, id, page) {
        Ok(_) => {}
        Err(never) => match never {},
    }
}

fn slash_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn create(path: &Path) -> Result<File> {
    File::create(path).map_err(|err| Error::Io {
        path: path.to_owned(),
        err,
    })
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site.
#[derive(Debug)]
pub enum Error {
    /// Returned when the content tree can't be read.
    Discovery(discovery::Error),

    /// Returned when the post index can't be serialized.
    Yaml(serde_yaml::Error),

    /// Returned for errors writing the sitemap.
    Sitemap(sitemap::Error),

    /// Returned for I/O problems creating output files.
    Io { path: PathBuf, err: std::io::Error },
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Discovery(err) => err.fmt(f),
            Error::Yaml(err) => write!(f, "Writing post index: {}", err),
            Error::Sitemap(err) => write!(f, "Writing sitemap: {}", err),
            Error::Io { path, err } => {
                write!(f, "Writing '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Discovery(err) => Some(err),
            Error::Yaml(err) => Some(err),
            Error::Sitemap(err) => Some(err),
            Error::Io { path: _, err } => Some(err),
        }
    }
}

impl From<discovery::Error> for Error {
    /// Converts [`discovery::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: discovery::Error) -> Error {
        Error::Discovery(err)
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts [`serde_yaml::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: serde_yaml::Error) -> Error {
        Error::Yaml(err)
    }
}

impl From<sitemap::Error> for Error {
    /// Converts [`sitemap::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: sitemap::Error) -> Error {
        Error::Sitemap(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::frontmatter;

    fn page(relative_path: &str, source: &str) -> PageData {
        PageData {
            relative_path: relative_path.to_owned(),
            frontmatter: frontmatter::parse(source).0,
        }
    }

    fn render(build: &mut Build, pages: &[PageData]) {
        let mut hook = build.capture_hook::<NoTransform>(None);
        for page in pages {
            hook.transform_page("", &page.relative_path, page).unwrap();
        }
    }

    #[test]
    fn test_sitemap_requires_hostname() {
        let mut build = Build::new(None, "404");
        render(&mut build, &[page("about.md", "")]);
        assert_eq!(build.pages().len(), 1);
        assert!(build.sitemap().is_none());
    }

    #[test]
    fn test_builds_do_not_share_pages() {
        let hostname = Url::parse("https://example.com").unwrap();
        let mut first = Build::new(Some(hostname.clone()), "404");
        render(&mut first, &[page("about.md", ""), page("index.md", "")]);
        assert_eq!(first.sitemap().unwrap().items().len(), 2);

        let second = Build::new(Some(hostname), "404");
        assert!(second.sitemap().unwrap().items().is_empty());
    }

    #[test]
    fn test_rendered_pages_end_to_end() {
        let hostname = Url::parse("https://example.com").unwrap();
        let mut build = Build::new(Some(hostname), "404");
        render(
            &mut build,
            &[
                page("about.md", "---\ndate: 2023-01-01\ntemplate: post\n---\n"),
                page("404.md", "---\ntemplate: home\n---\n"),
                page("posts/index.md", "---\ntemplate: allPost\n---\n"),
                page("index.md", "---\ntemplate: home\n---\n"),
                page("archive/rust.md", "---\ntemplate: archive\n---\n"),
            ],
        );

        let items = build.sitemap().unwrap().items();
        let urls: Vec<_> = items.iter().map(|item| item.url.as_str()).collect();
        assert_eq!(urls, vec!["/", "/posts/", "/archive/rust", "/about"]);
        assert_eq!(items[3].priority, 0.6);
        assert_eq!(items[3].lastmod.as_deref(), Some("2023-01-01T00:00:00.000Z"));
        assert!(items.iter().all(|item| !item.url.contains("404")));
    }

    #[test]
    fn test_archive_page() {
        let mut build = Build::new(None, "404");
        let page = archive_page("rust");
        render(&mut build, &[page]);

        let captured = &build.pages()[0];
        assert_eq!(captured.path, "/archive/rust");
        assert_eq!(captured.template, "archive");
        assert_eq!(captured.title, "rust");
        assert_eq!(captured.priority, 0.7);
        assert_eq!(captured.lastmod, None);
    }

    #[test]
    fn test_build_site() {
        let output_directory =
            std::env::temp_dir().join(format!("folio-build-site-{}", std::process::id()));
        let mut config = Config::from_project_file(Path::new("./testdata/folio.yaml")).unwrap();
        config.output_directory = output_directory.clone();
        build_site(config).unwrap();

        let posts = std::fs::read_to_string(output_directory.join(POSTS_FILE)).unwrap();
        assert!(posts.contains("path: /posts/posts-1"));
        assert!(!posts.contains("path: /sponsor/"));

        let xml = std::fs::read_to_string(output_directory.join("sitemap.xml")).unwrap();
        assert!(xml.contains("<loc>https://example.com/</loc>"));
        assert!(xml.contains("<loc>https://example.com/sponsor/</loc>"));
        assert!(!xml.contains("404"));
        assert!(!xml.contains("binary"));
        let home = xml.find("<loc>https://example.com/</loc>").unwrap();
        let all_posts = xml.find("<loc>https://example.com/posts/</loc>").unwrap();
        let archive = xml.find("<loc>https://example.com/archive</loc>").unwrap();
        let about = xml.find("<loc>https://example.com/about</loc>").unwrap();
        assert!(home < all_posts && all_posts < archive && archive < about);

        // One generated archive page per keyword, ranked with the archives.
        let mut archives = Vec::new();
        for keyword in &["a", "b", "c"] {
            let loc = format!("<loc>https://example.com/archive/{}</loc>", keyword);
            let at = xml.find(&loc).unwrap();
            assert!(archive < at && at < about);
            assert!(xml[at..].starts_with(&format!("{}\n    <priority>0.7</priority>", loc)));
            archives.push(at);
        }
        assert!(archives.windows(2).all(|pair| pair[0] < pair[1]));

        std::fs::remove_dir_all(&output_directory).unwrap();
    }
}
