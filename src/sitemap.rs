//! The sitemap: pages captured while rendering ([`SitemapPage`]), the ranked
//! entries assembled from them once every page is done ([`SitemapItem`]), and
//! their `sitemap.xml` serialization.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/</loc>
//!     <lastmod>2023-03-01T00:00:00.000Z</lastmod>
//!     <priority>1.0</priority>
//!   </url>
//! </urlset>
//! ```

use crate::date;
use crate::hook::{self, PageData};
use crate::route;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::io::{self, Write};
use url::Url;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// The render-time metadata of one output page.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SitemapPage {
    /// The output URL path. Always begins with `/`.
    pub path: String,

    pub date: String,

    pub title: String,

    pub author: String,

    pub template: String,

    pub keywords: Vec<String>,

    pub description: String,

    /// The declared date as an ISO-8601 timestamp. `None` when the page has no
    /// parseable date.
    pub lastmod: Option<String>,

    pub priority: f64,
}

impl SitemapPage {
    /// Builds the record for a page the host engine is rendering.
    pub fn capture(page: &PageData) -> SitemapPage {
        let frontmatter = &page.frontmatter;
        let date = frontmatter.date.clone().unwrap_or_default();
        SitemapPage {
            path: route::page_path(&page.relative_path),
            lastmod: date::iso8601(&date),
            priority: hook::priority(frontmatter.template.as_deref()),
            date,
            title: frontmatter.title.clone().unwrap_or_default(),
            author: frontmatter.author.clone().unwrap_or_default(),
            template: frontmatter.template.clone().unwrap_or_default(),
            keywords: frontmatter.keywords.clone(),
            description: frontmatter.description.clone().unwrap_or_default(),
        }
    }
}

/// One ranked sitemap entry.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SitemapItem {
    /// The page's output URL path.
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastmod: Option<String>,

    pub priority: f64,
}

/// Assembles the sitemap from a finished build's captured pages. Only
/// available when the site has a hostname; see
/// [`crate::build::Build::sitemap`].
pub struct SitemapAssembler<'a> {
    pages: &'a [SitemapPage],
    hostname: &'a Url,
}

impl<'a> SitemapAssembler<'a> {
    pub fn new(pages: &'a [SitemapPage], hostname: &'a Url) -> SitemapAssembler<'a> {
        SitemapAssembler { pages, hostname }
    }

    /// Returns an entry per captured page, highest priority first. Pages of
    /// equal priority keep the order in which they were captured.
    pub fn items(&self) -> Vec<SitemapItem> {
        let mut items: Vec<SitemapItem> = self
            .pages
            .iter()
            .map(|page| SitemapItem {
                url: page.path.clone(),
                lastmod: page.lastmod.clone(),
                priority: page.priority,
            })
            .collect();
        items.sort_by(|a, b| b.priority.total_cmp(&a.priority));
        items
    }

    /// Writes the entries from [`SitemapAssembler::items`] to `w` as a
    /// sitemaps.org `urlset`, resolving each path against the hostname.
    pub fn write_xml<W: Write>(&self, mut w: W) -> Result<()> {
        writeln!(w, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        writeln!(w, "<urlset xmlns=\"{}\">", SITEMAP_NS)?;
        for item in self.items() {
            let url = loc(self.hostname, &item.url)?;
            writeln!(w, "  <url>")?;
            writeln!(w, "    <loc>{}</loc>", escape_xml(url.as_str()))?;
            if let Some(lastmod) = &item.lastmod {
                writeln!(w, "    <lastmod>{}</lastmod>", escape_xml(lastmod))?;
            }
            writeln!(w, "    <priority>{:.1}</priority>", item.priority)?;
            writeln!(w, "  </url>")?;
        }
        writeln!(w, "</urlset>")?;
        Ok(())
    }
}

/// Appends the segments of `path` to the hostname's path. Each segment is
/// percent-encoded, so characters like `#`, `?` and `:` stay part of the path.
fn loc(hostname: &Url, path: &str) -> Result<Url> {
    let mut loc = hostname.clone();
    loc.path_segments_mut()
        .map_err(|_| Error::BaseUrl(hostname.clone()))?
        .pop_if_empty()
        .extend(path.trim_start_matches('/').split('/'));
    Ok(loc)
}

fn escape_xml(s: &str) -> Cow<'_, str> {
    if !s.contains(&['&', '<', '>', '"', '\''][..]) {
        return Cow::Borrowed(s);
    }

    Cow::Owned(
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;"),
    )
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem writing the sitemap.
#[derive(Debug)]
pub enum Error {
    /// Returned when writing to the output fails.
    Io(io::Error),

    /// Returned when the hostname can't have a path (e.g., `mailto:` URLs).
    BaseUrl(Url),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(f),
            Error::BaseUrl(hostname) => {
                write!(f, "Hostname '{}' can't be used as a base URL", hostname)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::BaseUrl(_) => None,
        }
    }
}

impl From<io::Error> for Error {
    /// Converts [`io::Error`]s into [`Error`]. This allows us to use the `?`
    /// operator while writing.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}
