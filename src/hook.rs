//! The per-page capture hook.
//!
//! A host build engine calls a [`PageTransform`] once for every page it
//! renders. [`CaptureHook`] is a decorator over an optional caller-supplied
//! transform: it records a [`SitemapPage`] for the page into the build's
//! accumulator and then hands the page, untouched, to the transform it wraps.

use crate::frontmatter::Frontmatter;
use crate::sitemap::SitemapPage;
use std::convert::Infallible;
use tracing::debug;

/// What the host engine knows about a page when it invokes a
/// [`PageTransform`].
#[derive(Clone, Debug, Default)]
pub struct PageData {
    /// The page's source path relative to the content root, `/`-separated
    /// (e.g. `posts/posts-1.md`).
    pub relative_path: String,

    /// The page's resolved frontmatter.
    pub frontmatter: Frontmatter,
}

/// A page-transform callback, invoked by the host engine once per rendered
/// page with the page's compiled output (`code`), its identifier (`id`) and
/// its [`PageData`]. A transform may return replacement output.
pub trait PageTransform {
    type Error;

    fn transform_page(
        &mut self,
        code: &str,
        id: &str,
        page: &PageData,
    ) -> Result<Option<String>, Self::Error>;
}

impl<F, E> PageTransform for F
where
    F: FnMut(&str, &str, &PageData) -> Result<Option<String>, E>,
{
    type Error = E;

    fn transform_page(
        &mut self,
        code: &str,
        id: &str,
        page: &PageData,
    ) -> Result<Option<String>, E> {
        self(code, id, page)
    }
}

/// The transform used when the caller didn't supply one. It never produces
/// output and never fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTransform;

impl PageTransform for NoTransform {
    type Error = Infallible;

    fn transform_page(&mut self, _: &str, _: &str, _: &PageData) -> Result<Option<String>, Infallible> {
        Ok(None)
    }
}

/// Sitemap priority for the home page.
pub const HOME_PRIORITY: f64 = 1.0;
/// Sitemap priority for the all-posts listing.
pub const ALL_POST_PRIORITY: f64 = 0.8;
/// Sitemap priority for archive pages.
pub const ARCHIVE_PRIORITY: f64 = 0.7;
/// Sitemap priority for everything else.
pub const DEFAULT_PRIORITY: f64 = 0.6;

/// Maps a page's `template` onto its sitemap priority.
pub fn priority(template: Option<&str>) -> f64 {
    match template {
        Some("home") => HOME_PRIORITY,
        Some("allPost") => ALL_POST_PRIORITY,
        Some("archive") => ARCHIVE_PRIORITY,
        _ => DEFAULT_PRIORITY,
    }
}

/// Records a [`SitemapPage`] for every page it sees, then calls the wrapped
/// transform (if any) with the original arguments. The wrapped transform's
/// output and errors are returned as-is.
///
/// The hook borrows the build's accumulator mutably, so the sitemap can't be
/// assembled until every hook for the build has been dropped. See
/// [`crate::build::Build::capture_hook`].
pub struct CaptureHook<'a, P = NoTransform> {
    pages: &'a mut Vec<SitemapPage>,
    not_found_marker: &'a str,
    prior: Option<P>,
}

impl<'a, P: PageTransform> CaptureHook<'a, P> {
    /// Creates a hook which appends to `pages`, skipping any page whose path
    /// contains `not_found_marker`, and chains to `prior`.
    pub fn new(
        pages: &'a mut Vec<SitemapPage>,
        not_found_marker: &'a str,
        prior: Option<P>,
    ) -> CaptureHook<'a, P> {
        CaptureHook {
            pages,
            not_found_marker,
            prior,
        }
    }
}

impl<P: PageTransform> PageTransform for CaptureHook<'_, P> {
    type Error = P::Error;

    fn transform_page(
        &mut self,
        code: &str,
        id: &str,
        page: &PageData,
    ) -> Result<Option<String>, P::Error> {
        let captured = SitemapPage::capture(page);
        if captured.path.contains(self.not_found_marker) {
            debug!(path = %captured.path, "leaving not-found page out of the sitemap");
        } else {
            debug!(path = %captured.path, priority = captured.priority, "captured page");
            self.pages.push(captured);
        }

        match &mut self.prior {
            Some(prior) => prior.transform_page(code, id, page),
            None => Ok(None),
        }
    }
}
