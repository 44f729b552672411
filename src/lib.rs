//! The library code for `folio`, the content metadata pipeline of a static
//! site. It runs at three points of a build:
//!
//! 1. Before any page is rendered, the markdown documents under the content
//!    root are discovered ([`crate::discovery`]), their frontmatter parsed
//!    ([`crate::frontmatter`]), and the posts collected into a [`PostIndex`]
//!    sorted by date ([`crate::post`]). [`config::define_config`] hands the
//!    index to the theme layer.
//! 2. While the host engine renders pages, a [`CaptureHook`]
//!    ([`crate::hook`]) records each page's path, dates, and sitemap priority
//!    into the build's accumulator, then chains to whatever page transform the
//!    caller already had.
//! 3. After the last page, the sitemap is assembled from the accumulator,
//!    highest priority first ([`crate::sitemap`]).
//!
//! [`build::Build`] owns one build's accumulator. [`build::build_site`] drives a
//! complete build without rendering anything, which is what the `folio` binary
//! does.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod date;
pub mod discovery;
pub mod frontmatter;
pub mod hook;
pub mod post;
pub mod route;
pub mod sitemap;

pub use hook::{CaptureHook, PageData, PageTransform};
pub use post::{PostIndex, PostRecord};
