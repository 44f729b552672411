//! Loads the project file (`folio.yaml`) and defines the shared site
//! configuration, including the [`ThemeConfig`] handed to the theme layer.

use crate::discovery;
use crate::post::PostIndex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the project file searched for by [`Config::from_directory`].
pub const PROJECT_FILE: &str = "folio.yaml";

#[derive(Deserialize)]
struct ContentDirectory(PathBuf);
impl Default for ContentDirectory {
    fn default() -> Self {
        ContentDirectory(PathBuf::from("docs"))
    }
}

#[derive(Deserialize)]
struct OutputDirectory(PathBuf);
impl Default for OutputDirectory {
    fn default() -> Self {
        OutputDirectory(PathBuf::from("dist"))
    }
}

#[derive(Deserialize)]
struct OnlyPost(bool);
impl Default for OnlyPost {
    fn default() -> Self {
        OnlyPost(true)
    }
}

#[derive(Deserialize)]
struct NotFoundMarker(String);
impl Default for NotFoundMarker {
    fn default() -> Self {
        NotFoundMarker(String::from("404"))
    }
}

#[derive(Deserialize)]
struct SitemapFile(PathBuf);
impl Default for SitemapFile {
    fn default() -> Self {
        SitemapFile(PathBuf::from("sitemap.xml"))
    }
}

#[derive(Deserialize)]
struct Project {
    #[serde(default)]
    content_directory: ContentDirectory,

    #[serde(default)]
    output_directory: OutputDirectory,

    #[serde(default)]
    only_post: OnlyPost,

    #[serde(default)]
    hostname: Option<Url>,

    #[serde(default)]
    not_found_marker: NotFoundMarker,

    #[serde(default)]
    sitemap_file: SitemapFile,

    #[serde(default)]
    title: Option<String>,

    #[serde(default)]
    description: Option<String>,

    #[serde(default)]
    theme: ThemeConfig,
}

/// The configuration exposed to the theme layer. `all_posts` is filled in by
/// [`define_config`].
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ThemeConfig {
    #[serde(default)]
    pub logo: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub author: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(skip_deserializing)]
    pub all_posts: PostIndex,
}

/// The resolved site configuration. Relative paths in the project file are
/// resolved against the project file's directory.
#[derive(Clone, Debug)]
pub struct Config {
    /// The root of the document tree.
    pub content_directory: PathBuf,

    /// Where `build` writes its output files.
    pub output_directory: PathBuf,

    /// Whether only documents declaring `template: post` are indexed.
    pub only_post: bool,

    /// The site's public base URL. The sitemap is only produced when this is
    /// set.
    pub hostname: Option<Url>,

    /// Pages whose output path contains this are left out of the sitemap.
    pub not_found_marker: String,

    /// The sitemap's file name, relative to `output_directory`.
    pub sitemap_file: PathBuf,

    pub title: Option<String>,

    pub description: Option<String>,

    pub theme: ThemeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            content_directory: ContentDirectory::default().0,
            output_directory: OutputDirectory::default().0,
            only_post: OnlyPost::default().0,
            hostname: None,
            not_found_marker: NotFoundMarker::default().0,
            sitemap_file: SitemapFile::default().0,
            title: None,
            description: None,
            theme: ThemeConfig::default(),
        }
    }
}

impl Config {
    /// Loads the project file in `dir` or the nearest ancestor of `dir` that
    /// has one.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            Config::from_project_file(&path)
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent),
                None => Err(Error::ProjectFileNotFound),
            }
        }
    }

    /// Loads the project file at `path`.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let file = File::open(path).map_err(|err| Error::OpenProjectFile {
            path: path.to_owned(),
            err,
        })?;
        let project: Project = serde_yaml::from_reader(file).map_err(|err| Error::ParseProjectFile {
            path: path.to_owned(),
            err,
        })?;
        let project_root = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(Config {
            content_directory: project_root.join(project.content_directory.0),
            output_directory: project_root.join(project.output_directory.0),
            only_post: project.only_post.0,
            hostname: project.hostname,
            not_found_marker: project.not_found_marker.0,
            sitemap_file: project.sitemap_file.0,
            title: project.title,
            description: project.description,
            theme: project.theme,
        })
    }
}

/// Injects the post index into the theme configuration and fills in the site
/// title and description from the theme's when the project doesn't set them.
/// This reads the whole content tree and must finish before any page is
/// rendered.
pub fn define_config(mut config: Config) -> discovery::Result<Config> {
    config.theme.all_posts = PostIndex::build(&config.content_directory, config.only_post)?;
    if config.title.is_none() {
        config.title = config.theme.title.clone();
    }
    if config.description.is_none() {
        config.description = config.theme.description.clone();
    }
    Ok(config)
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading the project file.
#[derive(Debug)]
pub enum Error {
    /// Returned when no directory from the starting one up to the filesystem
    /// root contains a project file.
    ProjectFileNotFound,

    /// Returned when the project file can't be opened.
    OpenProjectFile { path: PathBuf, err: std::io::Error },

    /// Returned when the project file isn't valid.
    ParseProjectFile { path: PathBuf, err: serde_yaml::Error },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ProjectFileNotFound => write!(
                f,
                "Could not find `{}` in any parent directory",
                PROJECT_FILE
            ),
            Error::OpenProjectFile { path, err } => {
                write!(f, "Opening project file '{}': {}", path.display(), err)
            }
            Error::ParseProjectFile { path, err } => {
                write!(f, "Loading project file '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ProjectFileNotFound => None,
            Error::OpenProjectFile { path: _, err } => Some(err),
            Error::ParseProjectFile { path: _, err } => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_project_file() -> Result<()> {
        let config = Config::from_project_file(Path::new("./testdata/folio.yaml"))?;
        assert_eq!(config.content_directory, Path::new("./testdata").join("docs"));
        assert_eq!(config.output_directory, Path::new("./testdata").join("dist"));
        assert!(config.only_post);
        assert_eq!(
            config.hostname.as_ref().map(Url::as_str),
            Some("https://example.com/")
        );
        assert_eq!(config.not_found_marker, "404");
        assert_eq!(config.sitemap_file, Path::new("sitemap.xml"));
        assert_eq!(config.title, None);
        assert_eq!(config.theme.title.as_deref(), Some("Example Blog"));
        assert!(config.theme.all_posts.is_empty());
        Ok(())
    }

    #[test]
    fn test_from_directory_searches_ancestors() -> Result<()> {
        let config = Config::from_directory(Path::new("./testdata/docs/posts"))?;
        assert_eq!(config.content_directory, Path::new("./testdata").join("docs"));
        Ok(())
    }

    #[test]
    fn test_define_config() {
        let config = Config::from_project_file(Path::new("./testdata/folio.yaml")).unwrap();
        let config = define_config(config).unwrap();
        assert_eq!(config.title.as_deref(), Some("Example Blog"));
        assert_eq!(config.description.as_deref(), Some("Notes and posts"));
        assert_eq!(config.theme.all_posts.len(), 4);
        assert_eq!(config.theme.all_posts[0].path, "/posts/posts-1");
    }

    #[test]
    fn test_define_config_keeps_explicit_title() {
        let config = Config {
            content_directory: PathBuf::from("./testdata/docs"),
            title: Some(String::from("Mine")),
            theme: ThemeConfig {
                title: Some(String::from("Theirs")),
                ..ThemeConfig::default()
            },
            ..Config::default()
        };
        let config = define_config(config).unwrap();
        assert_eq!(config.title.as_deref(), Some("Mine"));
        assert_eq!(config.description, None);
    }

    #[test]
    fn test_define_config_missing_content_fails() {
        let config = Config {
            content_directory: PathBuf::from("./testdata/nowhere"),
            ..Config::default()
        };
        assert!(define_config(config).is_err());
    }
}
