//! Defines the [`Frontmatter`] type and the [`parse`] function which splits a
//! markdown document into its leading YAML block and its body.
//!
//! Parsing never fails. A document without a frontmatter block, with an
//! unterminated block, or with YAML that doesn't describe a mapping yields an
//! empty [`Frontmatter`], so every field must be treated as optional.

use serde_yaml::{Mapping, Value};
use tracing::debug;

const FENCE: &str = "---";
const BOM: char = '\u{feff}';

/// The metadata declared at the head of a document. Known keys are lifted into
/// typed fields; everything else is preserved verbatim in
/// [`Frontmatter::extra`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frontmatter {
    /// The declared publication date, as written.
    pub date: Option<String>,

    pub title: Option<String>,

    pub author: Option<String>,

    pub description: Option<String>,

    /// The page category (e.g., `post`, `home`, `allPost`, `archive`).
    pub template: Option<String>,

    /// Trimmed, non-empty keywords. Always a sequence regardless of whether
    /// the document declared a list or a comma-separated string.
    pub keywords: Vec<String>,

    /// Declared keys this pipeline doesn't interpret. These are handed to the
    /// theme layer untouched.
    pub extra: Mapping,
}

impl Frontmatter {
    /// Returns `true` if the document declared `template: post`.
    pub fn is_post(&self) -> bool {
        self.template.as_deref() == Some("post")
    }

    fn from_mapping(mapping: Mapping) -> Frontmatter {
        let mut frontmatter = Frontmatter::default();

        for (key, value) in mapping {
            match key.as_str().and_then(Field::from_key) {
                Some(Field::Date) => frontmatter.date = scalar(&value),
                Some(Field::Title) => frontmatter.title = scalar(&value),
                Some(Field::Author) => frontmatter.author = scalar(&value),
                Some(Field::Description) => frontmatter.description = scalar(&value),
                Some(Field::Template) => frontmatter.template = scalar(&value),
                Some(Field::Keywords) => {
                    frontmatter.keywords = DeclaredKeywords::from(&value).normalize()
                }
                // `path` is always derived from the document's location.
                Some(Field::Path) => {}
                None => {
                    frontmatter.extra.insert(key, value);
                }
            }
        }

        frontmatter
    }
}

#[derive(Clone, Copy)]
enum Field {
    Date,
    Title,
    Author,
    Description,
    Template,
    Keywords,
    Path,
}

impl Field {
    fn from_key(key: &str) -> Option<Field> {
        Some(match key {
            "date" => Field::Date,
            "title" => Field::Title,
            "author" => Field::Author,
            "description" => Field::Description,
            "template" => Field::Template,
            "keywords" => Field::Keywords,
            "path" => Field::Path,
            _ => return None,
        })
    }
}

/// The two shapes in which `keywords` may be declared. This never leaves the
/// parse boundary; [`DeclaredKeywords::normalize`] collapses both into one
/// sequence.
enum DeclaredKeywords<'a> {
    /// `keywords: [a, b]`
    Sequence(&'a [Value]),

    /// `keywords: a, b`
    Delimited(String),

    Absent,
}

impl<'a> From<&'a Value> for DeclaredKeywords<'a> {
    fn from(value: &'a Value) -> DeclaredKeywords<'a> {
        match value {
            Value::Sequence(items) => DeclaredKeywords::Sequence(items),
            other => match scalar(other) {
                Some(text) => DeclaredKeywords::Delimited(text),
                None => DeclaredKeywords::Absent,
            },
        }
    }
}

impl DeclaredKeywords<'_> {
    fn normalize(self) -> Vec<String> {
        match self {
            DeclaredKeywords::Sequence(items) => items
                .iter()
                .filter_map(scalar)
                .map(|keyword| keyword.trim().to_owned())
                .filter(|keyword| !keyword.is_empty())
                .collect(),
            DeclaredKeywords::Delimited(text) => split_keywords(&text),
            DeclaredKeywords::Absent => Vec::new(),
        }
    }
}

/// Splits a comma-separated keyword declaration, trimming each piece and
/// dropping empty ones.
pub fn split_keywords(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Coerces a YAML scalar into its textual form. Nulls, sequences and mappings
/// have no textual form.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Finds the frontmatter block. Returns the YAML text and the body, or `None`
/// if the input doesn't open with a fence line or the fence is never closed.
fn split(input: &str) -> Option<(&str, &str)> {
    let rest = input.strip_prefix(FENCE)?;
    let newline = rest.find('\n')?;
    if !rest[..newline].trim().is_empty() {
        return None;
    }

    let rest = &rest[newline + 1..];
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == FENCE {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Parses the frontmatter block at the head of `input` and returns it along
/// with the rest of the document. See the module docs for the failure policy.
pub fn parse(input: &str) -> (Frontmatter, &str) {
    let input = input.strip_prefix(BOM).unwrap_or(input);
    let (yaml, body) = match split(input) {
        Some(parts) => parts,
        None => return (Frontmatter::default(), input),
    };

    if yaml.trim().is_empty() {
        return (Frontmatter::default(), body);
    }

    let frontmatter = match serde_yaml::from_str::<Value>(yaml) {
        Ok(Value::Mapping(mapping)) => Frontmatter::from_mapping(mapping),
        Ok(_) => {
            debug!("frontmatter is not a mapping; ignoring it");
            Frontmatter::default()
        }
        Err(err) => {
            debug!(error = %err, "malformed frontmatter; ignoring it");
            Frontmatter::default()
        }
    };
    (frontmatter, body)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_known_fields() {
        let (frontmatter, body) = parse(
            "---\ntitle: Hello\ndate: 2023-01-01\nauthor: Ann\ntemplate: post\ndescription: First\n---\n# Body\n",
        );
        assert_eq!(frontmatter.title.as_deref(), Some("Hello"));
        assert_eq!(frontmatter.date.as_deref(), Some("2023-01-01"));
        assert_eq!(frontmatter.author.as_deref(), Some("Ann"));
        assert_eq!(frontmatter.description.as_deref(), Some("First"));
        assert!(frontmatter.is_post());
        assert_eq!(frontmatter.extra.len(), 0);
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn test_keywords_from_delimited_string() {
        let (frontmatter, _) = parse("---\nkeywords: a, b, c\n---\n");
        assert_eq!(frontmatter.keywords, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_keywords_from_sequence() {
        let (frontmatter, _) = parse("---\nkeywords: [\"a\", \"b\"]\n---\n");
        assert_eq!(frontmatter.keywords, vec!["a", "b"]);
    }

    #[test]
    fn test_keywords_drop_empty_pieces() {
        let (frontmatter, _) = parse("---\nkeywords: 'rust,, ,yaml ,'\n---\n");
        assert_eq!(frontmatter.keywords, vec!["rust", "yaml"]);

        let (frontmatter, _) = parse("---\nkeywords:\n  - ' padded '\n  - ''\n  - 42\n---\n");
        assert_eq!(frontmatter.keywords, vec!["padded", "42"]);
    }

    #[test]
    fn test_missing_frontmatter() {
        let input = "# Just a heading\n";
        let (frontmatter, body) = parse(input);
        assert_eq!(frontmatter, Frontmatter::default());
        assert_eq!(body, input);
    }

    #[test]
    fn test_unterminated_frontmatter() {
        let input = "---\ntitle: Hello\n";
        let (frontmatter, body) = parse(input);
        assert_eq!(frontmatter, Frontmatter::default());
        assert_eq!(body, input);
    }

    #[test]
    fn test_malformed_yaml_is_empty() {
        let (frontmatter, body) = parse("---\ntitle: [unclosed\n---\nbody");
        assert_eq!(frontmatter, Frontmatter::default());
        assert_eq!(body, "body");
    }

    #[test]
    fn test_non_mapping_yaml_is_empty() {
        let (frontmatter, _) = parse("---\n- a\n- b\n---\n");
        assert_eq!(frontmatter, Frontmatter::default());
    }

    #[test]
    fn test_crlf_and_bom() {
        let (frontmatter, body) = parse("\u{feff}---\r\ntitle: Windows\r\n---\r\nbody");
        assert_eq!(frontmatter.title.as_deref(), Some("Windows"));
        assert_eq!(body, "body");
    }

    #[test]
    fn test_extra_keys_are_preserved() {
        let (frontmatter, _) = parse("---\ntitle: x\npath: /ignored\ncover: a.png\n---\n");
        assert_eq!(frontmatter.extra.len(), 1);
        assert_eq!(
            frontmatter.extra.get(&Value::from("cover")),
            Some(&Value::from("a.png"))
        );
    }

    #[test]
    fn test_scalar_coercion() {
        let (frontmatter, _) = parse("---\ntitle: 2024\nauthor: true\ndescription: ~\n---\n");
        assert_eq!(frontmatter.title.as_deref(), Some("2024"));
        assert_eq!(frontmatter.author.as_deref(), Some("true"));
        assert_eq!(frontmatter.description, None);
    }
}
