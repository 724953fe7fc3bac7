//! Description text normalization
//!
//! Descriptions in the OpenAPI document are written for the web docs. Before
//! they land in the catalog, relative doc links are made absolute and HTML
//! fragments are removed.

use std::sync::LazyLock;

use regex::Regex;

/// Default documentation root for relative `/docs/` links
pub const DEFAULT_DOCS_ROOT: &str = "https://fivetran.com/docs/";

/// Mis-encoded en dash as it appears in exported descriptions
const MISENCODED_DASH: &str = "\u{e2}\u{20ac}\u{201c}";

static MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?b>|<br\s*/?>").expect("markup pattern is valid"));

/// Rewrites description text for storage in the catalog
#[derive(Debug, Clone)]
pub struct DescriptionNormalizer {
    docs_link: String,
}

impl Default for DescriptionNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_DOCS_ROOT)
    }
}

impl DescriptionNormalizer {
    pub fn new(docs_root: &str) -> Self {
        let docs_root = if docs_root.ends_with('/') {
            docs_root.to_string()
        } else {
            format!("{}/", docs_root)
        };
        Self {
            docs_link: format!("]({}", docs_root),
        }
    }

    pub fn normalize(&self, text: &str) -> String {
        let text = text.replace("](/docs/", &self.docs_link);
        let text = MARKUP.replace_all(&text, "");
        text.replace(MISENCODED_DASH, "-").replace(['<', '>'], "")
    }
}
