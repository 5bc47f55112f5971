//! Navigation tree types.
//!
//! These are the values handed to the site renderer. Serialization follows
//! the renderer's sidebar shape: every item has `text`; documents carry a
//! `link`, sections carry `items` and, below the top level, `collapsed`.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

/// Leaf navigation entry for a single document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Document {
    /// Display title (frontmatter title, or file name without extension).
    #[serde(rename = "text")]
    pub title: String,
    /// Link target (e.g., "/guide/setup", "/guide/" for an index document).
    pub link: String,
    /// Source file name (e.g., "setup.md").
    #[serde(skip)]
    pub file_name: String,
    /// Publish date from frontmatter.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_date"
    )]
    pub date: Option<NaiveDateTime>,
    /// True if this is the directory's index document.
    #[serde(skip)]
    pub is_index: bool,
}

/// Grouping node, usually a directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Display title.
    #[serde(rename = "text")]
    pub title: String,
    /// Link target. Set on top-level sections only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Whether the section starts collapsed. Unset on top-level sections.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,
    /// Child entries in display order.
    pub items: Vec<SidebarItem>,
}

/// A navigation entry: a document or a nested section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SidebarItem {
    /// Leaf entry.
    Document(Document),
    /// Nested section.
    Section(Section),
}

impl SidebarItem {
    /// Display title of the entry.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Document(doc) => &doc.title,
            Self::Section(section) => &section.title,
        }
    }

    /// Link target of the entry, if it has one.
    #[must_use]
    pub fn link(&self) -> Option<&str> {
        match self {
            Self::Document(doc) => Some(&doc.link),
            Self::Section(section) => section.link.as_deref(),
        }
    }
}

/// Ordered top-level sections for one URL prefix.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NavigationTree {
    /// One section per contributing root directory, in request order.
    pub sections: Vec<Section>,
}

impl NavigationTree {
    /// True if the tree has no sections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Navigation trees keyed by normalised URL prefix (e.g., "/guide/").
pub type Forest = BTreeMap<String, NavigationTree>;

fn serialize_date<S: Serializer>(
    date: &Option<NaiveDateTime>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match date {
        Some(date) => serializer.collect_str(&date.format("%Y-%m-%d")),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn document(title: &str, link: &str) -> Document {
        Document {
            title: title.to_owned(),
            link: link.to_owned(),
            file_name: format!("{title}.md"),
            date: None,
            is_index: false,
        }
    }

    #[test]
    fn test_item_accessors() {
        let doc = SidebarItem::Document(document("Setup", "/guide/setup"));
        let section = SidebarItem::Section(Section {
            title: "Advanced".to_owned(),
            link: None,
            collapsed: Some(true),
            items: Vec::new(),
        });

        assert_eq!(doc.title(), "Setup");
        assert_eq!(doc.link(), Some("/guide/setup"));
        assert_eq!(section.title(), "Advanced");
        assert_eq!(section.link(), None);
    }

    #[test]
    fn test_document_serialization_hides_internal_fields() {
        let json = serde_json::to_value(document("Setup", "/guide/setup")).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "text": "Setup", "link": "/guide/setup" })
        );
    }

    #[test]
    fn test_document_serialization_with_date() {
        let mut doc = document("Release", "/blog/release");
        doc.date = NaiveDate::from_ymd_opt(2024, 6, 1).and_then(|d| d.and_hms_opt(9, 15, 0));

        let json = serde_json::to_value(doc).unwrap();

        assert_eq!(json["date"], "2024-06-01");
    }

    #[test]
    fn test_tree_serialization() {
        let tree = NavigationTree {
            sections: vec![Section {
                title: "Guide".to_owned(),
                link: Some("/guide/".to_owned()),
                collapsed: None,
                items: vec![
                    SidebarItem::Document(document("Setup", "/guide/setup")),
                    SidebarItem::Section(Section {
                        title: "Advanced".to_owned(),
                        link: None,
                        collapsed: Some(true),
                        items: vec![SidebarItem::Document(document(
                            "Tuning",
                            "/guide/advanced/tuning",
                        ))],
                    }),
                ],
            }],
        };

        let json = serde_json::to_value(&tree).unwrap();

        assert_eq!(
            json,
            serde_json::json!([{
                "text": "Guide",
                "link": "/guide/",
                "items": [
                    { "text": "Setup", "link": "/guide/setup" },
                    {
                        "text": "Advanced",
                        "collapsed": true,
                        "items": [{ "text": "Tuning", "link": "/guide/advanced/tuning" }]
                    }
                ]
            }])
        );
    }
}
