//! Project-wide extraction options persisted in the project record.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Attributes translated on any element unless a tag override applies.
const DEFAULT_LOCALIZABLE_ATTRIBUTES: [&str; 6] = ["title", "alt", "src", "srcset", "href", "placeholder"];

/// Ordered, duplicate-free list of attribute names.
///
/// Persisted as a single `", "`-joined string; a JSON array is accepted too.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeList(Vec<String>);

impl AttributeList {
    /// Build from names, trimming and dropping blanks and duplicates.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() || list.iter().any(|existing| existing == name) {
                continue;
            }
            list.push(name.to_string());
        }
        return Self(list);
    }

    /// Names in configured order.
    pub fn names(&self) -> &[String] {
        return &self.0;
    }
}

impl Serialize for AttributeList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        return serializer.serialize_str(&self.0.join(", "));
    }
}

impl<'de> Deserialize<'de> for AttributeList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        /// Either persisted shape.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawList {
            /// `"title, alt"`
            Joined(String),
            /// `["title", "alt"]`
            Items(Vec<String>),
        }

        return Ok(match RawList::deserialize(deserializer)? {
            RawList::Joined(joined) => Self::new(joined.split(',')),
            RawList::Items(items) => Self::new(items),
        });
    }
}

/// Which attributes are localizable, by default and per tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectOptions {
    /// Attributes translated on every element without a tag override.
    #[serde(default = "default_localizable_attributes")]
    pub localizable_attributes: AttributeList,
    /// Lowercase tag name → attributes replacing the default list.
    #[serde(default = "default_localizable_attributes_by_tag")]
    pub localizable_attributes_by_tag: BTreeMap<String, AttributeList>,
}

impl Default for ProjectOptions {
    fn default() -> Self {
        return Self {
            localizable_attributes: default_localizable_attributes(),
            localizable_attributes_by_tag: default_localizable_attributes_by_tag(),
        };
    }
}

impl ProjectOptions {
    /// Attribute list configured for a tag, falling back to the default list.
    /// Tag names compare case-insensitively.
    pub fn attributes_for_tag(&self, tag: &str) -> &AttributeList {
        return self
            .localizable_attributes_by_tag
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(tag))
            .map_or(&self.localizable_attributes, |(_, list)| list);
    }
}

/// `title, alt, src, srcset, href, placeholder`.
fn default_localizable_attributes() -> AttributeList {
    return AttributeList::new(DEFAULT_LOCALIZABLE_ATTRIBUTES);
}

/// `meta → content`.
fn default_localizable_attributes_by_tag() -> BTreeMap<String, AttributeList> {
    return BTreeMap::from([("meta".to_string(), AttributeList::new(["content"]))]);
}
