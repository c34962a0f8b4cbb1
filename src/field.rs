//! Fields: the translatable units extracted from marked elements.

use std::collections::BTreeMap;

use crate::error::Error;
use crate::types::{FieldRef, INVARIANT_CULTURE};

/// Culture tag → translated text. The empty tag is the invariant culture.
pub type Translations = BTreeMap<String, String>;

/// Attribute name (or `innerText`/`innerHtml`) → translations.
pub type Values = BTreeMap<String, Translations>;

/// Where a field's text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldContent {
    /// The field carries its own translations.
    Direct(Values),
    /// The field borrows the translations of another field at render time.
    Reference(FieldRef),
}

/// One translatable unit, keyed by name within its document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Direct values or the reference target, derived from the name.
    content: FieldContent,
    /// Whether the element was present in the latest extraction.
    pub exists: bool,
    /// Field identity within the owning document.
    name: String,
    /// Path of the owning document; set when the field joins a document.
    owner: String,
    /// Document order at the last extraction, `-1` if never extracted.
    pub sort_order: i64,
    /// The originating element without its `loc:` attributes.
    pub source_html: Option<String>,
}

impl Field {
    /// Sort order of a field that was never extracted.
    pub const NEVER_EXTRACTED: i64 = -1;

    /// Create an empty field. Names containing `#` become references.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingIdentifier` if `name` is blank.
    pub fn new(name: &str) -> Result<Self, Error> {
        if name.trim().is_empty() {
            return Err(Error::MissingIdentifier { what: "field name" });
        }
        let content = match FieldRef::parse(name) {
            Some(reference) => FieldContent::Reference(reference),
            None => FieldContent::Direct(Values::new()),
        };
        return Ok(Self {
            content,
            exists: true,
            name: name.to_string(),
            owner: String::new(),
            sort_order: Self::NEVER_EXTRACTED,
            source_html: None,
        });
    }

    /// The field name as written in `loc:name`.
    pub fn name(&self) -> &str {
        return &self.name;
    }

    /// Path of the document owning this field.
    pub fn owner(&self) -> &str {
        return &self.owner;
    }

    /// Attach the field to a document.
    pub(crate) fn set_owner(&mut self, path: &str) {
        path.clone_into(&mut self.owner);
    }

    /// The reference target, if this field is a reference.
    pub const fn reference(&self) -> Option<&FieldRef> {
        return match &self.content {
            FieldContent::Direct(_) => None,
            FieldContent::Reference(reference) => Some(reference),
        };
    }

    /// Whether this field borrows its content from another field.
    pub const fn is_reference(&self) -> bool {
        return matches!(self.content, FieldContent::Reference(_));
    }

    /// The value table of a direct field.
    pub const fn values(&self) -> Option<&Values> {
        return match &self.content {
            FieldContent::Direct(values) => Some(values),
            FieldContent::Reference(_) => None,
        };
    }

    /// Replace the whole value table of a direct field.
    ///
    /// # Errors
    ///
    /// Returns `Error::ReferenceHasNoValues` for reference fields.
    pub fn set_values(&mut self, values: Values) -> Result<(), Error> {
        let FieldContent::Direct(current) = &mut self.content else {
            return Err(Error::ReferenceHasNoValues { name: self.name.clone() });
        };
        *current = values;
        return Ok(());
    }

    /// Store `value` for `(attribute, culture)`. Attribute names match
    /// case-insensitively against existing keys.
    ///
    /// # Errors
    ///
    /// Returns `Error::ReferenceHasNoValues` for reference fields, or
    /// `Error::MissingIdentifier` if `attribute` is blank.
    pub fn set_value(&mut self, attribute: &str, culture: &str, value: &str) -> Result<(), Error> {
        if attribute.trim().is_empty() {
            return Err(Error::MissingIdentifier { what: "attribute name" });
        }
        let FieldContent::Direct(values) = &mut self.content else {
            return Err(Error::ReferenceHasNoValues { name: self.name.clone() });
        };
        let key = existing_key(values, attribute).unwrap_or_else(|| attribute.to_string());
        values
            .entry(key)
            .or_default()
            .insert(culture.to_string(), value.to_string());
        return Ok(());
    }

    /// Value stored for `(attribute, culture)`. References never hold values.
    pub fn value(&self, attribute: &str, culture: &str) -> Option<&str> {
        let values = self.values()?;
        let key = existing_key(values, attribute)?;
        return values.get(&key)?.get(culture).map(String::as_str);
    }

    /// Overwrite every `(attribute, culture)` pair present in `other`,
    /// leaving all other pairs untouched.
    pub fn merge_values(&mut self, other: &Self) {
        let (FieldContent::Direct(values), Some(incoming)) = (&mut self.content, other.values()) else {
            return;
        };
        for (attribute, translations) in incoming {
            let key = existing_key(values, attribute).unwrap_or_else(|| attribute.clone());
            let slot = values.entry(key).or_default();
            for (culture, text) in translations {
                slot.insert(culture.clone(), text.clone());
            }
        }
    }

    /// Every culture tag present in the value table, invariant included.
    pub fn cultures(&self) -> impl Iterator<Item = &str> {
        return self
            .values()
            .into_iter()
            .flat_map(|values| values.values())
            .flat_map(|translations| translations.keys())
            .map(String::as_str);
    }

    /// Attributes that have an invariant value but no value for `culture`.
    pub fn untranslated_attributes(&self, culture: &str) -> Vec<&str> {
        let Some(values) = self.values() else {
            return Vec::new();
        };
        return values
            .iter()
            .filter(|(_, translations)| {
                translations.contains_key(INVARIANT_CULTURE) && !translations.contains_key(culture)
            })
            .map(|(attribute, _)| attribute.as_str())
            .collect();
    }
}

/// Find the stored key matching `attribute` case-insensitively.
fn existing_key(values: &Values, attribute: &str) -> Option<String> {
    if values.contains_key(attribute) {
        return Some(attribute.to_string());
    }
    return values.keys().find(|key| key.eq_ignore_ascii_case(attribute)).cloned();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_with_separator_are_references() {
        let field = Field::new("SR.html#Cancel").unwrap();
        assert!(field.is_reference());
        assert_eq!(field.reference().unwrap().path, "SR.html");
        assert!(field.values().is_none());
        assert!(!Field::new("Cancel").unwrap().is_reference());
    }

    #[test]
    fn blank_names_are_rejected() {
        assert!(matches!(Field::new("  "), Err(Error::MissingIdentifier { .. })));
    }

    #[test]
    fn references_refuse_values() {
        let mut field = Field::new("#Cancel").unwrap();
        assert!(matches!(
            field.set_value("innerText", "fr", "Annuler"),
            Err(Error::ReferenceHasNoValues { .. })
        ));
    }

    #[test]
    fn attribute_lookup_ignores_case() {
        let mut field = Field::new("Title").unwrap();
        field.set_value("innerText", "", "Hello").unwrap();
        field.set_value("INNERTEXT", "fr", "Bonjour").unwrap();
        assert_eq!(field.values().unwrap().len(), 1);
        assert_eq!(field.value("innertext", "fr"), Some("Bonjour"));
        assert_eq!(field.value("innerText", INVARIANT_CULTURE), Some("Hello"));
    }

    #[test]
    fn merge_overwrites_only_incoming_pairs() {
        let mut existing = Field::new("Title").unwrap();
        existing.set_value("innerText", "", "Hello").unwrap();
        existing.set_value("innerText", "fr", "Bonjour").unwrap();
        existing.set_value("title", "fr", "Titre").unwrap();

        let mut extracted = Field::new("Title").unwrap();
        extracted.set_value("innerText", "", "Hello there").unwrap();

        existing.merge_values(&extracted);
        assert_eq!(existing.value("innerText", INVARIANT_CULTURE), Some("Hello there"));
        assert_eq!(existing.value("innerText", "fr"), Some("Bonjour"));
        assert_eq!(existing.value("title", "fr"), Some("Titre"));
    }

    #[test]
    fn untranslated_attributes_need_an_invariant_value() {
        let mut field = Field::new("Logo").unwrap();
        field.set_value("alt", "", "Logo").unwrap();
        field.set_value("src", "", "logo.png").unwrap();
        field.set_value("src", "fr", "logo-fr.png").unwrap();
        field.set_value("title", "fr", "orphan").unwrap();
        assert_eq!(field.untranslated_attributes("fr"), vec!["alt"]);
        let mut cultures: Vec<&str> = field.cultures().collect();
        cultures.sort_unstable();
        cultures.dedup();
        assert_eq!(cultures, vec!["", "fr"]);
    }
}
