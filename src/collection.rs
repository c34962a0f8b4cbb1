//! Ordered, name-indexed field storage for a single document.

use std::collections::HashMap;

use crate::error::Error;
use crate::field::Field;

/// Fields of one document in list order, with O(1) lookup by exact name.
#[derive(Debug, Clone, Default)]
pub struct FieldCollection {
    /// Fields in persisted order.
    fields: Vec<Field>,
    /// Field name → position in `fields`.
    index: HashMap<String, usize>,
}

impl FieldCollection {
    /// Empty collection.
    pub fn new() -> Self {
        return Self::default();
    }

    /// Number of fields, soft-deleted ones included.
    pub fn len(&self) -> usize {
        return self.fields.len();
    }

    /// True when the collection holds no field at all.
    pub fn is_empty(&self) -> bool {
        return self.fields.is_empty();
    }

    /// Field by exact, case-sensitive name.
    pub fn get(&self, name: &str) -> Option<&Field> {
        let position = *self.index.get(name)?;
        return self.fields.get(position);
    }

    /// Mutable field by exact name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Field> {
        let position = *self.index.get(name)?;
        return self.fields.get_mut(position);
    }

    /// Field at a list position.
    pub fn at(&self, position: usize) -> Option<&Field> {
        return self.fields.get(position);
    }

    /// Whether a field with this exact name exists.
    pub fn contains(&self, name: &str) -> bool {
        return self.index.contains_key(name);
    }

    /// Append a field.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateField` if the name is already present.
    pub fn push(&mut self, field: Field) -> Result<(), Error> {
        if self.contains(field.name()) {
            return Err(Error::DuplicateField {
                document: field.owner().to_string(),
                name: field.name().to_string(),
            });
        }
        self.index.insert(field.name().to_string(), self.fields.len());
        self.fields.push(field);
        return Ok(());
    }

    /// Remove a field by name, returning it. Later fields shift up.
    pub fn remove(&mut self, name: &str) -> Option<Field> {
        let position = *self.index.get(name)?;
        if position >= self.fields.len() {
            return None;
        }
        let field = self.fields.remove(position);
        self.rebuild_index();
        return Some(field);
    }

    /// Iterate in list order.
    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        return self.fields.iter();
    }

    /// Iterate mutably in list order. Names are immutable through `Field`,
    /// so the index stays valid.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Field> {
        return self.fields.iter_mut();
    }

    /// Flag every field as absent before an extraction pass.
    pub fn mark_all_missing(&mut self) {
        for field in &mut self.fields {
            field.exists = false;
        }
    }

    /// Put the existing fields into document order within the slots they
    /// already occupy. Soft-deleted fields keep their position.
    pub fn restore_document_order(&mut self) {
        let slots: Vec<usize> = self
            .fields
            .iter()
            .enumerate()
            .filter(|(_, field)| field.exists)
            .map(|(position, _)| position)
            .collect();

        let mut existing: Vec<Field> = Vec::with_capacity(slots.len());
        let mut remaining: Vec<Option<Field>> = std::mem::take(&mut self.fields).into_iter().map(Some).collect();
        for &slot in &slots {
            if let Some(field) = remaining.get_mut(slot).and_then(Option::take) {
                existing.push(field);
            }
        }
        existing.sort_by_key(|field| field.sort_order);

        let mut ordered = existing.into_iter();
        for (slot, entry) in remaining.iter_mut().enumerate() {
            if entry.is_none() && slots.binary_search(&slot).is_ok() {
                *entry = ordered.next();
            }
        }
        self.fields = remaining.into_iter().flatten().collect();
        self.rebuild_index();
    }

    /// Recompute name → position after structural changes.
    fn rebuild_index(&mut self) {
        self.index = self
            .fields
            .iter()
            .enumerate()
            .map(|(position, field)| (field.name().to_string(), position))
            .collect();
    }
}

impl<'a> IntoIterator for &'a FieldCollection {
    type IntoIter = std::slice::Iter<'a, Field>;
    type Item = &'a Field;

    fn into_iter(self) -> Self::IntoIter {
        return self.fields.iter();
    }
}
