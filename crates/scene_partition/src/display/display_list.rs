//! Arena of display objects

use super::display_object::DisplayObject;
use crate::foundation::collections::{Arena, DisplayKey};

/// Owns every display object in a scene, addressed by [`DisplayKey`]
///
/// Mutation goes through [`crate::scene::Scene`] so that every change that
/// affects bounds reaches the partition.
#[derive(Debug, Default)]
pub struct DisplayList {
    objects: Arena<DisplayKey, DisplayObject>,
}

impl DisplayList {
    /// Create an empty display list
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a display object
    pub fn get(&self, key: DisplayKey) -> Option<&DisplayObject> {
        self.objects.get(key)
    }

    /// Is the key live
    pub fn contains(&self, key: DisplayKey) -> bool {
        self.objects.contains_key(key)
    }

    /// Number of display objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// No display objects
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterate over all display objects
    pub fn iter(&self) -> impl Iterator<Item = (DisplayKey, &DisplayObject)> {
        self.objects.iter()
    }

    pub(crate) fn insert(&mut self, object: DisplayObject) -> DisplayKey {
        self.objects.insert(object)
    }

    pub(crate) fn remove(&mut self, key: DisplayKey) -> Option<DisplayObject> {
        self.objects.remove(key)
    }

    pub(crate) fn get_mut(&mut self, key: DisplayKey) -> Option<&mut DisplayObject> {
        self.objects.get_mut(key)
    }
}
