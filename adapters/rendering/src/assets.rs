use std::collections::HashMap;

use towerline_core::{AssetProvider, ImageHandle};
use tracing::debug;

/// Name-to-handle registry implementing [`AssetProvider`].
///
/// Images live in named lists; animations are lists whose frames are played
/// in registration order. Unknown names resolve to
/// [`ImageHandle::PLACEHOLDER`].
#[derive(Clone, Debug, Default)]
pub struct AssetCatalog {
    images: HashMap<String, HashMap<String, ImageHandle>>,
    animations: HashMap<String, Vec<ImageHandle>>,
    issued: u32,
}

impl AssetCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an image, returning the existing handle if already known.
    pub fn register_image(&mut self, list: &str, item: &str) -> ImageHandle {
        if let Some(handle) = self.images.get(list).and_then(|items| items.get(item)) {
            return *handle;
        }
        let handle = self.issue();
        let _ = self
            .images
            .entry(list.to_owned())
            .or_default()
            .insert(item.to_owned(), handle);
        handle
    }

    /// Registers an animation of `frames` frames, replacing any earlier one.
    pub fn register_animation(&mut self, list: &str, frames: usize) -> Vec<ImageHandle> {
        let handles: Vec<ImageHandle> = (0..frames).map(|_| self.issue()).collect();
        let _ = self.animations.insert(list.to_owned(), handles.clone());
        handles
    }

    /// Number of handles issued so far.
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.issued
    }

    /// Reports whether nothing was registered.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.issued == 0
    }

    fn issue(&mut self) -> ImageHandle {
        self.issued = self.issued.saturating_add(1);
        ImageHandle::new(self.issued)
    }
}

impl AssetProvider for AssetCatalog {
    fn image(&self, list: &str, item: &str) -> ImageHandle {
        match self.images.get(list).and_then(|items| items.get(item)) {
            Some(handle) => *handle,
            None => {
                debug!(list, item, "image_missing");
                ImageHandle::PLACEHOLDER
            }
        }
    }

    fn animation_frame(&self, list: &str, elapsed_ticks: u64) -> ImageHandle {
        let Some(frames) = self.animations.get(list).filter(|frames| !frames.is_empty()) else {
            return ImageHandle::PLACEHOLDER;
        };
        let index = elapsed_ticks % frames.len() as u64;
        frames
            .get(usize::try_from(index).unwrap_or_default())
            .copied()
            .unwrap_or(ImageHandle::PLACEHOLDER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn images_are_registered_once() {
        let mut catalog = AssetCatalog::new();
        let wall = catalog.register_image("misc", "wall");
        let shot = catalog.register_image("misc", "projectile");

        assert_ne!(wall, shot);
        assert_eq!(catalog.register_image("misc", "wall"), wall);
        assert_eq!(catalog.image("misc", "wall"), wall);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn unknown_names_resolve_to_the_placeholder() {
        let mut catalog = AssetCatalog::new();
        let _ = catalog.register_image("towers", "basic");

        assert_eq!(catalog.image("towers", "laser"), ImageHandle::PLACEHOLDER);
        assert_eq!(catalog.image("misc", "basic"), ImageHandle::PLACEHOLDER);
        assert_eq!(catalog.animation_frame("monster_basic", 3), ImageHandle::PLACEHOLDER);
    }

    #[test]
    fn animations_cycle_with_elapsed_ticks() {
        let mut catalog = AssetCatalog::new();
        let frames = catalog.register_animation("monster_fast", 3);

        assert_eq!(catalog.animation_frame("monster_fast", 0), frames[0]);
        assert_eq!(catalog.animation_frame("monster_fast", 4), frames[1]);
        assert_eq!(catalog.animation_frame("monster_fast", 8), frames[2]);
        assert!(!frames.contains(&ImageHandle::PLACEHOLDER));
    }
}
