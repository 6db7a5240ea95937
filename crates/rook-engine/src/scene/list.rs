use glam::Mat4;

use crate::render::TextureId;

/// One textured unit quad.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct QuadDraw {
    pub texture: TextureId,
    pub model: Mat4,
}

/// Recorded draw stream for a frame, in paint order (back-to-front).
///
/// `push()` is O(1); `clear()` keeps the allocation so steady-state frames do
/// not allocate.
#[derive(Debug, Default, Clone)]
pub struct DrawList {
    items: Vec<QuadDraw>,
}

impl DrawList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { items: Vec::with_capacity(capacity) }
    }

    /// Clears recorded items. Keeps allocated capacity for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[inline]
    pub fn push(&mut self, texture: TextureId, model: Mat4) {
        self.items.push(QuadDraw { texture, model });
    }

    /// Items in paint order.
    #[inline]
    pub fn items(&self) -> &[QuadDraw] {
        &self.items
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QuadDraw> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn push_preserves_order() {
        let mut list = DrawList::new();
        list.push(TextureId::from_raw(2), Mat4::IDENTITY);
        list.push(TextureId::from_raw(1), Mat4::from_scale(Vec3::splat(2.0)));

        let textures: Vec<u32> = list.iter().map(|d| d.texture.raw()).collect();
        assert_eq!(textures, vec![2, 1]);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut list = DrawList::with_capacity(96);
        for i in 0..96 {
            list.push(TextureId::from_raw(i), Mat4::IDENTITY);
        }
        let cap = list.items.capacity();
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.items.capacity(), cap);
    }
}
