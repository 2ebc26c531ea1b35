//! Pixel-exact collision between entities
//!
//! Two-phase test: a cheap bounding-box reject, then a mask overlap at the
//! rounded offset between the two boxes. Masks are only requested once the
//! boxes overlap.

use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

use super::mask::Mask;
use crate::Rect;

/// Anything with a bounding box and (optionally) a pixel mask.
///
/// The mask's top-left corner is aligned with `rect()`'s top-left corner and
/// must reflect the entity's current visual state.
pub trait Collidable {
    /// Current bounding rectangle
    fn rect(&self) -> Rect;

    /// Current pixel mask, `None` if the entity has no image to collide with
    fn mask(&self) -> Option<Cow<'_, Mask>>;

    /// Whether this entity's pixels overlap `other`'s
    fn collided(&self, other: &dyn Collidable) -> bool {
        collided(self, other)
    }
}

/// Shared handle to a collidable entity that forces can test against while
/// the game keeps mutating it (e.g. the skyline losing chunks to explosions)
pub type Collider = Rc<RefCell<dyn Collidable>>;

/// Offset of `b`'s top-left relative to `a`'s, rounded to whole pixels
#[inline]
pub fn mask_offset(a: &Rect, b: &Rect) -> (i32, i32) {
    (
        (b.left() - a.left()).round() as i32,
        (b.top() - a.top()).round() as i32,
    )
}

/// Pixel-exact overlap test between two entities.
///
/// Returns `false` without touching either mask when the bounding boxes don't
/// intersect. An entity without a mask never collides.
pub fn collided<A, B>(a: &A, b: &B) -> bool
where
    A: Collidable + ?Sized,
    B: Collidable + ?Sized,
{
    let a_rect = a.rect();
    let b_rect = b.rect();
    if !a_rect.intersects(&b_rect) {
        return false;
    }

    let Some(a_mask) = a.mask() else {
        return false;
    };
    let Some(b_mask) = b.mask() else {
        return false;
    };
    a_mask.overlap(&b_mask, mask_offset(&a_rect, &b_rect))
}
