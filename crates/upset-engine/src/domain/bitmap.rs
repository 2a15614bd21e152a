//! Element membership bitmap
//!
//! One bit per element of the universe. Used to answer "is this element in
//! that set" in O(1) during intersection and union materialization.

use crate::domain::set::ElemId;

/// Fixed-size bitmap over element ids `0..len`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElemBitmap {
    /// Bitmap storage (64 elements per u64 word)
    bits: Vec<u64>,
    len: usize,
}

impl ElemBitmap {
    /// Create a bitmap for `len` elements with all bits cleared
    pub fn new(len: usize) -> Self {
        Self {
            bits: vec![0; len.div_ceil(64)],
            len,
        }
    }

    /// Create a bitmap with the bits of `elems` set
    pub fn from_elems(len: usize, elems: &[ElemId]) -> Self {
        let mut bitmap = Self::new(len);
        for &elem in elems {
            bitmap.set(elem);
        }
        bitmap
    }

    /// Number of addressable elements
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the bitmap addresses no element
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn set(&mut self, elem: ElemId) {
        let i = elem.index();
        self.bits[i / 64] |= 1u64 << (i % 64);
    }

    /// Set the bit and report whether it was clear before
    #[inline]
    pub fn insert(&mut self, elem: ElemId) -> bool {
        let was_set = self.is_set(elem);
        self.set(elem);
        !was_set
    }

    /// Check a bit; ids beyond the bitmap read as clear
    #[inline]
    pub fn is_set(&self, elem: ElemId) -> bool {
        let i = elem.index();
        if i >= self.len {
            return false;
        }
        (self.bits[i / 64] >> (i % 64)) & 1 != 0
    }

    /// Count the set bits
    pub fn count(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitmap_new_all_zero() {
        let bitmap = ElemBitmap::new(130);
        assert_eq!(bitmap.count(), 0);
        assert!(!bitmap.is_set(ElemId(0)));
        assert!(!bitmap.is_set(ElemId(129)));
    }

    #[test]
    fn test_bitmap_word_storage() {
        assert_eq!(ElemBitmap::new(64).bits.len(), 1);
        assert_eq!(ElemBitmap::new(129).bits.len(), 3);
        assert!(ElemBitmap::new(0).bits.is_empty());
    }

    #[test]
    fn test_bitmap_boundary_values() {
        let mut bitmap = ElemBitmap::new(129);
        for i in [0, 63, 64, 128] {
            bitmap.set(ElemId(i));
        }
        for i in [0, 63, 64, 128] {
            assert!(bitmap.is_set(ElemId(i)), "bit {} should be set", i);
        }
        assert!(!bitmap.is_set(ElemId(65)));
        assert_eq!(bitmap.count(), 4);
    }

    #[test]
    fn test_bitmap_out_of_range_reads_clear() {
        let bitmap = ElemBitmap::from_elems(3, &[ElemId(0), ElemId(2)]);
        assert!(!bitmap.is_set(ElemId(3)));
        assert!(!bitmap.is_set(ElemId(1000)));
    }

    #[test]
    fn test_bitmap_insert_reports_new() {
        let mut bitmap = ElemBitmap::new(8);
        assert!(bitmap.insert(ElemId(5)));
        assert!(!bitmap.insert(ElemId(5)));
    }
}
