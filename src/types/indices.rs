//! Strongly-typed index newtypes.
//!
//! These types keep mesh vertex indices and triangle (face) indices from
//! being mixed up in locator and aggregation APIs.

use std::fmt;

/// Macro to generate index newtypes with common functionality.
macro_rules! define_index {
    (
        $(#[$meta:meta])*
        $name:ident, $display_prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name(usize);

        impl $name {
            /// Create a new index.
            #[inline]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            /// Get the raw index value.
            #[inline]
            pub const fn get(self) -> usize {
                self.0
            }

            /// Create an iterator over [0, n).
            pub fn iter(n: usize) -> impl ExactSizeIterator<Item = $name> {
                (0..n).map($name)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl From<$name> for usize {
            #[inline]
            fn from(idx: $name) -> usize {
                idx.0
            }
        }

        impl<T> std::ops::Index<$name> for [T] {
            type Output = T;
            #[inline]
            fn index(&self, idx: $name) -> &T {
                &self[idx.0]
            }
        }

        impl<T> std::ops::Index<$name> for Vec<T> {
            type Output = T;
            #[inline]
            fn index(&self, idx: $name) -> &T {
                &self[idx.0]
            }
        }
    };
}

define_index!(
    /// Vertex index in a triangle mesh.
    ///
    /// # Example
    ///
    /// ```
    /// use seisgrid::types::VertexIndex;
    ///
    /// let v = VertexIndex::new(7);
    /// assert_eq!(v.get(), 7);
    /// assert_eq!(v.to_string(), "V7");
    /// ```
    VertexIndex,
    "V"
);

define_index!(
    /// Triangle (face) index in a mesh.
    ///
    /// # Example
    ///
    /// ```
    /// use seisgrid::types::FaceIndex;
    ///
    /// let f = FaceIndex::new(10);
    /// assert_eq!(f.get(), 10);
    /// ```
    FaceIndex,
    "F"
);
