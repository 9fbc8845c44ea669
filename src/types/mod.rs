//! Strongly-typed domain types shared across modules.
//!
//! # Example
//!
//! ```
//! use seisgrid::types::{Bounds2D, FaceIndex, VertexIndex};
//!
//! let window = Bounds2D::new(25.0, 27.0, 36.0, 38.0);
//! assert_eq!(window.width(), 2.0);
//!
//! // Vertex and face indices cannot be swapped by accident
//! let v = VertexIndex::new(3);
//! let f = FaceIndex::new(3);
//! assert_eq!(v.get(), f.get());
//! ```

mod bounds;
mod indices;

pub use bounds::Bounds2D;
pub use indices::{FaceIndex, VertexIndex};
