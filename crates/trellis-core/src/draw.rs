//! Visual definitions shared by the diagram renderers.

mod stroke;

pub use stroke::{LineType, StrokeCap, StrokeDefinition};
