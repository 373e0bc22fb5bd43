//! The document utilities, one module per family.
//!
//! Every operation is a pure function over the document text: it takes `&str` plus typed
//! options and returns an [`Outcome`] holding the new text and the lines to show the user.
//! Reading and writing files is left to the caller.

pub mod add;
pub mod animate;
pub mod canvas;
pub mod cleanup;
pub mod clip_path;
pub mod colors;
pub mod edit;
pub mod gradient;
pub mod image;
pub mod layer;
pub mod list;
pub mod marker;
pub mod mask;
pub mod split;
pub mod text_path;
pub mod transform;

pub use add::{Shape, add_shape, add_text, add_use};
pub use animate::animate;
pub use canvas::{SizeMode, init, set_size};
pub use cleanup::{DefsKind, remove_animations, remove_defs};
pub use clip_path::{ClipShape, add_clip_path};
pub use colors::{ColorScope, convert_colors};
pub use edit::{clone, delete, edit, group};
pub use gradient::{GradientKind, add_gradient};
pub use image::{Fit, ImageOptions, add_image, image_href};
pub use layer::layer;
pub use list::{ListOptions, ListReport, list};
pub use marker::{MarkerKind, MarkerOptions, add_marker};
pub use mask::{MaskKind, add_mask};
pub use split::{ColorLayer, SplitOptions, split_by_color};
pub use text_path::{TextPathMode, TextPathOptions, add_text_path};
pub use transform::{Transform, apply_transform};

/// The result of running one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub document: String,
    /// `false` for informational no-ops; the caller should not rewrite the file.
    pub changed: bool,
    pub messages: Vec<String>,
}

impl Outcome {
    pub fn changed(document: String, message: impl Into<String>) -> Self {
        Self {
            document,
            changed: true,
            messages: vec![message.into()],
        }
    }

    pub fn unchanged(document: &str, message: impl Into<String>) -> Self {
        Self {
            document: document.to_string(),
            changed: false,
            messages: vec![message.into()],
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.messages.push(message.into());
        self
    }
}
