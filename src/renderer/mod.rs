//! Software rendering module
//!
//! Composes the session into an RGBA frame buffer; hosts blit the bytes.

pub mod canvas;
pub mod pipeline;
pub mod shapes;

pub use canvas::{BlendMode, FrameBuffer, Paint};
pub use pipeline::{Renderer, render_frame};
