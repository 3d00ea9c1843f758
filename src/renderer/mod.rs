//! Rendering module
//!
//! Frames arrive as owned [`RenderSnapshot`](crate::sim::RenderSnapshot)s;
//! sinks here only read them.
//! - `text`: character grid, used by the native binary and tests
//! - `dom`: writes the character grid into a `<pre>` element (web)

#[cfg(target_arch = "wasm32")]
pub mod dom;
pub mod text;

#[cfg(target_arch = "wasm32")]
pub use dom::DomRenderer;
pub use text::{TextRenderer, render_text};
