//! DOM text rendering (web)

use web_sys::Element;

use super::text::render_text;
use crate::platform::RenderSink;
use crate::sim::RenderSnapshot;

/// Writes each frame into an element's text content, skipping unchanged frames
pub struct DomRenderer {
    element: Element,
    last: String,
}

impl DomRenderer {
    pub fn new(element: Element) -> Self {
        Self {
            element,
            last: String::new(),
        }
    }

    /// Look up the target element by id
    pub fn by_id(id: &str) -> Option<Self> {
        let element = web_sys::window()?.document()?.get_element_by_id(id)?;
        Some(Self::new(element))
    }
}

impl RenderSink for DomRenderer {
    fn render(&mut self, frame: &RenderSnapshot) {
        let text = render_text(frame);
        if text != self.last {
            self.element.set_text_content(Some(&text));
            self.last = text;
        }
    }
}
