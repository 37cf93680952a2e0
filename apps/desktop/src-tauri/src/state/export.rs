//! # Export State
//!
//! The clipboard and renderer used by the export commands.

use std::sync::Arc;

use crate::export::{Clipboard, ResultRenderer};
use crate::platform::{PdfCardRenderer, SystemClipboard};

/// Export backends managed by Tauri.
#[derive(Clone)]
pub struct ExportState {
    clipboard: Arc<dyn Clipboard>,
    renderer: Arc<dyn ResultRenderer>,
}

impl ExportState {
    pub fn new(clipboard: Arc<dyn Clipboard>, renderer: Arc<dyn ResultRenderer>) -> Self {
        Self {
            clipboard,
            renderer,
        }
    }

    /// OS clipboard and the PDF card renderer.
    pub fn system() -> Self {
        Self::new(Arc::new(SystemClipboard), Arc::new(PdfCardRenderer))
    }

    pub fn clipboard(&self) -> &dyn Clipboard {
        self.clipboard.as_ref()
    }

    pub fn renderer(&self) -> &dyn ResultRenderer {
        self.renderer.as_ref()
    }
}
