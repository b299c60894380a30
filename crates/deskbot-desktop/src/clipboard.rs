use deskbot_core::{errors::Error, ports::ClipboardSource, Result};

/// OS clipboard via `arboard`. A fresh handle per read; the clipboard owner
/// can change between commands.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClipboard;

impl ClipboardSource for SystemClipboard {
    fn read_text(&self) -> Result<String> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| Error::Clipboard(e.to_string()))?;
        clipboard
            .get_text()
            .map_err(|e| Error::Clipboard(e.to_string()))
    }
}
