#[cfg(test)]
#[path = "clipboard_test.rs"]
mod tests;

use anyhow::Result;

use super::Notifier;
use crate::domain::models::Locale;
use crate::domain::models::Message;
use crate::domain::models::Text;

pub struct ClipboardService {}

impl ClipboardService {
    pub fn healthcheck() -> Result<()> {
        arboard::Clipboard::new()?;
        return Ok(());
    }

    pub fn set(text: &str) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new()?;
        clipboard.set_text(text.to_string())?;

        return Ok(());
    }

    /// Copies the answer summary. Messages without one are skipped and
    /// the clipboard is left alone.
    pub fn copy_summary(message: &Message, notifier: &Notifier, locale: Locale) -> Result<bool> {
        let summary = message.summary();
        if summary.is_empty() {
            return Ok(false);
        }

        ClipboardService::set(summary)?;
        notifier.success(locale.text(Text::Copied));

        return Ok(true);
    }
}
