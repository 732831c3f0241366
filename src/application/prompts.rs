use anyhow::Result;
use dialoguer::theme::ColorfulTheme;

use crate::domain::models::Confirm;

/// Asks on the terminal before destructive actions.
pub struct TerminalConfirm {}

impl Confirm for TerminalConfirm {
    fn confirm(&self, title: &str, content: &str) -> Result<bool> {
        let res = dialoguer::Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("{title} {content}"))
            .default(false)
            .interact_opt()?;

        return Ok(res.unwrap_or(false));
    }
}

/// Used with `--yes`.
pub struct AssumeYes {}

impl Confirm for AssumeYes {
    fn confirm(&self, _title: &str, _content: &str) -> Result<bool> {
        return Ok(true);
    }
}
