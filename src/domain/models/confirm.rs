use anyhow::Result;

/// Asks the user to confirm a destructive action.
pub trait Confirm: Send + Sync {
    fn confirm(&self, title: &str, content: &str) -> Result<bool>;
}

pub type ConfirmBox = Box<dyn Confirm>;
