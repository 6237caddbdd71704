//! Appearance preference service.
//!
//! # Responsibility
//! - Read and write the light/dark preference under its own storage key.
//!
//! # Invariants
//! - The theme entry is independent of the notebook snapshot; neither
//!   service reads or writes the other's key.
//! - Unknown stored values read as "no preference".

use crate::model::theme::Theme;
use crate::repo::kv_repo::{KvRepository, RepoResult};
use log::{debug, info};

/// Storage key holding the theme preference.
pub const THEME_KEY: &str = "noteKeeperTheme";

/// Theme preference facade over a key-value repository.
pub struct ThemeService<R: KvRepository> {
    repo: R,
}

impl<R: KvRepository> ThemeService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns the stored preference, if any valid one exists.
    pub fn stored_theme(&self) -> RepoResult<Option<Theme>> {
        let stored = self.repo.get_item(THEME_KEY)?;
        let theme = stored.as_deref().and_then(Theme::parse);
        if stored.is_some() && theme.is_none() {
            debug!("event=theme_load module=theme status=ignored reason=unknown_value");
        }
        Ok(theme)
    }

    /// Resolves the theme to apply at startup.
    ///
    /// A stored preference wins; otherwise the system preference decides.
    pub fn initial_theme(&self, system_prefers_dark: bool) -> RepoResult<Theme> {
        Ok(self.stored_theme()?.unwrap_or(if system_prefers_dark {
            Theme::Dark
        } else {
            Theme::Light
        }))
    }

    pub fn set_theme(&self, theme: Theme) -> RepoResult<()> {
        self.repo.set_item(THEME_KEY, theme.as_str())?;
        info!("event=theme_set module=theme status=ok theme={theme}");
        Ok(())
    }

    /// Flips `current`, persists the result and returns it.
    pub fn toggle_theme(&self, current: Theme) -> RepoResult<Theme> {
        let next = current.toggled();
        self.set_theme(next)?;
        Ok(next)
    }
}
