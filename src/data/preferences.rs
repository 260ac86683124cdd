use {anyhow::Result, std::path::PathBuf};

use crate::{
    config::PERSISTENCE,
    data::json_file::{load_json, save_json},
    models::Preferences,
};

#[cfg(debug_assertions)]
use crate::config::DF;

/// Storage seam for user preferences.
pub trait PreferencesRepository {
    fn load(&self) -> Result<Preferences>;
    fn save(&self, prefs: &Preferences) -> Result<()>;
}

pub struct JsonPreferencesRepository {
    path: PathBuf,
}

impl JsonPreferencesRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PreferencesRepository for JsonPreferencesRepository {
    /// Missing file -> defaults. A file from another layout version -> defaults.
    fn load(&self) -> Result<Preferences> {
        let Some(prefs) = load_json::<Preferences>(&self.path)? else {
            return Ok(Preferences::default());
        };

        if prefs.version != PERSISTENCE.preferences.version {
            log::warn!(
                "Preferences version {} != {}; using defaults",
                prefs.version,
                PERSISTENCE.preferences.version
            );
            return Ok(Preferences::default());
        }
        Ok(prefs)
    }

    fn save(&self, prefs: &Preferences) -> Result<()> {
        save_json(&self.path, prefs)?;

        #[cfg(debug_assertions)]
        if DF.log_templates {
            log::info!("Preferences saved to {}", self.path.display());
        }
        Ok(())
    }
}

/// Startup helper: any failure falls back to defaults.
pub fn load_or_default(repo: &dyn PreferencesRepository) -> Preferences {
    repo.load().unwrap_or_else(|e| {
        log::error!("Error loading preferences, using defaults: {:#}", e);
        Preferences::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Theme;

    fn temp_path() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("traderoad-prefs-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        dir.join("prefs.json")
    }

    #[test]
    fn save_then_load() {
        let repo = JsonPreferencesRepository::new(temp_path());
        let mut prefs = Preferences::default();
        prefs.set_theme(Theme::Light);
        prefs.signals_opacity = 30;
        repo.save(&prefs).expect("save");
        assert_eq!(repo.load().expect("load"), prefs);
    }

    #[test]
    fn version_mismatch_and_corruption_give_defaults() {
        let path = temp_path();
        let repo = JsonPreferencesRepository::new(&path);

        let mut prefs = Preferences::default();
        prefs.version = PERSISTENCE.preferences.version + 1;
        prefs.symbol = "SOLUSDT".to_string();
        repo.save(&prefs).expect("save");
        assert_eq!(repo.load().expect("load"), Preferences::default());

        std::fs::write(&path, "[]").expect("overwrite");
        assert!(repo.load().is_err());
        assert_eq!(load_or_default(&repo), Preferences::default());
    }
}
