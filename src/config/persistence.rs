//! File persistence configuration

/// Configuration for user-saved chart templates
pub struct TemplatePersistenceConfig {
    pub path: &'static str,
}

/// Configuration for the user preferences file
pub struct PreferencesPersistenceConfig {
    pub path: &'static str,
    /// Bump when the `Preferences` layout changes incompatibly.
    pub version: u32,
}

/// Configuration for Application State Persistence
pub struct AppPersistenceConfig {
    /// Path for saving/loading eframe window/UI state
    pub state_path: &'static str,
}

/// The Master Persistence Configuration
pub struct PersistenceConfig {
    pub templates: TemplatePersistenceConfig,
    pub preferences: PreferencesPersistenceConfig,
    pub app: AppPersistenceConfig,
}

pub const PERSISTENCE: PersistenceConfig = PersistenceConfig {
    templates: TemplatePersistenceConfig {
        path: "traderoad_chart_templates.json",
    },
    preferences: PreferencesPersistenceConfig {
        path: "traderoad_preferences.json",
        version: 1,
    },
    app: AppPersistenceConfig {
        state_path: ".states.json",
    },
};
