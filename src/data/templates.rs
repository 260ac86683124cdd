use {anyhow::Result, std::path::PathBuf};

use crate::{
    data::json_file::{load_json, save_json},
    models::{ChartTemplate, TemplateConfiguration, TemplateStore},
    utils::{now_rfc3339, now_timestamp_ms},
};

#[cfg(debug_assertions)]
use crate::config::DF;

/// Storage seam for saved templates.
pub trait TemplateRepository {
    fn load(&self) -> Result<TemplateStore>;
    fn save(&self, store: &TemplateStore) -> Result<()>;
}

/// Templates as one pretty-printed JSON file.
pub struct JsonTemplateRepository {
    path: PathBuf,
}

impl JsonTemplateRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TemplateRepository for JsonTemplateRepository {
    fn load(&self) -> Result<TemplateStore> {
        Ok(load_json(&self.path)?.unwrap_or_default())
    }

    fn save(&self, store: &TemplateStore) -> Result<()> {
        save_json(&self.path, store)
    }
}

/// `template_<millis>_<9 chars>`
fn generate_template_id() -> String {
    let fragment: String = uuid::Uuid::new_v4().simple().to_string().chars().take(9).collect();
    format!("template_{}_{}", now_timestamp_ms(), fragment)
}

/// Template CRUD. Every mutation is written straight through the repository.
pub struct TemplateManager<R: TemplateRepository> {
    repo: R,
    store: TemplateStore,
}

impl<R: TemplateRepository> TemplateManager<R> {
    /// A store that cannot be read starts empty; the failure is logged, not fatal.
    pub fn new(repo: R) -> Self {
        let store = match repo.load() {
            Ok(store) => store,
            Err(e) => {
                log::error!("Error loading templates: {:#}", e);
                TemplateStore::default()
            }
        };
        Self { repo, store }
    }

    fn persist(&self) {
        if let Err(e) = self.repo.save(&self.store) {
            log::error!("Error saving templates: {:#}", e);
        }

        #[cfg(debug_assertions)]
        if DF.log_templates {
            log::info!(
                "Templates saved ({} total, active: {:?})",
                self.store.templates.len(),
                self.store.active_template_id
            );
        }
    }

    pub fn templates(&self) -> &[ChartTemplate] {
        &self.store.templates
    }

    pub fn active_template_id(&self) -> Option<&str> {
        self.store.active_template_id.as_deref()
    }

    pub fn save_template(
        &mut self,
        name: &str,
        description: Option<&str>,
        is_default: bool,
        configuration: TemplateConfiguration,
    ) -> String {
        let now = now_rfc3339();
        let template = ChartTemplate {
            id: generate_template_id(),
            name: name.trim().to_string(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            created_at: now.clone(),
            last_modified: now,
            is_default,
            configuration,
        };
        let id = template.id.clone();
        self.store.templates.push(template);
        self.persist();
        id
    }

    /// Marks the template active and returns its configuration.
    pub fn load_template(&mut self, id: &str) -> Option<TemplateConfiguration> {
        let Some(cfg) = self.store.find(id).map(|t| t.configuration.clone()) else {
            log::error!("Template not found: {}", id);
            return None;
        };
        self.store.active_template_id = Some(id.to_string());
        self.persist();
        Some(cfg)
    }

    pub fn delete_template(&mut self, id: &str) {
        self.store.templates.retain(|t| t.id != id);
        if self.store.active_template_id.as_deref() == Some(id) {
            self.store.active_template_id = None;
        }
        self.persist();
    }

    /// Exactly `id` is default afterwards; its `last_modified` is refreshed.
    pub fn set_as_default(&mut self, id: &str) {
        let now = now_rfc3339();
        for t in &mut self.store.templates {
            t.is_default = t.id == id;
            if t.is_default {
                t.last_modified = now.clone();
            }
        }
        self.persist();
    }

    /// Overwrites the active template's configuration. Without an active template this does nothing.
    pub fn update_active_template(&mut self, configuration: TemplateConfiguration) {
        let Some(active) = self.store.active_template_id.clone() else {
            return;
        };
        if let Some(t) = self.store.find_mut(&active) {
            t.configuration = configuration;
            t.last_modified = now_rfc3339();
            self.persist();
        }
    }

    pub fn default_template(&self) -> Option<&ChartTemplate> {
        self.store.templates.iter().find(|t| t.is_default)
    }

    pub fn active_template(&self) -> Option<&ChartTemplate> {
        self.store.find(self.store.active_template_id.as_deref()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Preferences;
    use std::{cell::RefCell, rc::Rc};

    /// In-memory repository that counts saves.
    #[derive(Clone, Default)]
    struct MemoryRepo {
        store: Rc<RefCell<TemplateStore>>,
        saves: Rc<RefCell<usize>>,
    }

    impl TemplateRepository for MemoryRepo {
        fn load(&self) -> Result<TemplateStore> {
            Ok(self.store.borrow().clone())
        }
        fn save(&self, store: &TemplateStore) -> Result<()> {
            *self.store.borrow_mut() = store.clone();
            *self.saves.borrow_mut() += 1;
            Ok(())
        }
    }

    fn cfg() -> TemplateConfiguration {
        Preferences::default().to_template_configuration()
    }

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("traderoad-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        dir.join(name)
    }

    #[test]
    fn save_assigns_id_and_timestamps() {
        let repo = MemoryRepo::default();
        let mut mgr = TemplateManager::new(repo.clone());
        let id = mgr.save_template(" Scalping ", Some("  "), false, cfg());

        assert!(id.starts_with("template_"));
        assert_eq!(id.split('_').count(), 3);
        let t = &mgr.templates()[0];
        assert_eq!(t.name, "Scalping");
        assert_eq!(t.description, None);
        assert_eq!(t.created_at, t.last_modified);
        assert_eq!(*repo.saves.borrow(), 1);
        assert_eq!(repo.store.borrow().templates.len(), 1);
    }

    #[test]
    fn load_sets_active_and_delete_clears_it() {
        let mut mgr = TemplateManager::new(MemoryRepo::default());
        let a = mgr.save_template("A", None, false, cfg());
        let b = mgr.save_template("B", None, false, cfg());

        assert!(mgr.load_template("missing").is_none());
        assert!(mgr.active_template().is_none());

        assert!(mgr.load_template(&a).is_some());
        assert_eq!(mgr.active_template_id(), Some(a.as_str()));

        mgr.delete_template(&b);
        assert_eq!(mgr.active_template_id(), Some(a.as_str()));
        mgr.delete_template(&a);
        assert_eq!(mgr.active_template_id(), None);
        assert!(mgr.templates().is_empty());
    }

    #[test]
    fn exactly_one_default() {
        let mut mgr = TemplateManager::new(MemoryRepo::default());
        let a = mgr.save_template("A", None, true, cfg());
        let b = mgr.save_template("B", None, true, cfg());
        mgr.set_as_default(&a);

        let defaults: Vec<&str> = mgr
            .templates()
            .iter()
            .filter(|t| t.is_default)
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(defaults, vec![a.as_str()]);
        assert_eq!(mgr.default_template().map(|t| t.id.clone()), Some(a));
        assert!(mgr.templates().iter().any(|t| t.id == b && !t.is_default));
    }

    #[test]
    fn update_active_is_noop_without_active() {
        let repo = MemoryRepo::default();
        let mut mgr = TemplateManager::new(repo.clone());
        let id = mgr.save_template("A", None, false, cfg());
        let saves = *repo.saves.borrow();

        let mut changed = cfg();
        changed.volume_pane_height = 120;
        mgr.update_active_template(changed.clone());
        assert_eq!(*repo.saves.borrow(), saves);

        mgr.load_template(&id);
        mgr.update_active_template(changed);
        assert_eq!(mgr.active_template().map(|t| t.configuration.volume_pane_height), Some(120));
    }

    #[test]
    fn json_file_round_trip_and_corruption() {
        let path = temp_path("templates.json");
        let repo = JsonTemplateRepository::new(&path);
        assert_eq!(repo.load().expect("missing file is empty"), TemplateStore::default());

        let mut mgr = TemplateManager::new(JsonTemplateRepository::new(&path));
        let id = mgr.save_template("Swing", Some("4h setup"), true, cfg());
        mgr.load_template(&id);

        let reloaded = TemplateManager::new(JsonTemplateRepository::new(&path));
        assert_eq!(reloaded.active_template().map(|t| t.name.as_str()), Some("Swing"));

        let raw = std::fs::read_to_string(&path).expect("file written");
        assert!(raw.contains("\"activeTemplateId\""));
        assert!(raw.contains("\"movingAverages\""));

        std::fs::write(&path, "{ not json").expect("overwrite");
        assert!(repo.load().is_err());
        let recovered = TemplateManager::new(JsonTemplateRepository::new(&path));
        assert!(recovered.templates().is_empty());
    }
}
