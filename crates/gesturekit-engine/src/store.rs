//! In-memory template repository.
//!
//! Reference [`TemplateRepository`] implementation for hosts that manage
//! persistence elsewhere, and for tests. Library reads hand out an `Arc`
//! snapshot; dataset edits copy-on-write and swap the snapshot, so a
//! recognition pass never observes a half-updated library.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use gesturekit_core::{
    GestureTemplate, RecognitionSettings, StorageError, TemplateLibrary, TemplateRepository,
};

#[derive(Debug, Clone, Default)]
struct UserProfile {
    library: Arc<TemplateLibrary>,
    settings: RecognitionSettings,
}

#[derive(Debug, Default)]
struct StoreInner {
    users: HashMap<String, UserProfile>,
    active: Option<String>,
}

impl StoreInner {
    fn active_profile(&self) -> Result<&UserProfile, StorageError> {
        self.active
            .as_deref()
            .and_then(|name| self.users.get(name))
            .ok_or(StorageError::NoActiveUser)
    }

    fn active_profile_mut(&mut self) -> Result<&mut UserProfile, StorageError> {
        let name = self.active.clone().ok_or(StorageError::NoActiveUser)?;
        self.users
            .get_mut(&name)
            .ok_or(StorageError::NoActiveUser)
    }
}

/// Thread-safe in-memory user profile store.
#[derive(Debug, Default)]
pub struct InMemoryTemplateStore {
    inner: RwLock<StoreInner>,
}

impl InMemoryTemplateStore {
    /// Create an empty store with no active user.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of user profiles held by the store.
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.inner.read().users.len()
    }
}

impl TemplateRepository for InMemoryTemplateStore {
    fn user_name(&self) -> Option<String> {
        self.inner.read().active.clone()
    }

    fn load_or_create_user(&self, name: &str) -> Result<bool, StorageError> {
        if name.is_empty() {
            return Err(StorageError::InvalidUserName {
                reason: "user name must not be empty".into(),
            });
        }
        let mut inner = self.inner.write();
        let existed = inner.users.contains_key(name);
        inner.users.entry(name.to_owned()).or_default();
        inner.active = Some(name.to_owned());
        Ok(existed)
    }

    fn dataset_for_recognition(&self) -> Result<Arc<TemplateLibrary>, StorageError> {
        Ok(Arc::clone(&self.inner.read().active_profile()?.library))
    }

    fn recognition_settings(&self) -> Result<RecognitionSettings, StorageError> {
        Ok(self.inner.read().active_profile()?.settings.clone())
    }

    fn set_recognition_settings(
        &self,
        settings: &RecognitionSettings,
    ) -> Result<(), StorageError> {
        self.inner.write().active_profile_mut()?.settings = settings.clone();
        Ok(())
    }

    fn gesture_names(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.inner.read().active_profile()?.library.names())
    }

    fn gesture_dataset(&self, name: &str) -> Result<Vec<GestureTemplate>, StorageError> {
        self.inner
            .read()
            .active_profile()?
            .library
            .templates(name)
            .map(<[GestureTemplate]>::to_vec)
            .ok_or_else(|| StorageError::GestureNotFound {
                name: name.to_owned(),
            })
    }

    fn add_template(&self, name: &str, template: GestureTemplate) -> Result<(), StorageError> {
        let mut inner = self.inner.write();
        let profile = inner.active_profile_mut()?;
        // Copy-on-write: snapshots handed out earlier stay untouched
        Arc::make_mut(&mut profile.library)
            .insert_template(name, template)
            .map_err(|e| StorageError::InvalidGestureName {
                reason: e.to_string(),
            })
    }

    fn remove_gesture(&self, name: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.write();
        let profile = inner.active_profile_mut()?;
        Arc::make_mut(&mut profile.library)
            .remove_gesture(name)
            .map(|_| ())
            .ok_or_else(|| StorageError::GestureNotFound {
                name: name.to_owned(),
            })
    }

    fn remove_template(&self, name: &str, index: usize) -> Result<(), StorageError> {
        let mut inner = self.inner.write();
        let profile = inner.active_profile_mut()?;
        let len = profile
            .library
            .templates(name)
            .map(<[GestureTemplate]>::len)
            .ok_or_else(|| StorageError::GestureNotFound {
                name: name.to_owned(),
            })?;
        if index >= len {
            return Err(StorageError::TemplateIndexOutOfRange {
                name: name.to_owned(),
                index,
                len,
            });
        }
        Arc::make_mut(&mut profile.library)
            .remove_template(name, index)
            .map(|_| ())
            .map_err(|e| StorageError::serialization(e.to_string()))
    }

    fn delete_user(&self) -> Result<(), StorageError> {
        let mut inner = self.inner.write();
        let name = inner.active.take().ok_or(StorageError::NoActiveUser)?;
        inner.users.remove(&name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gesturekit_core::FeatureVector;

    fn template(n: usize) -> GestureTemplate {
        GestureTemplate::new((0..n).map(|i| FeatureVector::new(i as f64, 0.0)).collect())
    }

    #[test]
    fn load_reports_existing_profiles() {
        let store = InMemoryTemplateStore::new();
        assert!(!store.load_or_create_user("ada").unwrap());
        assert!(store.load_or_create_user("ada").unwrap());
        assert_eq!(store.user_name().as_deref(), Some("ada"));
        assert_eq!(store.user_count(), 1);
    }

    #[test]
    fn empty_user_name_rejected() {
        let store = InMemoryTemplateStore::new();
        assert!(matches!(
            store.load_or_create_user(""),
            Err(StorageError::InvalidUserName { .. })
        ));
    }

    #[test]
    fn operations_require_active_user() {
        let store = InMemoryTemplateStore::new();
        assert!(matches!(
            store.dataset_for_recognition(),
            Err(StorageError::NoActiveUser)
        ));
        assert!(matches!(
            store.add_template("wave", template(3)),
            Err(StorageError::NoActiveUser)
        ));
    }

    #[test]
    fn templates_round_trip() {
        let store = InMemoryTemplateStore::new();
        store.load_or_create_user("ada").unwrap();
        store.add_template("wave", template(3)).unwrap();
        store.add_template("wave", template(4)).unwrap();

        assert_eq!(store.gesture_names().unwrap(), vec!["wave"]);
        assert_eq!(store.gesture_dataset("wave").unwrap().len(), 2);
        assert!(matches!(
            store.gesture_dataset("circle"),
            Err(StorageError::GestureNotFound { .. })
        ));
    }

    #[test]
    fn snapshots_are_immutable_across_edits() {
        let store = InMemoryTemplateStore::new();
        store.load_or_create_user("ada").unwrap();
        store.add_template("wave", template(3)).unwrap();

        let snapshot = store.dataset_for_recognition().unwrap();
        store.add_template("circle", template(5)).unwrap();

        assert_eq!(snapshot.gesture_count(), 1);
        assert_eq!(store.dataset_for_recognition().unwrap().gesture_count(), 2);
    }

    #[test]
    fn remove_template_bounds_checked() {
        let store = InMemoryTemplateStore::new();
        store.load_or_create_user("ada").unwrap();
        store.add_template("wave", template(3)).unwrap();

        assert!(matches!(
            store.remove_template("wave", 1),
            Err(StorageError::TemplateIndexOutOfRange { len: 1, .. })
        ));
        store.remove_template("wave", 0).unwrap();
        // Removing the last template removed the gesture itself
        assert!(store.gesture_names().unwrap().is_empty());
    }

    #[test]
    fn settings_persist_per_user() {
        let store = InMemoryTemplateStore::new();
        store.load_or_create_user("ada").unwrap();

        let mut settings = RecognitionSettings::default();
        settings.set_match_number(3);
        store.set_recognition_settings(&settings).unwrap();

        store.load_or_create_user("brian").unwrap();
        assert_eq!(store.recognition_settings().unwrap().match_number(), 0);

        store.load_or_create_user("ada").unwrap();
        assert_eq!(store.recognition_settings().unwrap().match_number(), 3);
    }

    #[test]
    fn delete_user_clears_active() {
        let store = InMemoryTemplateStore::new();
        store.load_or_create_user("ada").unwrap();
        store.delete_user().unwrap();
        assert!(store.user_name().is_none());
        assert_eq!(store.user_count(), 0);
        assert!(matches!(store.delete_user(), Err(StorageError::NoActiveUser)));
    }
}
