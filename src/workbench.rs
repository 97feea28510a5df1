//! The workbench facade.
//!
//! One object owning every moving part: the persistent store, the
//! profile registry, the history log, the journal, the response cache,
//! the dispatcher, and the mock responder. UI layers talk to this and
//! nothing else. Routine persistence is fire-and-forget with failures
//! logged; only export and import propagate storage errors, since the
//! caller explicitly asked for them.

use crate::curl;
use crate::dispatch::{CacheStats, CancelError, DispatchError, Dispatcher, ResponseCache};
use crate::history::{is_masked_value, HistoryEntry, HistoryLog};
use crate::journal::{Journal, JournalEntry, LogLevel};
use crate::mock::MockResponder;
use crate::models::{ApiRequest, ApiResponse, HttpMethod, Profile};
use crate::profiles::{ProfileError, ProfileRegistry};
use crate::store::{FileStore, StoreError, DARK_MODE_KEY, MOCK_ENABLED_KEY};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// The top-level workbench object.
///
/// All methods take `&self`; interior state sits behind short-lived
/// locks that never span an `.await`, so concurrent dispatches from one
/// shared workbench are safe.
pub struct Workbench {
    store: Mutex<FileStore>,
    registry: Mutex<ProfileRegistry>,
    history: Mutex<HistoryLog>,
    journal: Mutex<Journal>,
    cache: ResponseCache,
    dispatcher: Dispatcher,
    mock: MockResponder,
    mock_enabled: AtomicBool,
    dark_mode: AtomicBool,
}

impl Workbench {
    /// Opens a workbench over a plaintext store.
    ///
    /// State persisted by earlier sessions (profiles, history, settings)
    /// is loaded immediately.
    ///
    /// # Arguments
    ///
    /// * `path` - Location of the backing store document
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::from_store(FileStore::open(path)?)
    }

    /// Opens a workbench whose store seals secret-named keys.
    ///
    /// # Arguments
    ///
    /// * `path` - Location of the backing store document
    /// * `key` - 32 bytes of sealing key material
    pub fn open_sealed(path: impl Into<PathBuf>, key: &[u8]) -> Result<Self, StoreError> {
        Self::from_store(FileStore::open_sealed(path, key)?)
    }

    fn from_store(store: FileStore) -> Result<Self, StoreError> {
        let registry = ProfileRegistry::load(&store)?;
        let history = HistoryLog::load(&store)?;
        let dark_mode = store.get_as::<bool>(DARK_MODE_KEY)?.unwrap_or(false);
        let mock_enabled = store.get_as::<bool>(MOCK_ENABLED_KEY)?.unwrap_or(false);

        let dispatcher = Dispatcher::new()
            .map_err(|e| StoreError::InvalidDocument(format!("dispatcher init failed: {}", e)))?;

        Ok(Self {
            store: Mutex::new(store),
            registry: Mutex::new(registry),
            history: Mutex::new(history),
            journal: Mutex::new(Journal::new()),
            cache: ResponseCache::new(),
            dispatcher,
            mock: MockResponder::new(),
            mock_enabled: AtomicBool::new(mock_enabled),
            dark_mode: AtomicBool::new(dark_mode),
        })
    }

    /// Replaces the mock responder, keeping everything else.
    ///
    /// Used by tests and demos that need a deterministic dataset.
    pub fn with_mock(mut self, mock: MockResponder) -> Self {
        self.mock = mock;
        self
    }

    // ---- profiles ----

    /// Returns all profiles in insertion order.
    pub fn profiles(&self) -> Vec<Profile> {
        self.lock(&self.registry).list().to_vec()
    }

    /// Looks up a profile by id.
    pub fn profile(&self, id: &str) -> Option<Profile> {
        self.lock(&self.registry).get(id).cloned()
    }

    /// Adds a profile and persists the registry.
    pub fn add_profile(&self, profile: Profile) -> Result<(), ProfileError> {
        self.lock(&self.registry).add(profile)?;
        self.persist_profiles();
        Ok(())
    }

    /// Updates a profile in place and persists the registry.
    pub fn update_profile(&self, profile: Profile) -> Result<(), ProfileError> {
        self.lock(&self.registry).update(profile)?;
        self.persist_profiles();
        Ok(())
    }

    /// Removes a profile by id and persists the registry.
    ///
    /// History entries referencing the profile stay behind, orphaned.
    ///
    /// # Returns
    ///
    /// The removed profile, or `None` if the id was unknown.
    pub fn remove_profile(&self, id: &str) -> Option<Profile> {
        let removed = self.lock(&self.registry).remove(id);
        if removed.is_some() {
            self.persist_profiles();
        }
        removed
    }

    // ---- dispatch ----

    /// Builds a request against a profile and sends it.
    ///
    /// # Arguments
    ///
    /// * `profile_id` - The profile to send through
    /// * `method` - HTTP method
    /// * `path` - Target path or absolute URL
    /// * `body` - Optional JSON body
    pub async fn send(
        &self,
        profile_id: &str,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiResponse, DispatchError> {
        let mut request = ApiRequest::new(profile_id, method, path);
        if let Some(body) = body {
            request.set_body(body);
        }
        self.send_request(request).await
    }

    /// Dispatches a caller-built request.
    ///
    /// This is the cancellable form: the request's id can be passed to
    /// [`Workbench::cancel`] while the returned future is pending. The
    /// exchange is recorded in history and journaled whichever way it
    /// ends, except that a missing profile records nothing — the
    /// request was never issued.
    pub async fn send_request(&self, request: ApiRequest) -> Result<ApiResponse, DispatchError> {
        let profile = self
            .profile(&request.profile_id)
            .ok_or_else(|| DispatchError::ProfileMissing(request.profile_id.clone()))?;

        self.lock(&self.journal).log_dispatch(&request);

        if self.mock_enabled() {
            let response = self.mock.handle(&request).await;
            self.record_exchange(&request, &response);
            return Ok(response);
        }

        if request.method == HttpMethod::GET {
            if let Some(cached) = self.cache.get(&request) {
                log::debug!("cache hit for {} {}", request.method, request.url);
                self.record_exchange(&request, &cached);
                return Ok(cached);
            }
        }

        match self.dispatcher.dispatch(&profile, &request).await {
            Ok(response) => {
                if request.method == HttpMethod::GET && response.is_success() {
                    self.cache.put(&request, &response);
                }
                self.record_exchange(&request, &response);
                Ok(response)
            }
            Err(err) => {
                let placeholder = ApiResponse::failure(err.to_string());
                self.lock(&self.journal).log_failure(&request.id, &err.to_string());
                self.lock(&self.history)
                    .record(HistoryEntry::new(request, placeholder));
                self.persist_history();
                Err(err)
            }
        }
    }

    /// Cancels an in-flight request by id.
    pub fn cancel(&self, request_id: &str) -> Result<(), CancelError> {
        self.dispatcher.cancel(request_id)
    }

    /// Replays a past exchange under a fresh request identity.
    ///
    /// Recorded entries carry masked credential values; those headers are
    /// dropped rather than sent, and auth is re-derived from the profile
    /// at dispatch time.
    ///
    /// # Arguments
    ///
    /// * `request_id` - Id of the history entry to replay
    ///
    /// # Errors
    ///
    /// `DispatchError::ProfileMissing` when no history entry matches or
    /// the entry's profile has since been deleted.
    pub async fn replay(&self, request_id: &str) -> Result<ApiResponse, DispatchError> {
        let original = self
            .lock(&self.history)
            .find(request_id)
            .map(|entry| entry.request.clone())
            .ok_or_else(|| DispatchError::ProfileMissing(request_id.to_string()))?;

        let mut request = original.reissued();
        request.headers.retain(|_, value| !is_masked_value(value));

        self.send_request(request).await
    }

    /// Renders a request as a cURL command using its profile's headers.
    pub fn curl_for(&self, request: &ApiRequest) -> Result<String, DispatchError> {
        let profile = self
            .profile(&request.profile_id)
            .ok_or_else(|| DispatchError::ProfileMissing(request.profile_id.clone()))?;
        curl::curl_command(&profile, request)
    }

    fn record_exchange(&self, request: &ApiRequest, response: &ApiResponse) {
        self.lock(&self.journal).log_outcome(&request.id, response);
        self.lock(&self.history)
            .record(HistoryEntry::new(request.clone(), response.clone()));
        self.persist_history();
    }

    // ---- history ----

    /// Returns all history entries, oldest first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.lock(&self.history).iter().cloned().collect()
    }

    /// Deletes the history entry recorded for a request id.
    ///
    /// # Returns
    ///
    /// `true` if an entry was removed.
    pub fn delete_history_entry(&self, request_id: &str) -> bool {
        let removed = self.lock(&self.history).remove(request_id).is_some();
        if removed {
            self.persist_history();
        }
        removed
    }

    /// Removes all history entries.
    pub fn clear_history(&self) {
        self.lock(&self.history).clear();
        self.persist_history();
    }

    // ---- journal ----

    /// Returns all journal events, newest first.
    pub fn journal_entries(&self) -> Vec<JournalEntry> {
        self.lock(&self.journal).newest_first()
    }

    /// Returns the journal events of one severity, newest first.
    pub fn journal_entries_by_level(&self, level: LogLevel) -> Vec<JournalEntry> {
        self.lock(&self.journal).filter_by_level(level)
    }

    // ---- cache ----

    /// Drops every cached response.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Reports the response cache's contents.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    // ---- settings ----

    /// Returns the dark mode flag.
    pub fn dark_mode(&self) -> bool {
        self.dark_mode.load(Ordering::SeqCst)
    }

    /// Sets and persists the dark mode flag.
    pub fn set_dark_mode(&self, enabled: bool) {
        self.dark_mode.store(enabled, Ordering::SeqCst);
        self.persist_setting(DARK_MODE_KEY, enabled);
    }

    /// Returns the mock mode flag.
    pub fn mock_enabled(&self) -> bool {
        self.mock_enabled.load(Ordering::SeqCst)
    }

    /// Sets and persists the mock mode flag.
    ///
    /// While enabled, sends are answered by the mock responder instead
    /// of the network.
    pub fn set_mock_enabled(&self, enabled: bool) {
        self.mock_enabled.store(enabled, Ordering::SeqCst);
        self.persist_setting(MOCK_ENABLED_KEY, enabled);
    }

    // ---- export / import ----

    /// Exports profiles, history, and settings as one JSON document.
    pub fn export_data(&self) -> Value {
        json!({
            "profiles": self.lock(&self.registry).list(),
            "history": self.lock(&self.history).iter().collect::<Vec<_>>(),
            "settings": {
                "darkMode": self.dark_mode(),
                "mockEnabled": self.mock_enabled(),
            },
        })
    }

    /// Imports a document produced by [`Workbench::export_data`].
    ///
    /// Only the sections present in the document are applied; an absent
    /// section leaves the current state alone. Unlike routine
    /// persistence, failures here are propagated — the caller explicitly
    /// asked for the import.
    pub fn import_data(&self, document: &Value) -> Result<(), StoreError> {
        if let Some(raw) = document.get("profiles") {
            let profiles: Vec<Profile> = serde_json::from_value(raw.clone())?;
            let mut registry = ProfileRegistry::new();
            for profile in profiles {
                registry
                    .add(profile)
                    .map_err(|e| StoreError::InvalidDocument(e.to_string()))?;
            }
            registry.save(&mut self.lock(&self.store))?;
            *self.lock(&self.registry) = registry;
        }

        if let Some(raw) = document.get("history") {
            let entries: Vec<HistoryEntry> = serde_json::from_value(raw.clone())?;
            let mut history = HistoryLog::new();
            for entry in entries {
                history.record(entry);
            }
            history.save(&mut self.lock(&self.store))?;
            *self.lock(&self.history) = history;
        }

        if let Some(settings) = document.get("settings") {
            if let Some(dark_mode) = settings.get("darkMode").and_then(Value::as_bool) {
                self.dark_mode.store(dark_mode, Ordering::SeqCst);
                self.lock(&self.store).set(DARK_MODE_KEY, json!(dark_mode))?;
            }
            if let Some(mock_enabled) = settings.get("mockEnabled").and_then(Value::as_bool) {
                self.mock_enabled.store(mock_enabled, Ordering::SeqCst);
                self.lock(&self.store)
                    .set(MOCK_ENABLED_KEY, json!(mock_enabled))?;
            }
        }

        Ok(())
    }

    // ---- persistence plumbing ----

    fn persist_profiles(&self) {
        let registry = self.lock(&self.registry).clone();
        if let Err(e) = registry.save(&mut self.lock(&self.store)) {
            log::warn!("Failed to persist profiles: {}", e);
        }
    }

    fn persist_history(&self) {
        let history = self.lock(&self.history).clone();
        if let Err(e) = history.save(&mut self.lock(&self.store)) {
            log::warn!("Failed to persist history: {}", e);
        }
    }

    fn persist_setting(&self, key: &str, value: bool) {
        if let Err(e) = self.lock(&self.store).set(key, json!(value)) {
            log::warn!("Failed to persist setting {}: {}", key, e);
        }
    }

    fn lock<'a, T>(&self, mutex: &'a Mutex<T>) -> std::sync::MutexGuard<'a, T> {
        match mutex.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl std::fmt::Debug for Workbench {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workbench")
            .field("profiles", &self.lock(&self.registry).len())
            .field("history", &self.lock(&self.history).len())
            .field("mock_enabled", &self.mock_enabled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AuthKind;
    use tempfile::TempDir;

    fn workbench_in(dir: &TempDir) -> Workbench {
        Workbench::open(dir.path().join("store.json")).unwrap()
    }

    fn sample_profile(name: &str) -> Profile {
        let mut profile = Profile::new(name, "https://api.example.com");
        profile.auth_type = AuthKind::Bearer;
        profile.auth_value = Some("tok".to_string());
        profile
    }

    #[test]
    fn test_profile_crud_persists() {
        let dir = TempDir::new().unwrap();
        let profile = sample_profile("Prod");
        let id = profile.id.clone();

        {
            let workbench = workbench_in(&dir);
            workbench.add_profile(profile).unwrap();

            let mut renamed = workbench.profile(&id).unwrap();
            renamed.name = "Production".to_string();
            workbench.update_profile(renamed).unwrap();
        }

        let reopened = workbench_in(&dir);
        assert_eq!(reopened.profiles().len(), 1);
        assert_eq!(reopened.profile(&id).unwrap().name, "Production");

        assert!(reopened.remove_profile(&id).is_some());
        assert!(reopened.remove_profile(&id).is_none());
    }

    #[test]
    fn test_settings_persist() {
        let dir = TempDir::new().unwrap();

        {
            let workbench = workbench_in(&dir);
            assert!(!workbench.dark_mode());
            assert!(!workbench.mock_enabled());
            workbench.set_dark_mode(true);
            workbench.set_mock_enabled(true);
        }

        let reopened = workbench_in(&dir);
        assert!(reopened.dark_mode());
        assert!(reopened.mock_enabled());
    }

    #[tokio::test]
    async fn test_missing_profile_records_nothing() {
        let dir = TempDir::new().unwrap();
        let workbench = workbench_in(&dir);

        let request = ApiRequest::new("no-such-profile", HttpMethod::GET, "/users");
        let err = workbench.send_request(request).await.unwrap_err();

        assert!(matches!(err, DispatchError::ProfileMissing(_)));
        assert!(workbench.history().is_empty());
        assert!(workbench.journal_entries().is_empty());
    }

    #[tokio::test]
    async fn test_mock_mode_answers_without_network() {
        let dir = TempDir::new().unwrap();
        let workbench = workbench_in(&dir);
        let profile = sample_profile("Mocked");
        let id = profile.id.clone();
        workbench.add_profile(profile).unwrap();
        workbench.set_mock_enabled(true);

        let response = workbench
            .send(&id, HttpMethod::GET, "/api/items", None)
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(
            response.headers.get(crate::mock::MOCK_HEADER),
            Some(&"true".to_string())
        );
        assert_eq!(workbench.history().len(), 1);
    }

    #[test]
    fn test_export_shape() {
        let dir = TempDir::new().unwrap();
        let workbench = workbench_in(&dir);
        workbench.add_profile(sample_profile("One")).unwrap();
        workbench.set_dark_mode(true);

        let exported = workbench.export_data();
        assert_eq!(exported["profiles"].as_array().unwrap().len(), 1);
        assert!(exported["history"].as_array().unwrap().is_empty());
        assert_eq!(exported["settings"]["darkMode"], true);
        assert_eq!(exported["settings"]["mockEnabled"], false);
    }

    #[test]
    fn test_import_applies_only_present_sections() {
        let dir = TempDir::new().unwrap();
        let workbench = workbench_in(&dir);
        workbench.add_profile(sample_profile("Kept")).unwrap();
        workbench.set_dark_mode(true);

        // A settings-only document leaves profiles alone.
        workbench
            .import_data(&json!({"settings": {"mockEnabled": true}}))
            .unwrap();

        assert_eq!(workbench.profiles().len(), 1);
        assert!(workbench.dark_mode());
        assert!(workbench.mock_enabled());
    }

    #[test]
    fn test_import_rejects_malformed_profiles() {
        let dir = TempDir::new().unwrap();
        let workbench = workbench_in(&dir);

        let err = workbench
            .import_data(&json!({"profiles": [{"bogus": true}]}))
            .unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
