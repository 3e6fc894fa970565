//! In-process store.

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use super::{StoreError, StoreResult, TranslationBatch, TranslationStore};
use crate::models::{
    NewUser, Rating, RatingSummary, RatingValue, Translation, TranslationAccessLog,
    TranslationMode, TranslationRequest, TranslationResponse, User,
};

#[derive(Default)]
struct Tables {
    requests: Vec<TranslationRequest>,
    responses: Vec<TranslationResponse>,
    ratings: Vec<Rating>,
    access_logs: Vec<TranslationAccessLog>,
    users: Vec<User>,
}

impl Tables {
    fn response_key_taken(&self, candidate: &TranslationResponse) -> bool {
        self.responses.iter().any(|r| {
            r.user_id == candidate.user_id
                && r.source == candidate.source
                && r.target == candidate.target
                && r.mode == candidate.mode
                && r.original_text_hash == candidate.original_text_hash
        })
    }

    fn oldest_request(&self, fingerprint: &str, source: &str, target: &str) -> Option<&TranslationRequest> {
        self.requests
            .iter()
            .filter(|r| r.original_text_hash == fingerprint && r.source == source && r.target == target)
            .min_by_key(|r| r.timestamp)
    }

    fn translation(&self, response: &TranslationResponse) -> Translation {
        let original_text = self
            .oldest_request(&response.original_text_hash, &response.source, &response.target)
            .map(|r| r.original_text.clone());

        let mut translation = Translation::unrated(response.clone(), original_text);
        for rating in self.ratings.iter().filter(|r| r.translation_id == response.id) {
            translation.rating += i64::from(rating.rating.as_int());
            translation.count += 1;
        }
        translation
    }
}

/// Store holding every table in memory behind one lock.
///
/// A batch commit takes the write lock once, so it is atomic with respect
/// to every other operation.
#[derive(Default)]
pub struct MemoryTranslationStore {
    tables: RwLock<Tables>,
    fail_commits: AtomicBool,
}

impl MemoryTranslationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following [`TranslationStore::commit`] fail.
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<TranslationRequest> {
        self.tables.read().requests.clone()
    }

    pub fn responses(&self) -> Vec<TranslationResponse> {
        self.tables.read().responses.clone()
    }

    pub fn ratings(&self) -> Vec<Rating> {
        self.tables.read().ratings.clone()
    }

    pub fn access_logs(&self) -> Vec<TranslationAccessLog> {
        self.tables.read().access_logs.clone()
    }
}

#[async_trait]
impl TranslationStore for MemoryTranslationStore {
    async fn fetch_request(
        &self,
        fingerprint: &str,
        source: &str,
        target: &str,
    ) -> StoreResult<Option<TranslationRequest>> {
        Ok(self
            .tables
            .read()
            .oldest_request(fingerprint, source, target)
            .cloned())
    }

    async fn fetch_response(
        &self,
        fingerprint: &str,
        source: &str,
        target: &str,
        mode: TranslationMode,
    ) -> StoreResult<Option<TranslationResponse>> {
        Ok(self
            .tables
            .read()
            .responses
            .iter()
            .filter(|r| {
                r.original_text_hash == fingerprint
                    && r.source == source
                    && r.target == target
                    && r.mode == mode
            })
            .min_by_key(|r| r.timestamp)
            .cloned())
    }

    async fn fetch_user_response(
        &self,
        user_id: Uuid,
        fingerprint: &str,
        source: &str,
        target: &str,
    ) -> StoreResult<Option<TranslationResponse>> {
        Ok(self
            .tables
            .read()
            .responses
            .iter()
            .find(|r| {
                r.user_id == Some(user_id)
                    && r.original_text_hash == fingerprint
                    && r.source == source
                    && r.target == target
                    && r.mode == TranslationMode::Human
            })
            .cloned())
    }

    async fn find_response(&self, id: Uuid) -> StoreResult<Option<TranslationResponse>> {
        Ok(self
            .tables
            .read()
            .responses
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn insert_response(&self, response: &TranslationResponse) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if tables.response_key_taken(response) {
            return Err(StoreError::Conflict);
        }
        tables.responses.push(response.clone());
        Ok(())
    }

    async fn delete_response(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write();
        let before = tables.responses.len();
        tables.responses.retain(|r| r.id != id);
        let removed = tables.responses.len() < before;

        if removed {
            tables.ratings.retain(|r| r.translation_id != id);
            for log in tables
                .access_logs
                .iter_mut()
                .filter(|l| l.translation_id == Some(id))
            {
                log.translation_id = None;
            }
        }
        Ok(removed)
    }

    async fn find_translation(&self, id: Uuid) -> StoreResult<Option<Translation>> {
        let tables = self.tables.read();
        Ok(tables
            .responses
            .iter()
            .find(|r| r.id == id)
            .map(|r| tables.translation(r)))
    }

    async fn list_human_translations(
        &self,
        fingerprint: &str,
        source: &str,
        target: &str,
    ) -> StoreResult<Vec<Translation>> {
        let tables = self.tables.read();
        let mut translations: Vec<Translation> = tables
            .responses
            .iter()
            .filter(|r| {
                r.original_text_hash == fingerprint
                    && r.source == source
                    && r.target == target
                    && r.mode == TranslationMode::Human
            })
            .map(|r| tables.translation(r))
            .collect();

        translations.sort_by(|a, b| {
            b.rating
                .cmp(&a.rating)
                .then_with(|| a.timestamp.cmp(&b.timestamp))
        });
        Ok(translations)
    }

    async fn find_rating(
        &self,
        translation_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Rating>> {
        Ok(self
            .tables
            .read()
            .ratings
            .iter()
            .find(|r| r.translation_id == translation_id && r.user_id == user_id)
            .cloned())
    }

    async fn insert_rating(&self, rating: &Rating) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if !tables.responses.iter().any(|r| r.id == rating.translation_id) {
            return Err(anyhow!("rating references unknown translation {}", rating.translation_id).into());
        }
        if tables
            .ratings
            .iter()
            .any(|r| r.translation_id == rating.translation_id && r.user_id == rating.user_id)
        {
            return Err(StoreError::Conflict);
        }
        tables.ratings.push(rating.clone());
        Ok(())
    }

    async fn update_rating(
        &self,
        id: Uuid,
        value: RatingValue,
        timestamp: DateTime<Utc>,
    ) -> StoreResult<Option<Rating>> {
        let mut tables = self.tables.write();
        Ok(tables.ratings.iter_mut().find(|r| r.id == id).map(|r| {
            r.rating = value;
            r.timestamp = timestamp;
            r.clone()
        }))
    }

    async fn rating_summary(&self, translation_id: Uuid) -> StoreResult<RatingSummary> {
        let tables = self.tables.read();
        let mut summary = RatingSummary::default();
        for rating in tables.ratings.iter().filter(|r| r.translation_id == translation_id) {
            match rating.rating {
                RatingValue::Up => summary.positive += 1,
                RatingValue::Down => summary.negative += 1,
            }
        }
        Ok(summary)
    }

    async fn upsert_user(&self, input: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write();
        if let Some(existing) = tables.users.iter_mut().find(|u| u.oauth_id == input.oauth_id) {
            existing.oauth_provider = input.oauth_provider;
            existing.oauth_username = input.oauth_username;
            existing.family_name = input.family_name;
            existing.given_name = input.given_name;
            existing.email = input.email;
            existing.gender = input.gender;
            existing.locale = input.locale;
            return Ok(existing.clone());
        }

        let user = User::from_new(input);
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self
            .tables
            .read()
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn commit(&self, batch: TranslationBatch) -> StoreResult<()> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(anyhow!("commit rejected by test configuration").into());
        }

        let mut tables = self.tables.write();
        if let Some(response) = &batch.response
            && tables.response_key_taken(response)
        {
            return Err(StoreError::Conflict);
        }

        if let Some(request) = batch.request {
            tables.requests.push(request);
        }
        if let Some(response) = batch.response {
            tables.responses.push(response);
        }
        tables.access_logs.push(batch.access_log);
        Ok(())
    }

    async fn health(&self) -> bool {
        true
    }
}

impl std::fmt::Debug for MemoryTranslationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTranslationStore").finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::fingerprint::Fingerprint;

    fn machine_response(text: &str) -> TranslationResponse {
        TranslationResponse::machine(
            "en",
            "ko",
            TranslationMode::Direct,
            &Fingerprint::of(text),
            None,
            "번역".to_string(),
        )
    }

    fn batch(response: Option<TranslationResponse>) -> TranslationBatch {
        TranslationBatch {
            request: None,
            response,
            access_log: TranslationAccessLog::new(None, "ua", "127.0.0.1"),
        }
    }

    #[tokio::test]
    async fn shared_machine_response_is_unique() {
        let store = MemoryTranslationStore::new();
        let text = "The quick brown fox jumps over the lazy dog";

        store.insert_response(&machine_response(text)).await.unwrap();
        let err = store.insert_response(&machine_response(text)).await.unwrap_err();

        assert!(matches!(err, StoreError::Conflict));
        assert_eq!(store.responses().len(), 1);
    }

    #[tokio::test]
    async fn conflicting_batch_writes_nothing() {
        let store = MemoryTranslationStore::new();
        let text = "The quick brown fox jumps over the lazy dog";
        store.commit(batch(Some(machine_response(text)))).await.unwrap();

        let err = store.commit(batch(Some(machine_response(text)))).await.unwrap_err();

        assert!(matches!(err, StoreError::Conflict));
        assert_eq!(store.responses().len(), 1);
        assert_eq!(store.access_logs().len(), 1);
    }

    #[tokio::test]
    async fn human_responses_are_scoped_per_user() {
        let store = MemoryTranslationStore::new();
        let hash = Fingerprint::of("Good morning everyone").to_hex();

        let a = TranslationResponse::human(Uuid::now_v7(), "en", "ko", &hash, "a".into());
        let b = TranslationResponse::human(Uuid::now_v7(), "en", "ko", &hash, "b".into());
        store.insert_response(&a).await.unwrap();
        store.insert_response(&b).await.unwrap();

        let again = TranslationResponse::human(a.user_id.unwrap(), "en", "ko", &hash, "c".into());
        assert!(matches!(
            store.insert_response(&again).await,
            Err(StoreError::Conflict)
        ));
    }

    #[tokio::test]
    async fn deleting_response_drops_its_votes() {
        let store = MemoryTranslationStore::new();
        let response = machine_response("Deleting drops the ratings too");
        store.insert_response(&response).await.unwrap();
        store
            .insert_rating(&Rating::new(response.id, Uuid::now_v7(), RatingValue::Up))
            .await
            .unwrap();

        assert!(store.delete_response(response.id).await.unwrap());
        assert!(!store.delete_response(response.id).await.unwrap());
        assert!(store.ratings().is_empty());
    }

    #[tokio::test]
    async fn upsert_user_refreshes_profile() {
        let store = MemoryTranslationStore::new();
        let first = store
            .upsert_user(NewUser {
                oauth_provider: "google".into(),
                oauth_id: "42".into(),
                given_name: Some("Ada".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        let second = store
            .upsert_user(NewUser {
                oauth_provider: "google".into(),
                oauth_id: "42".into(),
                given_name: Some("Augusta".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.given_name.as_deref(), Some("Augusta"));
    }
}
