use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::analysis::AnalysisRecord;
use crate::models::user::User;
use crate::store::{AnalysisStore, UserStore};

/// In-process store with the same ordering guarantees as `PgStore`.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<AnalysisRecord>>,
    owners: RwLock<Vec<(Uuid, Uuid)>>,
    users: RwLock<HashMap<Uuid, User>>,
}

#[async_trait]
impl AnalysisStore for MemoryStore {
    async fn save(&self, record: &AnalysisRecord) -> Result<Uuid> {
        self.records.write().await.push(record.clone());
        Ok(record.id)
    }

    async fn save_for_owner(&self, record: &AnalysisRecord) -> Result<Uuid> {
        let mut records = self.records.write().await;
        let mut owners = self.owners.write().await;
        records.push(record.clone());
        owners.push((record.owner_id, record.id));
        Ok(record.id)
    }

    async fn append_to_owner(&self, owner_id: Uuid, record_id: Uuid) -> Result<()> {
        self.owners.write().await.push((owner_id, record_id));
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<AnalysisRecord>> {
        Ok(self.records.read().await.clone())
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<AnalysisRecord>> {
        let records = self.records.read().await;
        Ok(self
            .owners
            .read()
            .await
            .iter()
            .filter(|(owner, _)| *owner == owner_id)
            .filter_map(|(_, record_id)| records.iter().find(|r| r.id == *record_id).cloned())
            .collect())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn ensure_user(&self, id: Uuid, email: &str) -> Result<User> {
        let mut users = self.users.write().await;
        let user = users.entry(id).or_insert_with(|| User {
            id,
            email: email.to_string(),
            first_name: None,
            last_name: None,
            created_at: Utc::now(),
        });
        user.email = email.to_string();
        Ok(user.clone())
    }

    async fn update_name(
        &self,
        id: Uuid,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<Option<User>> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|user| {
            user.first_name = first_name.map(str::to_string);
            user.last_name = last_name.map(str::to_string);
            user.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::ResumeAnalysis;

    fn record(owner_id: Uuid) -> AnalysisRecord {
        AnalysisRecord::new(
            owner_id,
            "memory://cv.pdf".to_string(),
            String::new(),
            ResumeAnalysis::default(),
        )
    }

    #[tokio::test]
    async fn test_save_for_owner_links_the_record() {
        let store = MemoryStore::default();
        let owner = Uuid::new_v4();
        let first = record(owner);
        let second = record(owner);

        store.save_for_owner(&first).await.unwrap();
        store.save_for_owner(&second).await.unwrap();
        store.save(&record(Uuid::new_v4())).await.unwrap();

        assert_eq!(store.find_all().await.unwrap().len(), 3);
        let owned: Vec<Uuid> = store
            .find_by_owner(owner)
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(owned, vec![first.id, second.id]);
    }
}
