//! Flag store interface and in-memory backend.
//!
//! The store is an external collaborator from the point of view of the
//! evaluation/propagation core: the only guarantee the core needs is
//! read-your-writes per flag. The in-memory backend below serves a
//! single-node deployment; a persistent backend implements the same trait.

use std::collections::HashMap;

use async_trait::async_trait;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use switchyard_sdk::keys::ClientKey;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::flag::{validate_table, Flag, FlagUpdate, FlagValidationError, NewFlag};

/// What `delete` does with the record.
///
/// One deletion operation, one policy switch — there are no separate soft-
/// and hard-delete paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetentionPolicy {
    /// Remove the record immediately.
    Immediate,
    /// Keep the record with `deleted_at` set; it disappears from every
    /// read path.
    #[default]
    Tombstoned,
}

/// Errors produced by flag store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("flag not found: {0}")]
    NotFound(Uuid),

    #[error("a flag titled `{0}` already exists for this tenant")]
    DuplicateTitle(CompactString),

    #[error(transparent)]
    Validation(#[from] FlagValidationError),
}

/// CRUD interface over flag definitions.
///
/// All write-time validation happens here; evaluation never validates.
#[async_trait]
pub trait FlagStore: Send + Sync {
    async fn create(&self, new_flag: NewFlag) -> Result<Flag, StoreError>;

    async fn get(&self, flag_id: Uuid) -> Result<Flag, StoreError>;

    /// All live flags for a tenant, ordered by title.
    async fn list(&self, tenant: &ClientKey) -> Result<Vec<Flag>, StoreError>;

    /// Replace a flag's definition, including the whole variation table.
    async fn update(&self, flag_id: Uuid, update: FlagUpdate) -> Result<Flag, StoreError>;

    /// Toggle the active switch.
    async fn set_active(&self, flag_id: Uuid, active: bool) -> Result<Flag, StoreError>;

    /// Delete per the store's retention policy; returns the flag as it was
    /// at deletion time.
    async fn delete(&self, flag_id: Uuid) -> Result<Flag, StoreError>;

    async fn find_by_tag(&self, tenant: &ClientKey, tag: &str)
        -> Result<Vec<Flag>, StoreError>;

    /// Live flags whose title or description contains `keyword`.
    async fn find_by_keyword(
        &self,
        tenant: &ClientKey,
        keyword: &str,
    ) -> Result<Vec<Flag>, StoreError>;
}

/// Single-node, in-memory flag store.
#[derive(Debug)]
pub struct InMemoryFlagStore {
    retention: RetentionPolicy,
    flags: RwLock<HashMap<Uuid, Flag>>,
}

impl InMemoryFlagStore {
    pub fn new(retention: RetentionPolicy) -> Self {
        Self {
            retention,
            flags: RwLock::new(HashMap::new()),
        }
    }

    fn live<'a>(
        flags: &'a HashMap<Uuid, Flag>,
        tenant: &'a ClientKey,
    ) -> impl Iterator<Item = &'a Flag> {
        flags
            .values()
            .filter(move |flag| !flag.is_deleted() && &flag.tenant == tenant)
    }

    fn sorted(mut flags: Vec<Flag>) -> Vec<Flag> {
        flags.sort_by(|a, b| a.title.cmp(&b.title));
        flags
    }
}

#[async_trait]
impl FlagStore for InMemoryFlagStore {
    async fn create(&self, new_flag: NewFlag) -> Result<Flag, StoreError> {
        if new_flag.title.is_empty() {
            return Err(FlagValidationError::EmptyTitle.into());
        }
        validate_table(
            new_flag.flag_type,
            &new_flag.default_value,
            new_flag.default_portion,
            &new_flag.variations,
            &new_flag.keywords,
        )?;

        let mut flags = self.flags.write().await;
        if Self::live(&flags, &new_flag.tenant).any(|flag| flag.title == new_flag.title) {
            return Err(StoreError::DuplicateTitle(new_flag.title));
        }

        let now = OffsetDateTime::now_utc();
        let flag = Flag {
            flag_id: Uuid::new_v4(),
            tenant: new_flag.tenant,
            title: new_flag.title,
            description: new_flag.description,
            flag_type: new_flag.flag_type,
            default_value: new_flag.default_value,
            default_portion: new_flag.default_portion,
            default_description: new_flag.default_description,
            variations: new_flag.variations,
            keywords: new_flag.keywords,
            tags: new_flag.tags,
            active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        flags.insert(flag.flag_id, flag.clone());
        Ok(flag)
    }

    async fn get(&self, flag_id: Uuid) -> Result<Flag, StoreError> {
        let flags = self.flags.read().await;
        flags
            .get(&flag_id)
            .filter(|flag| !flag.is_deleted())
            .cloned()
            .ok_or(StoreError::NotFound(flag_id))
    }

    async fn list(&self, tenant: &ClientKey) -> Result<Vec<Flag>, StoreError> {
        let flags = self.flags.read().await;
        Ok(Self::sorted(Self::live(&flags, tenant).cloned().collect()))
    }

    async fn update(&self, flag_id: Uuid, update: FlagUpdate) -> Result<Flag, StoreError> {
        if update.title.is_empty() {
            return Err(FlagValidationError::EmptyTitle.into());
        }

        let mut flags = self.flags.write().await;
        let Some(current) = flags.get(&flag_id).filter(|flag| !flag.is_deleted()) else {
            return Err(StoreError::NotFound(flag_id));
        };
        validate_table(
            current.flag_type,
            &update.default_value,
            update.default_portion,
            &update.variations,
            &update.keywords,
        )?;
        if update.title != current.title {
            let tenant = current.tenant.clone();
            if Self::live(&flags, &tenant).any(|flag| flag.title == update.title) {
                return Err(StoreError::DuplicateTitle(update.title));
            }
        }

        // Checked above; re-borrow mutably for the write.
        let Some(flag) = flags.get_mut(&flag_id) else {
            return Err(StoreError::NotFound(flag_id));
        };
        flag.title = update.title;
        flag.description = update.description;
        flag.default_value = update.default_value;
        flag.default_portion = update.default_portion;
        flag.default_description = update.default_description;
        flag.variations = update.variations;
        flag.keywords = update.keywords;
        flag.tags = update.tags;
        flag.updated_at = OffsetDateTime::now_utc();
        Ok(flag.clone())
    }

    async fn set_active(&self, flag_id: Uuid, active: bool) -> Result<Flag, StoreError> {
        let mut flags = self.flags.write().await;
        let Some(flag) = flags.get_mut(&flag_id).filter(|flag| !flag.is_deleted()) else {
            return Err(StoreError::NotFound(flag_id));
        };
        flag.active = active;
        flag.updated_at = OffsetDateTime::now_utc();
        Ok(flag.clone())
    }

    async fn delete(&self, flag_id: Uuid) -> Result<Flag, StoreError> {
        let mut flags = self.flags.write().await;
        match self.retention {
            RetentionPolicy::Immediate => flags
                .remove(&flag_id)
                .filter(|flag| !flag.is_deleted())
                .ok_or(StoreError::NotFound(flag_id)),
            RetentionPolicy::Tombstoned => {
                let Some(flag) = flags.get_mut(&flag_id).filter(|flag| !flag.is_deleted())
                else {
                    return Err(StoreError::NotFound(flag_id));
                };
                flag.deleted_at = Some(OffsetDateTime::now_utc());
                Ok(flag.clone())
            }
        }
    }

    async fn find_by_tag(
        &self,
        tenant: &ClientKey,
        tag: &str,
    ) -> Result<Vec<Flag>, StoreError> {
        let flags = self.flags.read().await;
        Ok(Self::sorted(
            Self::live(&flags, tenant)
                .filter(|flag| flag.tags.iter().any(|t| t == tag))
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_keyword(
        &self,
        tenant: &ClientKey,
        keyword: &str,
    ) -> Result<Vec<Flag>, StoreError> {
        let flags = self.flags.read().await;
        Ok(Self::sorted(
            Self::live(&flags, tenant)
                .filter(|flag| {
                    flag.title.contains(keyword) || flag.description.contains(keyword)
                })
                .cloned()
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchyard_sdk::keys::derive_client_key;
    use switchyard_sdk::objects::flag::{FlagType, Variation};

    fn new_flag(tenant: &ClientKey, title: &str) -> NewFlag {
        NewFlag {
            tenant: tenant.clone(),
            title: title.into(),
            description: "gradual rollout".to_owned(),
            flag_type: FlagType::Boolean,
            default_value: "TRUE".to_owned(),
            default_portion: 100,
            default_description: String::new(),
            variations: vec![Variation::new("FALSE", 0)],
            keywords: vec![],
            tags: vec!["checkout".into()],
        }
    }

    fn update_of(flag: &Flag) -> FlagUpdate {
        FlagUpdate {
            title: flag.title.clone(),
            description: flag.description.clone(),
            default_value: flag.default_value.clone(),
            default_portion: flag.default_portion,
            default_description: flag.default_description.clone(),
            variations: flag.variations.clone(),
            keywords: flag.keywords.clone(),
            tags: flag.tags.clone(),
        }
    }

    #[tokio::test]
    async fn create_then_read_reflects_the_write() {
        let store = InMemoryFlagStore::new(RetentionPolicy::Tombstoned);
        let tenant = derive_client_key("tenant");

        let created = store.create(new_flag(&tenant, "beta")).await.unwrap();
        let read = store.get(created.flag_id).await.unwrap();
        assert_eq!(read, created);
        assert!(read.active);
    }

    #[tokio::test]
    async fn invalid_variation_values_are_rejected_at_write_time() {
        let store = InMemoryFlagStore::new(RetentionPolicy::Tombstoned);
        let tenant = derive_client_key("tenant");

        let mut bad = new_flag(&tenant, "beta");
        bad.variations = vec![Variation::new("yes", 0)];
        assert!(matches!(
            store.create(bad).await,
            Err(StoreError::Validation(FlagValidationError::InvalidValue { .. }))
        ));

        let mut bad_portion = new_flag(&tenant, "beta");
        bad_portion.default_portion = 120;
        assert!(matches!(
            store.create(bad_portion).await,
            Err(StoreError::Validation(FlagValidationError::InvalidPortion(120)))
        ));

        let mut bad_keyword = new_flag(&tenant, "beta");
        bad_keyword.keywords = vec![switchyard_sdk::objects::flag::Keyword {
            properties: vec![switchyard_sdk::objects::flag::Property::new("plan", "pro")],
            description: String::new(),
            value: "on".to_owned(),
        }];
        assert!(matches!(
            store.create(bad_keyword).await,
            Err(StoreError::Validation(FlagValidationError::InvalidValue { .. }))
        ));
    }

    #[tokio::test]
    async fn duplicate_titles_within_a_tenant_are_rejected() {
        let store = InMemoryFlagStore::new(RetentionPolicy::Tombstoned);
        let tenant = derive_client_key("tenant");

        store.create(new_flag(&tenant, "beta")).await.unwrap();
        assert!(matches!(
            store.create(new_flag(&tenant, "beta")).await,
            Err(StoreError::DuplicateTitle(_))
        ));

        // Same title under another tenant is fine.
        let other = derive_client_key("other");
        assert!(store.create(new_flag(&other, "beta")).await.is_ok());
    }

    #[tokio::test]
    async fn update_replaces_the_variation_table_wholesale() {
        let store = InMemoryFlagStore::new(RetentionPolicy::Tombstoned);
        let tenant = derive_client_key("tenant");
        let created = store.create(new_flag(&tenant, "beta")).await.unwrap();

        let mut update = update_of(&created);
        update.default_portion = 60;
        update.variations = vec![Variation::new("FALSE", 40)];
        let updated = store.update(created.flag_id, update).await.unwrap();

        assert_eq!(updated.default_portion, 60);
        assert_eq!(updated.variations, vec![Variation::new("FALSE", 40)]);
        assert_eq!(store.get(created.flag_id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn tombstoned_delete_hides_the_flag_from_reads() {
        let store = InMemoryFlagStore::new(RetentionPolicy::Tombstoned);
        let tenant = derive_client_key("tenant");
        let created = store.create(new_flag(&tenant, "beta")).await.unwrap();

        let deleted = store.delete(created.flag_id).await.unwrap();
        assert!(deleted.deleted_at.is_some());

        assert!(matches!(
            store.get(created.flag_id).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(store.list(&tenant).await.unwrap().is_empty());
        assert!(matches!(
            store.delete(created.flag_id).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn immediate_delete_removes_the_record() {
        let store = InMemoryFlagStore::new(RetentionPolicy::Immediate);
        let tenant = derive_client_key("tenant");
        let created = store.create(new_flag(&tenant, "beta")).await.unwrap();

        let deleted = store.delete(created.flag_id).await.unwrap();
        assert!(deleted.deleted_at.is_none());
        assert!(matches!(
            store.get(created.flag_id).await,
            Err(StoreError::NotFound(_))
        ));

        // The title is free again.
        assert!(store.create(new_flag(&tenant, "beta")).await.is_ok());
    }

    #[tokio::test]
    async fn tag_and_keyword_lookup() {
        let store = InMemoryFlagStore::new(RetentionPolicy::Tombstoned);
        let tenant = derive_client_key("tenant");

        store.create(new_flag(&tenant, "beta-checkout")).await.unwrap();
        let mut untagged = new_flag(&tenant, "dark-mode");
        untagged.tags = vec!["ui".into()];
        untagged.description = "theme experiment".to_owned();
        store.create(untagged).await.unwrap();

        let by_tag = store.find_by_tag(&tenant, "checkout").await.unwrap();
        assert_eq!(by_tag.len(), 1);
        assert_eq!(by_tag[0].title, "beta-checkout");

        let by_keyword = store.find_by_keyword(&tenant, "theme").await.unwrap();
        assert_eq!(by_keyword.len(), 1);
        assert_eq!(by_keyword[0].title, "dark-mode");

        assert!(store.find_by_keyword(&tenant, "absent").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_is_scoped_to_the_tenant() {
        let store = InMemoryFlagStore::new(RetentionPolicy::Tombstoned);
        let tenant_a = derive_client_key("a");
        let tenant_b = derive_client_key("b");

        store.create(new_flag(&tenant_a, "alpha")).await.unwrap();
        store.create(new_flag(&tenant_b, "bravo")).await.unwrap();

        let listed = store.list(&tenant_a).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "alpha");
    }
}
