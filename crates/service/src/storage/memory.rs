use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use models::student::{NewStudent, Student, StudentId, StudentPatch};

use crate::{errors::ServiceError, student::repository::StudentRepository};

/// Process-local student store, selected with a `memory://` database URL.
///
/// Ids are generated the same way the document store generates them, so the
/// map's key order is insertion order, matching the store-native order of a
/// fresh collection. Contents are lost when the process exits.
#[derive(Clone, Default)]
pub struct MemoryStudentRepository {
    inner: Arc<RwLock<BTreeMap<StudentId, Student>>>,
}

impl MemoryStudentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl StudentRepository for MemoryStudentRepository {
    async fn insert_one(&self, input: NewStudent) -> Result<StudentId, ServiceError> {
        let id = StudentId::generate();
        let mut map = self.inner.write().await;
        map.insert(id, input.into_student(id));
        Ok(id)
    }

    async fn find_one(&self, id: StudentId) -> Result<Option<Student>, ServiceError> {
        let map = self.inner.read().await;
        Ok(map.get(&id).cloned())
    }

    async fn find_many(&self, cap: i64) -> Result<Vec<Student>, ServiceError> {
        let cap = usize::try_from(cap).unwrap_or(0);
        let map = self.inner.read().await;
        Ok(map.values().take(cap).cloned().collect())
    }

    async fn find_one_and_update(&self, id: StudentId, patch: &StudentPatch) -> Result<Option<Student>, ServiceError> {
        let mut map = self.inner.write().await;
        Ok(map.get_mut(&id).map(|existing| {
            patch.apply_to(existing);
            existing.clone()
        }))
    }

    async fn delete_one(&self, id: StudentId) -> Result<u64, ServiceError> {
        let mut map = self.inner.write().await;
        Ok(u64::from(map.remove(&id).is_some()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::student::Address;

    fn student(name: &str) -> NewStudent {
        NewStudent {
            name: name.into(),
            age: 18,
            address: Address { city: "Lyon".into(), country: "France".into() },
        }
    }

    #[tokio::test]
    async fn memory_store_crud() -> Result<(), anyhow::Error> {
        let repo = MemoryStudentRepository::new();
        assert!(repo.is_empty().await);

        let a = repo.insert_one(student("a")).await?;
        let b = repo.insert_one(student("b")).await?;
        assert_ne!(a, b);
        assert_eq!(repo.len().await, 2);

        let found = repo.find_one(a).await?.unwrap();
        assert_eq!(found.id, a);
        assert_eq!(found.name, "a");

        let patch = StudentPatch { age: Some(40), ..Default::default() };
        let updated = repo.find_one_and_update(b, &patch).await?.unwrap();
        assert_eq!(updated.age, 40);
        assert_eq!(updated.name, "b");

        assert_eq!(repo.delete_one(a).await?, 1);
        assert_eq!(repo.delete_one(a).await?, 0);
        assert!(repo.find_one(a).await?.is_none());
        assert!(repo.find_one_and_update(a, &patch).await?.is_none());
        assert_eq!(repo.len().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn find_many_keeps_insertion_order_and_cap() -> Result<(), anyhow::Error> {
        let repo = MemoryStudentRepository::new();
        for n in ["first", "second", "third"] {
            repo.insert_one(student(n)).await?;
        }
        let names: Vec<_> = repo.find_many(1000).await?.into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
        assert_eq!(repo.find_many(2).await?.len(), 2);
        assert!(repo.find_many(0).await?.is_empty());
        Ok(())
    }
}
