use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::ReturnDocument,
    Client, Collection,
};
use serde::{Deserialize, Serialize};

use models::student::{Address, NewStudent, Student, StudentId, StudentPatch};

use crate::errors::ServiceError;

/// Persistence primitives the service needs from a document store.
///
/// Consistency (single-document atomicity, isolation between writers) is
/// whatever the backing store gives; implementations add no locking on top.
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Persist a new record and return the store-assigned id.
    async fn insert_one(&self, input: NewStudent) -> Result<StudentId, ServiceError>;
    async fn find_one(&self, id: StudentId) -> Result<Option<Student>, ServiceError>;
    /// Up to `cap` records in store-native order.
    async fn find_many(&self, cap: i64) -> Result<Vec<Student>, ServiceError>;
    /// Apply the sparse patch; `None` when no record has this id.
    async fn find_one_and_update(&self, id: StudentId, patch: &StudentPatch) -> Result<Option<Student>, ServiceError>;
    /// Number of removed records (0 or 1).
    async fn delete_one(&self, id: StudentId) -> Result<u64, ServiceError>;
    /// Release connections; called once at shutdown.
    async fn close(&self) {}
}

/// Stored document shape. `_id` never leaves this module.
#[derive(Debug, Serialize, Deserialize)]
struct StudentDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    name: String,
    age: i64,
    address: Address,
}

impl From<NewStudent> for StudentDocument {
    fn from(s: NewStudent) -> Self {
        Self { id: None, name: s.name, age: s.age, address: s.address }
    }
}

impl TryFrom<StudentDocument> for Student {
    type Error = ServiceError;

    fn try_from(d: StudentDocument) -> Result<Self, Self::Error> {
        let id = d.id.ok_or_else(|| ServiceError::Store("document without _id".into()))?;
        Ok(Student { id: id.into(), name: d.name, age: d.age, address: d.address })
    }
}

fn by_id(id: StudentId) -> Document {
    doc! { "_id": id.object_id() }
}

/// `$set` body holding only the fields present in the patch.
fn set_document(patch: &StudentPatch) -> Result<Document, ServiceError> {
    let mut set = Document::new();
    if let Some(name) = &patch.name {
        set.insert("name", name.as_str());
    }
    if let Some(age) = patch.age {
        set.insert("age", age);
    }
    if let Some(address) = &patch.address {
        let address = mongodb::bson::to_document(address).map_err(|e| ServiceError::Store(e.to_string()))?;
        set.insert("address", address);
    }
    Ok(set)
}

/// MongoDB-backed repository implementation.
pub struct MongoStudentRepository {
    client: Client,
    collection: Collection<StudentDocument>,
}

impl MongoStudentRepository {
    pub fn new(client: Client, database: &str, collection: &str) -> Self {
        let collection = client.database(database).collection::<StudentDocument>(collection);
        Self { client, collection }
    }

    pub async fn connect(cfg: &configs::DatabaseConfig) -> anyhow::Result<Self> {
        let client = models::db::connect_with_config(cfg).await?;
        Ok(Self::new(client, &cfg.name, &cfg.collection))
    }
}

#[async_trait]
impl StudentRepository for MongoStudentRepository {
    async fn insert_one(&self, input: NewStudent) -> Result<StudentId, ServiceError> {
        let res = self.collection.insert_one(StudentDocument::from(input)).await?;
        res.inserted_id
            .as_object_id()
            .map(StudentId::from)
            .ok_or_else(|| ServiceError::Store(format!("unexpected inserted id {}", res.inserted_id)))
    }

    async fn find_one(&self, id: StudentId) -> Result<Option<Student>, ServiceError> {
        self.collection.find_one(by_id(id)).await?.map(Student::try_from).transpose()
    }

    async fn find_many(&self, cap: i64) -> Result<Vec<Student>, ServiceError> {
        let docs: Vec<StudentDocument> = self.collection.find(doc! {}).limit(cap).await?.try_collect().await?;
        docs.into_iter().map(Student::try_from).collect()
    }

    async fn find_one_and_update(&self, id: StudentId, patch: &StudentPatch) -> Result<Option<Student>, ServiceError> {
        let update = doc! { "$set": set_document(patch)? };
        self.collection
            .find_one_and_update(by_id(id), update)
            .return_document(ReturnDocument::After)
            .await?
            .map(Student::try_from)
            .transpose()
    }

    async fn delete_one(&self, id: StudentId) -> Result<u64, ServiceError> {
        Ok(self.collection.delete_one(by_id(id)).await?.deleted_count)
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_document_contains_only_present_fields() {
        let patch = StudentPatch { age: Some(30), ..Default::default() };
        let set = set_document(&patch).unwrap();
        assert_eq!(set, doc! { "age": 30_i64 });

        let patch = StudentPatch {
            name: Some("Ada".into()),
            address: Some(Address { city: "Pune".into(), country: "India".into() }),
            ..Default::default()
        };
        let set = set_document(&patch).unwrap();
        assert_eq!(set, doc! { "name": "Ada", "address": { "city": "Pune", "country": "India" } });
    }

    #[test]
    fn new_document_has_no_id_field() {
        let d = StudentDocument::from(NewStudent {
            name: "Ada".into(),
            age: 36,
            address: Address { city: "London".into(), country: "UK".into() },
        });
        let raw = mongodb::bson::to_document(&d).unwrap();
        assert!(!raw.contains_key("_id"));
        assert!(!raw.contains_key("id"));
    }

    #[test]
    fn document_without_id_is_a_store_error() {
        let d = StudentDocument {
            id: None,
            name: "Ada".into(),
            age: 1,
            address: Address { city: "a".into(), country: "b".into() },
        };
        assert!(matches!(Student::try_from(d), Err(ServiceError::Store(_))));
    }

    // 需要真实 MongoDB：设置 MONGODB_TEST_URL 才会执行
    #[tokio::test]
    async fn mongo_repository_crud() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let url = match std::env::var("MONGODB_TEST_URL") {
            Ok(u) => u,
            Err(_) => return Ok(()),
        };
        let cfg = configs::DatabaseConfig {
            url,
            collection: format!("students_test_{}", ObjectId::new().to_hex()),
            ..Default::default()
        };
        let repo = match MongoStudentRepository::connect(&cfg).await {
            Ok(r) => r,
            Err(e) => {
                eprintln!("skip: cannot connect to mongodb: {}", e);
                return Ok(());
            }
        };

        let id = repo
            .insert_one(NewStudent {
                name: "Jane Doe".into(),
                age: 20,
                address: Address { city: "Mumbai".into(), country: "India".into() },
            })
            .await?;
        let found = repo.find_one(id).await?.expect("inserted record");
        assert_eq!(found.name, "Jane Doe");

        let patch = StudentPatch { age: Some(21), ..Default::default() };
        let updated = repo.find_one_and_update(id, &patch).await?.expect("updated");
        assert_eq!(updated.age, 21);
        assert_eq!(updated.address.city, "Mumbai");

        assert_eq!(repo.find_many(1000).await?.len(), 1);
        assert_eq!(repo.delete_one(id).await?, 1);
        assert_eq!(repo.delete_one(id).await?, 0);
        assert!(repo.find_one(id).await?.is_none());

        repo.collection.drop().await?;
        repo.close().await;
        Ok(())
    }
}
