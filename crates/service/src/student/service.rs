use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use models::student::{NewStudent, Student, StudentId, UpdateStudent, Validate};

use crate::errors::ServiceError;
use crate::student::filter::StudentFilter;
use crate::student::repository::StudentRepository;

/// Application service encapsulating the student business rules.
/// Validation happens here before any store round trip.
pub struct StudentService {
    repo: Arc<dyn StudentRepository>,
    list_cap: i64,
}

fn parse_id(raw: &str) -> Result<StudentId, ServiceError> {
    StudentId::parse(raw).map_err(|_| {
        debug!(id = %raw, "malformed student id");
        ServiceError::MalformedId(raw.to_string())
    })
}

impl StudentService {
    pub fn new(repo: Arc<dyn StudentRepository>, list_cap: i64) -> Self {
        Self { repo, list_cap }
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: NewStudent) -> Result<StudentId, ServiceError> {
        input.validate()?;
        let id = self.repo.insert_one(input).await?;
        info!(%id, "student created");
        Ok(id)
    }

    /// Fetch at most `list_cap` records, then filter in process. Matches past
    /// the cap are not seen.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: StudentFilter) -> Result<Vec<Student>, ServiceError> {
        let fetched = self.repo.find_many(self.list_cap).await?;
        if fetched.len() as i64 >= self.list_cap && !filter.is_empty() {
            warn!(cap = self.list_cap, "list hit the retrieval cap; filtered result may be incomplete");
        }
        let students = filter.apply(fetched);
        debug!(count = students.len(), "students listed");
        Ok(students)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, raw_id: &str) -> Result<Student, ServiceError> {
        let id = parse_id(raw_id)?;
        self.repo.find_one(id).await?.ok_or_else(|| ServiceError::not_found(raw_id))
    }

    /// Fetch, merge, then write. The sequence is not atomic: two concurrent
    /// partial updates of one id can lose one of the writes.
    #[instrument(skip(self, input))]
    pub async fn update(&self, raw_id: &str, input: UpdateStudent) -> Result<(), ServiceError> {
        let id = parse_id(raw_id)?;
        input.validate()?;

        let current = self.repo.find_one(id).await?.ok_or_else(|| ServiceError::not_found(raw_id))?;
        let patch = input.into_patch(&current);
        if patch.is_empty() {
            debug!(%id, "empty update, nothing to write");
            return Ok(());
        }

        match self.repo.find_one_and_update(id, &patch).await? {
            Some(_) => {
                info!(%id, "student updated");
                Ok(())
            }
            None => Err(ServiceError::not_found(raw_id)),
        }
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, raw_id: &str) -> Result<(), ServiceError> {
        let id = parse_id(raw_id)?;
        match self.repo.delete_one(id).await? {
            1 => {
                info!(%id, "student deleted");
                Ok(())
            }
            _ => Err(ServiceError::not_found(raw_id)),
        }
    }

    pub async fn close(&self) {
        self.repo.close().await;
    }
}
