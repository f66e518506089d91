//! Service layer for the student records API.
//! - `student::repository` is the store adapter (MongoDB driver).
//! - `storage::memory` is a process-local store for development and tests.
//! - `student::service` holds the business rules on top of either store.

pub mod errors;
pub mod storage;
pub mod student;
