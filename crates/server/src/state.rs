use std::sync::Arc;

use service::student::service::StudentService;

#[derive(Clone)]
pub struct AppState {
    pub students: Arc<StudentService>,
}
