use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct AddressDoc {
    pub city: String,
    pub country: String,
}

#[derive(ToSchema)]
#[schema(example = json!({"name": "Jane Doe", "age": 20, "address": {"city": "Mumbai", "country": "India"}}))]
pub struct NewStudentDoc {
    pub name: String,
    #[schema(minimum = 0)]
    pub age: i64,
    pub address: AddressDoc,
}

#[derive(ToSchema)]
pub struct UpdateAddressDoc {
    pub city: Option<String>,
    pub country: Option<String>,
}

#[derive(ToSchema)]
#[schema(example = json!({"name": "Jane Doe", "age": 20, "address": {"city": "Mumbai", "country": "India"}}))]
pub struct UpdateStudentDoc {
    pub name: Option<String>,
    #[schema(minimum = 0)]
    pub age: Option<i64>,
    pub address: Option<UpdateAddressDoc>,
}

#[derive(ToSchema)]
pub struct StudentDoc {
    pub id: String,
    pub name: String,
    pub age: i64,
    pub address: AddressDoc,
}

#[derive(ToSchema)]
pub struct StudentCollectionDoc { pub data: Vec<StudentDoc> }

#[derive(ToSchema)]
pub struct CreatedIdDoc { pub id: String }

#[derive(ToSchema)]
pub struct FieldErrorDoc {
    pub field: String,
    pub reason: String,
}

#[derive(ToSchema)]
pub struct ErrorDoc {
    pub error: String,
    pub message: Option<String>,
    pub fields: Option<Vec<FieldErrorDoc>>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::students::create,
        crate::routes::students::list,
        crate::routes::students::get,
        crate::routes::students::update,
        crate::routes::students::delete,
    ),
    components(
        schemas(
            HealthResponse,
            AddressDoc,
            NewStudentDoc,
            UpdateAddressDoc,
            UpdateStudentDoc,
            StudentDoc,
            StudentCollectionDoc,
            CreatedIdDoc,
            FieldErrorDoc,
            ErrorDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "students")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_student_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/students"));
        assert!(paths.iter().any(|p| p.as_str() == "/students/{id}"));
        assert!(paths.iter().any(|p| p.as_str() == "/health"));
    }
}
