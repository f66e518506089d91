//! Student entity and its payload shapes.
//!
//! - `Student`: a stored record, always carrying an id.
//! - `NewStudent`: create payload; any `id` sent by the client is ignored.
//! - `UpdateStudent`: partial update payload; every field optional.
//! - `StudentPatch`: the sparse set of fields actually written by an update.

use std::{fmt, str::FromStr};

use mongodb::bson::oid::ObjectId;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{FieldError, ModelError};

/// Store-assigned identifier. On the wire it is the 24 char hex form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StudentId(ObjectId);

impl StudentId {
    /// Fresh id; the in-memory store uses this to mimic store assignment.
    pub fn generate() -> Self {
        Self(ObjectId::new())
    }

    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        ObjectId::parse_str(raw)
            .map(Self)
            .map_err(|_| ModelError::InvalidId(raw.to_string()))
    }

    pub fn object_id(&self) -> ObjectId {
        self.0
    }
}

impl From<ObjectId> for StudentId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

impl FromStr for StudentId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for StudentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_hex())
    }
}

impl<'de> Deserialize<'de> for StudentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(de::Error::custom)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub city: String,
    pub country: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub age: i64,
    pub address: Address,
}

/// Create payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub age: i64,
    pub address: Address,
}

impl NewStudent {
    pub fn into_student(self, id: StudentId) -> Student {
        Student { id, name: self.name, age: self.age, address: self.address }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateAddress {
    pub city: Option<String>,
    pub country: Option<String>,
}

impl UpdateAddress {
    pub fn is_empty(&self) -> bool {
        self.city.is_none() && self.country.is_none()
    }

    /// Field-level merge onto the stored address; never yields a half address.
    pub fn merge_onto(self, current: &Address) -> Address {
        Address {
            city: self.city.unwrap_or_else(|| current.city.clone()),
            country: self.country.unwrap_or_else(|| current.country.clone()),
        }
    }
}

/// Partial update payload. `null` and absent are both "leave unchanged".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateStudent {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub address: Option<UpdateAddress>,
}

impl UpdateStudent {
    /// Drop fields that carry no change (an address object with only nulls
    /// counts as absent).
    pub fn strip_empty(mut self) -> Self {
        if self.address.as_ref().is_some_and(UpdateAddress::is_empty) {
            self.address = None;
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.age.is_none()
            && self.address.as_ref().map_or(true, UpdateAddress::is_empty)
    }

    /// Resolve against the currently stored record.
    pub fn into_patch(self, current: &Student) -> StudentPatch {
        let this = self.strip_empty();
        StudentPatch {
            name: this.name,
            age: this.age,
            address: this.address.map(|a| a.merge_onto(&current.address)),
        }
    }
}

/// Sparse set of fields written by an update.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub address: Option<Address>,
}

impl StudentPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.age.is_none() && self.address.is_none()
    }

    pub fn apply_to(&self, student: &mut Student) {
        if let Some(name) = &self.name {
            student.name = name.clone();
        }
        if let Some(age) = self.age {
            student.age = age;
        }
        if let Some(address) = &self.address {
            student.address = address.clone();
        }
    }
}

/// Boundary validation run after deserialization and before any store call.
pub trait Validate {
    fn validate(&self) -> Result<(), ModelError>;
}

pub fn validate_name(name: &str) -> Result<(), FieldError> {
    if name.trim().is_empty() {
        return Err(FieldError::new("name", "must not be empty"));
    }
    Ok(())
}

pub fn validate_age(age: i64) -> Result<(), FieldError> {
    if age < 0 {
        return Err(FieldError::new("age", "must be greater than or equal to 0"));
    }
    Ok(())
}

fn collect(results: impl IntoIterator<Item = Result<(), FieldError>>) -> Result<(), ModelError> {
    let errors: Vec<FieldError> = results.into_iter().filter_map(Result::err).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ModelError::Validation(errors))
    }
}

impl Validate for NewStudent {
    fn validate(&self) -> Result<(), ModelError> {
        collect([validate_name(&self.name), validate_age(self.age)])
    }
}

impl Validate for UpdateStudent {
    fn validate(&self) -> Result<(), ModelError> {
        collect([
            self.name.as_deref().map_or(Ok(()), validate_name),
            self.age.map_or(Ok(()), validate_age),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn jane() -> Student {
        NewStudent {
            name: "Jane Doe".into(),
            age: 20,
            address: Address { city: "Mumbai".into(), country: "India".into() },
        }
        .into_student(StudentId::generate())
    }

    #[test]
    fn id_roundtrips_through_hex_text() {
        let id = StudentId::generate();
        let text = id.to_string();
        assert_eq!(text.len(), 24);
        assert_eq!(text.parse::<StudentId>().unwrap(), id);
        assert_eq!(serde_json::to_value(id).unwrap(), json!(text));
    }

    #[test]
    fn malformed_id_is_rejected() {
        let padded = format!(" {} ", StudentId::generate());
        assert!(matches!(StudentId::parse(&padded), Err(ModelError::InvalidId(_))));
        for raw in ["", "abc", "zzzzzzzzzzzzzzzzzzzzzzzz", "65f1c2d3e4a5b6c7d8e9f0a1ff"] {
            assert!(matches!(StudentId::parse(raw), Err(ModelError::InvalidId(_))), "{raw}");
        }
    }

    #[test]
    fn new_student_ignores_client_id_and_validates() {
        let input: NewStudent = serde_json::from_value(json!({
            "id": "not-used",
            "name": "Jane Doe",
            "age": 20,
            "address": {"city": "Mumbai", "country": "India"}
        }))
        .unwrap();
        assert!(input.validate().is_ok());
    }

    #[test]
    fn negative_age_and_blank_name_both_reported() {
        let input = NewStudent {
            name: "  ".into(),
            age: -1,
            address: Address { city: "Oslo".into(), country: "Norway".into() },
        };
        match input.validate() {
            Err(ModelError::Validation(fields)) => {
                let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
                assert_eq!(names, vec!["name", "age"]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn missing_address_field_fails_to_decode() {
        let res = serde_json::from_value::<NewStudent>(json!({
            "name": "Jane", "age": 3, "address": {"city": "Mumbai"}
        }));
        assert!(res.is_err());
    }

    #[test]
    fn update_nulls_are_absent() {
        let upd: UpdateStudent = serde_json::from_value(json!({
            "name": null, "age": null, "address": {"city": null, "country": null}
        }))
        .unwrap();
        assert!(upd.is_empty());
        assert_eq!(upd.strip_empty(), UpdateStudent::default());

        let upd: UpdateStudent = serde_json::from_value(json!({})).unwrap();
        assert!(upd.is_empty());
    }

    #[test]
    fn update_validation_only_checks_present_fields() {
        assert!(UpdateStudent::default().validate().is_ok());
        let bad = UpdateStudent { age: Some(-5), ..Default::default() };
        assert!(matches!(bad.validate(), Err(ModelError::Validation(_))));
        let bad = UpdateStudent { name: Some(String::new()), ..Default::default() };
        assert!(matches!(bad.validate(), Err(ModelError::Validation(_))));
    }

    #[test]
    fn patch_merges_address_field_by_field() {
        let current = jane();
        let upd = UpdateStudent {
            address: Some(UpdateAddress { city: Some("Pune".into()), country: None }),
            ..Default::default()
        };
        let patch = upd.into_patch(&current);
        assert_eq!(patch.name, None);
        assert_eq!(patch.age, None);
        assert_eq!(
            patch.address,
            Some(Address { city: "Pune".into(), country: "India".into() })
        );
    }

    #[test]
    fn patch_apply_only_touches_present_fields() {
        let mut s = jane();
        let before = s.clone();
        StudentPatch { name: Some("Janet".into()), ..Default::default() }.apply_to(&mut s);
        assert_eq!(s.name, "Janet");
        assert_eq!(s.age, before.age);
        assert_eq!(s.address, before.address);
        assert_eq!(s.id, before.id);
    }
}
