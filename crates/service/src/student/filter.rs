use models::student::Student;

/// In-process list filter applied after the capped retrieval.
///
/// `country` is an exact, case-sensitive match on `address.country`;
/// `min_age` is a floor (`age >= min_age`). Both present means AND.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StudentFilter {
    pub country: Option<String>,
    pub min_age: Option<i64>,
}

impl StudentFilter {
    pub fn is_empty(&self) -> bool {
        self.country.is_none() && self.min_age.is_none()
    }

    pub fn matches(&self, student: &Student) -> bool {
        let country_ok = self.country.as_deref().map_or(true, |c| student.address.country == c);
        let age_ok = self.min_age.map_or(true, |floor| student.age >= floor);
        country_ok && age_ok
    }

    pub fn apply(&self, students: Vec<Student>) -> Vec<Student> {
        if self.is_empty() {
            return students;
        }
        students.into_iter().filter(|s| self.matches(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::student::{Address, NewStudent, StudentId};

    fn s(name: &str, age: i64, country: &str) -> Student {
        NewStudent {
            name: name.into(),
            age,
            address: Address { city: "x".into(), country: country.into() },
        }
        .into_student(StudentId::generate())
    }

    fn names(v: Vec<Student>) -> Vec<String> {
        v.into_iter().map(|s| s.name).collect()
    }

    fn sample() -> Vec<Student> {
        vec![s("a", 19, "India"), s("b", 20, "India"), s("c", 25, "Nepal"), s("d", 30, "india")]
    }

    #[test]
    fn no_filter_keeps_everything_in_order() {
        assert_eq!(names(StudentFilter::default().apply(sample())), ["a", "b", "c", "d"]);
    }

    #[test]
    fn age_is_a_floor() {
        let f = StudentFilter { min_age: Some(20), ..Default::default() };
        assert_eq!(names(f.apply(sample())), ["b", "c", "d"]);
    }

    #[test]
    fn country_is_exact_and_case_sensitive() {
        let f = StudentFilter { country: Some("India".into()), ..Default::default() };
        assert_eq!(names(f.apply(sample())), ["a", "b"]);
    }

    #[test]
    fn both_filters_are_anded() {
        let f = StudentFilter { country: Some("India".into()), min_age: Some(20) };
        assert_eq!(names(f.apply(sample())), ["b"]);
    }
}
