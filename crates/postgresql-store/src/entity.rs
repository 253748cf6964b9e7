//! Row mapping for the relational entities.

use seed_core::{Course, Enrollment, Instructor, Student};
use tokio_postgres::types::ToSql;
use tokio_postgres::Row;

/// A relational entity stored in one table.
///
/// `COLUMNS` excludes the `id` column; [`params`](PgEntity::params) yields
/// one value per column in the same order.
pub trait PgEntity: Sized + Send + Sync + 'static {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];

    fn params(&self) -> Vec<&(dyn ToSql + Sync)>;

    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error>;
}

impl PgEntity for Student {
    const TABLE: &'static str = "students";
    const COLUMNS: &'static [&'static str] = &[
        "first_name",
        "last_name",
        "email",
        "date_of_birth",
        "phone_number",
        "address",
        "registration_date",
    ];

    fn params(&self) -> Vec<&(dyn ToSql + Sync)> {
        vec![
            &self.first_name as &(dyn ToSql + Sync),
            &self.last_name,
            &self.email,
            &self.date_of_birth,
            &self.phone_number,
            &self.address,
            &self.registration_date,
        ]
    }

    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Student {
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            email: row.try_get("email")?,
            date_of_birth: row.try_get("date_of_birth")?,
            phone_number: row.try_get("phone_number")?,
            address: row.try_get("address")?,
            registration_date: row.try_get("registration_date")?,
        })
    }
}

impl PgEntity for Instructor {
    const TABLE: &'static str = "instructors";
    const COLUMNS: &'static [&'static str] = &[
        "first_name",
        "last_name",
        "email",
        "department",
        "phone_number",
        "office_location",
        "hire_date",
        "biography",
    ];

    fn params(&self) -> Vec<&(dyn ToSql + Sync)> {
        vec![
            &self.first_name as &(dyn ToSql + Sync),
            &self.last_name,
            &self.email,
            &self.department,
            &self.phone_number,
            &self.office_location,
            &self.hire_date,
            &self.biography,
        ]
    }

    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Instructor {
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            email: row.try_get("email")?,
            department: row.try_get("department")?,
            phone_number: row.try_get("phone_number")?,
            office_location: row.try_get("office_location")?,
            hire_date: row.try_get("hire_date")?,
            biography: row.try_get("biography")?,
        })
    }
}

impl PgEntity for Course {
    const TABLE: &'static str = "courses";
    const COLUMNS: &'static [&'static str] = &["name", "description", "instructor_id"];

    fn params(&self) -> Vec<&(dyn ToSql + Sync)> {
        vec![
            &self.name as &(dyn ToSql + Sync),
            &self.description,
            &self.instructor_id,
        ]
    }

    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Course {
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            instructor_id: row.try_get("instructor_id")?,
        })
    }
}

impl PgEntity for Enrollment {
    const TABLE: &'static str = "enrollments";
    const COLUMNS: &'static [&'static str] = &["student_id", "course_id", "grade"];

    fn params(&self) -> Vec<&(dyn ToSql + Sync)> {
        vec![
            &self.student_id as &(dyn ToSql + Sync),
            &self.course_id,
            &self.grade,
        ]
    }

    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Enrollment {
            student_id: row.try_get("student_id")?,
            course_id: row.try_get("course_id")?,
            grade: row.try_get("grade")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn assert_params_match_columns<T: PgEntity>(entity: &T) {
        assert_eq!(entity.params().len(), T::COLUMNS.len(), "{}", T::TABLE);
        assert!(!T::COLUMNS.contains(&"id"));
    }

    #[test]
    fn test_params_cover_every_column() {
        let date = NaiveDate::from_ymd_opt(2001, 5, 20).unwrap();
        assert_params_match_columns(&Student {
            first_name: "Ava4".to_string(),
            last_name: "Davis".to_string(),
            email: "student4@university.edu".to_string(),
            date_of_birth: date,
            phone_number: None,
            address: None,
            registration_date: date,
        });
        assert_params_match_columns(&Instructor {
            first_name: "Lisa".to_string(),
            last_name: "Clark2".to_string(),
            email: "instructor2@university.edu".to_string(),
            department: "History".to_string(),
            phone_number: None,
            office_location: None,
            hire_date: date,
            biography: None,
        });
        assert_params_match_columns(&Course {
            name: "Modern AI 1".to_string(),
            description: "Course code: HI-1000".to_string(),
            instructor_id: 1,
        });
        assert_params_match_columns(&Enrollment {
            student_id: 1,
            course_id: 1,
            grade: Some(55.0),
        });
    }
}
