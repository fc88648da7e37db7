//! Shared fixtures for unit tests.

use crate::index::EnvironmentIndex;
use crate::types::RawMetadata;

/// A three-schema snapshot: a university schema, a small HR schema and a
/// sales schema whose `order` table collides with nothing else.
pub fn sample_metadata() -> RawMetadata {
    let mut raw = RawMetadata::default()
        .with_table(
            "public",
            "student",
            ["id", "first_name", "last_name", "email", "enrollment_date"],
        )
        .with_table("public", "course", ["id", "title", "credits", "instructor_id"])
        .with_table("public", "enrollment", ["id", "student_id", "course_id", "grade"])
        .with_table("public", "instructor", ["id", "name", "department", "email"])
        .with_table("hr", "employee", ["id", "name", "salary", "department_id"])
        .with_table("hr", "department", ["id", "name", "location"])
        .with_table("sales", "customer", ["id", "name", "email", "phone"])
        .with_table("sales", "order", ["id", "customer_id", "order_date", "total"])
        .with_table("sales", "order_item", ["id", "order_id", "product_name", "quantity"]);
    raw.exported_at = Some("2024-01-01T00:00:00".to_string());
    raw
}

pub fn sample_index() -> EnvironmentIndex {
    EnvironmentIndex::build("dev", &sample_metadata())
}
