use crate::models::DbStudent;
use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};

pub async fn get_students_by_numbers(
    pool: &Pool<Postgres>,
    student_numbers: &[String],
) -> Result<Vec<DbStudent>> {
    let students = sqlx::query_as::<_, DbStudent>(
        r#"
        SELECT id, student_number, name, class, topic, created_at
        FROM students
        WHERE student_number = ANY($1)
        "#,
    )
    .bind(student_numbers)
    .fetch_all(pool)
    .await?;

    Ok(students)
}

/// Business identity is the student number; the generated id never changes.
pub async fn upsert_student(
    pool: &Pool<Postgres>,
    student_number: &str,
    name: &str,
    class: &str,
    topic: &str,
) -> Result<DbStudent> {
    let now = Utc::now();

    let student = sqlx::query_as::<_, DbStudent>(
        r#"
        INSERT INTO students (student_number, name, class, topic, created_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (student_number)
        DO UPDATE SET name = EXCLUDED.name, class = EXCLUDED.class, topic = EXCLUDED.topic
        RETURNING id, student_number, name, class, topic, created_at
        "#,
    )
    .bind(student_number)
    .bind(name)
    .bind(class)
    .bind(topic)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(student)
}
