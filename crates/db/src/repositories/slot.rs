use crate::models::DbSlot;
use chrono::{NaiveDate, Utc};
use eyre::Result;
use sectorplan_core::models::slot::SlotQuery;
use sqlx::{Pool, Postgres, QueryBuilder};

const SLOT_COLUMNS: &str =
    "id, date, time, teacher, available, student_number, present, notes, completed, created_at";

pub async fn list_slots(pool: &Pool<Postgres>, query: &SlotQuery) -> Result<Vec<DbSlot>> {
    let mut builder = QueryBuilder::<Postgres>::new(format!(
        "SELECT {SLOT_COLUMNS} FROM slots WHERE TRUE"
    ));

    if let Some(teacher) = query.teacher {
        builder.push(" AND teacher = ").push_bind(teacher.as_str());
    }
    if let Some(date) = query.date {
        builder.push(" AND date = ").push_bind(date);
    }
    if let Some(available) = query.available {
        builder.push(" AND available = ").push_bind(available);
    }
    if let Some(booked) = query.booked {
        builder.push(if booked {
            " AND student_number IS NOT NULL"
        } else {
            " AND student_number IS NULL"
        });
    }
    if let Some(student_number) = &query.student_number {
        builder
            .push(" AND student_number = ")
            .push_bind(student_number.as_str().to_string());
    }
    if let Some(completed) = query.completed {
        builder.push(" AND completed = ").push_bind(completed);
    }
    builder.push(" ORDER BY date ASC, time ASC, id ASC");

    let slots = builder.build_query_as::<DbSlot>().fetch_all(pool).await?;

    Ok(slots)
}

pub async fn get_slot_by_id(pool: &Pool<Postgres>, id: i64) -> Result<Option<DbSlot>> {
    let slot = sqlx::query_as::<_, DbSlot>(&format!(
        "SELECT {SLOT_COLUMNS} FROM slots WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(slot)
}

pub async fn get_slot_by_key(
    pool: &Pool<Postgres>,
    date: NaiveDate,
    time: &str,
    teacher: &str,
) -> Result<Option<DbSlot>> {
    let slot = sqlx::query_as::<_, DbSlot>(&format!(
        "SELECT {SLOT_COLUMNS} FROM slots WHERE date = $1 AND time = $2 AND teacher = $3"
    ))
    .bind(date)
    .bind(time)
    .bind(teacher)
    .fetch_optional(pool)
    .await?;

    Ok(slot)
}

pub async fn create_slot(
    pool: &Pool<Postgres>,
    date: NaiveDate,
    time: &str,
    teacher: &str,
    available: bool,
) -> Result<DbSlot> {
    let now = Utc::now();

    let slot = sqlx::query_as::<_, DbSlot>(&format!(
        r#"
        INSERT INTO slots (date, time, teacher, available, student_number, present, notes, completed, created_at)
        VALUES ($1, $2, $3, $4, NULL, FALSE, NULL, FALSE, $5)
        RETURNING {SLOT_COLUMNS}
        "#
    ))
    .bind(date)
    .bind(time)
    .bind(teacher)
    .bind(available)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(slot)
}

/// Applies only while the slot is unbooked and still has `expected` availability.
pub async fn set_slot_availability(
    pool: &Pool<Postgres>,
    id: i64,
    expected: bool,
    available: bool,
) -> Result<Option<DbSlot>> {
    let slot = sqlx::query_as::<_, DbSlot>(&format!(
        r#"
        UPDATE slots
        SET available = $3
        WHERE id = $1 AND available = $2 AND student_number IS NULL
        RETURNING {SLOT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(expected)
    .bind(available)
    .fetch_optional(pool)
    .await?;

    Ok(slot)
}

/// Applies only while the slot is open and unbooked.
pub async fn assign_student(
    pool: &Pool<Postgres>,
    id: i64,
    student_number: &str,
) -> Result<Option<DbSlot>> {
    let slot = sqlx::query_as::<_, DbSlot>(&format!(
        r#"
        UPDATE slots
        SET student_number = $2, available = FALSE, present = FALSE, completed = FALSE
        WHERE id = $1 AND available AND student_number IS NULL
        RETURNING {SLOT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(student_number)
    .fetch_optional(pool)
    .await?;

    Ok(slot)
}

pub async fn update_outcome(
    pool: &Pool<Postgres>,
    id: i64,
    present: bool,
    notes: Option<&str>,
    completed: bool,
) -> Result<Option<DbSlot>> {
    let slot = sqlx::query_as::<_, DbSlot>(&format!(
        r#"
        UPDATE slots
        SET present = $2, notes = $3, completed = $4
        WHERE id = $1
        RETURNING {SLOT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(present)
    .bind(notes)
    .bind(completed)
    .fetch_optional(pool)
    .await?;

    Ok(slot)
}

pub async fn delete_unbooked_slot(pool: &Pool<Postgres>, id: i64) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM slots
        WHERE id = $1 AND student_number IS NULL
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
