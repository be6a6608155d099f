use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create students table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS students (
            id BIGSERIAL PRIMARY KEY,
            student_number VARCHAR(8) NOT NULL UNIQUE,
            name VARCHAR(255) NOT NULL,
            class VARCHAR(16) NOT NULL,
            topic VARCHAR(100) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create slots table; a booked slot can never be available
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS slots (
            id BIGSERIAL PRIMARY KEY,
            date DATE NOT NULL,
            time VARCHAR(5) NOT NULL,
            teacher VARCHAR(16) NOT NULL,
            available BOOLEAN NOT NULL DEFAULT TRUE,
            student_number VARCHAR(8) NULL,
            present BOOLEAN NOT NULL DEFAULT FALSE,
            notes TEXT NULL,
            completed BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT slots_natural_key UNIQUE (date, time, teacher),
            CONSTRAINT booked_slot_unavailable CHECK (student_number IS NULL OR NOT available)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    for statement in [
        "CREATE INDEX IF NOT EXISTS idx_slots_teacher_available ON slots(teacher, available)",
        "CREATE INDEX IF NOT EXISTS idx_slots_student_number ON slots(student_number)",
    ] {
        sqlx::query(statement).execute(pool).await?;
    }

    // Read view for appointment listings outside the service
    sqlx::query(
        r#"
        CREATE OR REPLACE VIEW slots_with_students AS
        SELECT s.id, s.date, s.time, s.teacher, s.available, s.student_number,
               s.present, s.notes, s.completed, s.created_at,
               st.name AS student_name, st.class AS student_class, st.topic AS student_topic
        FROM slots s
        LEFT JOIN students st ON st.student_number = s.student_number;
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema initialized successfully.");
    Ok(())
}
