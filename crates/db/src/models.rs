use chrono::{DateTime, NaiveDate, Utc};
use eyre::{Report, Result};
use sectorplan_core::models::{slot::Slot, student::Student};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSlot {
    pub id: i64,
    pub date: NaiveDate,
    pub time: String,
    pub teacher: String,
    pub available: bool,
    pub student_number: Option<String>,
    pub present: bool,
    pub notes: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbStudent {
    pub id: i64,
    pub student_number: String,
    pub name: String,
    pub class: String,
    pub topic: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbSlot> for Slot {
    type Error = Report;

    fn try_from(row: DbSlot) -> Result<Self> {
        Ok(Slot {
            id: row.id,
            date: row.date,
            time: row
                .time
                .parse()
                .map_err(|e| eyre::eyre!("slot {} has malformed time: {e}", row.id))?,
            teacher: row
                .teacher
                .parse()
                .map_err(|e| eyre::eyre!("slot {} has malformed teacher: {e}", row.id))?,
            available: row.available,
            student_number: row
                .student_number
                .map(|number| number.parse())
                .transpose()
                .map_err(|e| eyre::eyre!("slot {} has malformed student number: {e}", row.id))?,
            present: row.present,
            notes: row.notes,
            completed: row.completed,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<DbStudent> for Student {
    type Error = Report;

    fn try_from(row: DbStudent) -> Result<Self> {
        Ok(Student {
            id: row.id,
            student_number: row
                .student_number
                .parse()
                .map_err(|e| eyre::eyre!("student {} has malformed number: {e}", row.id))?,
            name: row.name,
            class: row
                .class
                .parse()
                .map_err(|e| eyre::eyre!("student {} has malformed class: {e}", row.id))?,
            topic: row.topic,
            created_at: row.created_at,
        })
    }
}
