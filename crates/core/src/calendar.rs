//! iCalendar (RFC 5545) export of a booked appointment, so a student can add
//! the presentation to their own calendar.

use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

use crate::errors::{BookingError, BookingResult};
use crate::models::slot::{Slot, SlotTime};

pub const PRODUCT_ID: &str = "-//Sectorwerkstuk//Planning//NL";
pub const UID_DOMAIN: &str = "sectorwerkstuk.nl";

/// RFC 5545 content lines must not exceed 75 octets.
const MAX_LINE_OCTETS: usize = 75;

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarSettings {
    /// Zone the slot's wall-clock date and time are expressed in.
    pub timezone: Tz,
    pub title: String,
    pub description: String,
    pub location: String,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::Europe::Amsterdam,
            title: "Presentatie Sectorwerkstuk".to_string(),
            description: "Presentatie van je sectorwerkstuk.".to_string(),
            location: "School".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub uid: String,
    pub stamp: DateTime<Utc>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub summary: String,
    pub description: String,
    pub location: String,
}

impl CalendarEvent {
    pub fn for_slot(
        slot: &Slot,
        settings: &CalendarSettings,
        stamp: DateTime<Utc>,
    ) -> BookingResult<Self> {
        let local = slot.date.and_time(slot.time.to_naive_time());
        let start = settings
            .timezone
            .from_local_datetime(&local)
            .earliest()
            .ok_or_else(|| {
                BookingError::InvalidArgument(format!(
                    "{} {} bestaat niet in tijdzone {}",
                    slot.date,
                    slot.time,
                    settings.timezone.name()
                ))
            })?
            .with_timezone(&Utc);

        Ok(Self {
            uid: format!("{}@{UID_DOMAIN}", Uuid::new_v4()),
            stamp,
            start,
            end: start + Duration::minutes(i64::from(SlotTime::GRANULARITY_MINUTES)),
            summary: settings.title.clone(),
            description: settings.description.clone(),
            location: settings.location.clone(),
        })
    }

    pub fn to_ics(&self) -> String {
        let lines = [
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            format!("PRODID:{PRODUCT_ID}"),
            "CALSCALE:GREGORIAN".to_string(),
            "METHOD:PUBLISH".to_string(),
            "BEGIN:VEVENT".to_string(),
            format!("UID:{}", self.uid),
            format!("DTSTAMP:{}", format_utc(&self.stamp)),
            format!("DTSTART:{}", format_utc(&self.start)),
            format!("DTEND:{}", format_utc(&self.end)),
            format!("SUMMARY:{}", escape_text(&self.summary)),
            format!("DESCRIPTION:{}", escape_text(&self.description)),
            format!("LOCATION:{}", escape_text(&self.location)),
            "STATUS:CONFIRMED".to_string(),
            "END:VEVENT".to_string(),
            "END:VCALENDAR".to_string(),
        ];

        let mut ics = String::new();
        for line in &lines {
            ics.push_str(&fold_line(line));
            ics.push_str("\r\n");
        }
        ics
    }
}

fn format_utc(value: &DateTime<Utc>) -> String {
    value.format("%Y%m%dT%H%M%SZ").to_string()
}

fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            other => escaped.push(other),
        }
    }
    escaped
}

/// Splits a content line into 75-octet pieces joined by CRLF + space,
/// never cutting through a multi-byte character.
fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }

    let mut folded = String::with_capacity(line.len() + line.len() / MAX_LINE_OCTETS * 3);
    let mut used = 0;
    for c in line.chars() {
        // Continuation lines start with a space that counts toward the limit.
        if used + c.len_utf8() > MAX_LINE_OCTETS {
            folded.push_str("\r\n ");
            used = 1;
        }
        folded.push(c);
        used += c.len_utf8();
    }
    folded
}
