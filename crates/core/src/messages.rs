//! User-facing texts. The presentation layer shows these verbatim.

pub const BOOKED: &str = "Afspraak succesvol ingepland!";
pub const ACTIVE_BOOKING_EXISTS: &str =
    "Je hebt al een gepland gesprek. Wacht tot dit is afgerond.";
pub const SLOT_UNAVAILABLE: &str = "Dit tijdslot is niet (meer) beschikbaar.";
pub const PARTIAL_BOOKING: &str =
    "Je gegevens zijn opgeslagen, maar het tijdslot kon niet worden vastgelegd. Probeer het opnieuw.";

pub const SLOT_CREATED: &str = "Tijdslot aangemaakt en geopend.";
pub const BOOKED_SLOT_LOCKED: &str = "Kan een geboekt tijdslot niet wijzigen.";
pub const SLOT_CHANGED_CONCURRENTLY: &str =
    "Dit tijdslot is zojuist gewijzigd. Vernieuw de pagina en probeer het opnieuw.";

pub const APPOINTMENT_UPDATED: &str = "Afspraak bijgewerkt.";
pub const APPOINTMENT_NOT_FOUND: &str = "Afspraak niet gevonden.";
pub const SLOT_NOT_BOOKED: &str = "Voor dit tijdslot is geen afspraak gepland.";

pub const SLOT_DELETED: &str = "Tijdslot succesvol verwijderd.";
pub const SLOT_NOT_FOUND: &str = "Tijdslot niet gevonden.";
pub const BOOKED_SLOT_UNDELETABLE: &str = "Kan een geboekt tijdslot niet verwijderen.";

pub const GENERIC_FAILURE: &str = "Er is een fout opgetreden.";
pub const TIMEOUT: &str = "De planning reageert niet op tijd. Probeer het later opnieuw.";
pub const STORE_UNAVAILABLE: &str = "De planning is tijdelijk niet bereikbaar.";

pub fn slot_toggled(available: bool) -> String {
    format!(
        "Tijdslot is nu {}.",
        if available { "open" } else { "gesloten" }
    )
}

pub fn slots_found(count: usize) -> String {
    match count {
        1 => "1 tijdslot gevonden.".to_string(),
        n => format!("{n} tijdsloten gevonden."),
    }
}

pub fn appointments_found(count: usize) -> String {
    match count {
        1 => "1 afspraak gevonden.".to_string(),
        n => format!("{n} afspraken gevonden."),
    }
}
