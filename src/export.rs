use crate::calendar::{parse_date_parts, parse_time_parts};
use crate::error::CalResult;
use crate::models::StoredCalendarEvent;
use crate::store::{EventFilter, EventStore};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

/// Export all events of a class as iCalendar text.
///
/// Stamps the export bookkeeping on every exported event: events get an
/// ics_uid on first export and keep it on later ones, so re-exports
/// update rather than duplicate entries in the target calendar. The
/// actual push to a calendar provider is up to the caller.
pub async fn export_class_events<S: EventStore>(store: &S, class_id: &str) -> CalResult<String> {
    let events = store.list_events(&EventFilter::for_class(class_id)).await?;

    let now = Utc::now();
    let mut exported = Vec::with_capacity(events.len());
    for mut event in events {
        if event.ics_uid.is_none() {
            event.ics_uid = Some(Uuid::new_v4().to_string());
        }
        event.is_exported = true;
        event.exported_at = Some(now);
        exported.push(event);
    }

    let ics = render_ics(&exported);
    store.update_events(&exported).await?;

    info!("Exported {} event(s) for class {}", exported.len(), class_id);
    Ok(ics)
}

/// Render events as an iCalendar document.
///
/// Date-only events become all-day entries; events with a due time get a
/// floating local timestamp built from the stored parts, never from a
/// timezone conversion.
pub fn render_ics(events: &[StoredCalendarEvent]) -> String {
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "PRODID:-//coursecal//EN".to_string(),
    ];

    for event in events {
        let Some((year, month, day)) = parse_date_parts(&event.due_date) else {
            continue;
        };

        lines.push("BEGIN:VEVENT".to_string());

        let uid = event.ics_uid.as_deref().unwrap_or(event.id.as_str());
        lines.push(format!("UID:{}", uid));
        lines.push(format!(
            "DTSTAMP:{}",
            event.created_at.format("%Y%m%dT%H%M%SZ")
        ));

        match event.due_time.as_deref().and_then(parse_time_parts) {
            Some((hour, minute)) => lines.push(format!(
                "DTSTART:{:04}{:02}{:02}T{:02}{:02}00",
                year, month, day, hour, minute
            )),
            None => lines.push(format!(
                "DTSTART;VALUE=DATE:{:04}{:02}{:02}",
                year, month, day
            )),
        }

        lines.push(format!("SUMMARY:{}", escape_text(&event.title)));
        if let Some(description) = &event.description {
            lines.push(format!("DESCRIPTION:{}", escape_text(description)));
        }
        lines.push(format!("CATEGORIES:{}", event.event_type.to_uppercase()));
        lines.push("END:VEVENT".to_string());
    }

    lines.push("END:VCALENDAR".to_string());
    let mut out = lines.join("\r\n");
    out.push_str("\r\n");
    out
}

/// Escape text per RFC 5545
fn escape_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}
