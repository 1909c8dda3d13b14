use crate::models::StoredCalendarEvent;
use chrono::{Datelike, NaiveDate};

/// Parse a date string in YYYY-MM-DD format into its parts.
///
/// Splitting on the delimiter instead of constructing a full datetime
/// sidesteps timezone-shift bugs; the parts come back exactly as stored.
pub fn parse_date_parts(date_str: &str) -> Option<(i32, u32, u32)> {
    let parts: Vec<&str> = date_str.split('-').collect();
    if parts.len() != 3 {
        return None;
    }
    let year = parts[0].parse::<i32>().ok()?;
    let month = parts[1].parse::<u32>().ok()?;
    let day = parts[2].parse::<u32>().ok()?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    Some((year, month, day))
}

/// Parse a time string in HH:MM format
pub fn parse_time_parts(time_str: &str) -> Option<(u32, u32)> {
    let parts: Vec<&str> = time_str.split(':').collect();
    if parts.len() != 2 {
        return None;
    }
    let hour = parts[0].parse::<u32>().ok()?;
    let minute = parts[1].parse::<u32>().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

/// One cell of the month grid
#[derive(Debug, Clone, Default)]
pub struct DayCell {
    /// Day of month, or None for a leading/trailing blank cell
    pub day: Option<u32>,
    /// Events due on this day
    pub events: Vec<StoredCalendarEvent>,
}

/// A month of day cells, six weeks of seven days, Sunday first
#[derive(Debug, Clone)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub cells: Vec<DayCell>,
}

impl MonthGrid {
    /// The grid rows, one per week
    pub fn weeks(&self) -> impl Iterator<Item = &[DayCell]> {
        self.cells.chunks(7)
    }
}

/// Build the month grid for a flat event list.
///
/// Events are bucketed per day by their stored date string; events from
/// other months are ignored. Returns None for an invalid year/month.
pub fn month_grid(year: i32, month: u32, events: &[StoredCalendarEvent]) -> Option<MonthGrid> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let leading_blanks = first.weekday().num_days_from_sunday() as usize;
    let days_in_month = days_in_month(year, month)?;

    let mut cells: Vec<DayCell> = Vec::with_capacity(42);
    cells.resize_with(leading_blanks, DayCell::default);

    for day in 1..=days_in_month {
        let day_events = events
            .iter()
            .filter(|event| parse_date_parts(&event.due_date) == Some((year, month, day)))
            .cloned()
            .collect();
        cells.push(DayCell {
            day: Some(day),
            events: day_events,
        });
    }

    // Pad to full weeks
    while cells.len() % 7 != 0 {
        cells.push(DayCell::default());
    }

    Some(MonthGrid { year, month, cells })
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some(next_month.pred_opt()?.day())
}

/// List view: events due on or after a date, ordered by date then time.
///
/// Accepts any slice; the result is sorted even when the input is not.
pub fn upcoming_events<'a>(
    events: &'a [StoredCalendarEvent],
    from_date: &str,
) -> Vec<&'a StoredCalendarEvent> {
    let mut upcoming: Vec<&StoredCalendarEvent> = events
        .iter()
        .filter(|event| event.due_date.as_str() >= from_date)
        .collect();
    upcoming.sort_by(|a, b| {
        a.due_date
            .cmp(&b.due_date)
            .then_with(|| a.due_time.cmp(&b.due_time))
    });
    upcoming
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{provenance, CandidateEvent, Ownership, StoredCalendarEvent};

    fn stored(title: &str, due_date: &str, due_time: Option<&str>) -> StoredCalendarEvent {
        let candidate = CandidateEvent {
            title: title.to_string(),
            description: None,
            event_type: "assignment".to_string(),
            due_date: Some(due_date.to_string()),
            due_time: due_time.map(str::to_string),
            confidence_score: 0.9,
            source_text: String::new(),
        };
        let ownership = Ownership {
            class_id: "class-1".to_string(),
            user_id: "user-1".to_string(),
            syllabus_id: None,
        };
        StoredCalendarEvent::from_candidate(candidate, &ownership, provenance::UPLOAD_WORKFLOW)
    }

    #[test]
    fn date_parts_round_trip_without_shift() {
        // A late-evening event near a date boundary must keep its stored day
        let event = stored("Essay", "2024-09-15", Some("23:59"));
        let (year, month, day) = parse_date_parts(&event.due_date).unwrap();
        let (hour, minute) = parse_time_parts(event.due_time.as_deref().unwrap()).unwrap();
        assert_eq!((year, month, day), (2024, 9, 15));
        assert_eq!((hour, minute), (23, 59));
    }

    #[test]
    fn rejects_malformed_dates_and_times() {
        assert!(parse_date_parts("2024/09/15").is_none());
        assert!(parse_date_parts("2024-13-01").is_none());
        assert!(parse_date_parts("2024-09").is_none());
        assert!(parse_time_parts("24:00").is_none());
        assert!(parse_time_parts("9").is_none());
    }

    #[test]
    fn grid_buckets_events_on_their_day() {
        let events = vec![
            stored("PS1", "2024-09-15", None),
            stored("PS2", "2024-09-15", None),
            stored("Quiz", "2024-10-03", None),
        ];
        let grid = month_grid(2024, 9, &events).unwrap();

        // September 2024 starts on a Sunday
        assert_eq!(grid.cells[0].day, Some(1));
        let cell = grid
            .cells
            .iter()
            .find(|c| c.day == Some(15))
            .unwrap();
        assert_eq!(cell.events.len(), 2);

        // The October event is not in the September grid
        let total: usize = grid.cells.iter().map(|c| c.events.len()).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn grid_is_whole_weeks() {
        for month in 1..=12 {
            let grid = month_grid(2024, month, &[]).unwrap();
            assert_eq!(grid.cells.len() % 7, 0);
            assert!(grid.weeks().all(|week| week.len() == 7));
        }
    }

    #[test]
    fn upcoming_is_ordered_by_date_then_time() {
        let events = vec![
            stored("B", "2024-09-20", Some("14:00")),
            stored("A", "2024-09-20", Some("09:00")),
            stored("C", "2024-09-15", None),
            stored("Old", "2024-01-01", None),
        ];
        let upcoming = upcoming_events(&events, "2024-09-01");
        let titles: Vec<&str> = upcoming.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["C", "A", "B"]);
    }
}
