use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{
    Booking, BookingStatus, Cadence, CustomerSnapshot, ProviderSnapshot, Schedule, ServiceKind,
};

const BOOKING_COLUMNS: &str = "id, customer_id, customer_name, customer_phone, customer_photo_url, \
     provider_id, provider_name, provider_phone, provider_photo_url, provider_hourly_rate, \
     service, schedule_mode, booking_date, booking_time, recurring_cadence, preferred_day, \
     preferred_hour, last_completed_date, status, instructions, created_at, updated_at";

// ── Bookings ──

pub fn create_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    let (schedule_mode, booking_date, booking_time, cadence, preferred_day, preferred_hour) =
        match &booking.schedule {
            Schedule::OneTime { date, time } => (
                "one_time",
                Some(date.format("%Y-%m-%d").to_string()),
                Some(time.clone()),
                None,
                None,
                None,
            ),
            Schedule::Recurring { cadence, day, hour } => (
                "recurring",
                None,
                None,
                Some(cadence.as_str().to_string()),
                Some(day.clone()),
                Some(hour.clone()),
            ),
        };

    conn.execute(
        &format!(
            "INSERT INTO bookings ({BOOKING_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22)"
        ),
        params![
            booking.id,
            booking.customer.id,
            booking.customer.name,
            booking.customer.phone,
            booking.customer.photo_url,
            booking.provider.id,
            booking.provider.name,
            booking.provider.phone,
            booking.provider.photo_url,
            booking.provider.hourly_rate,
            booking.service.as_str(),
            schedule_mode,
            booking_date,
            booking_time,
            cadence,
            preferred_day,
            preferred_hour,
            booking
                .last_completed_date
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            booking.status.as_str(),
            booking.instructions,
            booking.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            booking.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_booking_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let result = conn.query_row(
        &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
        params![id],
        |row| Ok(parse_booking_row(row)),
    );

    match result {
        Ok(booking) => Ok(Some(booking?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[derive(Default)]
pub struct BookingFilter<'a> {
    pub status: Option<&'a str>,
    pub customer_id: Option<&'a str>,
    pub provider_id: Option<&'a str>,
    pub limit: i64,
}

pub fn list_bookings(conn: &Connection, filter: &BookingFilter) -> anyhow::Result<Vec<Booking>> {
    let mut clauses: Vec<&str> = vec![];
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = vec![];

    if let Some(status) = filter.status {
        values.push(Box::new(status.to_string()));
        clauses.push("status = ?");
    }
    if let Some(customer_id) = filter.customer_id {
        values.push(Box::new(customer_id.to_string()));
        clauses.push("customer_id = ?");
    }
    if let Some(provider_id) = filter.provider_id {
        values.push(Box::new(provider_id.to_string()));
        clauses.push("provider_id = ?");
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };
    values.push(Box::new(if filter.limit > 0 { filter.limit } else { 50 }));

    let sql = format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings{where_sql} ORDER BY created_at DESC LIMIT ?"
    );

    let mut stmt = conn.prepare(&sql)?;
    let value_refs: Vec<&dyn rusqlite::types::ToSql> =
        values.iter().map(|v| v.as_ref()).collect();
    let rows = stmt.query_map(value_refs.as_slice(), |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

/// Persist a lifecycle transition. `completed_at` is only passed when a
/// recurring booking enters Completed; otherwise the stored basis is kept.
pub fn update_booking_status(
    conn: &Connection,
    id: &str,
    status: &BookingStatus,
    completed_at: Option<NaiveDateTime>,
) -> anyhow::Result<bool> {
    let now = Utc::now()
        .naive_utc()
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();
    let completed = completed_at.map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string());
    let count = conn.execute(
        "UPDATE bookings
         SET status = ?1, updated_at = ?2,
             last_completed_date = COALESCE(?3, last_completed_date)
         WHERE id = ?4",
        params![status.as_str(), now, completed, id],
    )?;
    Ok(count > 0)
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let id: String = row.get(0)?;
    let customer = CustomerSnapshot {
        id: row.get(1)?,
        name: row.get(2)?,
        phone: row.get(3)?,
        photo_url: row.get(4)?,
    };
    let provider = ProviderSnapshot {
        id: row.get(5)?,
        name: row.get(6)?,
        phone: row.get(7)?,
        photo_url: row.get(8)?,
        hourly_rate: row.get(9)?,
    };
    let service_str: String = row.get(10)?;
    let schedule_mode: String = row.get(11)?;
    let booking_date: Option<String> = row.get(12)?;
    let booking_time: Option<String> = row.get(13)?;
    let cadence_str: Option<String> = row.get(14)?;
    let preferred_day: Option<String> = row.get(15)?;
    let preferred_hour: Option<String> = row.get(16)?;
    let last_completed_str: Option<String> = row.get(17)?;
    let status_str: String = row.get(18)?;
    let instructions: Option<String> = row.get(19)?;
    let created_at_str: String = row.get(20)?;
    let updated_at_str: String = row.get(21)?;

    let schedule = match schedule_mode.as_str() {
        "recurring" => Schedule::Recurring {
            cadence: Cadence::parse(cadence_str.as_deref().unwrap_or("weekly")),
            day: preferred_day.unwrap_or_else(|| "monday".to_string()),
            hour: preferred_hour.unwrap_or_else(|| "09:00".to_string()),
        },
        _ => Schedule::OneTime {
            date: booking_date
                .as_deref()
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
                .unwrap_or_else(|| Utc::now().date_naive()),
            time: booking_time.unwrap_or_else(|| "09:00".to_string()),
        },
    };

    let last_completed_date = last_completed_str
        .as_deref()
        .and_then(|s| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").ok());
    let created_at = NaiveDateTime::parse_from_str(&created_at_str, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    let updated_at = NaiveDateTime::parse_from_str(&updated_at_str, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|_| Utc::now().naive_utc());

    Ok(Booking {
        id,
        customer,
        provider,
        service: ServiceKind::parse(&service_str),
        schedule,
        last_completed_date,
        status: BookingStatus::parse(&status_str),
        instructions,
        created_at,
        updated_at,
    })
}

// ── Device Tokens ──

pub fn save_device_token(conn: &Connection, user_id: &str, token: &str) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO device_tokens (user_id, token, updated_at)
         VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(user_id) DO UPDATE SET
           token = excluded.token,
           updated_at = excluded.updated_at",
        params![user_id, token],
    )?;
    Ok(())
}

pub fn get_device_token(conn: &Connection, user_id: &str) -> anyhow::Result<Option<String>> {
    let result = conn.query_row(
        "SELECT token FROM device_tokens WHERE user_id = ?1",
        params![user_id],
        |row| row.get::<_, String>(0),
    );

    match result {
        Ok(token) => Ok(Some(token)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ── Dashboard Stats ──

pub struct DashboardStats {
    pub pending_count: i64,
    pub confirmed_count: i64,
    pub active_count: i64,
    pub completed_count: i64,
    pub cancelled_count: i64,
}

pub fn get_dashboard_stats(conn: &Connection) -> anyhow::Result<DashboardStats> {
    let count_for = |status: &str| -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM bookings WHERE status = ?1",
            params![status],
            |row| row.get(0),
        )
        .unwrap_or(0)
    };

    let active_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM bookings WHERE status IN ('on_the_way', 'in_progress')",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    Ok(DashboardStats {
        pending_count: count_for("pending"),
        confirmed_count: count_for("confirmed"),
        active_count,
        completed_count: count_for("completed"),
        cancelled_count: count_for("cancelled"),
    })
}
