use chrono::{NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

/// Snapshot of the customer taken when the booking is created. Profile edits
/// after that point do not rewrite historical bookings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerSnapshot {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub photo_url: Option<String>,
}

/// Snapshot of the maid assigned to the booking, including the hourly rate
/// advertised at booking time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSnapshot {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub photo_url: Option<String>,
    pub hourly_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub customer: CustomerSnapshot,
    pub provider: ProviderSnapshot,
    pub service: ServiceKind,
    pub schedule: Schedule,
    /// Set when a recurring occurrence is completed; basis for projecting
    /// the next one. Always `None` for one-time bookings.
    pub last_completed_date: Option<NaiveDateTime>,
    pub status: BookingStatus,
    pub instructions: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Booking {
    pub fn is_recurring(&self) -> bool {
        matches!(self.schedule, Schedule::Recurring { .. })
    }
}

/// A booking is either pinned to a single date or recurs on a weekday.
/// The two arms are exclusive by construction; `time`/`hour` are plain
/// time-of-day strings ("14:00") and never folded into date math.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Schedule {
    OneTime {
        date: NaiveDate,
        time: String,
    },
    Recurring {
        cadence: Cadence,
        day: String,
        hour: String,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    Weekly,
    Biweekly,
    Monthly,
}

impl Cadence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cadence::Weekly => "weekly",
            Cadence::Biweekly => "biweekly",
            Cadence::Monthly => "monthly",
        }
    }

    /// Lenient parse for values coming back out of the store. Unknown
    /// cadences degrade to weekly; entry points use [`Cadence::from_input`].
    pub fn parse(s: &str) -> Self {
        match s {
            "weekly" => Cadence::Weekly,
            "biweekly" => Cadence::Biweekly,
            "monthly" => Cadence::Monthly,
            _ => {
                tracing::warn!(cadence = s, "unrecognized cadence, defaulting to weekly");
                Cadence::Weekly
            }
        }
    }

    pub fn from_input(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "weekly" => Ok(Cadence::Weekly),
            "biweekly" => Ok(Cadence::Biweekly),
            "monthly" => Ok(Cadence::Monthly),
            _ => Err(anyhow::anyhow!("invalid cadence: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    DeepCleaning,
    StandardCleaning,
    MoveOutCleaning,
}

impl ServiceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::DeepCleaning => "deep_cleaning",
            ServiceKind::StandardCleaning => "standard_cleaning",
            ServiceKind::MoveOutCleaning => "move_out_cleaning",
        }
    }

    /// Human-readable name used in notification copy.
    pub fn label(&self) -> &'static str {
        match self {
            ServiceKind::DeepCleaning => "Deep Cleaning",
            ServiceKind::StandardCleaning => "Standard Cleaning",
            ServiceKind::MoveOutCleaning => "Move-out Cleaning",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "deep_cleaning" => ServiceKind::DeepCleaning,
            "move_out_cleaning" => ServiceKind::MoveOutCleaning,
            _ => ServiceKind::StandardCleaning,
        }
    }

    pub fn from_input(s: &str) -> anyhow::Result<Self> {
        match s {
            "deep_cleaning" => Ok(ServiceKind::DeepCleaning),
            "standard_cleaning" => Ok(ServiceKind::StandardCleaning),
            "move_out_cleaning" => Ok(ServiceKind::MoveOutCleaning),
            _ => Err(anyhow::anyhow!("invalid service kind: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    OnTheWay,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::OnTheWay => "on_the_way",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "confirmed" => BookingStatus::Confirmed,
            "on_the_way" => BookingStatus::OnTheWay,
            "in_progress" => BookingStatus::InProgress,
            "completed" => BookingStatus::Completed,
            "cancelled" => BookingStatus::Cancelled,
            _ => BookingStatus::Pending,
        }
    }

    /// Completed and Cancelled admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }
}

/// Lenient weekday parse. Unrecognized values degrade to Monday so a bad
/// record can never crash date math; entry points validate with
/// [`weekday_from_input`] so this is a last resort, not an expected path.
pub fn weekday_or_default(s: &str) -> Weekday {
    match weekday_from_input(s) {
        Ok(day) => day,
        Err(_) => {
            tracing::warn!(weekday = s, "unrecognized weekday, defaulting to Monday");
            Weekday::Mon
        }
    }
}

pub fn weekday_from_input(s: &str) -> anyhow::Result<Weekday> {
    match s.to_lowercase().as_str() {
        "mon" | "monday" => Ok(Weekday::Mon),
        "tue" | "tuesday" => Ok(Weekday::Tue),
        "wed" | "wednesday" => Ok(Weekday::Wed),
        "thu" | "thursday" => Ok(Weekday::Thu),
        "fri" | "friday" => Ok(Weekday::Fri),
        "sat" | "saturday" => Ok(Weekday::Sat),
        "sun" | "sunday" => Ok(Weekday::Sun),
        _ => Err(anyhow::anyhow!("invalid weekday: {s}")),
    }
}

pub fn validate_time_of_day(s: &str) -> anyhow::Result<()> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 2 {
        return Err(anyhow::anyhow!("invalid time format: {s}"));
    }
    let hour: u32 = parts[0]
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid hour in: {s}"))?;
    let minute: u32 = parts[1]
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid minute in: {s}"))?;
    if hour > 23 || minute > 59 {
        return Err(anyhow::anyhow!("time out of range: {s}"));
    }
    Ok(())
}
