use std::str::FromStr;

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const MAX_NAME_LENGTH: usize = 255;
pub const RECORDED_AT_FORMAT: &str = "%d/%m/%Y %H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Attendance {
    Yes,
    No,
}

impl Attendance {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "YES",
            Self::No => "NO",
        }
    }
}

impl FromStr for Attendance {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "YES" => Ok(Self::Yes),
            "NO" => Ok(Self::No),
            _ => Err(AppError::BadRequest(
                "Attendance must be YES or NO".into(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rsvp {
    pub id: i32,
    pub name: String,
    pub attendance: Attendance,
    pub recorded_at: DateTime<Utc>,
}

/// Row shape as stored; `attendance` is plain text in the table.
#[derive(Debug, sqlx::FromRow)]
pub struct RsvpRow {
    pub id: i32,
    pub name: String,
    pub attendance: String,
    pub recorded_at: DateTime<Utc>,
}

impl TryFrom<RsvpRow> for Rsvp {
    type Error = AppError;

    fn try_from(row: RsvpRow) -> Result<Self, Self::Error> {
        let attendance = row.attendance.parse::<Attendance>().map_err(|_| {
            AppError::Internal(format!(
                "RSVP {} has unexpected attendance {:?}",
                row.id, row.attendance
            ))
        })?;
        Ok(Self {
            id: row.id,
            name: row.name,
            attendance,
            recorded_at: row.recorded_at,
        })
    }
}

/// A submission that passed validation and may be written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRsvp {
    pub name: String,
    pub attendance: Attendance,
}

impl NewRsvp {
    pub fn parse(name: &str, attendance: &str) -> Result<Self, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("Name is required".into()));
        }
        // Postgres text cannot hold NUL, and no other control character belongs in a name
        if name.chars().any(char::is_control) {
            return Err(AppError::BadRequest(
                "Name must not contain control characters".into(),
            ));
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(AppError::BadRequest(format!(
                "Name must be at most {MAX_NAME_LENGTH} characters"
            )));
        }
        Ok(Self {
            name: name.to_string(),
            attendance: attendance.parse()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(i32),
    Updated(i32),
}

impl SubmitOutcome {
    pub fn id(self) -> i32 {
        match self {
            Self::Created(id) | Self::Updated(id) => id,
        }
    }

    pub fn status(self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::Updated(_) => "updated",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub attendance: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub message: &'static str,
    pub status: &'static str,
    pub id: i32,
}

impl From<SubmitOutcome> for SubmitResponse {
    fn from(outcome: SubmitOutcome) -> Self {
        let message = match outcome {
            SubmitOutcome::Created(_) => "RSVP received, thank you!",
            SubmitOutcome::Updated(_) => "RSVP updated, thank you!",
        };
        Self {
            message,
            status: outcome.status(),
            id: outcome.id(),
        }
    }
}

/// Body of a delete call. Anything other than an object with a string
/// `token` field carries no token at all.
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct DeleteRequest(serde_json::Value);

impl DeleteRequest {
    pub fn token(&self) -> Option<&str> {
        self.0.as_object()?.get("token")?.as_str()
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// An RSVP as shown to the host, with a local wall-clock timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct RsvpView {
    pub id: i32,
    pub name: String,
    pub attendance: Attendance,
    pub recorded_at: String,
}

impl RsvpView {
    pub fn in_timezone<Tz: TimeZone>(rsvp: Rsvp, tz: &Tz) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            id: rsvp.id,
            name: rsvp.name,
            attendance: rsvp.attendance,
            recorded_at: rsvp
                .recorded_at
                .with_timezone(tz)
                .format(RECORDED_AT_FORMAT)
                .to_string(),
        }
    }
}

impl From<Rsvp> for RsvpView {
    fn from(rsvp: Rsvp) -> Self {
        Self::in_timezone(rsvp, &Local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attendance_is_case_insensitive() {
        assert_eq!("yes".parse::<Attendance>().unwrap(), Attendance::Yes);
        assert_eq!("Yes".parse::<Attendance>().unwrap(), Attendance::Yes);
        assert_eq!("nO".parse::<Attendance>().unwrap(), Attendance::No);
        assert!(" no ".parse::<Attendance>().is_err());
        assert!(" yes\t".parse::<Attendance>().is_err());
        assert!("maybe".parse::<Attendance>().is_err());
        assert!("".parse::<Attendance>().is_err());
        assert!("SIM".parse::<Attendance>().is_err());
    }

    #[test]
    fn parse_trims_name_and_normalizes_attendance() {
        let rsvp = NewRsvp::parse("  Ana Maria \n", "yEs").unwrap();
        assert_eq!(rsvp.name, "Ana Maria");
        assert_eq!(rsvp.attendance, Attendance::Yes);
        assert_eq!(rsvp.attendance.as_str(), "YES");
    }

    #[test]
    fn parse_rejects_blank_or_overlong_names() {
        assert!(matches!(
            NewRsvp::parse("   ", "YES"),
            Err(AppError::BadRequest(_))
        ));
        for name in ["A\0na", "Ana\u{7}", "Ana\nMaria", "Ana\u{9b}"] {
            assert!(
                matches!(NewRsvp::parse(name, "YES"), Err(AppError::BadRequest(_))),
                "{name:?}"
            );
        }
        let long = "a".repeat(MAX_NAME_LENGTH + 1);
        assert!(matches!(
            NewRsvp::parse(&long, "YES"),
            Err(AppError::BadRequest(_))
        ));
        assert!(NewRsvp::parse(&"a".repeat(MAX_NAME_LENGTH), "NO").is_ok());
    }

    #[test]
    fn row_with_unknown_attendance_is_an_internal_error() {
        let row = RsvpRow {
            id: 7,
            name: "Ana".into(),
            attendance: "MAYBE".into(),
            recorded_at: Utc::now(),
        };
        assert!(matches!(Rsvp::try_from(row), Err(AppError::Internal(_))));
    }

    #[test]
    fn view_formats_timestamp() {
        let rsvp = Rsvp {
            id: 1,
            name: "Ana".into(),
            attendance: Attendance::Yes,
            recorded_at: Utc.with_ymd_and_hms(2025, 3, 9, 18, 5, 0).unwrap(),
        };
        let view = RsvpView::in_timezone(rsvp, &Utc);
        assert_eq!(view.recorded_at, "09/03/2025 18:05");
        assert_eq!(
            serde_json::to_value(&view).unwrap()["attendance"],
            serde_json::json!("YES")
        );
    }
}
