//! Daily attendance records and their correction history

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    #[default]
    Present,
    Absent,
    HalfDay,
    Leave,
    Holiday,
    WeekOff,
}

/// The check-in/check-out/status triple of one day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Punch {
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
    pub status: AttendanceStatus,
}

/// A requested change to one day's attendance
#[derive(Debug, Clone, PartialEq)]
pub struct Correction {
    pub updated: Punch,
    pub reason: String,
    pub corrected_by: String,
}

/// One entry of a record's correction history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionEntry {
    pub reason: String,
    pub previous: Punch,
    pub updated: Punch,
    pub corrected_at: DateTime<Utc>,
    pub corrected_by: String,
}

/// Attendance of one employee on one date
///
/// The history only grows; see `AttendanceRecord::apply_correction`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    #[serde(default)]
    pub id: Option<u64>,
    pub employee_id: u64,
    pub date: NaiveDate,
    #[serde(default)]
    pub check_in: Option<NaiveTime>,
    #[serde(default)]
    pub check_out: Option<NaiveTime>,
    #[serde(default)]
    pub status: AttendanceStatus,
    #[serde(default)]
    pub(crate) history: Vec<CorrectionEntry>,
}

impl AttendanceRecord {
    pub fn new(employee_id: u64, date: NaiveDate) -> Self {
        Self {
            id: None,
            employee_id,
            date,
            check_in: None,
            check_out: None,
            status: AttendanceStatus::Absent,
            history: Vec::new(),
        }
    }

    pub fn with_punch(mut self, punch: Punch) -> Self {
        self.check_in = punch.check_in;
        self.check_out = punch.check_out;
        self.status = punch.status;
        self
    }

    /// Current values as a punch snapshot
    pub fn punch(&self) -> Punch {
        Punch {
            check_in: self.check_in,
            check_out: self.check_out,
            status: self.status,
        }
    }

    pub fn history(&self) -> &[CorrectionEntry] {
        &self.history
    }
}
