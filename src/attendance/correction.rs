//! Search-then-correct flow for daily attendance

use chrono::{DateTime, Duration, NaiveDate, Utc};
use thiserror::Error;

use crate::model::{AttendanceRecord, Correction, CorrectionEntry};

#[derive(Debug, Error, PartialEq)]
pub enum CorrectionError {
    #[error("a reason is required to correct attendance")]
    MissingReason,

    #[error("correction does not change anything")]
    Unchanged,
}

/// Find the record of an employee on a given date
pub fn find_record(
    records: &[AttendanceRecord],
    employee_id: u64,
    date: NaiveDate,
) -> Option<&AttendanceRecord> {
    records
        .iter()
        .find(|r| r.employee_id == employee_id && r.date == date)
}

/// Mutable variant of [`find_record`]
pub fn find_record_mut(
    records: &mut [AttendanceRecord],
    employee_id: u64,
    date: NaiveDate,
) -> Option<&mut AttendanceRecord> {
    records
        .iter_mut()
        .find(|r| r.employee_id == employee_id && r.date == date)
}

impl AttendanceRecord {
    /// Apply a correction and append it to the history
    pub fn apply_correction(
        &mut self,
        correction: Correction,
        at: DateTime<Utc>,
    ) -> Result<&CorrectionEntry, CorrectionError> {
        if correction.reason.trim().is_empty() {
            return Err(CorrectionError::MissingReason);
        }

        let previous = self.punch();
        if previous == correction.updated {
            return Err(CorrectionError::Unchanged);
        }

        self.check_in = correction.updated.check_in;
        self.check_out = correction.updated.check_out;
        self.status = correction.updated.status;

        tracing::debug!(
            employee_id = self.employee_id,
            date = %self.date,
            by = %correction.corrected_by,
            "attendance corrected"
        );

        self.history.push(CorrectionEntry {
            reason: correction.reason,
            previous,
            updated: correction.updated,
            corrected_at: at,
            corrected_by: correction.corrected_by,
        });

        // just pushed
        Ok(&self.history[self.history.len() - 1])
    }

    /// Time between check-in and check-out
    ///
    /// A check-out earlier than the check-in is taken to fall on the next day.
    pub fn worked_duration(&self) -> Option<Duration> {
        let (check_in, check_out) = (self.check_in?, self.check_out?);
        let worked = check_out.signed_duration_since(check_in);
        if worked < Duration::zero() {
            Some(worked + Duration::hours(24))
        } else {
            Some(worked)
        }
    }
}
