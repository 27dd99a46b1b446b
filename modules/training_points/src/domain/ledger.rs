//! Participation state machine
//!
//! `Registered -> Attended -> Credited`. Credit is one-directional: clearing
//! attendance after a credit leaves both the minted entry and `is_point_added`
//! in place.

use crate::contract::{Activity, NewTrainingPoint, Participation};

/// What an attendance write must persist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendanceTransition {
    /// New value of `is_attendance`
    pub is_attendance: bool,
    /// Whether this write must mint the training point and set `is_point_added`
    pub grant_point: bool,
}

/// Evaluate an attendance write against the current row.
///
/// Storage must apply the returned transition atomically, and must re-check
/// `is_point_added == false` at write time before minting.
pub fn attendance_transition(current: &Participation, attended: bool) -> AttendanceTransition {
    AttendanceTransition {
        is_attendance: attended,
        grant_point: attended && !current.is_point_added,
    }
}

/// Ledger entry minted for a credited participation, using the activity's
/// values at the moment of the credit.
pub fn credit_for(participation: &Participation, activity: &Activity) -> NewTrainingPoint {
    NewTrainingPoint {
        student_id: participation.student_id,
        semester_id: activity.semester_id,
        criterion_id: activity.criterion_id,
        point: activity.point,
    }
}
