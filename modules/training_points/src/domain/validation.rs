//! Input validation and normalization

use crate::contract::{Activity, NewActivity, NewDeficiencyReport, TrainingPointsError};
use chrono::NaiveDate;

const MAX_NAME_LEN: usize = 255;

/// Validate activity fields that do not need storage lookups
pub fn validate_new_activity(data: &NewActivity) -> Result<(), TrainingPointsError> {
    require_text("name", &data.name)?;
    if data.name.chars().count() > MAX_NAME_LEN {
        return Err(TrainingPointsError::validation(format!(
            "name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }
    require_text("location", &data.location)?;
    validate_schedule(data.start_date, data.end_date)?;

    if data.point < 0 {
        return Err(TrainingPointsError::validation(format!(
            "point must be non-negative, got {}",
            data.point
        )));
    }

    Ok(())
}

/// Validate an activity after a schedule/metadata patch has been applied
pub fn validate_patched_activity(activity: &Activity) -> Result<(), TrainingPointsError> {
    require_text("name", &activity.name)?;
    require_text("location", &activity.location)?;
    validate_schedule(activity.start_date, activity.end_date)
}

fn validate_schedule(start_date: NaiveDate, end_date: NaiveDate) -> Result<(), TrainingPointsError> {
    if start_date > end_date {
        return Err(TrainingPointsError::validation(format!(
            "start_date {} is after end_date {}",
            start_date, end_date
        )));
    }
    Ok(())
}

fn require_text(field: &str, value: &str) -> Result<(), TrainingPointsError> {
    if value.trim().is_empty() {
        return Err(TrainingPointsError::validation(format!(
            "{} cannot be empty",
            field
        )));
    }
    Ok(())
}

/// Blank evidence fields are stored as absent, so a report never mixes
/// empty strings with missing values.
pub fn normalize_report(mut report: NewDeficiencyReport) -> NewDeficiencyReport {
    report.image = report.image.filter(|v| !v.trim().is_empty());
    report.content = report.content.filter(|v| !v.trim().is_empty());
    report
}

/// Validate an account email address (shape only)
pub fn validate_email(email: &str) -> Result<(), TrainingPointsError> {
    let trimmed = email.trim();
    let valid = match trimmed.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };
    if !valid {
        return Err(TrainingPointsError::validation(format!(
            "'{}' is not a valid email address",
            email
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::OrganizationalForm;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn activity() -> NewActivity {
        NewActivity {
            name: "Green Sunday".to_string(),
            organizational_form: OrganizationalForm::Offline,
            participant: "Year 1".to_string(),
            start_date: date(2024, 4, 7),
            end_date: date(2024, 4, 7),
            location: "Campus park".to_string(),
            point: 3,
            description: "Clean-up".to_string(),
            faculty_id: 1,
            semester_id: 1,
            criterion_id: None,
        }
    }

    #[test]
    fn test_valid_activity() {
        assert!(validate_new_activity(&activity()).is_ok());
    }

    #[test]
    fn test_start_after_end_rejected() {
        let mut data = activity();
        data.start_date = date(2024, 4, 8);
        assert!(matches!(
            validate_new_activity(&data),
            Err(TrainingPointsError::Validation { .. })
        ));
    }

    #[test]
    fn test_negative_point_rejected() {
        let mut data = activity();
        data.point = -1;
        assert!(validate_new_activity(&data).is_err());
    }

    #[test]
    fn test_zero_point_allowed() {
        let mut data = activity();
        data.point = 0;
        assert!(validate_new_activity(&data).is_ok());
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut data = activity();
        data.name = "   ".to_string();
        assert!(validate_new_activity(&data).is_err());
    }

    #[test]
    fn test_report_normalization() {
        let report = normalize_report(NewDeficiencyReport {
            student_id: 1,
            activity_id: 2,
            image: Some(String::new()),
            content: Some("  ".to_string()),
        });
        assert_eq!(report.image, None);
        assert_eq!(report.content, None);

        let report = normalize_report(NewDeficiencyReport {
            student_id: 1,
            activity_id: 2,
            image: None,
            content: Some("I was there, see the sign-in sheet".to_string()),
        });
        assert_eq!(report.image, None);
        assert!(report.content.is_some());
    }

    #[test]
    fn test_email() {
        assert!(validate_email("a.student@uni.edu.vn").is_ok());
        assert!(validate_email("nobody").is_err());
        assert!(validate_email("@uni.edu").is_err());
        assert!(validate_email("x@localhost").is_err());
    }
}
