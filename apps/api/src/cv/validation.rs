use serde::{Deserialize, Serialize};

use crate::cv::models::CvContent;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationIssue {
    /// Dotted path into the document, e.g. `experience[1].date_end`.
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub passed: bool,
    pub issues: Vec<ValidationIssue>,
}

const GPA_RANGE: std::ops::RangeInclusive<f64> = 0.0..=10.0;

/// Checks a draft for problems worth surfacing in the editor.
///
/// Drafts are saved regardless of the outcome; the report is advisory.
pub fn validate_content(content: &CvContent) -> ValidationReport {
    let mut issues = Vec::new();
    let mut push = |field: String, message: &str| {
        issues.push(ValidationIssue {
            field,
            message: message.to_string(),
        })
    };

    let personal = &content.personal;
    if personal.full_name.trim().is_empty() {
        push("personal.full_name".into(), "Name is required");
    }
    if !personal.email.trim().is_empty() && !is_plausible_email(&personal.email) {
        push("personal.email".into(), "Email address looks malformed");
    }

    for (i, edu) in content.education.iter().enumerate() {
        if edu.institution.trim().is_empty() {
            push(format!("education[{i}].institution"), "Institution is required");
        }
        if let Some(end) = edu.date_end {
            if end < edu.date_start {
                push(format!("education[{i}].date_end"), "End date is before start date");
            }
        }
        if let Some(gpa) = edu.gpa {
            if !GPA_RANGE.contains(&gpa) {
                push(format!("education[{i}].gpa"), "GPA must be between 0 and 10");
            }
        }
    }

    for (i, exp) in content.experience.iter().enumerate() {
        if exp.company.trim().is_empty() {
            push(format!("experience[{i}].company"), "Company is required");
        }
        if exp.role.trim().is_empty() {
            push(format!("experience[{i}].role"), "Role is required");
        }
        if let Some(end) = exp.date_end {
            if end < exp.date_start {
                push(format!("experience[{i}].date_end"), "End date is before start date");
            }
        }
        for (j, bullet) in exp.bullets.iter().enumerate() {
            if bullet.trim().is_empty() {
                push(format!("experience[{i}].bullets[{j}]"), "Bullet is empty");
            }
        }
    }

    for (i, group) in content.skills.iter().enumerate() {
        if group.items.iter().all(|s| s.trim().is_empty()) {
            push(format!("skills[{i}].items"), "Skill group has no skills");
        }
    }

    ValidationReport {
        passed: issues.is_empty(),
        issues,
    }
}

fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cv::models::{EducationEntry, ExperienceEntry, PersonalInfo, SkillGroup};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn valid_content() -> CvContent {
        CvContent {
            personal: PersonalInfo {
                full_name: "Grace Hopper".into(),
                email: "grace@navy.mil".into(),
                ..Default::default()
            },
            education: vec![EducationEntry {
                institution: "Yale".into(),
                degree: "PhD".into(),
                field: Some("Mathematics".into()),
                date_start: date(1930, 9),
                date_end: Some(date(1934, 6)),
                gpa: Some(4.0),
                honors: vec![],
            }],
            experience: vec![ExperienceEntry {
                company: "Eckert-Mauchly".into(),
                role: "Senior Mathematician".into(),
                location: None,
                date_start: date(1949, 1),
                date_end: None,
                tech_stack: vec!["UNIVAC I".into()],
                bullets: vec!["Built the A-0 compiler".into()],
            }],
            skills: vec![SkillGroup {
                category: "Languages".into(),
                items: vec!["COBOL".into()],
            }],
        }
    }

    fn fields(report: &ValidationReport) -> Vec<&str> {
        report.issues.iter().map(|i| i.field.as_str()).collect()
    }

    #[test]
    fn test_valid_content_passes() {
        let report = validate_content(&valid_content());
        assert!(report.passed, "issues: {:?}", report.issues);
    }

    #[test]
    fn test_empty_draft_flags_name_only() {
        let report = validate_content(&CvContent::default());
        assert!(!report.passed);
        assert_eq!(fields(&report), vec!["personal.full_name"]);
    }

    #[test]
    fn test_malformed_email() {
        for bad in ["grace", "grace@", "@navy.mil", "grace@navy", "grace @navy.mil"] {
            let mut content = valid_content();
            content.personal.email = bad.into();
            let report = validate_content(&content);
            assert_eq!(fields(&report), vec!["personal.email"], "email {bad}");
        }
    }

    #[test]
    fn test_reversed_dates() {
        let mut content = valid_content();
        content.experience[0].date_end = Some(date(1940, 1));
        content.education[0].date_end = Some(date(1929, 1));
        let report = validate_content(&content);
        assert_eq!(
            fields(&report),
            vec!["education[0].date_end", "experience[0].date_end"]
        );
    }

    #[test]
    fn test_gpa_out_of_range() {
        let mut content = valid_content();
        content.education[0].gpa = Some(12.5);
        assert_eq!(fields(&validate_content(&content)), vec!["education[0].gpa"]);
    }

    #[test]
    fn test_blank_bullet_and_skills() {
        let mut content = valid_content();
        content.experience[0].bullets.push("   ".into());
        content.skills[0].items = vec!["".into()];
        assert_eq!(
            fields(&validate_content(&content)),
            vec!["experience[0].bullets[1]", "skills[0].items"]
        );
    }
}
