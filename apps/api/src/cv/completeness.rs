use serde::{Deserialize, Serialize};

use crate::cv::models::CvContent;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    Strong,
    Moderate,
    Weak,
    Missing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionHealth {
    pub section: String,
    pub score: f64,
    pub entry_count: usize,
    pub status: SectionStatus,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletenessReport {
    pub overall_score: f64,
    pub sections: Vec<SectionHealth>,
    pub missing_sections: Vec<String>,
}

const SECTION_WEIGHTS: &[(&str, f64)] = &[
    ("personal", 0.25),
    ("experience", 0.40),
    ("education", 0.20),
    ("skills", 0.15),
];

/// A section is scored by the share of its "nice to have" fields that are filled.
struct SectionFill {
    entry_count: usize,
    filled: usize,
    expected: usize,
    recommendations: Vec<String>,
}

pub fn compute_completeness_report(content: &CvContent) -> CompletenessReport {
    let mut sections = Vec::new();
    let mut missing_sections = Vec::new();
    let mut weighted_score_sum = 0.0;

    for (section_key, weight) in SECTION_WEIGHTS {
        let fill = match *section_key {
            "personal" => personal_fill(content),
            "experience" => experience_fill(content),
            "education" => education_fill(content),
            _ => skills_fill(content),
        };

        if fill.entry_count == 0 {
            missing_sections.push(section_key.to_string());
            sections.push(SectionHealth {
                section: section_key.to_string(),
                score: 0.0,
                entry_count: 0,
                status: SectionStatus::Missing,
                recommendations: vec![format!("Add your {section_key} to the CV")],
            });
            continue;
        }

        let score = if fill.expected == 0 {
            0.0
        } else {
            (fill.filled as f64 / fill.expected as f64).clamp(0.0, 1.0)
        };
        let status = match score {
            s if s >= 0.8 => SectionStatus::Strong,
            s if s >= 0.5 => SectionStatus::Moderate,
            _ => SectionStatus::Weak,
        };

        weighted_score_sum += score * weight;
        sections.push(SectionHealth {
            section: section_key.to_string(),
            score,
            entry_count: fill.entry_count,
            status,
            recommendations: fill.recommendations,
        });
    }

    let total_weight: f64 = SECTION_WEIGHTS.iter().map(|(_, w)| w).sum();
    let overall_score = if total_weight > 0.0 {
        (weighted_score_sum / total_weight).clamp(0.0, 1.0)
    } else {
        0.0
    };

    CompletenessReport {
        overall_score,
        sections,
        missing_sections,
    }
}

fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn personal_fill(content: &CvContent) -> SectionFill {
    let p = &content.personal;
    if p.full_name.trim().is_empty() && p.email.trim().is_empty() {
        return SectionFill {
            entry_count: 0,
            filled: 0,
            expected: 0,
            recommendations: vec![],
        };
    }

    let checks = [
        ("name", !p.full_name.trim().is_empty()),
        ("email", !p.email.trim().is_empty()),
        ("headline", is_set(&p.headline)),
        ("phone", is_set(&p.phone)),
        ("location", is_set(&p.location)),
        ("summary", is_set(&p.summary)),
    ];
    let recommendations = checks
        .iter()
        .filter(|(_, ok)| !ok)
        .map(|(name, _)| format!("Add a {name} to your personal details"))
        .collect();

    SectionFill {
        entry_count: 1,
        filled: checks.iter().filter(|(_, ok)| *ok).count(),
        expected: checks.len(),
        recommendations,
    }
}

fn experience_fill(content: &CvContent) -> SectionFill {
    let entries = &content.experience;
    let mut recommendations = Vec::new();

    let with_bullets = entries.iter().filter(|e| !e.bullets.is_empty()).count();
    let with_stack = entries.iter().filter(|e| !e.tech_stack.is_empty()).count();

    let without_bullets = entries.len() - with_bullets;
    if without_bullets > 0 {
        recommendations.push(format!(
            "{without_bullets} experience entries have no bullet points describing your impact"
        ));
    }
    if !entries.is_empty() && entries.len() < 2 {
        recommendations.push("Add more experience entries to build a complete picture".into());
    }

    SectionFill {
        entry_count: entries.len(),
        filled: with_bullets * 2 + with_stack,
        expected: entries.len() * 3,
        recommendations,
    }
}

fn education_fill(content: &CvContent) -> SectionFill {
    let entries = &content.education;
    let with_field = entries.iter().filter(|e| is_set(&e.field)).count();
    let finished = entries.iter().filter(|e| e.date_end.is_some()).count();

    let mut recommendations = Vec::new();
    if with_field < entries.len() {
        recommendations.push("Name the field of study for each education entry".into());
    }

    SectionFill {
        entry_count: entries.len(),
        filled: entries.len() + with_field + finished,
        expected: entries.len() * 3,
        recommendations,
    }
}

fn skills_fill(content: &CvContent) -> SectionFill {
    let groups = &content.skills;
    let total_items: usize = groups.iter().map(|g| g.items.len()).sum();

    let mut recommendations = Vec::new();
    if total_items < 5 && !groups.is_empty() {
        recommendations.push("List at least five skills".into());
    }

    SectionFill {
        entry_count: groups.len(),
        filled: total_items.min(5),
        expected: 5,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cv::models::{ExperienceEntry, PersonalInfo, SkillGroup};
    use chrono::NaiveDate;

    fn experience(bullets: Vec<&str>) -> ExperienceEntry {
        ExperienceEntry {
            company: "Acme".into(),
            role: "Engineer".into(),
            location: None,
            date_start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            date_end: None,
            tech_stack: vec!["Rust".into()],
            bullets: bullets.into_iter().map(String::from).collect(),
        }
    }

    #[test]
    fn test_empty_cv_all_missing() {
        let report = compute_completeness_report(&CvContent::default());
        assert_eq!(report.overall_score, 0.0);
        assert_eq!(
            report.missing_sections,
            vec!["personal", "experience", "education", "skills"]
        );
        assert!(report
            .sections
            .iter()
            .all(|s| s.status == SectionStatus::Missing));
    }

    #[test]
    fn test_experience_without_bullets_is_weak() {
        let content = CvContent {
            experience: vec![experience(vec![]), experience(vec![])],
            ..Default::default()
        };
        let report = compute_completeness_report(&content);
        let exp = report
            .sections
            .iter()
            .find(|s| s.section == "experience")
            .unwrap();
        assert_eq!(exp.status, SectionStatus::Weak);
        assert!(exp.recommendations[0].starts_with("2 experience entries"));
    }

    #[test]
    fn test_full_personal_and_skills_strong() {
        let content = CvContent {
            personal: PersonalInfo {
                full_name: "Linus".into(),
                headline: Some("Kernel hacker".into()),
                email: "linus@example.org".into(),
                phone: Some("+1 555 0100".into()),
                location: Some("Portland".into()),
                website: None,
                summary: Some("Writes kernels.".into()),
            },
            skills: vec![SkillGroup {
                category: "Languages".into(),
                items: vec!["C", "Rust", "Perl", "Shell", "Make"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            }],
            experience: vec![experience(vec!["Shipped 6.0"]), experience(vec!["Merged 1k patches"])],
            ..Default::default()
        };
        let report = compute_completeness_report(&content);
        for section in ["personal", "skills", "experience"] {
            let health = report.sections.iter().find(|s| s.section == section).unwrap();
            assert_eq!(health.status, SectionStatus::Strong, "{section}");
        }
        assert_eq!(report.missing_sections, vec!["education"]);
        // 0.25 + 0.40 + 0.15 of a total weight of 1.0
        assert!((report.overall_score - 0.80).abs() < 1e-9, "{}", report.overall_score);
    }
}
