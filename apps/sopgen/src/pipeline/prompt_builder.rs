//! Prompt builder: pure assembly of the SOP writing prompt.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::pipeline::extractor::CourseMetadata;
use crate::pipeline::prompts::{NO_RESUME_LEAD_IN, RESUME_LEAD_IN, SOP_OUTLINE_TEMPLATE};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").unwrap());

/// Builds the seven-paragraph SOP prompt. A blank resume counts as no resume.
pub fn build_prompt(metadata: &CourseMetadata, resume_text: Option<&str>) -> String {
    let lead_in = match resume_text.map(str::trim).filter(|r| !r.is_empty()) {
        Some(resume) => RESUME_LEAD_IN.replace("{resume_text}", resume),
        None => NO_RESUME_LEAD_IN.to_string(),
    };

    fill_template(
        SOP_OUTLINE_TEMPLATE,
        &[
            ("lead_in", lead_in.as_str()),
            ("course", metadata.course.as_str()),
            ("university", metadata.university.as_str()),
            ("country", metadata.country.as_str()),
            ("course_info", metadata.course_info.as_str()),
        ],
    )
}

/// Substitutes `{name}` placeholders in one pass over `template`, so values
/// are never scanned for further placeholders. Unknown names are kept.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            values
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> CourseMetadata {
        CourseMetadata {
            course: "MSc Robotics".to_string(),
            university: "KTH Royal Institute of Technology".to_string(),
            country: "Sweden".to_string(),
            course_info: "Two-year programme covering perception, control and planning.".to_string(),
        }
    }

    #[test]
    fn test_prompt_without_resume_uses_placeholder_lead_in() {
        let prompt = build_prompt(&metadata(), None);
        assert!(prompt.starts_with(NO_RESUME_LEAD_IN));
        assert!(!prompt.contains("CANDIDATE RESUME"));
    }

    #[test]
    fn test_prompt_with_resume_embeds_resume_text() {
        let prompt = build_prompt(&metadata(), Some("B.Tech Mechanical, 2021. Built a line-following robot."));
        assert!(prompt.contains("CANDIDATE RESUME:\nB.Tech Mechanical, 2021. Built a line-following robot."));
        assert!(!prompt.contains(NO_RESUME_LEAD_IN));
    }

    #[test]
    fn test_blank_resume_is_treated_as_absent() {
        assert_eq!(build_prompt(&metadata(), Some("  \n ")), build_prompt(&metadata(), None));
    }

    #[test]
    fn test_prompt_interpolates_metadata_and_has_seven_sections() {
        let prompt = build_prompt(&metadata(), None);
        assert!(prompt.contains("Course: MSc Robotics"));
        assert!(prompt.contains("University: KTH Royal Institute of Technology"));
        assert!(prompt.contains("Why this country: explain why studying in Sweden"));
        assert!(prompt.contains("Course summary: Two-year programme"));
        for n in 1..=7 {
            assert!(prompt.contains(&format!("\n{n}. ")), "missing paragraph {n}");
        }
        assert!(!prompt.contains('{'));
    }

    #[test]
    fn test_braces_in_resume_are_not_interpolated() {
        let prompt = build_prompt(&metadata(), Some("Skills: {course} templating, JSON {}"));
        assert!(prompt.contains("Skills: {course} templating, JSON {}"));
    }

    #[test]
    fn test_placeholders_inside_metadata_are_not_interpolated() {
        let tricky = CourseMetadata {
            course: "MSc {university} Studies".to_string(),
            university: "Uni {lead_in}".to_string(),
            country: "Sweden".to_string(),
            course_info: "Covers {country} and {course_info}.".to_string(),
        };
        let prompt = build_prompt(&tricky, Some("RESUME-MARKER"));

        assert!(prompt.contains("Course: MSc {university} Studies"));
        assert!(prompt.contains("University: Uni {lead_in}"));
        assert!(prompt.contains("Course summary: Covers {country} and {course_info}."));
        assert_eq!(prompt.matches("RESUME-MARKER").count(), 1);
    }

    #[test]
    fn test_fill_template_keeps_unknown_placeholders() {
        assert_eq!(fill_template("{a} {b} {}", &[("a", "x")]), "x {b} {}");
    }

    #[test]
    fn test_empty_metadata_fields_render_empty() {
        let blank = CourseMetadata {
            course: String::new(),
            university: String::new(),
            country: String::new(),
            course_info: String::new(),
        };
        let prompt = build_prompt(&blank, None);
        assert!(prompt.contains("Course: \n"));
        assert!(prompt.contains("University: \n"));
    }
}
