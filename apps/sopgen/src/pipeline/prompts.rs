//! Prompt templates for both pipeline stages.
//! Placeholders are `{name}`.

/// Metadata extraction directive. Replace: {json_only}, {course_text}
pub const METADATA_EXTRACTION_TEMPLATE: &str = r#"You are an admissions research assistant. Read the course page text below and identify the programme it describes.

Return a JSON object with exactly these keys:
{"course":"<full course name>","university":"<university name>","country":"<country the university is in>","course_info":"<summary of the course: focus areas, notable modules, research strengths, career outcomes>"}

{json_only}

COURSE PAGE TEXT:
{course_text}"#;

/// Lead-in used when the candidate supplied a resume. Replace: {resume_text}
pub const RESUME_LEAD_IN: &str = r#"You are an expert admissions consultant writing a Statement of Purpose on behalf of the candidate whose resume is given below. Ground every claim about the candidate in this resume. Do not invent degrees, employers, projects, grades or awards.

CANDIDATE RESUME:
{resume_text}"#;

/// Lead-in used when no resume is available.
pub const NO_RESUME_LEAD_IN: &str = r#"You are an expert admissions consultant writing a Statement of Purpose. No resume was provided for this candidate, so keep personal details generic and leave clearly marked placeholders such as [UNDERGRADUATE DEGREE] or [PROJECT NAME] wherever a specific fact about the candidate is needed."#;

/// Seven-paragraph outline. Replace: {lead_in}, {course}, {university}, {country}, {course_info}
pub const SOP_OUTLINE_TEMPLATE: &str = r#"{lead_in}

TARGET PROGRAMME
Course: {course}
University: {university}
Country: {country}
Course summary: {course_info}

Write a Statement of Purpose of roughly 1000 to 1200 words in exactly seven paragraphs, following this outline:

1. Introduction and industry context: open with the current state of the field that {course} prepares students for, and where the candidate wants to fit into it.
2. Academic journey: describe the candidate's education in chronological order, highlighting the subjects, projects and results that led to this field.
3. Why this course: explain how the curriculum of {course} fills the gaps in the candidate's knowledge, referring to specific elements of the course summary.
4. Why this university: explain what makes {university} the right place, such as faculty, research groups, facilities or industry links.
5. Why this country: explain why studying in {country} suits the candidate's academic and professional goals.
6. Future plans: describe short-term and long-term career goals after completing {course}.
7. Conclusion: close with a confident summary of the candidate's fit and commitment.

Write in the first person, in a sincere and specific tone. Use plain paragraphs without headings, bullet points or markdown."#;
