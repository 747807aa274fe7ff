// Resume analysis prompt templates.

pub const ANALYSIS_SYSTEM: &str = "\
You are an experienced technical recruiter and Applicant Tracking System (ATS) expert. \
You evaluate resumes against a target role and report findings as structured JSON. \
You MUST respond with valid JSON only — no markdown fences, no explanations.";

pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the following resume and provide insights:
- Matching jobs for the given resume
- Missing skills for the target role
- Suggested jobs for the given resume
- Readability score for the given resume (always above 50)
- ATS (Applicant Tracking System) compatibility
- Skill comparison with the target role: '{job_description}' as short pointers, no tables
- No additional text or explanation, return ONLY valid JSON

Return the JSON response with exactly these fields and this structure:

{
  "score": number,                  // ATS score, 0-100
  "missingKeywords": [string],      // Keywords missing from the resume
  "suggestedJobs": [string],        // Suitable job titles
  "readabilityScore": number,       // Readability score (above 50)
  "grammarIssues": string,          // Short description of grammar issues, if any
  "atsFriendly": "true" | "false",  // ATS compatibility, as a string
  "detailedDescription": string,    // End-to-end summary of the resume

  "personalInfo": {
    "name": string | null,
    "email": string | null,
    "phone": string | null,
    "location": string | null
  },

  "education": [
    {
      "degree": string | null,
      "branch": string | null,
      "university": string | null,
      "year": string | null,
      "cgpa": string | null
    }
  ],

  "experience": [
    {
      "role": string,
      "company": string,
      "description": string
    }
  ],

  "skills": {
    "technicalSkills": [string],
    "softSkills": [string],
    "tools": [string]
  },

  "sectionWiseScore": {
    "Education": number,
    "Experience": number,
    "Skills": number,
    "Projects": number,
    "Achievements": number,
    "Other": number
  }
}

Resume:
"""{resume_text}""""#;

/// Fills the analysis template. The job description is substituted first so a
/// resume containing the literal `{job_description}` is left untouched.
pub fn build_analysis_prompt(resume_text: &str, job_description: &str) -> String {
    let job_description = if job_description.trim().is_empty() {
        "not specified"
    } else {
        job_description.trim()
    };
    ANALYSIS_PROMPT_TEMPLATE
        .replace("{job_description}", job_description)
        .replace("{resume_text}", resume_text)
}
