pub(crate) const CLOSING_MESSAGE: &str =
    "Interview completed. Generating your performance summary...";
pub(crate) const FALLBACK_SUMMARY: &str = "Interview complete!";
pub(crate) const MISSING_SESSION_GUIDANCE: &str =
    "Missing session id (analyze a resume before starting the interview).";
pub(crate) const MISSING_RESUME_GUIDANCE: &str =
    "Missing resume text (upload a resume before starting the interview).";
