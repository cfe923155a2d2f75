//! Prompt rendering
//!
//! Builds the neutral creatives prompt from trial data

use anyhow::{bail, Result};

use crate::models::NeutralPrompt;

const CREATIVES_SYSTEM_PROMPT: &str = "\
You are an expert direct-response copywriter for clinical trial recruitment. \
Given a trial description and its eligibility criteria, produce a set of ad \
creatives. Each creative targets one plausible demographic drawn from the \
eligibility criteria, uses plain eighth-grade language, avoids medical \
jargon and any efficacy claims, and never promises treatment or cure. Use \
the provided output schema exactly.";

/// Render the creatives prompt for one trial
///
/// All three inputs are required; the trial description and eligibility land
/// in the user part verbatim.
pub fn creatives_prompt(
    customer_id: &str,
    description: &str,
    eligibility: &str,
) -> Result<NeutralPrompt> {
    if customer_id.is_empty() || description.is_empty() || eligibility.is_empty() {
        bail!(
            "Cannot create a prompt without description, eligibility, or customer_id"
        );
    }

    let user = format!(
        "Customer: {}\n\nTrial description:\n{}\n\nEligibility criteria:\n{}\n\n\
         Generate ad creatives for this trial.",
        customer_id, description, eligibility
    );

    Ok(NeutralPrompt {
        system: CREATIVES_SYSTEM_PROMPT.to_string(),
        user,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_trial_data() {
        let prompt = creatives_prompt("acmeinc", "A study of X.", "Adults 18+.").unwrap();
        assert!(prompt.user.contains("A study of X."));
        assert!(prompt.user.contains("Adults 18+."));
        assert!(prompt.user.contains("acmeinc"));
        assert!(!prompt.system.is_empty());
    }

    #[test]
    fn test_missing_inputs_rejected() {
        assert!(creatives_prompt("", "desc", "elig").is_err());
        assert!(creatives_prompt("acmeinc", "", "elig").is_err());
        assert!(creatives_prompt("acmeinc", "desc", "").is_err());
    }
}
