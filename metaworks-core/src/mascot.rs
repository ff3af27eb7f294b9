//! Prompt construction for the security mascot
//!
//! Pure string building. Calling the completion API is the server's job.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

const FRIENDLY_PROMPT: &str = "You are a friendly and approachable security mascot named \
\"Security Buddy\" for a cybersecurity compliance platform. Your tone is supportive, \
encouraging, and helpful. You explain security concepts in simple terms with relatable \
examples. You always maintain a positive outlook, even when discussing security threats or \
compliance gaps. Keep your responses concise (1-3 sentences) and focus on actionable advice.";

const SERIOUS_PROMPT: &str = "You are a professional and authoritative security mascot named \
\"Security Guardian\" for a cybersecurity compliance platform. Your tone is formal, precise, \
and fact-based. You use industry-standard terminology and refer to compliance frameworks \
precisely. You emphasize the importance of security best practices and the potential risks \
of non-compliance. Keep your responses concise (1-3 sentences) and highlight the most \
critical security considerations.";

const QUIRKY_PROMPT: &str = "You are a quirky and memorable security mascot named \
\"Security Sidekick\" for a cybersecurity compliance platform. Your tone is conversational \
with occasional humor and pop culture references that relate to cybersecurity. You make \
security concepts interesting and memorable through creative analogies. While you keep \
things light, you never downplay the importance of security. Keep your responses concise \
(1-3 sentences) with a unique twist that helps the advice stick.";

const COMPLIANCE_CONTEXT: &str = "\n\nConsider the following cybersecurity compliance \
frameworks if relevant to the question:\n\
- NCA ECC (National Cybersecurity Authority Essential Cybersecurity Controls)\n\
- SAMA (Saudi Arabian Monetary Authority Cyber Security Framework)\n\
- PDPL (Personal Data Protection Law)\n\
- ISO 27001 (Information Security Management)\n\
- ITGC (IT General Controls)\n\n\
When providing guidance, focus on practical tips for compliance and security improvements.";

const TIP_INSTRUCTION: &str = "\nYou are providing a helpful tip related to the user's \
current context in the cybersecurity compliance platform. Focus on providing ONE concise, \
helpful tip that is directly relevant to the context.";

/// Completion budget per answer.
pub const MAX_TOKENS: u32 = 150;

/// Completion budget per contextual tip.
pub const TIP_MAX_TOKENS: u32 = 100;
const TIP_TEMPERATURE: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Personality {
    #[default]
    Friendly,
    Serious,
    Quirky,
}

impl Personality {
    /// Lenient parse: anything unrecognised is friendly.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }

    pub fn system_prompt(&self) -> &'static str {
        match self {
            Self::Friendly => FRIENDLY_PROMPT,
            Self::Serious => SERIOUS_PROMPT,
            Self::Quirky => QUIRKY_PROMPT,
        }
    }

    pub fn temperature(&self) -> f32 {
        match self {
            Self::Quirky => 0.8,
            _ => 0.5,
        }
    }
}

impl FromStr for Personality {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "friendly" => Ok(Self::Friendly),
            "serious" => Ok(Self::Serious),
            "quirky" => Ok(Self::Quirky),
            _ => Err(CoreError::unknown_variant("personality", s)),
        }
    }
}

/// A ready-to-send chat prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct MascotPrompt {
    pub personality: Personality,
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl MascotPrompt {
    pub fn new(personality: Personality, question: &str) -> Result<Self> {
        let question = question.trim();
        if question.is_empty() {
            return Err(CoreError::invalid_input("question is required"));
        }

        Ok(Self {
            personality,
            system: format!("{}{}", personality.system_prompt(), COMPLIANCE_CONTEXT),
            user: question.to_owned(),
            max_tokens: MAX_TOKENS,
            temperature: personality.temperature(),
        })
    }

    /// A single tip for the screen the user is on, e.g. "Risk Register".
    pub fn contextual_tip(personality: Personality, context: &str) -> Result<Self> {
        let context = context.trim();
        if context.is_empty() {
            return Err(CoreError::invalid_input("context is required"));
        }

        Ok(Self {
            personality,
            system: format!("{}{}", personality.system_prompt(), TIP_INSTRUCTION),
            user: format!(
                "I'm currently viewing the \"{context}\" section of the cybersecurity \
                 compliance platform. Provide a relevant security tip or guidance for this context."
            ),
            max_tokens: TIP_MAX_TOKENS,
            temperature: TIP_TEMPERATURE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_personality_falls_back_to_friendly() {
        assert_eq!(Personality::from_name("grumpy"), Personality::Friendly);
        assert_eq!(Personality::from_name("Serious"), Personality::Serious);
    }

    #[test]
    fn prompt_includes_persona_and_context() {
        let prompt = MascotPrompt::new(Personality::Serious, "  What is ECC?  ").unwrap();
        assert!(prompt.system.contains("Security Guardian"));
        assert!(prompt.system.contains("NCA ECC"));
        assert_eq!(prompt.user, "What is ECC?");
        assert_eq!(prompt.max_tokens, 150);
        assert_eq!(prompt.temperature, 0.5);
    }

    #[test]
    fn quirky_runs_hotter() {
        let prompt = MascotPrompt::new(Personality::Quirky, "hi").unwrap();
        assert_eq!(prompt.temperature, 0.8);
    }

    #[test]
    fn empty_question_rejected() {
        let err = MascotPrompt::new(Personality::Friendly, "   ").unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput { .. }));
    }

    #[test]
    fn contextual_tip_prompt() {
        let prompt = MascotPrompt::contextual_tip(Personality::Quirky, " Risk Register ").unwrap();
        assert!(prompt.system.contains("Security Sidekick"));
        assert!(prompt.system.contains("ONE concise"));
        assert!(prompt.user.contains("\"Risk Register\" section"));
        assert_eq!(prompt.max_tokens, 100);
        assert_eq!(prompt.temperature, 0.5);
        assert!(MascotPrompt::contextual_tip(Personality::Friendly, "").is_err());
    }
}
