//! User personalization profile.
//!
//! The profile only parameterizes the system instruction. It never changes
//! windowing or retry behaviour.

use serde::{Deserialize, Serialize};

use crate::error::ProfileError;

/// Maximum number of interest tags on a profile.
pub const MAX_INTERESTS: usize = 20;

/// Maximum length of a single interest tag, in characters.
pub const MAX_INTEREST_CHARS: usize = 40;

/// Maximum length of the custom persona instruction, in characters.
pub const MAX_PERSONA_CHARS: usize = 500;

/// Per-user personalization data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Short topic tags, in the order the user gave them.
    #[serde(default)]
    pub interests: Vec<String>,
    /// Free-text custom instruction appended verbatim to the system prompt.
    #[serde(default)]
    pub persona: String,
}

impl UserProfile {
    /// Check the size limits on interests and persona.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.interests.len() > MAX_INTERESTS {
            return Err(ProfileError::TooManyInterests {
                max: MAX_INTERESTS,
                actual: self.interests.len(),
            });
        }

        for tag in &self.interests {
            if tag.trim().is_empty() {
                return Err(ProfileError::InvalidInterest(
                    "interest tags must not be blank".to_string(),
                ));
            }
            if tag.chars().count() > MAX_INTEREST_CHARS {
                return Err(ProfileError::InvalidInterest(format!(
                    "interest '{tag}' exceeds {MAX_INTEREST_CHARS} characters"
                )));
            }
        }

        let persona_len = self.persona.chars().count();
        if persona_len > MAX_PERSONA_CHARS {
            return Err(ProfileError::PersonaTooLong {
                max: MAX_PERSONA_CHARS,
                actual: persona_len,
            });
        }

        Ok(())
    }

    /// True when the profile contributes nothing to the system instruction.
    pub fn is_empty(&self) -> bool {
        self.interests.is_empty() && self.persona.trim().is_empty()
    }
}
