//! System instruction assembly.
//!
//! The instruction is the fixed tutor persona, optionally followed by an
//! interests clause and then the user's custom instruction. The order is
//! fixed; the only conditionals are presence checks.

use tutoria_types::profile::UserProfile;

/// Base tutor persona sent with every request.
pub const BASE_INSTRUCTION: &str = "You are Tutoria, a patient and encouraging computer science tutor. \
Explain concepts step by step, check the student's understanding with short questions, \
and prefer small, concrete examples over long lectures. When the student shares code, \
point out problems and guide them toward a fix instead of rewriting everything for them. \
Format code with fenced code blocks.";

/// Build the system instruction for an optional user profile.
pub fn build_system_instruction(profile: Option<&UserProfile>) -> String {
    let mut instruction = String::from(BASE_INSTRUCTION);

    let Some(profile) = profile else {
        return instruction;
    };

    if !profile.interests.is_empty() {
        instruction.push_str("\n\nThe student is interested in: ");
        instruction.push_str(&profile.interests.join(", "));
        instruction.push_str(". Draw on these interests for examples and analogies when it helps.");
    }

    if !profile.persona.trim().is_empty() {
        instruction.push_str("\n\nCustom instructions from the student: ");
        instruction.push_str(&profile.persona);
    }

    instruction
}
