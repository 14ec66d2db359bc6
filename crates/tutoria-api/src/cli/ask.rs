//! One-shot question command.
//!
//! Runs a single-turn history through the same generator the server uses,
//! with the retry, fallback, and deadline rules intact. Nothing is stored.

use std::time::Instant;

use anyhow::{Result, bail};
use console::style;
use tokio_util::sync::CancellationToken;

use tutoria_types::config::AppConfig;
use tutoria_types::llm::Message;
use tutoria_types::profile::UserProfile;

use crate::state::build_generator;

/// Ask the tutor one question and print the reply.
///
/// # Examples
///
/// ```bash
/// tutoria ask "What is a stack?"
/// tutoria ask "Explain recursion" --interest music --persona "Use short sentences."
/// tutoria ask "What is a queue?" --json
/// ```
pub async fn ask(
    config: &AppConfig,
    question: &str,
    interests: Vec<String>,
    persona: Option<String>,
    json: bool,
) -> Result<()> {
    if question.trim().is_empty() {
        bail!("Question must not be empty");
    }

    let profile = UserProfile {
        interests,
        persona: persona.unwrap_or_default(),
    };
    profile.validate()?;

    let generator = build_generator(config)?;
    let history = [Message::user(question)];

    // Ctrl+C abandons the request instead of waiting out retries.
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let started = Instant::now();
    let reply = generator
        .generate_with_cancel(&history, (!profile.is_empty()).then_some(&profile), &cancel)
        .await?;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if json {
        let out = serde_json::json!({
            "question": question,
            "reply": reply,
            "models": generator.settings().models,
            "elapsed_ms": elapsed_ms,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("  {} {}", style("You:").bold(), question);
    println!();
    println!("  {}", style("Tutor:").cyan().bold());
    for line in reply.lines() {
        println!("  {line}");
    }
    println!();
    println!(
        "  {}",
        style(format!("answered in {:.1}s", elapsed_ms as f64 / 1000.0)).dim()
    );

    Ok(())
}
