//! Range and cross-field checks run after parsing. Every failure is
//! collected into one `ConfigError::ValidationError`.

mod helpers;


use crate::schema::MiloConfig;
use helpers::check_range;
use milo_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &MiloConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_assistant(&mut errors, config);
    validate_reveal(&mut errors, config);
    validate_voice(&mut errors, config);
    validate_panel(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_assistant(errors: &mut Vec<String>, config: &MiloConfig) {
    let a = &config.assistant;
    check_range(errors, "assistant.context_window", a.context_window, 1..=100);
    check_range(errors, "assistant.max_tokens", a.max_tokens, 64..=32000);
    if a.placeholder_title.trim().is_empty() {
        errors.push("assistant.placeholder_title must not be empty".into());
    }
    if let Some(secs) = a.inference_timeout_secs {
        check_range(errors, "assistant.inference_timeout_secs", secs, 1..=3600);
    }
}

fn validate_reveal(errors: &mut Vec<String>, config: &MiloConfig) {
    let r = &config.reveal;
    check_range(errors, "reveal.initial_delay_ms", r.initial_delay_ms, 0..=5000);
    check_range(errors, "reveal.sentence_pause_ms", r.sentence_pause_ms, 0..=2000);
    check_range(errors, "reveal.comma_pause_ms", r.comma_pause_ms, 0..=2000);
    check_range(errors, "reveal.newline_pause_ms", r.newline_pause_ms, 0..=2000);
    check_range(errors, "reveal.char_pause_max_ms", r.char_pause_max_ms, 0..=1000);
    if r.char_pause_min_ms > r.char_pause_max_ms {
        errors.push(format!(
            "reveal.char_pause_min_ms = {} exceeds reveal.char_pause_max_ms = {}",
            r.char_pause_min_ms, r.char_pause_max_ms
        ));
    }
    check_range(errors, "reveal.progress_every", r.progress_every, 1..=100);
    check_range(errors, "reveal.voice_cache_capacity", r.voice_cache_capacity, 1..=10_000);
}

fn validate_voice(errors: &mut Vec<String>, config: &MiloConfig) {
    check_range(errors, "voice.rate", config.voice.rate, 0.1..=4.0);
}

fn validate_panel(errors: &mut Vec<String>, config: &MiloConfig) {
    check_range(errors, "panel.outside_click_grace_ms", config.panel.outside_click_grace_ms, 0..=2000);
}
