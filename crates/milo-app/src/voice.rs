use milo_assistant::{VoiceOutput, VoiceSettings};

/// Speaks through the system speech command where one exists.
pub struct CommandVoice;

impl VoiceOutput for CommandVoice {
    #[cfg(target_os = "macos")]
    fn speak(&self, text: &str, settings: &VoiceSettings) {
        let mut cmd = tokio::process::Command::new("say");
        if settings.voice != "default" {
            cmd.arg("-v").arg(&settings.voice);
        }
        // `say` takes words per minute; 175 is its normal rate.
        let wpm = (175.0 * settings.rate.clamp(0.1, 4.0)).round() as u32;
        cmd.arg("-r").arg(wpm.to_string()).arg(text);
        if let Err(e) = cmd.spawn() {
            tracing::warn!(error = %e, "failed to start speech");
        }
    }

    #[cfg(not(target_os = "macos"))]
    fn speak(&self, text: &str, settings: &VoiceSettings) {
        tracing::info!(
            voice = %settings.voice,
            chars = text.chars().count(),
            "speech output is not available on this platform"
        );
    }
}
