//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# MILO Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[assistant]
# context_window = 10            # 1-100 most recent messages sent as history
# placeholder_title = "New Chat"
# inference_timeout_secs = 60    # unset: wait for the model indefinitely
# model = "claude-sonnet-4-20250514"
# max_tokens = 1024              # 64-32000

[reveal]
# enabled = true
# initial_delay_ms = 100
# sentence_pause_ms = 80         # after . ! ?
# comma_pause_ms = 40
# newline_pause_ms = 60
# char_pause_min_ms = 15
# char_pause_max_ms = 30
# progress_every = 5             # characters between scroll updates
# voice_cache_capacity = 100

[voice]
# enabled = false
# voice = "default"
# rate = 1.0                     # 0.1-4.0

[panel]
# outside_click_grace_ms = 150   # 0-2000
# start_expanded = false

[storage]
# backend = "json"               # json | memory
# path = "/path/to/conversations.json"

[logging]
# level = "INFO"                 # TRACE | DEBUG | INFO | WARNING | ERROR
"##
    .to_string()
}
