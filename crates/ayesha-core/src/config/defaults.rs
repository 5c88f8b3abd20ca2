//! Serde default functions for config fields.

pub(super) fn default_data_dir() -> String {
    "~/.ayesha".to_string()
}
pub(super) fn default_log_level() -> String {
    "info".to_string()
}
pub(super) fn default_true() -> bool {
    true
}
pub(super) fn default_base_url() -> String {
    "https://cloud.olakrutrim.com/v1".to_string()
}
pub(super) fn default_model() -> String {
    "Meta-Llama-3.1-70B-Instruct".to_string()
}
pub(super) fn default_max_tokens() -> u32 {
    256
}
pub(super) fn default_timeout_secs() -> u64 {
    120
}
pub(super) fn default_image_endpoint() -> String {
    "https://cloud.olakrutrim.com/v1/images/generations/diffusion".to_string()
}
pub(super) fn default_image_model() -> String {
    "diffusion1XL".to_string()
}
pub(super) fn default_image_size() -> u32 {
    1024
}
pub(super) fn default_image_command() -> String {
    "!generateimage".to_string()
}
pub(super) fn default_image_triggers() -> Vec<String> {
    vec![
        "create an image of".to_string(),
        "draw".to_string(),
        "generate a picture of".to_string(),
    ]
}
pub(super) fn default_console_id() -> u64 {
    1
}
pub(super) fn default_console_author() -> u64 {
    42
}
