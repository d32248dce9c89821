//! Configuration loading and management.

mod file;
mod paths;
mod types;
mod validate;

pub use file::{load_config_file, load_config_or_default, save_config};
pub use paths::{config_dir, config_file_path, resolve_config_path};
pub use types::{
    AlignmentConfig, AudioConfig, Config, MixConfig, ModelConfig, ModelsConfig, OutputConfig,
    ProcessingConfig, ReconcileConfig, ToolsConfig, VideoConfig,
};
pub use validate::sanitize_config;
