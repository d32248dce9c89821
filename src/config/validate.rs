//! Configuration validation.
//!
//! Invalid values never abort a run. Each one is replaced by its default
//! and reported with a warning.

use crate::config::{
    AlignmentConfig, Config, MixConfig, ModelConfig, ModelsConfig, ProcessingConfig,
    ReconcileConfig,
};
use tracing::warn;

/// Replace every invalid value in `config` with its default.
#[must_use]
pub fn sanitize_config(mut config: Config) -> Config {
    sanitize_processing(&mut config.processing);
    sanitize_alignment("alignment", &mut config.alignment, &AlignmentConfig::default());

    let reconcile_defaults = ReconcileConfig::default();
    let mut reconcile = config.reconcile.alignment();
    sanitize_alignment("reconcile", &mut reconcile, &reconcile_defaults.alignment());
    config.reconcile.set_alignment(reconcile);

    let default_offset = reconcile_defaults.max_offset_ms;
    if !config.reconcile.max_offset_ms.is_finite() || config.reconcile.max_offset_ms < 0.0 {
        warn!(
            "reconcile.max_offset_ms must be non-negative, got {}; using {default_offset}",
            config.reconcile.max_offset_ms
        );
        config.reconcile.max_offset_ms = default_offset;
    }

    sanitize_mix(&mut config.mix);
    sanitize_models(&mut config.models);

    if config.output.format.trim().is_empty() {
        let default = crate::config::OutputConfig::default().format;
        warn!("output.format is empty; using {default}");
        config.output.format = default;
    }

    config
}

fn sanitize_processing(processing: &mut ProcessingConfig) {
    let defaults = ProcessingConfig::default();

    if processing.workers == 0 {
        warn!("processing.workers must be at least 1; using {}", defaults.workers);
        processing.workers = defaults.workers;
    }

    if !processing.segment_duration.is_finite() || processing.segment_duration <= 0.0 {
        warn!(
            "processing.segment_duration must be positive, got {}; using {}",
            processing.segment_duration, defaults.segment_duration
        );
        processing.segment_duration = defaults.segment_duration;
    }

    if processing.model_attempts == 0 {
        warn!(
            "processing.model_attempts must be at least 1; using {}",
            defaults.model_attempts
        );
        processing.model_attempts = defaults.model_attempts;
    }
}

fn sanitize_alignment(section: &str, alignment: &mut AlignmentConfig, defaults: &AlignmentConfig) {
    let fields = [
        ("max_delay_secs", &mut alignment.max_delay_secs, defaults.max_delay_secs),
        ("confidence_ratio", &mut alignment.confidence_ratio, defaults.confidence_ratio),
        ("window_secs", &mut alignment.window_secs, defaults.window_secs),
        ("envelope_secs", &mut alignment.envelope_secs, defaults.envelope_secs),
    ];
    for (name, value, default) in fields {
        if !value.is_finite() || *value <= 0.0 {
            warn!("{section}.{name} must be positive, got {value}; using {default}");
            *value = default;
        }
    }

    if !alignment.min_coefficient.is_finite() || alignment.min_coefficient < 0.0 {
        warn!(
            "{section}.min_coefficient must be non-negative, got {}; using {}",
            alignment.min_coefficient, defaults.min_coefficient
        );
        alignment.min_coefficient = defaults.min_coefficient;
    }
}

fn sanitize_mix(mix: &mut MixConfig) {
    let defaults = MixConfig::default();
    let valid = |w: f32| w.is_finite() && w >= 0.0;

    if !valid(mix.primary_weight) || !valid(mix.secondary_weight) {
        warn!(
            "mix weights must be non-negative, got {} / {}; using {} / {}",
            mix.primary_weight, mix.secondary_weight, defaults.primary_weight, defaults.secondary_weight
        );
        *mix = defaults;
    }
}

fn sanitize_models(models: &mut ModelsConfig) {
    let defaults = ModelsConfig::default();
    sanitize_model("spleeter", &mut models.spleeter, &defaults.spleeter);
    sanitize_model("demucs", &mut models.demucs, &defaults.demucs);
}

fn sanitize_model(name: &str, model: &mut ModelConfig, default: &ModelConfig) {
    if model.model.trim().is_empty() {
        model.model.clone_from(&default.model);
    }
    if model.python.trim().is_empty() {
        warn!("models.{name}.python is empty; using {}", default.python);
        model.python.clone_from(&default.python);
    }
}
