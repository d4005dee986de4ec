//! Engine configuration.
//!
//! Loads settings from a toml file or falls back to defaults. The default
//! provider registries reproduce the hosted free-model orderings the
//! service ships with; hosts override them per deployment. Provider lists
//! are read-only after load.

use crate::cache::ResponseCache;
use crate::chain::ProviderChain;
use crate::orchestrator::PipelineOrchestrator;
use crate::providers::{HuggingFaceProvider, OpenRouterProvider, Provider};
use crate::resolver::CapabilityResolver;
use crate::safety::SafetyInterceptor;
use mindmirror_common::{Capability, ProviderSpec, ProviderTask};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Default config file path.
pub const CONFIG_PATH: &str = "/etc/mindmirror/config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_bound")]
    pub size_bound: usize,
}

fn default_cache_bound() -> usize {
    100
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            size_bound: default_cache_bound(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Constant backoff before the single transient-failure retry.
    #[serde(default = "default_retry_backoff_secs")]
    pub backoff_secs: u64,
}

fn default_retry_backoff_secs() -> u64 {
    1
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            backoff_secs: default_retry_backoff_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Synthesize the reflection aloud as a fourth stage.
    #[serde(default)]
    pub enable_speech: bool,
}

/// Which adapter fronts a provider entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Huggingface,
    Openrouter,
}

/// One provider entry in a capability's chain. List position is the
/// priority: earlier entries are tried first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub id: String,
    pub kind: ProviderKind,
    /// Full endpoint URL; derived from the kind and id when omitted.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
    /// Ceiling for call + backoff + retry; derived when omitted.
    #[serde(default)]
    pub total_budget_secs: Option<u64>,
    #[serde(default = "default_retryable")]
    pub retryable: bool,
    /// Request/decoder shape; derived from the capability when omitted.
    #[serde(default)]
    pub task: Option<ProviderTask>,
}

fn default_call_timeout_secs() -> u64 {
    12
}

fn default_retryable() -> bool {
    true
}

impl ProviderConfig {
    fn to_spec(
        &self,
        capability: Capability,
        priority: u32,
        api_token: Option<String>,
    ) -> ProviderSpec {
        let task = self
            .task
            .unwrap_or_else(|| default_task(capability, self.kind));
        let endpoint = self
            .endpoint
            .clone()
            .unwrap_or_else(|| default_endpoint(self.kind, &self.id));

        let mut spec = ProviderSpec::new(&self.id, priority, task)
            .with_call_timeout(Duration::from_secs(self.call_timeout_secs))
            .with_retryable(self.retryable)
            .with_endpoint(endpoint)
            .with_api_token(api_token);
        if let Some(budget) = self.total_budget_secs {
            spec = spec.with_total_budget(Duration::from_secs(budget));
        }
        spec
    }
}

fn default_task(capability: Capability, kind: ProviderKind) -> ProviderTask {
    match capability {
        Capability::Emotion => ProviderTask::TextClassification,
        Capability::Reflection => match kind {
            ProviderKind::Openrouter => ProviderTask::ChatCompletion,
            ProviderKind::Huggingface => ProviderTask::TextGeneration,
        },
        Capability::Art => ProviderTask::TextToImage,
        Capability::Transcription => ProviderTask::AutomaticSpeechRecognition,
        Capability::Speech => ProviderTask::TextToSpeech,
    }
}

fn default_endpoint(kind: ProviderKind, id: &str) -> String {
    match kind {
        ProviderKind::Huggingface => {
            format!("https://api-inference.huggingface.co/models/{}", id)
        }
        ProviderKind::Openrouter => "https://openrouter.ai/api/v1".to_string(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Tokens may live here or in the environment
    /// (HUGGINGFACE_HUB_TOKEN / OPENROUTER_API_KEY).
    #[serde(default)]
    pub huggingface_token: Option<String>,
    #[serde(default)]
    pub openrouter_api_key: Option<String>,

    #[serde(default = "default_emotion_providers")]
    pub emotion: Vec<ProviderConfig>,
    #[serde(default = "default_reflection_providers")]
    pub reflection: Vec<ProviderConfig>,
    #[serde(default = "default_art_providers")]
    pub art: Vec<ProviderConfig>,
    #[serde(default = "default_transcription_providers")]
    pub transcription: Vec<ProviderConfig>,
    #[serde(default = "default_speech_providers")]
    pub speech: Vec<ProviderConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            retry: RetryConfig::default(),
            pipeline: PipelineConfig::default(),
            huggingface_token: None,
            openrouter_api_key: None,
            emotion: default_emotion_providers(),
            reflection: default_reflection_providers(),
            art: default_art_providers(),
            transcription: default_transcription_providers(),
            speech: default_speech_providers(),
        }
    }
}

fn hf(id: &str, call_timeout_secs: u64) -> ProviderConfig {
    ProviderConfig {
        id: id.to_string(),
        kind: ProviderKind::Huggingface,
        endpoint: None,
        call_timeout_secs,
        total_budget_secs: None,
        retryable: true,
        task: None,
    }
}

fn openrouter(id: &str, call_timeout_secs: u64) -> ProviderConfig {
    ProviderConfig {
        id: id.to_string(),
        kind: ProviderKind::Openrouter,
        endpoint: None,
        call_timeout_secs,
        total_budget_secs: None,
        retryable: true,
        task: None,
    }
}

fn default_emotion_providers() -> Vec<ProviderConfig> {
    vec![
        hf("j-hartmann/emotion-english-distilroberta-base", 12),
        hf("nateraw/bert-base-uncased-emotion", 12),
        hf("bhadresh-savani/distilbert-base-uncased-emotion", 12),
    ]
}

fn default_reflection_providers() -> Vec<ProviderConfig> {
    vec![
        openrouter("google/gemini-flash-1.5", 12),
        openrouter("meta-llama/llama-3.1-8b-instruct:free", 12),
        openrouter("mistralai/mistral-7b-instruct:free", 12),
        hf("HuggingFaceH4/zephyr-7b-beta", 30),
        hf("mistralai/Mistral-7B-Instruct-v0.2", 30),
        hf("google/flan-t5-base", 15),
    ]
}

fn default_art_providers() -> Vec<ProviderConfig> {
    vec![
        hf("stabilityai/stable-diffusion-2-1-base", 45),
        hf("CompVis/stable-diffusion-v1-4", 45),
        hf("runwayml/stable-diffusion-v1-5", 45),
    ]
}

fn default_transcription_providers() -> Vec<ProviderConfig> {
    vec![
        hf("openai/whisper-tiny", 15),
        hf("openai/whisper-base", 20),
        hf("facebook/wav2vec2-base-960h", 15),
    ]
}

fn default_speech_providers() -> Vec<ProviderConfig> {
    vec![
        hf("facebook/fastspeech2-en-ljspeech", 20),
        hf("espnet/kan-bayashi_ljspeech_vits", 20),
    ]
}

impl EngineConfig {
    /// Load from a toml file, warning and defaulting on any problem. A
    /// missing or broken config never stops the engine.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    info!("loaded configuration from {}", path.display());
                    config
                }
                Err(err) => {
                    warn!("bad config at {}: {}; using defaults", path.display(), err);
                    Self::default()
                }
            },
            Err(_) => {
                info!("no config at {}; using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn providers_for(&self, capability: Capability) -> &[ProviderConfig] {
        match capability {
            Capability::Emotion => &self.emotion,
            Capability::Reflection => &self.reflection,
            Capability::Art => &self.art,
            Capability::Transcription => &self.transcription,
            Capability::Speech => &self.speech,
        }
    }

    fn token_for(&self, kind: ProviderKind) -> Option<String> {
        match kind {
            ProviderKind::Huggingface => self
                .huggingface_token
                .clone()
                .or_else(|| std::env::var("HUGGINGFACE_HUB_TOKEN").ok()),
            ProviderKind::Openrouter => self
                .openrouter_api_key
                .clone()
                .or_else(|| std::env::var("OPENROUTER_API_KEY").ok()),
        }
    }

    /// Materialize the read-only spec list for one capability. List
    /// position becomes the priority.
    pub fn build_specs(&self, capability: Capability) -> Vec<ProviderSpec> {
        self.providers_for(capability)
            .iter()
            .enumerate()
            .map(|(index, cfg)| {
                cfg.to_spec(capability, index as u32, self.token_for(cfg.kind))
            })
            .collect()
    }

    pub fn build_chain(&self, capability: Capability) -> ProviderChain {
        let providers: Vec<Arc<dyn Provider>> = self
            .providers_for(capability)
            .iter()
            .enumerate()
            .map(|(index, cfg)| {
                let spec = cfg.to_spec(capability, index as u32, self.token_for(cfg.kind));
                match cfg.kind {
                    ProviderKind::Huggingface => {
                        Arc::new(HuggingFaceProvider::new(spec)) as Arc<dyn Provider>
                    }
                    ProviderKind::Openrouter => {
                        Arc::new(OpenRouterProvider::new(spec)) as Arc<dyn Provider>
                    }
                }
            })
            .collect();

        ProviderChain::new(capability, providers)
            .with_retry_backoff(Duration::from_secs(self.retry.backoff_secs))
    }

    pub fn build_resolver(
        &self,
        capability: Capability,
        cache: Arc<ResponseCache>,
        safety: Arc<SafetyInterceptor>,
    ) -> CapabilityResolver {
        CapabilityResolver::new(capability, self.build_chain(capability), cache, safety)
    }

    /// Build the full pipeline with shared cache and safety interceptor.
    pub fn build_orchestrator(&self) -> PipelineOrchestrator {
        let cache = Arc::new(ResponseCache::new(self.cache.size_bound));
        let safety = Arc::new(SafetyInterceptor::new());

        let orchestrator = PipelineOrchestrator::new(
            Arc::new(self.build_resolver(Capability::Emotion, cache.clone(), safety.clone())),
            Arc::new(self.build_resolver(Capability::Reflection, cache.clone(), safety.clone())),
            Arc::new(self.build_resolver(Capability::Art, cache.clone(), safety.clone())),
        )
        .with_safety(safety.clone());

        if self.pipeline.enable_speech {
            orchestrator.with_speech(Arc::new(self.build_resolver(
                Capability::Speech,
                cache,
                safety,
            )))
        } else {
            orchestrator
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_registries_match_shipped_orderings() {
        let config = EngineConfig::default();
        assert_eq!(config.emotion.len(), 3);
        assert_eq!(config.reflection.len(), 6);
        assert_eq!(config.art.len(), 3);
        assert_eq!(config.transcription.len(), 3);
        assert_eq!(config.speech.len(), 2);

        // OpenRouter free models lead the reflection chain.
        assert_eq!(config.reflection[0].kind, ProviderKind::Openrouter);
        assert_eq!(config.reflection[0].id, "google/gemini-flash-1.5");
        assert_eq!(config.reflection[3].kind, ProviderKind::Huggingface);
    }

    #[test]
    fn test_build_specs_assigns_list_position_as_priority() {
        let config = EngineConfig::default();
        let specs = config.build_specs(Capability::Transcription);

        assert_eq!(specs[0].priority, 0);
        assert_eq!(specs[0].id, "openai/whisper-tiny");
        assert_eq!(specs[1].priority, 1);
        assert_eq!(specs[1].call_timeout, Duration::from_secs(20));
        assert_eq!(
            specs[0].endpoint,
            "https://api-inference.huggingface.co/models/openai/whisper-tiny"
        );
    }

    #[test]
    fn test_default_tasks_per_capability() {
        let config = EngineConfig::default();
        assert_eq!(
            config.build_specs(Capability::Emotion)[0].task,
            ProviderTask::TextClassification
        );
        assert_eq!(
            config.build_specs(Capability::Reflection)[0].task,
            ProviderTask::ChatCompletion
        );
        assert_eq!(
            config.build_specs(Capability::Reflection)[3].task,
            ProviderTask::TextGeneration
        );
        assert_eq!(
            config.build_specs(Capability::Art)[0].task,
            ProviderTask::TextToImage
        );
    }

    #[test]
    fn test_parse_partial_toml_keeps_defaults_elsewhere() {
        let config: EngineConfig = toml::from_str(
            r#"
            [cache]
            size_bound = 10

            [[emotion]]
            id = "custom/emotion-model"
            kind = "huggingface"
            call_timeout_secs = 5
            retryable = false
            "#,
        )
        .unwrap();

        assert_eq!(config.cache.size_bound, 10);
        assert_eq!(config.emotion.len(), 1);
        assert_eq!(config.emotion[0].id, "custom/emotion-model");
        assert!(!config.emotion[0].retryable);
        // Untouched sections keep their defaults.
        assert_eq!(config.retry.backoff_secs, 1);
        assert_eq!(config.reflection.len(), 6);
    }

    #[test]
    fn test_load_missing_file_defaults() {
        let config = EngineConfig::load(Path::new("/nonexistent/mindmirror.toml"));
        assert_eq!(config.cache.size_bound, 100);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[pipeline]\nenable_speech = true").unwrap();

        let config = EngineConfig::load(file.path());
        assert!(config.pipeline.enable_speech);
    }

    #[test]
    fn test_load_bad_file_warns_and_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "this is not toml [[").unwrap();

        let config = EngineConfig::load(file.path());
        assert_eq!(config.cache.size_bound, 100);
    }
}
