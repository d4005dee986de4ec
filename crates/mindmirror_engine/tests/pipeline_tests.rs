//! End-to-end orchestration: stage chaining, partial failure containment,
//! deadlines, and fallback signaling.

use mindmirror_engine::cache::ResponseCache;
use mindmirror_engine::chain::ProviderChain;
use mindmirror_engine::orchestrator::PipelineOrchestrator;
use mindmirror_engine::providers::stub::{StubOutcome, StubProvider};
use mindmirror_engine::providers::Provider;
use mindmirror_engine::resolver::CapabilityResolver;
use mindmirror_engine::safety::SafetyInterceptor;
use mindmirror_common::{
    validate, Capability, DegradationTier, Payload, ProviderSpec, ProviderTask,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

fn spec(id: &str) -> ProviderSpec {
    ProviderSpec::new(id, 0, ProviderTask::TextGeneration)
        .with_call_timeout(Duration::from_millis(200))
        .with_total_budget(Duration::from_secs(2))
}

fn emotion_payload() -> Payload {
    json!({"emotions": ["joy", "gratitude"], "scores": {"joy": 0.85, "gratitude": 0.72}})
        .as_object()
        .unwrap()
        .clone()
}

fn reflection_payload() -> Payload {
    json!({
        "reflection": "Joy like this is worth savoring.",
        "poem_line": "Sunlight settles where you let it.",
        "micro_actions": [
            {"label": "Savor", "duration_seconds": 120, "instruction": "Replay the best moment of today."}
        ],
        "severity": "calm",
        "tone": "creative"
    })
    .as_object()
    .unwrap()
    .clone()
}

fn art_payload() -> Payload {
    json!({"image": "aW1hZ2UtYnl0ZXM=", "format": "png"})
        .as_object()
        .unwrap()
        .clone()
}

fn speech_payload() -> Payload {
    json!({"audio": "UklGRgAAAAA=", "format": "wav"})
        .as_object()
        .unwrap()
        .clone()
}

struct Fixture {
    emotion: Arc<StubProvider>,
    reflection: Arc<StubProvider>,
    art: Arc<StubProvider>,
    speech: Arc<StubProvider>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            emotion: Arc::new(StubProvider::new(
                spec("emotion-model"),
                StubOutcome::Payload(emotion_payload()),
            )),
            reflection: Arc::new(StubProvider::new(
                spec("reflection-model"),
                StubOutcome::Payload(reflection_payload()),
            )),
            art: Arc::new(StubProvider::new(
                spec("art-model"),
                StubOutcome::Payload(art_payload()),
            )),
            speech: Arc::new(StubProvider::new(
                spec("speech-model"),
                StubOutcome::Payload(speech_payload()),
            )),
        }
    }

    fn orchestrator(&self, with_speech: bool) -> PipelineOrchestrator {
        let cache = Arc::new(ResponseCache::default());
        let safety = Arc::new(SafetyInterceptor::new());
        let resolver = |capability: Capability, provider: &Arc<StubProvider>| {
            let providers: Vec<Arc<dyn Provider>> =
                vec![Arc::clone(provider) as Arc<dyn Provider>];
            Arc::new(CapabilityResolver::new(
                capability,
                ProviderChain::new(capability, providers)
                    .with_retry_backoff(Duration::from_millis(10)),
                cache.clone(),
                safety.clone(),
            ))
        };

        let orchestrator = PipelineOrchestrator::new(
            resolver(Capability::Emotion, &self.emotion),
            resolver(Capability::Reflection, &self.reflection),
            resolver(Capability::Art, &self.art),
        )
        .with_safety(safety.clone());

        if with_speech {
            orchestrator.with_speech(resolver(Capability::Speech, &self.speech))
        } else {
            orchestrator
        }
    }
}

#[tokio::test]
async fn test_happy_path_runs_all_stages() {
    let fixture = Fixture::new();
    let orchestrator = fixture.orchestrator(false);

    let result = orchestrator
        .run("Celebrated with friends today, so grateful", BTreeMap::new())
        .await;

    assert!(!result.fallback_used);
    assert!(result.errors.is_empty());
    for capability in [Capability::Emotion, Capability::Reflection, Capability::Art] {
        let stage = result.get(capability).unwrap();
        assert_eq!(stage.tier, DegradationTier::Primary);
        assert!(validate(capability, &stage.payload));
    }
    assert_eq!(
        result.model_versions()[&Capability::Reflection],
        "reflection-model"
    );
    assert_eq!(fixture.emotion.call_count(), 1);
    assert_eq!(fixture.reflection.call_count(), 1);
    assert_eq!(fixture.art.call_count(), 1);
}

#[tokio::test]
async fn test_speech_stage_included_when_enabled() {
    let fixture = Fixture::new();
    let result = fixture
        .orchestrator(true)
        .run("good day", BTreeMap::new())
        .await;

    let speech = result.get(Capability::Speech).unwrap();
    assert_eq!(speech.tier, DegradationTier::Primary);
    assert_eq!(fixture.speech.call_count(), 1);
}

#[tokio::test]
async fn test_art_panic_does_not_abort_pipeline() {
    let fixture = Fixture::new();
    fixture.art.push_outcome(StubOutcome::Panic);

    let result = fixture
        .orchestrator(false)
        .run("ordinary tuesday", BTreeMap::new())
        .await;

    // Emotion and reflection are intact.
    assert_eq!(
        result.get(Capability::Emotion).unwrap().tier,
        DegradationTier::Primary
    );
    assert_eq!(
        result.get(Capability::Reflection).unwrap().tier,
        DegradationTier::Primary
    );

    // Art degraded to its placeholder with one recorded error.
    let art = result.get(Capability::Art).unwrap();
    assert_eq!(art.tier, DegradationTier::Minimal);
    assert!(validate(Capability::Art, &art.payload));
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].capability, Capability::Art);
    assert!(result.fallback_used);
}

#[tokio::test]
async fn test_degraded_stage_flips_fallback_used_without_errors() {
    let fixture = Fixture::new();
    fixture.emotion.push_outcome(StubOutcome::Malformed);

    let result = fixture
        .orchestrator(false)
        .run("feeling fine", BTreeMap::new())
        .await;

    // Emotion fell to its local keyword tier; that's degradation, not an error.
    assert_eq!(
        result.get(Capability::Emotion).unwrap().tier,
        DegradationTier::Local
    );
    assert!(result.errors.is_empty());
    assert!(result.fallback_used);
}

#[tokio::test]
async fn test_zero_deadline_skips_every_stage_synchronously() {
    let fixture = Fixture::new();

    let result = fixture
        .orchestrator(false)
        .run_with_deadline("entry", BTreeMap::new(), Some(Duration::ZERO))
        .await;

    assert_eq!(result.errors.len(), 3);
    for capability in [Capability::Emotion, Capability::Reflection, Capability::Art] {
        let stage = result.get(capability).unwrap();
        assert_eq!(stage.tier, DegradationTier::Minimal);
        assert!(validate(capability, &stage.payload));
        assert!(result
            .errors
            .iter()
            .any(|e| e.capability == capability && e.message.contains("deadline")));
    }

    // No network call was attempted anywhere.
    assert_eq!(fixture.emotion.call_count(), 0);
    assert_eq!(fixture.reflection.call_count(), 0);
    assert_eq!(fixture.art.call_count(), 0);
    assert!(result.fallback_used);
}

#[tokio::test]
async fn test_generous_deadline_runs_normally() {
    let fixture = Fixture::new();

    let result = fixture
        .orchestrator(false)
        .run_with_deadline("entry", BTreeMap::new(), Some(Duration::from_secs(30)))
        .await;

    assert!(result.errors.is_empty());
    assert!(!result.fallback_used);
}

#[tokio::test]
async fn test_urgent_input_short_circuits_reflection_only() {
    let fixture = Fixture::new();

    let result = fixture
        .orchestrator(false)
        .run("some days I feel like I want to die", BTreeMap::new())
        .await;

    let reflection = result.get(Capability::Reflection).unwrap();
    assert_eq!(reflection.tier, DegradationTier::Minimal);
    assert_eq!(reflection.payload["severity"].as_str().unwrap(), "urgent");
    assert_eq!(fixture.reflection.call_count(), 0);

    // Other stages still consulted their providers.
    assert_eq!(fixture.emotion.call_count(), 1);
    assert_eq!(fixture.art.call_count(), 1);
    assert!(result.fallback_used);
}

#[tokio::test]
async fn test_pipeline_never_fails_with_everything_down() {
    let fixture = Fixture::new();
    for provider in [&fixture.emotion, &fixture.reflection, &fixture.art] {
        provider.push_outcome(StubOutcome::Fail(
            mindmirror_common::ProviderError::Transient("unreachable".to_string()),
        ));
        provider.push_outcome(StubOutcome::Fail(
            mindmirror_common::ProviderError::Transient("unreachable".to_string()),
        ));
    }

    let result = fixture
        .orchestrator(false)
        .run("just checking in", BTreeMap::new())
        .await;

    assert!(result.errors.is_empty());
    assert!(result.fallback_used);
    for capability in [Capability::Emotion, Capability::Reflection, Capability::Art] {
        let stage = result.get(capability).unwrap();
        assert_eq!(stage.tier, DegradationTier::Local);
        assert!(validate(capability, &stage.payload));
    }
}
