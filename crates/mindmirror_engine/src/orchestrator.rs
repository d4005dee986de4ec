//! Pipeline orchestrator: composes capability resolvers into one
//! end-to-end run.
//!
//! Emotion resolves first and feeds its top label into the context for
//! every later stage; Art and Speech run concurrently once that context is
//! known. A failed, panicked, or deadline-skipped stage is recorded in
//! `errors` and replaced with its Minimal-tier payload; nothing aborts the
//! pipeline.

use crate::resolver::CapabilityResolver;
use crate::safety::{SafetyInterceptor, Urgency};
use mindmirror_common::{
    context_keys, Capability, CapabilityRequest, CapabilityResult, PipelineResult, StageError,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

pub struct PipelineOrchestrator {
    emotion: Arc<CapabilityResolver>,
    reflection: Arc<CapabilityResolver>,
    art: Arc<CapabilityResolver>,
    speech: Option<Arc<CapabilityResolver>>,
    safety: Arc<SafetyInterceptor>,
}

impl PipelineOrchestrator {
    pub fn new(
        emotion: Arc<CapabilityResolver>,
        reflection: Arc<CapabilityResolver>,
        art: Arc<CapabilityResolver>,
    ) -> Self {
        Self {
            emotion,
            reflection,
            art,
            speech: None,
            safety: Arc::new(SafetyInterceptor::new()),
        }
    }

    /// Enable the optional speech stage (reads the reflection text aloud).
    pub fn with_speech(mut self, speech: Arc<CapabilityResolver>) -> Self {
        self.speech = Some(speech);
        self
    }

    pub fn with_safety(mut self, safety: Arc<SafetyInterceptor>) -> Self {
        self.safety = safety;
        self
    }

    /// Run the full pipeline with no overall deadline.
    pub async fn run(
        &self,
        raw_input: &str,
        context: BTreeMap<String, String>,
    ) -> PipelineResult {
        self.run_with_deadline(raw_input, context, None).await
    }

    /// Run the full pipeline. When `deadline` is set, stages not yet
    /// started once it passes are skipped: recorded in `errors` and filled
    /// with their Minimal-tier payload, no network call attempted.
    pub async fn run_with_deadline(
        &self,
        raw_input: &str,
        mut context: BTreeMap<String, String>,
        deadline: Option<Duration>,
    ) -> PipelineResult {
        let started = Instant::now();
        let deadline_at = deadline.map(|d| started + d);
        let mut errors: Vec<StageError> = Vec::new();
        let mut results: BTreeMap<Capability, CapabilityResult> = BTreeMap::new();

        if self.safety.classify(raw_input) == Urgency::Urgent {
            // Informational for every stage; the reflection resolver does
            // its own hard short-circuit.
            context.insert(context_keys::URGENCY.to_string(), "urgent".to_string());
        }

        // Stage 1: emotion. Its top label becomes context for the rest.
        let emotion_request = CapabilityRequest::new(raw_input, Capability::Emotion)
            .with_context_map(context.clone());
        let emotion_task = spawn_stage(&self.emotion, &emotion_request, deadline_at);
        let emotion_result =
            finish_stage(self.emotion.as_ref(), &emotion_request, emotion_task, &mut errors)
                .await;
        if let Some(label) = top_emotion(&emotion_result) {
            context.insert(context_keys::PRIMARY_EMOTION.to_string(), label);
        }
        results.insert(Capability::Emotion, emotion_result);

        // Stage 2: reflection. Hard sequential dependency on stage 1.
        let reflection_request = CapabilityRequest::new(raw_input, Capability::Reflection)
            .with_context_map(context.clone());
        let reflection_task = spawn_stage(&self.reflection, &reflection_request, deadline_at);
        let reflection_result = finish_stage(
            self.reflection.as_ref(),
            &reflection_request,
            reflection_task,
            &mut errors,
        )
        .await;
        let reflection_text = reflection_result
            .text_field("reflection")
            .unwrap_or_default()
            .to_string();
        results.insert(Capability::Reflection, reflection_result);

        // Stages 3 and 4: art and speech are independent of each other and
        // run concurrently. Concurrency is a latency optimization only.
        let art_request = CapabilityRequest::new(raw_input, Capability::Art)
            .with_context_map(context.clone());
        let art_task = spawn_stage(&self.art, &art_request, deadline_at);

        let speech_stage = self.speech.as_ref().map(|resolver| {
            let request = CapabilityRequest::new(reflection_text.clone(), Capability::Speech)
                .with_context_map(context.clone());
            let task = spawn_stage(resolver, &request, deadline_at);
            (resolver, request, task)
        });

        let art_result =
            finish_stage(self.art.as_ref(), &art_request, art_task, &mut errors).await;
        results.insert(Capability::Art, art_result);

        if let Some((resolver, request, task)) = speech_stage {
            let speech_result =
                finish_stage(resolver.as_ref(), &request, task, &mut errors).await;
            results.insert(Capability::Speech, speech_result);
        }

        let fallback_used =
            results.values().any(|r| r.tier.is_degraded()) || !errors.is_empty();
        let processing_ms = started.elapsed().as_millis() as u64;
        info!(
            processing_ms,
            fallback_used,
            errors = errors.len(),
            "pipeline completed"
        );

        PipelineResult {
            results,
            fallback_used,
            errors,
            processing_ms,
        }
    }
}

/// Spawn a stage on its own task unless the deadline has already passed.
/// The task boundary also contains stage panics.
fn spawn_stage(
    resolver: &Arc<CapabilityResolver>,
    request: &CapabilityRequest,
    deadline_at: Option<Instant>,
) -> Option<JoinHandle<CapabilityResult>> {
    if deadline_at.map(|at| Instant::now() >= at).unwrap_or(false) {
        warn!(capability = %request.capability, "deadline exceeded, skipping stage");
        return None;
    }
    let resolver = Arc::clone(resolver);
    let request = request.clone();
    Some(tokio::spawn(async move { resolver.resolve(&request).await }))
}

/// Await a stage, mapping skips and panics onto an `errors` entry plus the
/// stage's Minimal-tier payload.
async fn finish_stage(
    resolver: &CapabilityResolver,
    request: &CapabilityRequest,
    task: Option<JoinHandle<CapabilityResult>>,
    errors: &mut Vec<StageError>,
) -> CapabilityResult {
    let capability = request.capability;
    match task {
        None => {
            errors.push(StageError::deadline_exceeded(capability));
            resolver.minimal_result(request)
        }
        Some(handle) => match handle.await {
            Ok(result) => result,
            Err(join_err) => {
                error!(%capability, "stage task failed: {}", join_err);
                errors.push(StageError::new(
                    capability,
                    format!("stage failure: {}", join_err),
                ));
                resolver.minimal_result(request)
            }
        },
    }
}

fn top_emotion(result: &CapabilityResult) -> Option<String> {
    result
        .payload
        .get("emotions")
        .and_then(|v| v.as_array())
        .and_then(|a| a.first())
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}
