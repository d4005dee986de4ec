//! MindMirror resolution engine.
//!
//! One reusable multi-tier resolution pattern, parameterized per capability
//! with data: cache lookup, safety screening, a priority-ordered provider
//! chain with declarative retries, a rule-based local fallback, and a
//! hardcoded minimal tier. Resolvers never fail; degraded quality is
//! signaled through `DegradationTier`, not errors.

pub mod cache;
pub mod chain;
pub mod config;
pub mod fallback;
pub mod orchestrator;
pub mod prompts;
pub mod providers;
pub mod resolver;
pub mod safety;

pub use cache::ResponseCache;
pub use chain::ProviderChain;
pub use config::EngineConfig;
pub use orchestrator::PipelineOrchestrator;
pub use resolver::CapabilityResolver;
pub use safety::{SafetyInterceptor, Urgency};
