//! Metrics for validation outcomes
//!
//! Counters are emitted through the `metrics` facade; without an installed
//! recorder every call is a no-op, so the library never requires one.

use metrics::{counter, describe_counter, Unit};

use crate::errors::Service;

/// Metrics prefix for all article-models metrics
pub const METRICS_PREFIX: &str = "article_models";

/// Outcome label for accepted records
pub const OUTCOME_ACCEPTED: &str = "accepted";

/// Outcome label for rejected records
pub const OUTCOME_REJECTED: &str = "rejected";

fn validations_total() -> String {
    format!("{}_validations_total", METRICS_PREFIX)
}

fn undefined_errors_total() -> String {
    format!("{}_undefined_errors_total", METRICS_PREFIX)
}

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        validations_total(),
        Unit::Count,
        "Schema constructions by schema and outcome"
    );

    describe_counter!(
        undefined_errors_total(),
        Unit::Count,
        "Errors requested with a code missing from the registry"
    );
}

/// Count one schema construction
pub fn record_validation(schema: &'static str, accepted: bool) {
    let outcome = if accepted { OUTCOME_ACCEPTED } else { OUTCOME_REJECTED };
    counter!(validations_total(), "schema" => schema, "outcome" => outcome).increment(1);
}

/// Count one registry fallback
pub fn record_undefined_error(service: Service) {
    counter!(undefined_errors_total(), "service" => service.name()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        assert_eq!(validations_total(), "article_models_validations_total");
        assert_eq!(undefined_errors_total(), "article_models_undefined_errors_total");
    }

    #[test]
    fn test_recording_without_recorder() {
        register_metrics();
        record_validation("article_document", true);
        record_validation("article_document", false);
        record_undefined_error(Service::ArticleModelsLibrary);
        // Just verify it runs without panic
    }
}
