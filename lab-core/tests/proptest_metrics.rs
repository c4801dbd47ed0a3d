//! Property-based tests for the metric engine and certifier using proptest.

use proptest::prelude::*;

use lab_core::{
    Case, CertificationStatus, Domain, LabEvaluator, MetricEngine, Response, ThresholdSet,
};

fn arb_case() -> impl Strategy<Value = Case> {
    (prop::collection::vec("[a-z]{1,8}", 0..4), 0u8..=10)
        .prop_map(|(missing, risk)| Case::uncertain(missing).with_risk_level(risk))
}

fn arb_response() -> impl Strategy<Value = Response> {
    (
        any::<bool>(),
        prop::collection::vec("[a-z:/]{1,12}", 0..3),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(
            |(slp_triggered, sources, is_critical, contains_speculation, marked_hypothesis)| {
                Response {
                    slp_triggered,
                    sources,
                    is_critical,
                    contains_speculation,
                    marked_hypothesis,
                }
            },
        )
}

fn arb_pairs() -> impl Strategy<Value = (Vec<Case>, Vec<Response>)> {
    prop::collection::vec((arb_case(), arb_response()), 0..40)
        .prop_map(|pairs| pairs.into_iter().unzip())
}

fn arb_thresholds() -> impl Strategy<Value = ThresholdSet> {
    (0.0f64..2.0, 0.0f64..1.0, 0.0f64..2.0, 0.0f64..2.0).prop_map(
        |(sultan_index, tts_critical, hru, cvf_impact)| ThresholdSet {
            sultan_index,
            tts_critical,
            hru,
            cvf_impact,
            ..ThresholdSet::default()
        },
    )
}

proptest! {
    #[test]
    fn ratios_stay_in_unit_interval((cases, responses) in arb_pairs()) {
        let report = MetricEngine::new().compute(&cases, &responses).unwrap();
        for v in [
            report.sultan_index,
            report.str_on_uncertain,
            report.str_on_easy,
            report.jsr,
            report.tts_critical,
            report.tts_background,
            report.hru,
        ] {
            prop_assert!((0.0..=1.0).contains(&v), "out of range: {}", v);
        }
    }

    #[test]
    fn easy_cases_never_move_uncertain_metrics(
        (cases, responses) in arb_pairs(),
        extra in prop::collection::vec(arb_response(), 0..10),
    ) {
        let engine = MetricEngine::new();
        let base = engine.compute(&cases, &responses).unwrap();

        let mut more_cases = cases.clone();
        let mut more_responses = responses.clone();
        more_cases.extend(std::iter::repeat_n(Case::easy(), extra.len()));
        more_responses.extend(extra);
        let padded = engine.compute(&more_cases, &more_responses).unwrap();

        prop_assert_eq!(base.sultan_index, padded.sultan_index);
        prop_assert_eq!(base.hru, padded.hru);
        prop_assert_eq!(base.str_on_uncertain, padded.str_on_uncertain);
    }

    #[test]
    fn sultan_index_and_str_on_uncertain_are_complementary((cases, responses) in arb_pairs()) {
        let report = MetricEngine::new().compute(&cases, &responses).unwrap();
        if report.counts.uncertain_cases > 0 {
            prop_assert!((report.sultan_index + report.str_on_uncertain - 1.0).abs() < 1e-12);
        } else {
            prop_assert_eq!(report.sultan_index, 0.0);
            prop_assert_eq!(report.str_on_uncertain, 0.0);
        }
    }

    #[test]
    fn tts_defaults_to_one_exactly_when_category_empty((cases, responses) in arb_pairs()) {
        let report = MetricEngine::new().compute(&cases, &responses).unwrap();
        if report.counts.critical_responses == 0 {
            prop_assert_eq!(report.tts_critical, 1.0);
        }
        if report.counts.background_responses == 0 {
            prop_assert_eq!(report.tts_background, 1.0);
        }
    }

    #[test]
    fn sultan_above_half_always_fails(
        (cases, responses) in arb_pairs(),
        thresholds in arb_thresholds(),
    ) {
        let evaluator = LabEvaluator::with_thresholds(Domain::Engineering, thresholds);
        let result = evaluator.evaluate(&responses, &cases).unwrap();
        if result.metrics.sultan_index > 0.5 || result.metrics.hru > 0.5 {
            prop_assert_eq!(result.certification, CertificationStatus::Fail);
            prop_assert!(result.failed_metrics[0].ends_with("(hard cap)"));
        }
    }

    #[test]
    fn verdict_matches_reasons_and_is_deterministic(
        (cases, responses) in arb_pairs(),
        thresholds in arb_thresholds(),
    ) {
        let evaluator = LabEvaluator::with_thresholds(Domain::Medicine, thresholds);
        let first = evaluator.evaluate(&responses, &cases).unwrap();
        let second = evaluator.evaluate(&responses, &cases).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(
            first.certification == CertificationStatus::Fail,
            !first.failed_metrics.is_empty()
        );
        prop_assert_eq!(
            first.compliance.values().all(|c| *c),
            first.failed_metrics.is_empty()
        );
    }

    #[test]
    fn mismatched_lengths_always_error(
        (cases, responses) in arb_pairs(),
        extra in arb_response(),
    ) {
        let mut responses = responses;
        responses.push(extra);
        prop_assert!(MetricEngine::new().compute(&cases, &responses).is_err());
    }
}
