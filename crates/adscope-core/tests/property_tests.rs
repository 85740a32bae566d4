//! # Property-Based Tests
//!
//! Constraint narrowing, date resolution and payload invariants checked
//! over generated inputs with proptest.

use adscope_core::{
    ALL, Channel, ConstraintGraph, DateRange, DateRangeResolver, Dimension, FetchOrchestrator,
    FixedClock, Mutation, PayloadValue, Selector, ServiceCall, WeekStart,
};
use chrono::NaiveDate;
use proptest::collection::vec;
use proptest::prelude::*;

// =============================================================================
// HELPERS & STRATEGIES
// =============================================================================

fn clock() -> FixedClock {
    FixedClock(NaiveDate::from_ymd_opt(2026, 10, 15).expect("date"))
}

fn channel() -> impl Strategy<Value = Channel> {
    proptest::sample::select(Channel::ALL.to_vec())
}

fn dimension() -> impl Strategy<Value = Dimension> {
    proptest::sample::select(Dimension::ALL.to_vec())
}

fn selector() -> impl Strategy<Value = Selector> {
    proptest::sample::select(Selector::ALL.to_vec())
}

fn date() -> impl Strategy<Value = NaiveDate> {
    // 1990-01-01 ..= 2099-12-31
    (726_468i32..=766_644).prop_map(|days| {
        NaiveDate::from_num_days_from_ce_opt(days).expect("day in range")
    })
}

fn value() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(ALL.to_string()),
        Just(String::new()),
        "[a-z0-9+-]{1,8}",
    ]
}

fn mutation() -> impl Strategy<Value = Mutation> {
    prop_oneof![
        proptest::sample::select(DateRange::ALL.to_vec()).prop_map(|r| Mutation::DateRange {
            token: r.as_str().to_string()
        }),
        (selector(), value()).prop_map(|(selector, value)| Mutation::Select { selector, value }),
        channel().prop_map(|channel| Mutation::Channel { channel }),
        (dimension(), value()).prop_map(|(dimension, value)| Mutation::Dimension {
            dimension,
            value
        }),
        Just(Mutation::Reset),
        Just(Mutation::Submit),
    ]
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// After a channel switch the enabled set is exactly the channel's keys.
    /// Re-picking the active channel changes nothing.
    #[test]
    fn channel_switch_enables_channel_keys(
        first in channel(),
        second in channel(),
        picked in dimension(),
    ) {
        let graph = ConstraintGraph::standard();
        let mut orch = FetchOrchestrator::new(clock());
        orch.start();
        orch.set_channel(first);
        orch.set_dimension(picked, "x");

        if second == orch.state().channel() {
            let before = orch.enabled().clone();
            let generation = orch.state().generation();
            prop_assert!(orch.set_channel(second).is_empty());
            prop_assert_eq!(orch.enabled(), &before);
            prop_assert_eq!(orch.state().generation(), generation);
            return Ok(());
        }
        orch.set_channel(second);

        let expected: Vec<Dimension> = graph
            .table(second)
            .map(|table| table.keys().copied().collect())
            .unwrap_or_default();
        prop_assert_eq!(orch.enabled().iter().collect::<Vec<_>>(), expected);
    }

    /// Selecting a known dimension leaves exactly it and its compatible set.
    /// Selecting an unknown one leaves nothing.
    #[test]
    fn selection_narrows_to_compatible(channel in channel(), picked in dimension()) {
        let graph = ConstraintGraph::standard();
        let enabled = graph.after_select(channel, picked);

        match graph.compatible_with(channel, picked) {
            Some(compatible) => {
                prop_assert!(enabled.contains(picked));
                prop_assert_eq!(enabled.len(), compatible.len() + 1);
                for dimension in compatible {
                    prop_assert!(enabled.contains(*dimension));
                }
            }
            None => prop_assert!(enabled.is_empty()),
        }
    }

    /// Every known token resolves to ordered, well-formed bounds.
    #[test]
    fn bounds_are_ordered(
        today in date(),
        range in proptest::sample::select(DateRange::ALL.to_vec()),
        sunday in any::<bool>(),
    ) {
        let week_start = if sunday { WeekStart::Sunday } else { WeekStart::Monday };
        let bounds = DateRangeResolver::new(week_start)
            .bounds(range, today)
            .expect("bounds");

        prop_assert!(bounds.start_date <= bounds.end_date);
        prop_assert!(bounds.end_date <= today || range == DateRange::ThisWeek);
        prop_assert_eq!(bounds.start().len(), 10);
    }

    /// The "all" sentinel and empty values never reach a payload.
    #[test]
    fn sentinel_never_sent(steps in vec(mutation(), 1..24)) {
        let mut orch = FetchOrchestrator::new(clock());
        let mut requests = orch.start();
        for step in steps {
            requests.extend(orch.apply(step));
        }

        for request in &requests {
            let payload = match &request.call {
                ServiceCall::Organizations => continue,
                ServiceCall::Campaigns(payload) | ServiceCall::Metrics { payload, .. } => payload,
            };
            for (key, value) in payload.iter() {
                if let PayloadValue::Text(text) = value {
                    prop_assert_ne!(text.as_str(), ALL, "{} carried the sentinel", key);
                    prop_assert!(!text.is_empty(), "{} was empty", key);
                }
            }
        }
    }

    /// Generations never go backwards across any mutation sequence.
    #[test]
    fn generation_is_monotonic(steps in vec(mutation(), 1..24)) {
        let mut orch = FetchOrchestrator::new(clock());
        let mut last = orch.state().generation();
        for step in steps {
            for request in orch.apply(step) {
                prop_assert_eq!(request.ticket.generation, orch.state().generation());
            }
            prop_assert!(orch.state().generation() >= last);
            last = orch.state().generation();
        }
    }
}
