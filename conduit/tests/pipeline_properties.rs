use conduit::{Message, Pipeline, PipelineError, RequestContext, testing::CountingExtension};
use futures::executor::block_on;
use proptest::prelude::*;
use std::sync::{Arc, Mutex};

mod common;
use common::{KeyWriter, Resumer};

proptest! {
    #[test]
    fn hooks_observe_exactly_the_earlier_mutations(count in 1usize..8) {
        let observed = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::new();
        let keys: Vec<String> = (0..count).map(|i| format!("k{i}")).collect();
        for key in &keys {
            pipeline.add_extension(KeyWriter {
                key: key.clone(),
                observed: Arc::clone(&observed),
            });
        }

        let out = block_on(pipeline.run_incoming(Message::new("/p"), &RequestContext::new()))
            .unwrap();
        prop_assert_eq!(out.ext().unwrap().len(), count);

        let observed = observed.lock().unwrap();
        prop_assert_eq!(observed.len(), count);
        for (position, (key, seen)) in observed.iter().enumerate() {
            prop_assert_eq!(key, &keys[position]);
            let mut earlier = keys[..position].to_vec();
            earlier.sort();
            prop_assert_eq!(seen, &earlier);
        }
    }

    #[test]
    fn continuation_faults_are_reported_once(
        before in 0usize..4,
        after in 0usize..4,
        calls in 0usize..5,
    ) {
        let pipeline = Pipeline::new();
        let counters: Vec<CountingExtension> =
            (0..before + after).map(|_| CountingExtension::new()).collect();
        for counter in &counters[..before] {
            pipeline.add_extension(counter.clone());
        }
        pipeline.add_extension(Resumer { calls });
        for counter in &counters[before..] {
            pipeline.add_extension(counter.clone());
        }

        let result = block_on(pipeline.run_incoming(Message::new("/p"), &RequestContext::new()));

        for counter in &counters[..before] {
            prop_assert_eq!(counter.count(), 1);
        }
        match calls {
            1 => {
                prop_assert!(result.is_ok());
                for counter in &counters[before..] {
                    prop_assert_eq!(counter.count(), 1);
                }
            }
            0 => {
                let is_dropped = matches!(result, Err(PipelineError::ContinuationDropped { .. }));
                prop_assert!(is_dropped);
            }
            n => {
                let is_reused = matches!(
                    result,
                    Err(PipelineError::ContinuationReused { calls, .. }) if calls == n
                );
                prop_assert!(is_reused);
            }
        }
        if calls != 1 {
            for counter in &counters[before..] {
                prop_assert_eq!(counter.count(), 0);
            }
        }
    }
}
