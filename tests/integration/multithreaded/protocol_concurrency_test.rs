// Tests to verify concurrent issue and verify calls share nothing mutable

use crate::common::{create_issuer, create_verifier, scenario_record};
use certseal::{Envelope, ProtocolPolicy};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::task;

const NUM_TASKS: usize = 8;
const OPERATIONS_PER_TASK: usize = 10;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_issue_and_verify_with_shared_instances() {
    if option_env!("SKIP_SLOW_TESTS").is_some() {
        return;
    }

    let issuer = Arc::new(create_issuer(ProtocolPolicy::new()));
    let verifier = Arc::new(create_verifier(ProtocolPolicy::new()));

    let mut tasks = Vec::new();
    for i in 0..NUM_TASKS {
        let issuer = issuer.clone();
        let verifier = verifier.clone();

        // RSA work is CPU bound, keep it off the async workers
        tasks.push(task::spawn_blocking(move || {
            let mut ivs = Vec::new();
            for j in 0..OPERATIONS_PER_TASK {
                let mut record = scenario_record();
                record
                    .insert("Certificate ID", format!("CERT-{}-{}", i, j))
                    .unwrap();

                let issued = issuer.issue(record.clone()).expect("Failed to issue");
                let signed = verifier.verify(&issued.payload).expect("Failed to verify");
                assert_eq!(signed.record(), &record);

                ivs.push(Envelope::disassemble(&issued.payload).unwrap().iv);
            }
            ivs
        }));
    }

    let mut seen = HashSet::new();
    for task in tasks {
        for iv in task.await.expect("task panicked") {
            assert!(seen.insert(iv), "iv reused across concurrent issues");
        }
    }
    assert_eq!(seen.len(), NUM_TASKS * OPERATIONS_PER_TASK);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_verifying_one_payload_from_many_tasks() {
    let issued = create_issuer(ProtocolPolicy::new())
        .issue(scenario_record())
        .unwrap();
    let payload = Arc::new(issued.payload);
    let verifier = Arc::new(create_verifier(ProtocolPolicy::new()));

    let handles: Vec<_> = (0..NUM_TASKS)
        .map(|_| {
            let payload = payload.clone();
            let verifier = verifier.clone();
            task::spawn_blocking(move || verifier.verify(&payload))
        })
        .collect();

    for handle in handles {
        let signed = handle.await.unwrap().expect("Failed to verify");
        assert_eq!(signed.record(), &scenario_record());
    }
}
