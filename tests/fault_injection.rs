// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Fault-injection scenarios over the in-memory reference stream

use std::sync::Arc;

use stream_mock::fault::{eio_error, no_space_error, FaultStream};
use stream_mock::{
    FailureBehavior, FaultPolicy, InMemoryStream, SeekOrigin, SequentialStream, StatFlag, Stream,
    StreamError, StreamStat,
};

fn wrapped(contents: &[u8], behavior: FailureBehavior) -> FaultStream {
    FaultStream::with_behavior(
        Box::new(InMemoryStream::with_contents(None::<String>, contents)),
        behavior,
    )
}

#[test]
fn pass_through_by_default() {
    let stream = FaultStream::new(Box::new(InMemoryStream::new()));
    assert_eq!(stream.write(b"data").unwrap(), 4);
    stream.seek(0, SeekOrigin::Start).unwrap();
    let mut buf = [0u8; 4];
    assert_eq!(stream.read(&mut buf).unwrap(), 4);
    assert_eq!(&buf, b"data");
    assert_eq!(stream.call_count("write"), 1);
    assert_eq!(stream.call_count("read"), 1);
    assert_eq!(stream.call_count("seek"), 1);
}

#[test]
fn fail_after_count_trips_on_the_next_call() {
    let stream = wrapped(
        b"",
        FailureBehavior::FailAfter {
            op: "write",
            count: 2,
            error_fn: Arc::new(eio_error),
        },
    );

    assert!(stream.write(b"a").is_ok());
    assert!(stream.write(b"b").is_ok());
    assert!(matches!(stream.write(b"c"), Err(StreamError::Io(_))));
    assert!(matches!(stream.write(b"d"), Err(StreamError::Io(_))));
    assert_eq!(stream.call_count("write"), 4);
}

#[test]
fn fail_for_count_recovers_afterwards() {
    let stream = wrapped(
        b"abc",
        FailureBehavior::FailFor {
            op: "read",
            count: 2,
            error_fn: Arc::new(no_space_error),
        },
    );

    let mut buf = [0u8; 3];
    assert!(matches!(stream.read(&mut buf), Err(StreamError::NoSpace)));
    assert!(matches!(stream.read(&mut buf), Err(StreamError::NoSpace)));
    assert_eq!(stream.read(&mut buf).unwrap(), 3);
    assert_eq!(stream.call_count("read"), 3);
}

#[test]
fn always_fail_targets_one_operation_only() {
    let stream = wrapped(
        b"abc",
        FailureBehavior::AlwaysFail {
            op: "stat",
            error_fn: Arc::new(|| StreamError::AccessDenied),
        },
    );

    let mut stat = StreamStat::new();
    assert!(matches!(
        stream.stat(&mut stat, StatFlag::Default),
        Err(StreamError::AccessDenied)
    ));
    // other operations still pass through
    assert_eq!(stream.seek(0, SeekOrigin::End).unwrap(), 3);
}

#[test]
fn custom_predicate_fails_every_third_read() {
    let stream = wrapped(
        b"abcdef",
        FailureBehavior::Custom(Arc::new(|op, count| {
            (op == "read" && count % 3 == 2).then(eio_error)
        })),
    );

    let mut buf = [0u8; 1];
    assert!(stream.read(&mut buf).is_ok());
    assert!(stream.read(&mut buf).is_ok());
    assert!(matches!(stream.read(&mut buf), Err(StreamError::Io(_))));
    assert!(stream.read(&mut buf).is_ok());
    assert_eq!(stream.call_count("read"), 4);
}

#[test]
fn runtime_behavior_change_and_counter_reset() {
    let stream = FaultStream::new(Box::new(InMemoryStream::new()));
    assert!(stream.write(b"a").is_ok());

    stream.set_behavior(FailureBehavior::AlwaysFail {
        op: "write",
        error_fn: Arc::new(no_space_error),
    });
    assert!(matches!(stream.write(b"b"), Err(StreamError::NoSpace)));

    stream.set_behavior(FailureBehavior::AlwaysSucceed);
    assert!(stream.write(b"c").is_ok());
    assert_eq!(stream.call_count("write"), 3);

    stream.reset_counters();
    assert_eq!(stream.call_count("write"), 0);
}

#[test]
fn json_policy_drives_rule_windows() {
    let policy = FaultPolicy::from_json_bytes(
        br#"{
            "enabled": true,
            "rules": [
                { "op": "write", "code": "no_space", "start_after": 1, "max_faults": 2 }
            ]
        }"#,
    )
    .unwrap();

    let stream = wrapped(b"", policy.into_behavior());

    assert!(stream.write(b"a").is_ok());
    assert!(matches!(stream.write(b"b"), Err(StreamError::NoSpace)));
    assert!(matches!(stream.write(b"c"), Err(StreamError::NoSpace)));
    // rule exhausted after max_faults injections
    assert!(stream.write(b"d").is_ok());
}

#[test]
fn disabled_policy_never_fires() {
    let policy = FaultPolicy::from_json_bytes(
        br#"{ "enabled": false, "rules": [ { "op": "read", "code": "eio" } ] }"#,
    )
    .unwrap();

    let stream = wrapped(b"xyz", policy.into_behavior());
    let mut buf = [0u8; 3];
    assert_eq!(stream.read(&mut buf).unwrap(), 3);
}

#[test]
fn decorated_clone_detaches_from_the_decorator() {
    let stream = wrapped(b"bytes", FailureBehavior::AlwaysSucceed);
    let clone = stream.clone_stream().unwrap();
    assert_eq!(stream.call_count("clone_stream"), 1);

    let mut buf = [0u8; 5];
    assert_eq!(clone.read(&mut buf).unwrap(), 5);
    assert_eq!(&buf, b"bytes");
}
