use std::sync::Arc;
use std::time::Duration;
use tether::command::{Header, ResponseCommand, ResponseHeader};
use tether_rpc_service_caller::{InFlightConfig, InFlightRequests, RpcCallerError};

fn success(request_id: i32, payload: Vec<u8>) -> ResponseCommand {
    ResponseCommand::new(
        ResponseHeader::success(&Header::rpc_request(request_id)),
        payload,
    )
}

fn config(max_in_flight: usize) -> InFlightConfig {
    InFlightConfig::default()
        .with_max_in_flight(max_in_flight)
        .with_acquire_timeout(Duration::from_millis(50))
        .with_request_timeout(Duration::from_secs(5))
        .with_sweep_interval(Duration::from_secs(5))
}

#[test]
fn default_config_uses_ten_slots_and_ten_second_windows() {
    let config = InFlightConfig::default();

    assert_eq!(config.max_in_flight, 10);
    assert_eq!(config.acquire_timeout, Duration::from_secs(10));
    assert_eq!(config.request_timeout, Duration::from_secs(10));
    assert_eq!(config.sweep_interval, Duration::from_secs(10));
}

#[tokio::test]
async fn resolving_a_request_completes_its_handle_and_frees_the_slot() {
    let in_flight = InFlightRequests::new(config(2));

    let first = in_flight.register(1).await.unwrap();
    let _second = in_flight.register(2).await.unwrap();
    assert_eq!(in_flight.available_permits(), 0);
    assert_eq!(in_flight.pending_count(), 2);

    assert!(in_flight.resolve(success(1, vec![9, 9])));
    assert_eq!(in_flight.available_permits(), 1);
    assert_eq!(in_flight.pending_count(), 1);

    let response = first.await.unwrap();
    assert_eq!(response.request_id(), 1);
    assert_eq!(response.payload, vec![9, 9]);
}

#[tokio::test]
async fn register_fails_with_backpressure_timeout_when_full() {
    let in_flight = InFlightRequests::new(config(1));
    let _held = in_flight.register(1).await.unwrap();

    let err = in_flight.register(2).await.unwrap_err();

    assert!(matches!(
        err,
        RpcCallerError::BackpressureTimeout { waited } if waited == Duration::from_millis(50)
    ));
    assert_eq!(in_flight.pending_count(), 1);
}

#[tokio::test]
async fn waiting_register_is_admitted_once_a_slot_frees_up() {
    let in_flight = Arc::new(InFlightRequests::new(
        config(1).with_acquire_timeout(Duration::from_secs(2)),
    ));
    let _held = in_flight.register(1).await.unwrap();

    let resolver = {
        let in_flight = in_flight.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            in_flight.resolve(success(1, Vec::new()))
        })
    };

    let admitted = in_flight.register(2).await;
    assert!(admitted.is_ok());
    assert!(resolver.await.unwrap());
}

#[tokio::test]
async fn sweep_fails_stale_requests_with_timeout_and_frees_their_slots() {
    let in_flight = InFlightRequests::new(
        config(3)
            .with_request_timeout(Duration::from_millis(50))
            .with_sweep_interval(Duration::from_millis(20)),
    );

    let handle = in_flight.register(7).await.unwrap();
    assert_eq!(in_flight.available_permits(), 2);

    let outcome = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("sweep should fail the request");

    match outcome {
        Err(RpcCallerError::Timeout {
            request_id,
            elapsed,
        }) => {
            assert_eq!(request_id, 7);
            assert!(elapsed >= Duration::from_millis(50));
        }
        other => panic!("expected a timeout, got {other:?}"),
    }

    assert_eq!(in_flight.pending_count(), 0);
    assert_eq!(in_flight.available_permits(), 3);

    // A response arriving after the timeout is dropped.
    assert!(!in_flight.resolve(success(7, Vec::new())));
}

#[tokio::test]
async fn remove_expired_only_reaps_requests_past_the_timeout() {
    let in_flight =
        InFlightRequests::new(config(3).with_request_timeout(Duration::from_millis(40)));

    let _old = in_flight.register(1).await.unwrap();
    tokio::time::sleep(Duration::from_millis(60)).await;
    let _fresh = in_flight.register(2).await.unwrap();

    assert_eq!(in_flight.remove_expired(), 1);
    assert_eq!(in_flight.pending_count(), 1);
    assert!(in_flight.resolve(success(2, Vec::new())));
}

#[tokio::test]
async fn resolving_an_unknown_request_is_a_no_op() {
    let in_flight = InFlightRequests::new(config(2));

    assert!(!in_flight.resolve(success(42, Vec::new())));
    assert!(!in_flight.fail(42, RpcCallerError::transport("gone")));
    assert_eq!(in_flight.available_permits(), 2);
}

#[tokio::test]
async fn duplicate_request_id_is_rejected_and_its_slot_returned() {
    let in_flight = InFlightRequests::new(config(3));
    let _first = in_flight.register(5).await.unwrap();

    let err = in_flight.register(5).await.unwrap_err();

    assert!(matches!(err, RpcCallerError::DuplicateRequestId(5)));
    assert_eq!(in_flight.available_permits(), 2);
    assert_eq!(in_flight.pending_count(), 1);
}

#[tokio::test]
async fn fail_all_completes_every_pending_request() {
    let in_flight = InFlightRequests::new(config(5));
    let handles = vec![
        in_flight.register(1).await.unwrap(),
        in_flight.register(2).await.unwrap(),
        in_flight.register(3).await.unwrap(),
    ];

    assert_eq!(
        in_flight.fail_all(RpcCallerError::transport("connection closed")),
        3
    );
    assert_eq!(in_flight.available_permits(), 5);

    for handle in handles {
        assert!(matches!(
            handle.await,
            Err(RpcCallerError::Transport(msg)) if msg == "connection closed"
        ));
    }
}

#[tokio::test]
async fn closed_tracker_fails_pending_and_rejects_new_requests() {
    let in_flight = InFlightRequests::new(config(2));
    let pending = in_flight.register(1).await.unwrap();

    in_flight.close();

    assert!(in_flight.is_closed());
    assert!(matches!(pending.await, Err(RpcCallerError::Transport(_))));
    assert!(matches!(
        in_flight.register(2).await,
        Err(RpcCallerError::Transport(_))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn registrations_racing_close_never_leave_a_request_behind() {
    for _ in 0..50 {
        let in_flight = Arc::new(InFlightRequests::new(config(64)));

        let registrations: Vec<_> = (0..32)
            .map(|id| {
                let in_flight = in_flight.clone();
                tokio::spawn(async move { in_flight.register(id).await })
            })
            .collect();
        in_flight.close();

        for registration in registrations {
            if let Ok(handle) = registration.await.unwrap() {
                let outcome = tokio::time::timeout(Duration::from_secs(1), handle)
                    .await
                    .expect("admitted request was left unresolved");
                assert!(matches!(outcome, Err(RpcCallerError::Transport(_))));
            }
        }
        assert_eq!(in_flight.pending_count(), 0);
    }
}
