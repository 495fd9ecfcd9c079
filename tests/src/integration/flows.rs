//! # Request/Response Flows
//!
//! A client and a remote end share one bus. Each test checks how a request
//! is matched with its response by identifier, and what happens when the
//! response is late, missing or out of order.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use futures::future::join;
    use jetbridge_client::ClientError;
    use jetbridge_module::ModuleService;
    use jetbridge_protocol::{Packet, PacketId, PACKET_DATA_SIZE};

    use crate::integration::fixtures::{bus, connected_client, wait_for_pending, ManualRemote};

    // =============================================================================
    // HAPPY PATH
    // =============================================================================

    #[tokio::test]
    async fn test_ping_pong() {
        let bus = bus();
        let pong = |request: &Packet| (request.text() == "PING").then(|| Packet::new(request.id(), "PONG"));
        let module = ModuleService::start(&bus, Arc::new(pong)).unwrap();
        let client = connected_client(&bus, 1);

        let started = Instant::now();
        let response = client
            .request_with_timeout("PING", Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(response.as_deref(), Some("PONG"));
        assert!(started.elapsed() < Duration::from_millis(100));
        assert_eq!(client.pending_count(), 0);
        module.shutdown();
    }

    #[tokio::test]
    async fn test_sequential_requests_get_distinct_ids() {
        let bus = bus();
        let mut remote = ManualRemote::attach(&bus);
        let client = connected_client(&bus, 100);

        for expected in 100..103 {
            let request = {
                let client = Arc::clone(&client);
                tokio::spawn(async move { client.request("STATUS").await })
            };
            let packet = remote.next_request().await;
            assert_eq!(packet.id(), PacketId::new(expected));
            remote.respond(Packet::new(packet.id(), "OK"));
            assert_eq!(request.await.unwrap().unwrap().as_deref(), Some("OK"));
        }
    }

    // =============================================================================
    // TIMEOUTS AND STALE RESPONSES
    // =============================================================================

    #[tokio::test]
    async fn test_unanswered_request_times_out() {
        let bus = bus();
        let silent = |_: &Packet| -> Option<Packet> { None };
        let _module = ModuleService::start(&bus, Arc::new(silent)).unwrap();
        let client = connected_client(&bus, 1);

        let started = Instant::now();
        let response = client
            .request_with_timeout("NOOP", Duration::from_millis(200))
            .await
            .unwrap();

        let elapsed = started.elapsed();
        assert!(response.is_none());
        assert!(elapsed >= Duration::from_millis(200));
        assert!(
            elapsed < Duration::from_millis(200 + 150),
            "timeout overran: {elapsed:?}"
        );
        assert_eq!(client.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_late_response_is_discarded() {
        let bus = bus();
        let mut remote = ManualRemote::attach(&bus);
        let client = connected_client(&bus, 7);

        let first = client
            .request_with_timeout("SLOW", Duration::from_millis(50))
            .await
            .unwrap();
        assert!(first.is_none());

        // The answer to the expired request shows up now.
        let expired = remote.next_request().await;
        remote.respond(Packet::new(expired.id(), "TOO LATE"));

        // The next request is unaffected.
        let second = {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.request("FAST").await })
        };
        let packet = remote.next_request().await;
        assert_ne!(packet.id(), expired.id());
        remote.respond(Packet::new(packet.id(), "ON TIME"));

        assert_eq!(second.await.unwrap().unwrap().as_deref(), Some("ON TIME"));
        assert_eq!(client.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_id_ignored() {
        let bus = bus();
        let mut remote = ManualRemote::attach(&bus);
        let client = connected_client(&bus, 1);

        let request = {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.request("WHO").await })
        };
        let packet = remote.next_request().await;

        remote.respond(Packet::new(PacketId::new(9999), "STRAY"));
        remote.respond(Packet::new(packet.id(), "YOU"));

        assert_eq!(request.await.unwrap().unwrap().as_deref(), Some("YOU"));
    }

    // =============================================================================
    // CONCURRENCY
    // =============================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_requests_answered_in_reverse() {
        let bus = bus();
        let mut remote = ManualRemote::attach(&bus);
        let client = connected_client(&bus, 20);

        let a = {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.request("A").await })
        };
        let first = remote.next_request().await;
        let b = {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.request("B").await })
        };
        let second = remote.next_request().await;
        wait_for_pending(&client, 2).await;

        remote.respond(Packet::new(second.id(), &format!("re {}", second.text())));
        remote.respond(Packet::new(first.id(), &format!("re {}", first.text())));

        let (a, b) = join(a, b).await;
        assert_eq!(a.unwrap().unwrap().as_deref(), Some("re A"));
        assert_eq!(b.unwrap().unwrap().as_deref(), Some("re B"));
        assert_eq!(client.pending_count(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_many_concurrent_requests_against_module() {
        let bus = bus();
        let echo = |request: &Packet| Some(Packet::new(request.id(), &request.text()));
        let _module = ModuleService::start(&bus, Arc::new(echo)).unwrap();
        let client = connected_client(&bus, 1);

        let requests: Vec<_> = (0..50)
            .map(|n| {
                let client = Arc::clone(&client);
                tokio::spawn(async move { (n, client.request(&format!("cmd {n}")).await) })
            })
            .collect();

        for request in requests {
            let (n, response) = request.await.unwrap();
            assert_eq!(response.unwrap(), Some(format!("cmd {n}")));
        }
        assert_eq!(client.pending_count(), 0);
    }

    // =============================================================================
    // WIRE BOUNDS AND LIFECYCLE
    // =============================================================================

    #[tokio::test]
    async fn test_long_command_truncated() {
        let bus = bus();
        let mut remote = ManualRemote::attach(&bus);
        let client = connected_client(&bus, 1);
        let command = "X".repeat(PACKET_DATA_SIZE + 72);

        let request = {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.request(&command).await })
        };
        let packet = remote.next_request().await;
        assert_eq!(packet.text().len(), PACKET_DATA_SIZE);
        remote.respond(Packet::new(packet.id(), "OK"));

        assert_eq!(request.await.unwrap().unwrap().as_deref(), Some("OK"));
    }

    #[tokio::test]
    async fn test_request_after_disconnect() {
        let bus = bus();
        let client = connected_client(&bus, 1);
        client.disconnect();

        let err = client.request("PING").await.unwrap_err();
        assert!(matches!(err, ClientError::NotConnected));
        assert_eq!(client.pending_count(), 0);
    }
}
