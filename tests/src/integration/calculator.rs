//! # Calculator Opcode Flows
//!
//! `JetBridgeClient` binary commands served by `ModuleService` with an
//! `OpcodeHandler` over the in-memory backend.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use jetbridge_client::adapters::BusTransport;
    use jetbridge_client::{ClientConfig, JetBridgeClient};
    use jetbridge_module::{MemoryBackend, ModuleService, OpcodeHandler};

    use crate::integration::fixtures::{bus, connected_client};

    #[tokio::test]
    async fn test_execute_calculator_code() {
        let bus = bus();
        let backend = Arc::new(MemoryBackend::new());
        let handler = OpcodeHandler::new(Arc::clone(&backend));
        let _module = ModuleService::start(&bus, Arc::new(handler)).unwrap();
        let client = connected_client(&bus, 1);

        assert!(client
            .execute_calculator_code("(>K:TOGGLE_MASTER_BATTERY)")
            .await
            .unwrap());
        assert_eq!(
            backend.executed(),
            vec!["(>K:TOGGLE_MASTER_BATTERY)".to_string()]
        );
    }

    #[tokio::test]
    async fn test_get_named_variable() {
        let bus = bus();
        let backend = Arc::new(MemoryBackend::new());
        backend.set_variable("A:INDICATED ALTITUDE", 12_500.25);
        let _module = ModuleService::start(&bus, Arc::new(OpcodeHandler::new(backend))).unwrap();
        let client = connected_client(&bus, 1);

        let value = client
            .get_named_variable("A:INDICATED ALTITUDE")
            .await
            .unwrap();
        assert_eq!(value, Some(12_500.25));
    }

    #[tokio::test]
    async fn test_missing_variable_times_out() {
        let bus = bus();
        let _module = ModuleService::start(
            &bus,
            Arc::new(OpcodeHandler::new(MemoryBackend::new())),
        )
        .unwrap();
        let config = ClientConfig {
            default_timeout: Duration::from_millis(100),
            ..Default::default()
        };
        let client =
            JetBridgeClient::new(Arc::new(BusTransport::connect(&bus, "host")), config).unwrap();
        client.connect().unwrap();

        assert_eq!(client.get_named_variable("L:NOPE").await.unwrap(), None);
        assert_eq!(client.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_text_and_binary_share_channels() {
        let bus = bus();
        let backend = Arc::new(MemoryBackend::new());
        backend.set_variable("L:FLAPS", 2.0);
        let _module =
            ModuleService::start(&bus, Arc::new(OpcodeHandler::new(Arc::clone(&backend)))).unwrap();
        let client = connected_client(&bus, 1);

        // Plain text commands carry no opcode and are left unanswered.
        let text = client
            .request_with_timeout("PING", Duration::from_millis(50))
            .await
            .unwrap();
        assert!(text.is_none());

        assert_eq!(client.get_named_variable("L:FLAPS").await.unwrap(), Some(2.0));
    }
}
