//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Covers:
//! - Contract snapshot checks
//! - Submission -> store -> fan-out -> remote dispatch flows (no real
//!   transport; the mock channel records everything)
//! - Delivery properties: segmentation law, file fallback, redaction,
//!   routing, cycle exclusion

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        // Verify the contracts crate surface
        let _ = contracts::ConfigVersion::V1;
        assert_eq!(contracts::MAX_MESSAGE_CHARS, 4096);
    }

    #[test]
    fn test_crate_surfaces() {
        // Smoke-check the leaf crates the engine is assembled from
        let buffer = record_store::RecordBuffer::new(4);
        assert!(buffer.is_empty());

        assert_eq!(classifier::escape_html("<b>"), "&lt;b&gt;");

        let mut stats = observability::DispatchStatsAggregator::new();
        stats.record_cycle(observability::CycleStats::default());
        assert_eq!(stats.total_cycles, 1);

        assert!(dispatcher::split_segments("abc", 2).len() == 2);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use channels::{MockChannelConfig, MockChatChannel, MockInstaller};
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        ChatRef, DestinationConfig, DestinationId, ExceptionInfo, HandlerSettings, Level,
        RedactionSettings, RoutingMode, SecretSpec,
    };
    use handler::LogHandler;
    use tokio::time::sleep;

    type TestHandler = LogHandler<MockChatChannel, MockInstaller>;

    fn engine(settings: HandlerSettings, redaction: RedactionSettings) -> Arc<TestHandler> {
        LogHandler::new(settings, &redaction, MockInstaller::new())
    }

    fn broadcast_destination(id: &str, min_level: Level) -> DestinationConfig {
        DestinationConfig {
            id: DestinationId::from(id),
            chat: ChatRef::from(format!("{id}-chat").as_str()),
            min_level,
            routing: RoutingMode::Broadcast,
            origin: None,
        }
    }

    /// End-to-end flow: submit -> store -> remote queue -> mock transport.
    #[tokio::test]
    async fn test_e2e_submission_to_remote_delivery() {
        let courier = engine(HandlerSettings::default(), RedactionSettings::default());
        let channel = MockChatChannel::new();
        courier.register_destination(&broadcast_destination("ops", Level::Info), channel.clone());

        courier.submit(Level::Info, "core.loader", "modules loaded", Vec::new(), None, None);
        courier.submit(
            Level::Error,
            "core.net",
            "request failed",
            Vec::new(),
            Some(ExceptionInfo {
                kind: "NetworkError".to_string(),
                message: "host unreachable".to_string(),
                traceback: "Traceback (most recent call last):\n  File \"net.py\", line 10, in fetch\nNetworkError: host unreachable\n".to_string(),
                caller: None,
                comment: None,
            }),
            None,
        );

        courier.run_dispatch_cycle().await;
        sleep(Duration::from_millis(50)).await;

        // Plain line goes out as one text batch, the exception as a report
        let texts = channel.sent_texts();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].text.contains("modules loaded"));

        let reports = channel.sent_action_messages();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].text.contains("connectivity"));
        assert_eq!(reports[0].actions.len(), 1);

        // Both records are retained in the store
        assert_eq!(courier.dump().len(), 2);
        courier.shutdown();
    }

    /// Capacity invariant holds after every single append.
    #[tokio::test]
    async fn test_store_capacity_invariant() {
        let courier = engine(
            HandlerSettings {
                capacity: 5,
                ..Default::default()
            },
            RedactionSettings::default(),
        );

        for i in 0..100u32 {
            courier.submit(
                Level::Info,
                "gen",
                &format!("record {i}"),
                Vec::new(),
                None,
                None,
            );
            assert!(courier.dump().len() <= 5);
        }

        // Newest five survive
        let stored: Vec<String> = courier.dump().iter().map(|r| r.message.clone()).collect();
        assert_eq!(stored[0], "record 95");
        assert_eq!(stored[4], "record 99");
    }

    /// Segmentation law across the full path: K*4096+r chars -> K+1
    /// messages whose concatenation equals the escaped batch.
    #[tokio::test]
    async fn test_segmentation_law_end_to_end() {
        let courier = engine(HandlerSettings::default(), RedactionSettings::default());
        let channel = MockChatChannel::new();
        courier.register_destination(&broadcast_destination("ops", Level::Info), channel.clone());

        // remote_line adds "[INFO] big: " and "\n" around the payload
        let payload = "x".repeat(2 * 4096 + 100);
        courier.submit(Level::Info, "big", &payload, Vec::new(), None, None);
        courier.run_dispatch_cycle().await;
        sleep(Duration::from_millis(50)).await;

        let texts = channel.sent_texts();
        assert_eq!(texts.len(), 3);
        assert!(texts.iter().all(|t| t.text.chars().count() <= 4096));

        let concatenated: String = texts.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(concatenated, format!("[INFO] big: {payload}\n"));
        courier.shutdown();
    }

    /// More than five segments collapse into exactly one document and
    /// zero individual messages.
    #[tokio::test]
    async fn test_file_fallback_for_oversized_batch() {
        let courier = engine(HandlerSettings::default(), RedactionSettings::default());
        let channel = MockChatChannel::new();
        courier.register_destination(&broadcast_destination("ops", Level::Info), channel.clone());

        // 6 * 4096 chars of payload guarantee more than 5 segments
        let payload = "y".repeat(6 * 4096);
        courier.submit(Level::Info, "big", &payload, Vec::new(), None, None);
        courier.run_dispatch_cycle().await;
        sleep(Duration::from_millis(50)).await;

        assert_eq!(channel.sent_documents().len(), 1);
        assert!(channel.sent_texts().is_empty());
        courier.shutdown();
    }

    /// A registered secret never reaches the transport in the clear, on
    /// any delivery path.
    #[tokio::test]
    async fn test_redaction_end_to_end() {
        let secret = "8123456789:AAFxSecretBotToken";
        let courier = engine(
            HandlerSettings::default(),
            RedactionSettings {
                secrets: vec![SecretSpec {
                    value: secret.to_string(),
                    mask: None,
                }],
            },
        );
        let channel = MockChatChannel::new();
        courier.register_destination(&broadcast_destination("ops", Level::Info), channel.clone());

        courier.submit(
            Level::Warning,
            "core.auth",
            &format!("token {secret} was rejected"),
            Vec::new(),
            None,
            None,
        );
        courier.submit(
            Level::Error,
            "core.auth",
            "auth exception",
            Vec::new(),
            Some(ExceptionInfo {
                kind: "ValueError".to_string(),
                message: format!("bad token {secret}"),
                traceback: format!("ValueError: bad token {secret}\n"),
                caller: None,
                comment: None,
            }),
            None,
        );

        courier.run_dispatch_cycle().await;
        sleep(Duration::from_millis(50)).await;

        for text in channel.sent_texts() {
            assert!(!text.text.contains(secret));
        }
        for report in channel.sent_action_messages() {
            assert!(!report.text.contains(secret));
        }

        // Full-trace rendering is redacted as well
        let report_msg = &channel.sent_action_messages()[0];
        courier.invoke_action(report_msg.actions[0].id).await.unwrap();
        let after = channel.sent_texts();
        assert!(after.iter().all(|t| !t.text.contains(secret)));
        courier.shutdown();
    }

    /// Exclusive-vs-broadcast routing across the full path.
    #[tokio::test]
    async fn test_routing_exclusive_and_broadcast() {
        let courier = engine(HandlerSettings::default(), RedactionSettings::default());
        let channel = MockChatChannel::new();
        courier.register_destination(&broadcast_destination("all", Level::Debug), channel.clone());
        courier.register_destination(
            &DestinationConfig {
                id: DestinationId::from("x"),
                chat: ChatRef::from("x-chat"),
                min_level: Level::Debug,
                routing: RoutingMode::Exclusive,
                origin: Some("client1".to_string()),
            },
            channel.clone(),
        );

        handler::with_origin("client2", async {
            courier.submit(Level::Info, "m", "from client2", Vec::new(), None, None);
        })
        .await;

        courier.run_dispatch_cycle().await;
        sleep(Duration::from_millis(50)).await;

        let texts = channel.sent_texts();
        // Broadcast destination receives it, the exclusive one does not
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0].chat, "all-chat");
        courier.shutdown();
    }

    /// Two ticks firing during an in-flight cycle execute exactly one
    /// cycle in that window.
    #[tokio::test]
    async fn test_overlapping_cycles_execute_once() {
        let courier = engine(HandlerSettings::default(), RedactionSettings::default());
        let channel = MockChatChannel::with_config(MockChannelConfig {
            fail_chats: Vec::new(),
            send_delay: Some(Duration::from_millis(150)),
        });
        courier.register_destination(&broadcast_destination("slow", Level::Info), channel.clone());

        courier.submit(
            Level::Error,
            "core",
            "boom",
            Vec::new(),
            Some(ExceptionInfo {
                kind: "ValueError".to_string(),
                message: "boom".to_string(),
                traceback: String::new(),
                caller: None,
                comment: None,
            }),
            None,
        );

        let slow_cycle = {
            let courier = Arc::clone(&courier);
            tokio::spawn(async move { courier.run_dispatch_cycle().await })
        };
        sleep(Duration::from_millis(20)).await;

        assert!(!courier.run_dispatch_cycle().await);
        assert!(!courier.run_dispatch_cycle().await);
        assert!(slow_cycle.await.unwrap());

        assert_eq!(channel.sent_action_messages().len(), 1);
        courier.shutdown();
    }

    /// A blueprint loaded from TOML drives a working engine.
    #[tokio::test]
    async fn test_blueprint_to_engine() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("courier.log");
        let toml = format!(
            r#"
[handler]
capacity = 50
remote_level = "warning"

[[sinks]]
name = "logfile"
sink_type = "file"
min_level = "debug"
[sinks.params]
path = "{}"

[[destinations]]
id = "ops"
chat = "ops-chat"
min_level = "warning"
"#,
            log_path.display()
        );
        let blueprint = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();

        let courier: Arc<TestHandler> = LogHandler::new(
            blueprint.handler.clone(),
            &blueprint.redaction,
            MockInstaller::new(),
        );
        let channel = MockChatChannel::new();
        for destination in &blueprint.destinations {
            courier.register_destination(destination, channel.clone());
        }
        courier.add_local_sink(Box::new(
            handler::sinks::RotatingFileSink::from_params(
                "logfile",
                Level::Debug,
                &blueprint.sinks[0].params,
            )
            .unwrap(),
        ));

        courier.submit(Level::Info, "m", "local only", Vec::new(), None, None);
        courier.submit(Level::Error, "m", "remote too", Vec::new(), None, None);
        courier.run_dispatch_cycle().await;
        sleep(Duration::from_millis(50)).await;
        courier.shutdown();

        // Local file saw both records, the destination only the error
        let content = std::fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("local only"));
        assert!(content.contains("remote too"));

        let texts = channel.sent_texts();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].text.contains("remote too"));
        assert!(!texts[0].text.contains("local only"));
    }

    /// Formatted read-back respects level and origin filters.
    #[tokio::test]
    async fn test_dumps_formatted_read_back() {
        let courier = engine(HandlerSettings::default(), RedactionSettings::default());

        courier.submit(Level::Debug, "a", "noise", Vec::new(), None, None);
        courier.submit(Level::Warning, "b", "tagged", Vec::new(), None, Some("c1".into()));
        courier.submit(Level::Error, "c", "other tag", Vec::new(), None, Some("c2".into()));
        courier.submit(Level::Critical, "d", "untagged", Vec::new(), None, None);

        let lines = courier.dumps_formatted(Level::Warning, Some("c1"));
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("tagged"));
        assert!(lines[1].contains("untagged"));
    }
}
