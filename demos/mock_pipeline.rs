//! Mock pipeline demo: submission -> store -> dispatch against the
//! recording mock transport, printing what would have been delivered.
//!
//! Run with: cargo run --bin mock_pipeline

use std::time::Duration;

use channels::{MockChatChannel, MockInstaller};
use contracts::{
    ChatRef, DestinationConfig, DestinationId, ExceptionInfo, HandlerSettings, Level,
    RedactionSettings, RoutingMode, SecretSpec,
};
use handler::LogHandler;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().compact().init();

    let courier = LogHandler::new(
        HandlerSettings {
            capacity: 100,
            remote_level: Level::Info,
            ..Default::default()
        },
        &RedactionSettings {
            secrets: vec![SecretSpec {
                value: "8123456789:AAFxDemoToken".to_string(),
                mask: None,
            }],
        },
        MockInstaller::new(),
    );

    let channel = MockChatChannel::new();
    courier.register_destination(
        &DestinationConfig {
            id: DestinationId::from("ops"),
            chat: ChatRef::from("ops-chat"),
            min_level: Level::Info,
            routing: RoutingMode::Broadcast,
            origin: None,
        },
        channel.clone(),
    );

    // Plain records from two logical clients
    handler::with_origin("client1", async {
        courier.submit(
            Level::Info,
            "core.loader",
            "loaded {} modules",
            vec!["12".to_string()],
            None,
            None,
        );
    })
    .await;

    courier.submit(
        Level::Warning,
        "core.auth",
        "token 8123456789:AAFxDemoToken is close to expiry",
        Vec::new(),
        None,
        None,
    );

    // An exception with a missing-dependency shape
    courier.submit(
        Level::Error,
        "core.modules",
        "module import failed",
        Vec::new(),
        Some(ExceptionInfo {
            kind: "ModuleNotFoundError".to_string(),
            message: "No module named 'pillow'".to_string(),
            traceback: "Traceback (most recent call last):\n  File \"loader.py\", line 88, in import_module\nModuleNotFoundError: No module named 'pillow'\n".to_string(),
            caller: None,
            comment: None,
        }),
        None,
    );

    // Drain the queues once instead of waiting for the poller
    courier.run_dispatch_cycle().await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    println!("=== recorded text messages ===");
    for text in channel.sent_texts() {
        println!("[{}] silent={} {}", text.chat, text.silent, text.text);
    }

    println!("\n=== recorded report messages ===");
    for report in channel.sent_action_messages() {
        let labels: Vec<&str> = report.actions.iter().map(|a| a.label.as_str()).collect();
        println!("[{}] {} | actions: {}", report.chat, report.text, labels.join(", "));

        // Exercise the install action round-trip
        if let Some(install) = report.actions.get(1) {
            courier.invoke_action(install.id).await.expect("install action");
        }
    }

    println!("\n=== after install action ===");
    for text in channel.sent_texts().iter().skip(1) {
        println!("[{}] {}", text.chat, text.text);
    }

    println!("\n=== stored records ===");
    for line in courier.dumps_formatted(Level::Debug, None) {
        println!("{line}");
    }

    courier.shutdown();
}
