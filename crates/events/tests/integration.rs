//! Integration tests for events

#[cfg(test)]
mod tests {
    use sai_events::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_event_sender_emit() {
        let (tx, mut rx) = channel();

        tx.emit_warning_with_context("Failed to close package source", "pipe closed");

        let event = rx.recv().await.unwrap();
        assert_eq!(event.log_level(), tracing::Level::WARN);
        assert_eq!(event.log_target(), "sai::events::general");
        match event {
            AppEvent::General(GeneralEvent::Warning { message, context }) => {
                assert_eq!(message, "Failed to close package source");
                assert_eq!(context, "pipe closed");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dropped_receiver() {
        let (tx, rx) = channel();
        drop(rx);

        // Should not panic when receiver is dropped
        tx.emit_warning_with_context("ignored", "no listener");
    }

    #[test]
    fn test_missing_sender_is_noop() {
        let sender: Option<EventSender> = None;
        sender.emit_warning_with_context("ignored", "no sender");
    }

    #[test]
    fn test_failed_install_logs_at_error() {
        let event = AppEvent::Install(InstallEvent::Failed {
            attempt_id: Uuid::new_v4(),
            failure: FailureContext::new(Some("install.commit_failed"), "commit rejected", None::<String>, false),
            diagnostic: "commit rejected".into(),
        });
        assert_eq!(event.log_level(), tracing::Level::ERROR);
        assert_eq!(event.log_target(), "sai::events::install");
    }

    #[test]
    fn test_install_event_serialization() {
        let event = AppEvent::Install(InstallEvent::Succeeded {
            attempt_id: None,
            package: "org.example.app".into(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["domain"], "install");
        assert_eq!(json["event"]["type"], "Succeeded");
        assert_eq!(json["event"]["package"], "org.example.app");
    }
}
