//! Integration tests for package sources

#[cfg(test)]
mod tests {
    use sai_source::*;
    use tempfile::tempdir;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_file_source_yields_payloads_in_order() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("split_config.en.apk"), b"abc").unwrap();
        std::fs::write(dir.path().join("base.apk"), b"hello").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let mut source = FileSource::from_dir(dir.path()).await.unwrap();
        assert_eq!(source.len(), 2);

        assert!(source.next_payload().await.unwrap());
        assert_eq!(source.payload_name(), Some("base.apk"));
        assert_eq!(source.payload_length(), PayloadLength::Known(5));
        let mut bytes = Vec::new();
        source
            .open_payload()
            .await
            .unwrap()
            .read_to_end(&mut bytes)
            .await
            .unwrap();
        assert_eq!(bytes, b"hello");

        assert!(source.next_payload().await.unwrap());
        assert_eq!(source.payload_name(), Some("split_config.en.apk"));
        assert_eq!(source.payload_length(), PayloadLength::Known(3));

        assert!(!source.next_payload().await.unwrap());
        source.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_has_unknown_length() {
        let dir = tempdir().unwrap();
        let mut source = FileSource::new(vec![dir.path().join("gone.apk")]);

        assert!(source.next_payload().await.unwrap());
        assert_eq!(source.payload_length(), PayloadLength::Unknown);
        assert!(source.open_payload().await.is_err());
    }

    #[tokio::test]
    async fn test_payload_opens_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.apk");
        std::fs::write(&path, b"x").unwrap();
        let mut source = FileSource::new(vec![path]);

        assert!(source.open_payload().await.is_err());
        assert!(source.next_payload().await.unwrap());
        assert!(source.open_payload().await.is_ok());
        assert!(matches!(
            source.open_payload().await,
            Err(sai_errors::Error::Source(sai_errors::SourceError::AlreadyOpened { .. }))
        ));
    }

    #[test]
    fn test_payload_length_display() {
        assert_eq!(PayloadLength::Known(42).to_string(), "42");
        assert_eq!(PayloadLength::Unknown.to_string(), "unknown");
        assert_eq!(PayloadLength::Unknown.known(), None);
    }
}
