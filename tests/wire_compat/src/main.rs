fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Cursor;
    use std::path::PathBuf;

    use futures_util::TryStreamExt;
    use gallery_upload::{Envelope, FileDescriptor, PathResolver, UploadRequest, read_header};

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    fn load_text(name: &str) -> String {
        let path = fixtures_dir().join(name);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
    }

    /// Loads a hex fixture as raw bytes.
    fn load_hex(name: &str) -> Vec<u8> {
        hex::decode(load_text(name).trim())
            .unwrap_or_else(|e| panic!("failed to decode fixture {name}: {e}"))
    }

    fn descriptor(name: &str, dir: &str, size: u64, category: i64) -> FileDescriptor {
        FileDescriptor {
            name: name.into(),
            dir: dir.into(),
            size,
            category,
        }
    }

    /// Frames `files` (descriptor + contents) and returns the streamed body.
    async fn frame(files: &[(FileDescriptor, &[u8])]) -> (Vec<u8>, u64) {
        let descriptors: Vec<FileDescriptor> = files.iter().map(|(d, _)| d.clone()).collect();
        let sources = files
            .iter()
            .map(|(d, data)| (Cursor::new(data.to_vec()), d.size))
            .collect();
        let envelope = Envelope::encode(&descriptors, sources).unwrap();
        let content_length = envelope.content_length();

        let body = envelope
            .into_stream()
            .try_fold(Vec::new(), |mut acc, chunk| async move {
                acc.extend_from_slice(&chunk);
                Ok(acc)
            })
            .await
            .unwrap();
        (body, content_length)
    }

    /// Compares framed output against a fixture byte for byte.
    async fn envelope_test(name: &str, files: &[(FileDescriptor, &[u8])]) {
        let expected = load_hex(name);
        let (body, content_length) = frame(files).await;
        assert_eq!(
            body,
            expected,
            "envelope mismatch for {name}:\n  fixture: {}\n  rust:    {}",
            hex::encode(&expected),
            hex::encode(&body)
        );
        assert_eq!(content_length, expected.len() as u64);
    }

    // --- Descriptor block ---

    #[test]
    fn fixture_descriptor_block() {
        let descriptors = vec![
            descriptor("a.jpg", "", 4, 1),
            descriptor("b.png", "sub", 9, 1),
        ];
        let json = serde_json::to_string(&descriptors).unwrap();
        assert_eq!(json, load_text("descriptors.json").trim_end());
    }

    #[test]
    fn fixture_descriptor_block_parses_back() {
        let parsed: Vec<FileDescriptor> =
            serde_json::from_str(&load_text("descriptors.json")).unwrap();
        assert_eq!(parsed[1], descriptor("b.png", "sub", 9, 1));
    }

    // --- Envelopes ---

    #[tokio::test]
    async fn fixture_envelope_two_files() {
        envelope_test(
            "envelope_two_files.hex",
            &[
                (descriptor("a.jpg", "", 4, 1), &b"JPEG"[..]),
                (descriptor("b.png", "sub", 9, 1), &b"PNG_BYTES"[..]),
            ],
        )
        .await;
    }

    #[tokio::test]
    async fn fixture_envelope_two_byte_prefix() {
        envelope_test(
            "envelope_shared_dir.hex",
            &[
                (descriptor("IMG_20240101_120000.jpg", "shared", 3, 7), &b"abc"[..]),
                (descriptor("IMG_20240101_120001.jpg", "shared", 0, 7), &b""[..]),
                (descriptor("VID_20240101_120002.mp4", "shared", 5, 7), &b"vwxyz"[..]),
            ],
        )
        .await;

        let bytes = load_hex("envelope_shared_dir.hex");
        assert_eq!(&bytes[..2], &[0xCD_u8, 0x01]);
    }

    #[tokio::test]
    async fn fixture_envelope_empty() {
        envelope_test("envelope_empty.hex", &[]).await;
    }

    #[test]
    fn fixture_envelope_header_decodes() {
        let bytes = load_hex("envelope_two_files.hex");
        let (descriptors, offset) = read_header(&bytes).unwrap().unwrap();
        assert_eq!(descriptors.len(), 2);
        assert_eq!(&bytes[offset..], b"JPEGPNG_BYTES");
    }

    // --- Request messages ---

    #[test]
    fn fixture_request_confined() {
        let req = UploadRequest::from_json(&load_text("request_confined.json")).unwrap();
        assert_eq!(req.category, 1);
        assert_eq!(req.forced_directory(), None);

        let resolved = PathResolver::for_request(&req)
            .resolve_all(&req.file_paths)
            .unwrap();
        let dirs: Vec<&str> = resolved.iter().map(|r| r.dir.as_str()).collect();
        assert_eq!(dirs, vec!["", "sub"]);
        let relative: Vec<&str> = resolved.iter().map(|r| r.relative.as_str()).collect();
        assert_eq!(relative, vec!["a.jpg", "sub/b.png"]);
    }

    #[test]
    fn fixture_request_forced() {
        let req = UploadRequest::from_json(&load_text("request_forced.json")).unwrap();
        assert_eq!(req.category, 7);
        assert_eq!(req.forced_directory(), Some("shared"));

        let resolved = PathResolver::for_request(&req)
            .resolve_all(&req.file_paths)
            .unwrap();
        assert_eq!(resolved[0].dir, "shared");
        assert_eq!(resolved[0].name, "x.txt");
    }
}
