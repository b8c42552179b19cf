//! Integration tests for staged downloads

mod common;

use ::common::error::{BucketError, DownloadError};
use http::header::{CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use tempfile::TempDir;

#[test]
fn test_download_local() {
    let (bucket, temp) = common::local_bucket();
    let source = common::scratch_file(&temp, "r.pdf", b"%PDF-1.7 body");
    assert!(bucket.file_push(&source, "docs/report.pdf").unwrap());

    let download = bucket.download("docs/report.pdf", None).unwrap();
    assert_eq!(download.file_name(), "report.pdf");
    assert_eq!(download.content_length(), 13);

    let staged = download.staged_path();
    assert!(staged.exists());

    let (headers, body) = download.into_parts().unwrap();
    assert_eq!(body, b"%PDF-1.7 body");
    assert_eq!(headers[CONTENT_TYPE], "application/octet-stream");
    assert_eq!(headers[CONTENT_LENGTH], "13");
    assert_eq!(
        headers[CONTENT_DISPOSITION],
        "attachment; filename=\"report.pdf\""
    );
    assert!(headers[CACHE_CONTROL].to_str().unwrap().contains("no-cache"));
    assert!(!staged.exists());

    // The stored file is untouched.
    assert_eq!(common::read_local(&bucket, "docs/report.pdf"), b"%PDF-1.7 body");
}

#[test]
fn test_download_with_custom_file_name() {
    let (bucket, temp) = common::local_bucket();
    let source = common::scratch_file(&temp, "a.bin", b"bytes");
    assert!(bucket.file_push(&source, "a.bin").unwrap());

    let download = bucket.download("a.bin", Some("renamed.bin")).unwrap();
    assert_eq!(
        download.headers()[CONTENT_DISPOSITION],
        "attachment; filename=\"renamed.bin\""
    );

    let mut out = Vec::new();
    assert_eq!(download.write_to(&mut out).unwrap(), 5);
    assert_eq!(out, b"bytes");
}

#[test]
fn test_download_missing_source() {
    let (bucket, _temp) = common::local_bucket();

    let err = bucket.download("missing.zip", None).unwrap_err();
    assert!(matches!(
        err,
        BucketError::Download(DownloadError::SourceMissing(_))
    ));
}

#[test]
fn test_download_forbidden_mime_type() {
    let (bucket, temp) = common::local_bucket_with(|config| {
        config.download.forbidden_mime_types = vec!["TEXT/HTML; charset=utf-8".to_string()];
    });
    let source = common::scratch_file(&temp, "i.html", b"<html></html>");
    assert!(bucket.file_push(&source, "index.html").unwrap());

    let err = bucket.download("index.html", None).unwrap_err();
    match err {
        BucketError::Download(DownloadError::ForbiddenMimeType { mime, .. }) => {
            assert_eq!(mime, "text/html");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    // Renaming the markup does not get it past the check.
    assert!(bucket.file_push(&source, "index.txt").unwrap());
    assert!(bucket.download("index.txt", None).is_err());

    // Other types are still served.
    let notes = common::scratch_file(&temp, "n.txt", b"just notes");
    assert!(bucket.file_push(&notes, "notes.txt").unwrap());
    assert!(bucket.download("notes.txt", None).is_ok());
}

/// A 16 KiB ELF image: magic, 64-bit little endian header, zero padding.
fn elf_binary() -> Vec<u8> {
    let mut image = b"\x7fELF\x02\x01\x01\x00".to_vec();
    image.resize(16 * 1024, 0);
    image
}

fn forbid_executables(config: &mut ::common::config::BucketConfig) {
    config.download.forbidden_mime_types = vec!["application/x-executable".to_string()];
}

#[test]
fn test_download_refuses_executable_without_extension() {
    let (bucket, temp) = common::local_bucket_with(forbid_executables);
    let source = common::scratch_file(&temp, "tool", &elf_binary());
    assert!(bucket.file_push(&source, "bin/tool").unwrap());
    assert!(bucket.file_push(&source, "bin/tool.bin").unwrap());

    for remote in ["bin/tool", "bin/tool.bin"] {
        match bucket.download(remote, None).unwrap_err() {
            BucketError::Download(DownloadError::ForbiddenMimeType { mime, .. }) => {
                assert_eq!(mime, "application/x-executable");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}

#[test]
fn test_download_refuses_executable_over_ftp() {
    let (bucket, server) = common::ftp_bucket_with(forbid_executables);
    server.put_bytes("/data/bin/tool", &elf_binary());

    let err = bucket.download("bin/tool", None).unwrap_err();
    assert!(matches!(
        err,
        BucketError::Download(DownloadError::ForbiddenMimeType { .. })
    ));

    // Only the head was read; the transfer was aborted and the file kept.
    let commands = server.commands();
    let retr = commands
        .iter()
        .position(|c| c == "RETR /data/bin/tool")
        .unwrap();
    assert!(commands[retr + 1].starts_with("ABOR"));
    assert_eq!(
        commands.iter().filter(|c| c.starts_with("RETR")).count(),
        1
    );
    assert!(server.contains("/data/bin/tool"));
}

#[test]
fn test_download_forbidden_by_name_over_ftp() {
    let (bucket, server) = common::ftp_bucket_with(|config| {
        config.download.forbidden_mime_types = vec!["text/html".to_string()];
    });
    server.put_bytes("/data/page.html", b"<p>hello</p>");

    let err = bucket.download("page.html", None).unwrap_err();
    assert!(matches!(
        err,
        BucketError::Download(DownloadError::ForbiddenMimeType { .. })
    ));
    assert_eq!(
        server.commands().iter().filter(|c| c.starts_with("RETR")).count(),
        1
    );
    assert!(server.contains("/data/page.html"));
}

#[test]
fn test_download_ftp() {
    let (bucket, server) = common::ftp_bucket();
    server.put_bytes("/data/reports/q3.csv", b"a,b\n1,2\n");

    let download = bucket.download("/data/reports/q3.csv", None).unwrap();
    assert_eq!(download.file_name(), "q3.csv");
    assert_eq!(download.into_bytes().unwrap(), b"a,b\n1,2\n");
    assert!(server
        .commands()
        .contains(&"RETR /data/reports/q3.csv".to_string()));
}

#[test]
fn test_pull_into_fresh_directory_after_download() {
    let (bucket, server) = common::ftp_bucket();
    server.put_bytes("/data/a.txt", b"same bytes");
    let temp = TempDir::new().unwrap();

    let downloaded = bucket.download("a.txt", None).unwrap().into_bytes().unwrap();
    let target = temp.path().join("a.txt");
    assert!(bucket.file_pull("a.txt", &target).unwrap());
    assert_eq!(std::fs::read(&target).unwrap(), downloaded);
}
