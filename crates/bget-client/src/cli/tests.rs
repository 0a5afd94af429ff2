//! Unit tests for download flag validation.

use std::path::PathBuf;

use bget_core::error::Error;

use super::parsing::DownloadSource;
use super::types::DownloadArgs;

fn args() -> DownloadArgs {
    DownloadArgs {
        allocation: None,
        remotepath: None,
        localpath: PathBuf::from("/tmp/out.bin"),
        authticket: None,
        lookuphash: None,
        thumbnail: false,
        no_progress: false,
    }
}

#[test]
fn missing_source_is_a_usage_error() {
    let err = args().validate().unwrap_err();
    assert!(matches!(
        &err,
        Error::Usage { message } if message == "remotepath / authticket flag is missing"
    ));
}

#[test]
fn empty_values_count_as_missing() {
    let mut a = args();
    a.remotepath = Some(String::new());
    a.authticket = Some(String::new());

    let err = a.validate().unwrap_err();
    assert!(err.is_usage());
}

#[test]
fn remotepath_requires_allocation() {
    let mut a = args();
    a.remotepath = Some("/docs/report.pdf".to_string());

    let err = a.validate().unwrap_err();
    assert!(matches!(
        &err,
        Error::Usage { message } if message == "allocation flag is missing"
    ));
}

#[test]
fn remotepath_with_allocation_validates() {
    let mut a = args();
    a.allocation = Some("alloc-1".to_string());
    a.remotepath = Some("/docs/report.pdf".to_string());

    let request = a.validate().unwrap();
    assert_eq!(
        request.source,
        DownloadSource::RemotePath {
            allocation_id: "alloc-1".to_string(),
            remote_path: "/docs/report.pdf".to_string(),
        }
    );
    assert!(!request.thumbnail);
}

#[test]
fn authticket_alone_validates() {
    let mut a = args();
    a.authticket = Some("dGlja2V0".to_string());

    let request = a.validate().unwrap();
    assert_eq!(
        request.source,
        DownloadSource::AuthTicket {
            ticket: "dGlja2V0".to_string(),
            lookup_hash: None,
        }
    );
}

#[test]
fn lookuphash_is_carried_with_the_ticket() {
    let mut a = args();
    a.authticket = Some("dGlja2V0".to_string());
    a.lookuphash = Some("hash-1".to_string());

    let request = a.validate().unwrap();
    assert_eq!(
        request.source,
        DownloadSource::AuthTicket {
            ticket: "dGlja2V0".to_string(),
            lookup_hash: Some("hash-1".to_string()),
        }
    );
}

#[test]
fn remotepath_takes_precedence_over_ticket() {
    let mut a = args();
    a.allocation = Some("alloc-1".to_string());
    a.remotepath = Some("/docs/report.pdf".to_string());
    a.authticket = Some("dGlja2V0".to_string());

    let request = a.validate().unwrap();
    assert!(matches!(request.source, DownloadSource::RemotePath { .. }));
}

#[test]
fn thumbnail_flag_is_preserved() {
    let mut a = args();
    a.allocation = Some("alloc-1".to_string());
    a.remotepath = Some("/docs/report.pdf".to_string());
    a.thumbnail = true;

    let request = a.validate().unwrap();
    assert!(request.thumbnail);
}

#[test]
fn display_name_uses_the_file_name() {
    let mut a = args();
    a.authticket = Some("dGlja2V0".to_string());
    a.localpath = PathBuf::from("/tmp/downloads/report.pdf");

    let request = a.validate().unwrap();
    assert_eq!(request.display_name(), "report.pdf");
}
