use bacstack_core::apdu::{
    ApduType, ComplexAckHeader, ErrorPduHeader, SegmentAck, UnconfirmedRequestHeader,
};
use bacstack_core::encoding::reader::Reader;
use bacstack_core::npdu::Npdu;
use bacstack_core::services::cov_notification::{
    CovNotificationRequest, SERVICE_UNCONFIRMED_COV_NOTIFICATION,
};
use bacstack_core::services::error::ServiceError;
use bacstack_core::services::i_am::{IAmRequest, SERVICE_I_AM};
use bacstack_core::services::read_property::ReadPropertyAck;
use bacstack_core::services::who_is::{WhoIsRequest, SERVICE_WHO_IS};
use std::fs;
use std::path::{Path, PathBuf};

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .canonicalize()
        .expect("workspace root should be resolvable")
}

fn parse_hex_fixture(path: &Path) -> Vec<u8> {
    let content = fs::read_to_string(path).expect("fixture must be readable");
    let mut out = Vec::new();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        for token in trimmed.split_whitespace() {
            let byte = u8::from_str_radix(token, 16)
                .unwrap_or_else(|_| panic!("invalid hex token '{token}' in {}", path.display()));
            out.push(byte);
        }
    }
    out
}

/// Decodes the service body behind each APDU type this client consumes and
/// insists the whole fixture is used.
fn decode_apdu_fully(name: &str, apdu: &[u8]) {
    let mut r = Reader::new(apdu);
    match ApduType::of(apdu[0]) {
        Some(ApduType::UnconfirmedRequest) => {
            let hdr = UnconfirmedRequestHeader::decode(&mut r).unwrap();
            match hdr.service_choice {
                SERVICE_I_AM => {
                    IAmRequest::decode_after_header(&mut r).unwrap();
                }
                SERVICE_WHO_IS => {
                    WhoIsRequest::decode_after_header(&mut r).unwrap();
                }
                SERVICE_UNCONFIRMED_COV_NOTIFICATION => {
                    CovNotificationRequest::decode_after_header(&mut r).unwrap();
                }
                other => panic!("{name}: unexpected unconfirmed service {other}"),
            }
        }
        Some(ApduType::ComplexAck) => {
            ComplexAckHeader::decode(&mut r).unwrap();
            ReadPropertyAck::decode_after_header(&mut r).unwrap();
        }
        Some(ApduType::Error) => {
            ErrorPduHeader::decode(&mut r).unwrap();
            ServiceError::decode_after_header(&mut r).unwrap();
        }
        Some(ApduType::SegmentAck) => {
            SegmentAck::decode(&mut r).unwrap();
        }
        Some(_) => return,
        None => panic!("{name}: unknown APDU type nibble 0x{:x}", apdu[0] >> 4),
    }
    assert!(r.is_empty(), "{name}: {} trailing octets", r.remaining());
}

#[test]
fn golden_corpus_fixtures_decode_npdu_and_apdu() {
    let fixture_dir = workspace_root().join("fixtures/golden");
    let mut fixture_files = fs::read_dir(&fixture_dir)
        .expect("fixtures directory should exist")
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "hex"))
        .collect::<Vec<_>>();
    fixture_files.sort();
    assert!(
        !fixture_files.is_empty(),
        "expected at least one corpus fixture in {}",
        fixture_dir.display()
    );

    for fixture in fixture_files {
        let name = fixture.display().to_string();
        let bytes = parse_hex_fixture(&fixture);
        assert!(!bytes.is_empty(), "fixture {name} must contain at least one byte");

        let mut r = Reader::new(&bytes);
        let npdu = Npdu::decode(&mut r)
            .unwrap_or_else(|e| panic!("fixture {name} failed NPDU decode with error {e:?}"));
        assert!(!npdu.is_network_message(), "fixture {name} is a network message");
        assert!(!r.is_empty(), "fixture {name} has no APDU");
        decode_apdu_fully(&name, r.rest());
    }
}
