#![no_main]

use bacstack_core::encoding::reader::Reader;
use bacstack_core::services::cov_notification::CovNotificationRequest;
use bacstack_core::services::error::ServiceError;
use bacstack_core::services::event_notification::EventNotificationRequest;
use bacstack_core::services::i_am::IAmRequest;
use bacstack_core::services::read_property::ReadPropertyAck;
use bacstack_core::services::who_is::WhoIsRequest;
use libfuzzer_sys::fuzz_target;

// The first byte picks the decoder, the rest is the service payload.
fuzz_target!(|data: &[u8]| {
    let Some((&selector, payload)) = data.split_first() else {
        return;
    };
    let mut r = Reader::new(payload);
    match selector % 6 {
        0 => {
            let _ = ReadPropertyAck::decode_after_header(&mut r);
        }
        1 => {
            let _ = IAmRequest::decode_after_header(&mut r);
        }
        2 => {
            let _ = WhoIsRequest::decode_after_header(&mut r);
        }
        3 => {
            let _ = CovNotificationRequest::decode_after_header(&mut r);
        }
        4 => {
            let _ = EventNotificationRequest::decode_after_header(&mut r);
        }
        _ => {
            let _ = ServiceError::decode_after_header(&mut r);
        }
    }
});
