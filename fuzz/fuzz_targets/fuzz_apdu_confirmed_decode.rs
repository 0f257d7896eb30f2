#![no_main]

use bacstack_core::apdu::{ComplexAckHeader, ConfirmedRequestHeader};
use bacstack_core::encoding::reader::Reader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = ConfirmedRequestHeader::decode(&mut Reader::new(data));
    let _ = ComplexAckHeader::decode(&mut Reader::new(data));
});
