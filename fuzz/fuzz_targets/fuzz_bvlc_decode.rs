#![no_main]

use bacstack_datalink::BvlcFrame;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(frame) = BvlcFrame::decode(data) {
        let _ = frame.carries_npdu();
    }
});
