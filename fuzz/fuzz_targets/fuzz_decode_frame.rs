//! Fuzzes the IL-2 motion-device frame decoder.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_decode_frame
#![no_main]
use il2_motion_protocol::{RECORD_SIZE, RawTelemetryRecord, decode_frame};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Errors are expected, panics are not.
    let decoded = RawTelemetryRecord::decode(data);
    assert_eq!(decoded.is_ok(), data.len() == RECORD_SIZE);
    if let Ok(record) = decode_frame(data) {
        assert_eq!(&record.encode()[..], data);
    }
});
