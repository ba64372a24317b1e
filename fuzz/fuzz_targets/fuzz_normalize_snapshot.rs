//! Fuzzes snapshot normalization over arbitrary full-size records.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_normalize_snapshot
#![no_main]
use il2_motion_protocol::{
    DEFAULT_ROLL_THRESHOLD_DEG, FIELD_NAMES, RECORD_SIZE, RawTelemetryRecord, TelemetrySnapshot,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: [u8; RECORD_SIZE]| {
    if let Ok(raw) = RawTelemetryRecord::decode(&data) {
        let snapshot = TelemetrySnapshot::normalize(&raw, DEFAULT_ROLL_THRESHOLD_DEG);
        assert_eq!(snapshot.tick(), raw.tick);
        for name in FIELD_NAMES {
            assert!(snapshot.value(name).is_some());
        }
    }
});
