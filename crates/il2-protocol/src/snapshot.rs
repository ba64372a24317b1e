//! Normalized telemetry snapshot.

use serde::Serialize;

use crate::angle::{normalize_roll, radians_to_degrees};
use crate::record::RawTelemetryRecord;

/// One decoded record with orientation converted to degrees.
///
/// Roll is additionally folded into ±threshold by [`normalize_roll`]. All
/// other fields are carried over verbatim. The default value is the zeroed
/// snapshot used as "previous" before the first frame arrives.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct TelemetrySnapshot {
    fields: RawTelemetryRecord,
}

impl TelemetrySnapshot {
    /// Build a snapshot from a raw record.
    pub fn normalize(raw: &RawTelemetryRecord, roll_threshold_deg: f32) -> Self {
        let mut fields = RawTelemetryRecord::default();
        fields.copy_fields(raw);

        fields.roll = normalize_roll(radians_to_degrees(raw.roll), roll_threshold_deg);
        fields.pitch = radians_to_degrees(raw.pitch);
        fields.yaw = radians_to_degrees(raw.yaw);

        Self { fields }
    }

    pub fn packet_id(&self) -> u32 {
        self.fields.packet_id
    }

    pub fn tick(&self) -> u32 {
        self.fields.tick
    }

    /// Heading in degrees.
    pub fn yaw(&self) -> f32 {
        self.fields.yaw
    }

    /// Pitch in degrees.
    pub fn pitch(&self) -> f32 {
        self.fields.pitch
    }

    /// Roll in degrees, folded into ±threshold.
    pub fn roll(&self) -> f32 {
        self.fields.roll
    }

    /// Angular velocity `[x, y, z]` as sent by the simulator.
    pub fn spin(&self) -> [f32; 3] {
        [self.fields.spin_x, self.fields.spin_y, self.fields.spin_z]
    }

    /// Acceleration `[x, y, z]` as sent by the simulator.
    pub fn acceleration(&self) -> [f32; 3] {
        [self.fields.acc_x, self.fields.acc_y, self.fields.acc_z]
    }

    /// Normalized fields as a plain record.
    pub fn fields(&self) -> &RawTelemetryRecord {
        &self.fields
    }

    /// Read a field by its layout name.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.fields.value(name)
    }

    /// All fields as `(name, value)` pairs in wire order.
    pub fn values(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.fields.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angle::DEFAULT_ROLL_THRESHOLD_DEG;
    use crate::layout::PACKET_ID;
    use core::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    const EPS: f32 = 1e-4;

    fn raw(yaw: f32, pitch: f32, roll: f32) -> RawTelemetryRecord {
        RawTelemetryRecord {
            packet_id: PACKET_ID,
            tick: 42,
            yaw,
            pitch,
            roll,
            spin_x: 0.5,
            spin_y: -0.5,
            spin_z: 1.0,
            acc_x: 2.0,
            acc_y: -9.81,
            acc_z: 0.25,
        }
    }

    #[test]
    fn test_normalize_converts_pitch_and_yaw() {
        let snap = TelemetrySnapshot::normalize(&raw(PI, -FRAC_PI_4, 0.0), DEFAULT_ROLL_THRESHOLD_DEG);
        assert!((snap.yaw() - 180.0).abs() < EPS);
        assert!((snap.pitch() + 45.0).abs() < EPS);
    }

    #[test]
    fn test_normalize_does_not_reflect_pitch_or_yaw() {
        let snap = TelemetrySnapshot::normalize(
            &raw(3.0 * FRAC_PI_4, 3.0 * FRAC_PI_4, 0.0),
            DEFAULT_ROLL_THRESHOLD_DEG,
        );
        assert!((snap.yaw() - 135.0).abs() < EPS);
        assert!((snap.pitch() - 135.0).abs() < EPS);
    }

    #[test]
    fn test_normalize_reflects_roll() {
        let snap = TelemetrySnapshot::normalize(&raw(0.0, 0.0, 3.0 * FRAC_PI_4), DEFAULT_ROLL_THRESHOLD_DEG);
        assert!((snap.roll() - 45.0).abs() < EPS);

        let snap = TelemetrySnapshot::normalize(&raw(0.0, 0.0, -FRAC_PI_2), DEFAULT_ROLL_THRESHOLD_DEG);
        assert!((snap.roll() + 90.0).abs() < EPS);
    }

    #[test]
    fn test_normalize_keeps_opaque_fields() {
        let source = raw(0.1, 0.2, 0.3);
        let snap = TelemetrySnapshot::normalize(&source, DEFAULT_ROLL_THRESHOLD_DEG);
        assert_eq!(snap.packet_id(), PACKET_ID);
        assert_eq!(snap.tick(), 42);
        assert_eq!(snap.spin(), [0.5, -0.5, 1.0]);
        assert_eq!(snap.acceleration(), [2.0, -9.81, 0.25]);
    }

    #[test]
    fn test_default_snapshot_is_zeroed() {
        let snap = TelemetrySnapshot::default();
        assert!(snap.values().all(|(_, v)| v == 0.0));
    }
}
