//! Raw motion-device record and its codec.

use serde::Serialize;

use crate::error::DecodeError;
use crate::layout::{FIELD_NAMES, PACKET_ID, RECORD_SIZE, offsets};

/// One motion-device record exactly as the simulator sent it.
///
/// Orientation angles are in radians; spin and acceleration are passed
/// through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RawTelemetryRecord {
    pub packet_id: u32,
    pub tick: u32,
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
    pub spin_x: f32,
    pub spin_y: f32,
    pub spin_z: f32,
    pub acc_x: f32,
    pub acc_y: f32,
    pub acc_z: f32,
}

impl RawTelemetryRecord {
    /// Decode a datagram payload.
    ///
    /// The payload must be exactly [`RECORD_SIZE`] bytes; anything else is
    /// rejected without looking at its contents. The identifier is not
    /// checked here, see [`decode_frame`] for that.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let Ok(buf) = <&[u8; RECORD_SIZE]>::try_from(bytes) else {
            return Err(DecodeError::size_mismatch(bytes.len()));
        };

        Ok(Self {
            packet_id: u32::from_le_bytes(word(buf, offsets::PACKET_ID)),
            tick: u32::from_le_bytes(word(buf, offsets::TICK)),
            yaw: f32::from_le_bytes(word(buf, offsets::YAW)),
            pitch: f32::from_le_bytes(word(buf, offsets::PITCH)),
            roll: f32::from_le_bytes(word(buf, offsets::ROLL)),
            spin_x: f32::from_le_bytes(word(buf, offsets::SPIN_X)),
            spin_y: f32::from_le_bytes(word(buf, offsets::SPIN_Y)),
            spin_z: f32::from_le_bytes(word(buf, offsets::SPIN_Z)),
            acc_x: f32::from_le_bytes(word(buf, offsets::ACC_X)),
            acc_y: f32::from_le_bytes(word(buf, offsets::ACC_Y)),
            acc_z: f32::from_le_bytes(word(buf, offsets::ACC_Z)),
        })
    }

    /// Encode into the wire layout. Inverse of [`RawTelemetryRecord::decode`].
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut buf = [0u8; RECORD_SIZE];
        put(&mut buf, offsets::PACKET_ID, self.packet_id.to_le_bytes());
        put(&mut buf, offsets::TICK, self.tick.to_le_bytes());
        put(&mut buf, offsets::YAW, self.yaw.to_le_bytes());
        put(&mut buf, offsets::PITCH, self.pitch.to_le_bytes());
        put(&mut buf, offsets::ROLL, self.roll.to_le_bytes());
        put(&mut buf, offsets::SPIN_X, self.spin_x.to_le_bytes());
        put(&mut buf, offsets::SPIN_Y, self.spin_y.to_le_bytes());
        put(&mut buf, offsets::SPIN_Z, self.spin_z.to_le_bytes());
        put(&mut buf, offsets::ACC_X, self.acc_x.to_le_bytes());
        put(&mut buf, offsets::ACC_Y, self.acc_y.to_le_bytes());
        put(&mut buf, offsets::ACC_Z, self.acc_z.to_le_bytes());
        buf
    }

    /// Whether the record carries the motion-device identifier.
    pub fn has_expected_identifier(&self) -> bool {
        self.packet_id == PACKET_ID
    }

    /// Overwrite every field of `self` with the fields of `src`.
    pub fn copy_fields(&mut self, src: &RawTelemetryRecord) {
        let RawTelemetryRecord {
            packet_id,
            tick,
            yaw,
            pitch,
            roll,
            spin_x,
            spin_y,
            spin_z,
            acc_x,
            acc_y,
            acc_z,
        } = *src;
        self.packet_id = packet_id;
        self.tick = tick;
        self.yaw = yaw;
        self.pitch = pitch;
        self.roll = roll;
        self.spin_x = spin_x;
        self.spin_y = spin_y;
        self.spin_z = spin_z;
        self.acc_x = acc_x;
        self.acc_y = acc_y;
        self.acc_z = acc_z;
    }

    /// Read a field by its layout name.
    pub fn value(&self, name: &str) -> Option<f64> {
        let value = match name {
            "packet_id" => f64::from(self.packet_id),
            "tick" => f64::from(self.tick),
            "yaw" => f64::from(self.yaw),
            "pitch" => f64::from(self.pitch),
            "roll" => f64::from(self.roll),
            "spin_x" => f64::from(self.spin_x),
            "spin_y" => f64::from(self.spin_y),
            "spin_z" => f64::from(self.spin_z),
            "acc_x" => f64::from(self.acc_x),
            "acc_y" => f64::from(self.acc_y),
            "acc_z" => f64::from(self.acc_z),
            _ => return None,
        };
        Some(value)
    }

    /// All fields as `(name, value)` pairs in wire order.
    pub fn values(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FIELD_NAMES
            .into_iter()
            .filter_map(move |name| self.value(name).map(|v| (name, v)))
    }
}

/// Decode a payload and require the motion-device identifier.
pub fn decode_frame(bytes: &[u8]) -> Result<RawTelemetryRecord, DecodeError> {
    let record = RawTelemetryRecord::decode(bytes)?;
    if !record.has_expected_identifier() {
        return Err(DecodeError::UnexpectedIdentifier {
            found: record.packet_id,
        });
    }
    Ok(record)
}

fn word(buf: &[u8; RECORD_SIZE], offset: usize) -> [u8; 4] {
    let mut out = [0u8; 4];
    if let Some(src) = buf.get(offset..offset + 4) {
        out.copy_from_slice(src);
    }
    out
}

fn put(buf: &mut [u8; RECORD_SIZE], offset: usize, bytes: [u8; 4]) {
    if let Some(dst) = buf.get_mut(offset..offset + 4) {
        dst.copy_from_slice(&bytes);
    }
}
