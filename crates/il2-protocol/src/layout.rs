//! Versioned wire layout of the IL-2 motion-device record.
//!
//! The simulator writes one packed little-endian struct per datagram. The
//! table below is the single source of truth for offsets and field names;
//! the codec, the name list shown to host configuration UIs and the
//! by-name lookup all derive from it.
//!
//! | Offset | Type | Field       |
//! |-------:|------|-------------|
//! | 0      | u32  | `packet_id` |
//! | 4      | u32  | `tick`      |
//! | 8      | f32  | `yaw`       |
//! | 12     | f32  | `pitch`     |
//! | 16     | f32  | `roll`      |
//! | 20     | f32  | `spin_x`    |
//! | 24     | f32  | `spin_y`    |
//! | 28     | f32  | `spin_z`    |
//! | 32     | f32  | `acc_x`     |
//! | 36     | f32  | `acc_y`     |
//! | 40     | f32  | `acc_z`     |

/// Revision of the layout table. Bump when offsets or fields change.
pub const LAYOUT_VERSION: u16 = 1;

/// Identifier carried in the first word of every motion-device frame.
///
/// Read as a little-endian `u32`, so the wire bytes are `00 01 4C 49`.
pub const PACKET_ID: u32 = 0x494C_0100;

/// Exact size of one record on the wire.
pub const RECORD_SIZE: usize = 44;

/// Number of fields in the record.
pub const FIELD_COUNT: usize = 11;

/// Byte offsets of each field.
pub mod offsets {
    pub const PACKET_ID: usize = 0;
    pub const TICK: usize = 4;
    pub const YAW: usize = 8;
    pub const PITCH: usize = 12;
    pub const ROLL: usize = 16;
    pub const SPIN_X: usize = 20;
    pub const SPIN_Y: usize = 24;
    pub const SPIN_Z: usize = 28;
    pub const ACC_X: usize = 32;
    pub const ACC_Y: usize = 36;
    pub const ACC_Z: usize = 40;
}

/// Primitive encoding of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Unsigned 32-bit integer, little-endian.
    U32,
    /// IEEE-754 single precision, little-endian.
    F32,
}

impl FieldKind {
    /// Encoded width in bytes.
    pub const fn width(self) -> usize {
        match self {
            FieldKind::U32 | FieldKind::F32 => 4,
        }
    }
}

/// One entry of the layout table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Stable field name exposed to hosts.
    pub name: &'static str,
    /// Byte offset from the start of the record.
    pub offset: usize,
    /// Encoding of the field.
    pub kind: FieldKind,
}

const fn field(name: &'static str, offset: usize, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, offset, kind }
}

/// The record layout, in wire order.
pub const FIELDS: [FieldSpec; FIELD_COUNT] = [
    field("packet_id", offsets::PACKET_ID, FieldKind::U32),
    field("tick", offsets::TICK, FieldKind::U32),
    field("yaw", offsets::YAW, FieldKind::F32),
    field("pitch", offsets::PITCH, FieldKind::F32),
    field("roll", offsets::ROLL, FieldKind::F32),
    field("spin_x", offsets::SPIN_X, FieldKind::F32),
    field("spin_y", offsets::SPIN_Y, FieldKind::F32),
    field("spin_z", offsets::SPIN_Z, FieldKind::F32),
    field("acc_x", offsets::ACC_X, FieldKind::F32),
    field("acc_y", offsets::ACC_Y, FieldKind::F32),
    field("acc_z", offsets::ACC_Z, FieldKind::F32),
];

/// Field names in wire order, for host-side configuration UIs.
pub const FIELD_NAMES: [&str; FIELD_COUNT] = {
    let mut names = [""; FIELD_COUNT];
    let mut i = 0;
    while i < FIELD_COUNT {
        names[i] = FIELDS[i].name;
        i += 1;
    }
    names
};

// Fields are contiguous and end exactly at RECORD_SIZE.
const _: () = {
    let mut expected = 0;
    let mut i = 0;
    while i < FIELD_COUNT {
        assert!(FIELDS[i].offset == expected);
        expected += FIELDS[i].kind.width();
        i += 1;
    }
    assert!(expected == RECORD_SIZE);
};

/// Look up a field by name.
pub fn field_spec(name: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|spec| spec.name == name)
}
