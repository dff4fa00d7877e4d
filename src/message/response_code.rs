use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Status byte of a call response.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum ResponseCode {
    Ok = 0x00,
    Error = 0x01,
}

impl ResponseCode {
    #[inline]
    pub fn is_ok(self) -> bool {
        self == ResponseCode::Ok
    }
}
