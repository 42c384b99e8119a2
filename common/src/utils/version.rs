use std::fmt::{Display, Formatter};

/// A plugin's own version number, as reported to the host.
///
/// FMOD treats this as an opaque 32-bit integer. By convention, the major version lives in the
/// upper 16 bits and the minor version in the lower 16 bits, so `1.0` is `0x00010000`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct PluginVersion(u32);

impl PluginVersion {
    #[inline]
    pub const fn new(major: u16, minor: u16) -> Self {
        Self(((major as u32) << 16) | minor as u32)
    }

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn to_raw(self) -> u32 {
        self.0
    }

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn major(self) -> u16 {
        (self.0 >> 16) as u16
    }

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn minor(self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }
}

impl Display for PluginVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major(), self.minor())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn packs_major_and_minor() {
        let version = PluginVersion::new(1, 0);
        assert_eq!(0x0001_0000, version.to_raw());
        assert_eq!("1.0", version.to_string());
        assert_eq!(PluginVersion::new(3, 7), PluginVersion::from_raw(0x0003_0007));
    }
}
