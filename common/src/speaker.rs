use crate::sys::*;
use bitflags::bitflags;

bitflags! {
    /// Which speakers the channels of an interleaved buffer map to.
    #[repr(C)]
    #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
    pub struct ChannelMask: u32 {
        const FRONT_LEFT = FMOD_CHANNELMASK_FRONT_LEFT;
        const FRONT_RIGHT = FMOD_CHANNELMASK_FRONT_RIGHT;
        const FRONT_CENTER = FMOD_CHANNELMASK_FRONT_CENTER;
        const LOW_FREQUENCY = FMOD_CHANNELMASK_LOW_FREQUENCY;
        const SURROUND_LEFT = FMOD_CHANNELMASK_SURROUND_LEFT;
        const SURROUND_RIGHT = FMOD_CHANNELMASK_SURROUND_RIGHT;
        const BACK_LEFT = FMOD_CHANNELMASK_BACK_LEFT;
        const BACK_RIGHT = FMOD_CHANNELMASK_BACK_RIGHT;
        const BACK_CENTER = FMOD_CHANNELMASK_BACK_CENTER;

        const MONO = Self::FRONT_LEFT.bits();
        const STEREO = Self::FRONT_LEFT.bits() | Self::FRONT_RIGHT.bits();
    }
}

#[repr(i32)]
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum SpeakerMode {
    #[default]
    Default = FMOD_SPEAKERMODE_DEFAULT,
    Raw = FMOD_SPEAKERMODE_RAW,
    Mono = FMOD_SPEAKERMODE_MONO,
    Stereo = FMOD_SPEAKERMODE_STEREO,
    Quad = FMOD_SPEAKERMODE_QUAD,
    Surround = FMOD_SPEAKERMODE_SURROUND,
    FivePointOne = FMOD_SPEAKERMODE_5POINT1,
    SevenPointOne = FMOD_SPEAKERMODE_7POINT1,
    SevenPointOnePointFour = FMOD_SPEAKERMODE_7POINT1POINT4,
}

impl SpeakerMode {
    pub const fn from_raw(raw: FMOD_SPEAKERMODE) -> Option<Self> {
        use SpeakerMode::*;

        match raw {
            FMOD_SPEAKERMODE_DEFAULT => Some(Default),
            FMOD_SPEAKERMODE_RAW => Some(Raw),
            FMOD_SPEAKERMODE_MONO => Some(Mono),
            FMOD_SPEAKERMODE_STEREO => Some(Stereo),
            FMOD_SPEAKERMODE_QUAD => Some(Quad),
            FMOD_SPEAKERMODE_SURROUND => Some(Surround),
            FMOD_SPEAKERMODE_5POINT1 => Some(FivePointOne),
            FMOD_SPEAKERMODE_7POINT1 => Some(SevenPointOne),
            FMOD_SPEAKERMODE_7POINT1POINT4 => Some(SevenPointOnePointFour),
            _ => None,
        }
    }

    #[inline]
    pub const fn to_raw(self) -> FMOD_SPEAKERMODE {
        self as _
    }

    /// The number of channels this speaker mode implies, if it implies a fixed count.
    pub const fn channel_count(self) -> Option<u32> {
        match self {
            SpeakerMode::Default | SpeakerMode::Raw => None,
            SpeakerMode::Mono => Some(1),
            SpeakerMode::Stereo => Some(2),
            SpeakerMode::Quad => Some(4),
            SpeakerMode::Surround => Some(5),
            SpeakerMode::FivePointOne => Some(6),
            SpeakerMode::SevenPointOne => Some(8),
            SpeakerMode::SevenPointOnePointFour => Some(12),
        }
    }
}
