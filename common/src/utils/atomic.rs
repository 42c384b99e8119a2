use std::sync::atomic::{AtomicU32, Ordering};

/// An [`f32`] that can be shared between threads without locking.
///
/// The value is stored bit-for-bit inside an [`AtomicU32`], so any value (including NaNs and
/// signed zeroes) is read back exactly as it was written.
#[derive(Default)]
pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    #[inline]
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline]
    pub fn store(&self, new_value: f32, order: Ordering) {
        self.0.store(new_value.to_bits(), order)
    }

    #[inline]
    pub fn load(&self, order: Ordering) -> f32 {
        f32::from_bits(self.0.load(order))
    }

    #[inline]
    pub fn swap(&self, new_value: f32, order: Ordering) -> f32 {
        f32::from_bits(self.0.swap(new_value.to_bits(), order))
    }
}

impl std::fmt::Debug for AtomicF32 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.load(Ordering::Relaxed), f)
    }
}

#[cfg(test)]
mod test {
    extern crate static_assertions as sa;
    use super::*;

    sa::assert_impl_all!(AtomicF32: Send, Sync);

    #[test]
    fn keeps_exact_bits() {
        let value = AtomicF32::new(0.0);

        for v in [0.25, -0.0, f32::MIN_POSITIVE, f32::INFINITY, 1.0e-42] {
            value.store(v, Ordering::SeqCst);
            assert_eq!(v.to_bits(), value.load(Ordering::SeqCst).to_bits());
        }

        let nan = f32::from_bits(0x7fc0_1234);
        assert_eq!((-0.0f32).to_bits(), value.swap(nan, Ordering::SeqCst).to_bits());
        assert_eq!(0x7fc0_1234, value.load(Ordering::SeqCst).to_bits());
    }
}
