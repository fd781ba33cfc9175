pub trait FromU32 {
    fn from_u32(src: u32) -> Self;
}

impl FromU32 for usize {
    #[cfg(any(target_pointer_width = "32", target_pointer_width = "64"))]
    #[inline(always)]
    fn from_u32(src: u32) -> Self {
        // Since the pointer width is guaranteed to be 32 or 64,
        // the following process always succeeds.
        unsafe { Self::try_from(src).unwrap_unchecked() }
    }
}
