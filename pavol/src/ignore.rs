/// This is utility trait which allows using `result.ignore()` rather than `let _ = result`, for
/// results where failure leaves nothing to act on (writes to a closed stdout, a logger that was
/// already installed, etc).
pub trait Ignore {
    fn ignore(self);
}

impl<T, E> Ignore for Result<T, E> {
    #[inline(always)]
    fn ignore(self) {}
}
