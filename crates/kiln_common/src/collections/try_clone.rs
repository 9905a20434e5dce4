use core::convert::Infallible;

/// Fallible duplication of a value.
///
/// This is the fallible counterpart of [`Clone`], for types whose copies can fail without that being a bug,
/// e.g. values holding a handle to an external resource that may be exhausted.
/// Collections use it to offer copy operations that report the failure instead of unwinding,
/// while keeping the same rollback guarantees as their [`Clone`] based counterparts.
///
/// # Examples
///
/// ```
/// use kiln_common::collections::TryClone;
///
/// struct Ticket(u32);
///
/// impl TryClone for Ticket {
///     type Error = &'static str;
///
///     fn try_clone(&self) -> Result<Self, Self::Error> {
///         if self.0 == 0 { Err("no tickets left") } else { Ok(Ticket(self.0)) }
///     }
/// }
///
/// assert!(Ticket(1).try_clone().is_ok());
/// assert!(Ticket(0).try_clone().is_err());
/// ```
pub trait TryClone: Sized {
    /// Error produced when a copy fails.
    type Error;

    /// Try to create a copy of `self`.
    fn try_clone(&self) -> Result<Self, Self::Error>;
}

macro_rules! impl_infallible_try_clone {
    ($($ty:ty),* $(,)?) => {
        $(
            impl TryClone for $ty {
                type Error = Infallible;

                #[inline]
                fn try_clone(&self) -> Result<Self, Infallible> {
                    Ok(self.clone())
                }
            }
        )*
    };
}

impl_infallible_try_clone!(
    bool, char,
    u8, u16, u32, u64, u128, usize,
    i8, i16, i32, i64, i128, isize,
    f32, f64,
    String,
);

impl<T: TryClone> TryClone for Option<T> {
    type Error = T::Error;

    fn try_clone(&self) -> Result<Self, Self::Error> {
        self.as_ref().map(T::try_clone).transpose()
    }
}
