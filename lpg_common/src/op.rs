/// Implements operator traits for a single-field integer newtype by delegating to the inner value.
///
/// ```ignore
/// op!(Points => Add::add, Sub::sub);
/// op!(assign Points => AddAssign::add_assign);
/// op!(neg Points);
/// ```
#[macro_export]
macro_rules! op {
    ($ty:ident => $($tr:ident::$f:ident),+ $(,)?) => {
        $(
            impl $tr for $ty {
                type Output = Self;

                fn $f(self, rhs: Self) -> Self {
                    Self($tr::$f(self.0, rhs.0))
                }
            }
        )+
    };

    (assign $ty:ident => $($tr:ident::$f:ident),+ $(,)?) => {
        $(
            impl $tr for $ty {
                fn $f(&mut self, rhs: Self) {
                    $tr::$f(&mut self.0, rhs.0)
                }
            }
        )+
    };

    (neg $ty:ident) => {
        impl Neg for $ty {
            type Output = Self;

            fn neg(self) -> Self {
                Self(-self.0)
            }
        }
    };
}
