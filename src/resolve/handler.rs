//! Handler functions as seen by the resolver.

use super::param::{Param, ParamSpec};
use crate::error::BindError;
use crate::value::{unbox, Arguments, BoxedValue};

/// A function whose parameters can be resolved and whose call can be made
/// from a type-erased argument list.
///
/// Implemented for every `Fn(A1, .., An) -> R` with up to eight [`Param`]
/// arguments. `Args` only disambiguates the arities.
pub trait Handler<Args>: Send + Sync + 'static {
    type Output;

    /// Declared parameters, in order.
    fn params() -> Vec<ParamSpec>;

    /// Call the function, downcasting each argument to its declared type.
    fn invoke(&self, args: Arguments) -> Result<Self::Output, BindError>;
}

fn next_arg<T: 'static>(args: &mut impl Iterator<Item = BoxedValue>) -> Result<T, BindError> {
    let value = args.next().ok_or(BindError::TypeMismatch {
        expected: std::any::type_name::<T>(),
    })?;
    unbox::<T>(value)
}

macro_rules! impl_handler {
    ($($ty:ident),*) => {
        impl<F, R, $($ty,)*> Handler<fn($($ty,)*) -> R> for F
        where
            F: Fn($($ty),*) -> R + Send + Sync + 'static,
            $($ty: Param,)*
        {
            type Output = R;

            fn params() -> Vec<ParamSpec> {
                vec![$(ParamSpec::of::<$ty>()),*]
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn invoke(&self, args: Arguments) -> Result<R, BindError> {
                let mut args = args.into_iter();
                $( let $ty = next_arg::<$ty>(&mut args)?; )*
                Ok((self)($($ty),*))
            }
        }
    };
}

impl_handler!();
impl_handler!(T1);
impl_handler!(T1, T2);
impl_handler!(T1, T2, T3);
impl_handler!(T1, T2, T3, T4);
impl_handler!(T1, T2, T3, T4, T5);
impl_handler!(T1, T2, T3, T4, T5, T6);
impl_handler!(T1, T2, T3, T4, T5, T6, T7);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8);
