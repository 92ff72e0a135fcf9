//! Guard macros for early-return error handling.
//!
//! ```ignore
//! ensure!(!self.is_paused(), SaleError::Paused);
//! ensure_ne!(*new_owner, ZERO_ADDRESS, SaleError::InvalidAddress { .. });
//! ```

/// Return early with an error if the condition is false.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return ::core::result::Result::Err(::core::convert::Into::into($err));
        }
    };
}

/// Return early with an error if two values are equal.
#[macro_export]
macro_rules! ensure_ne {
    ($left:expr, $right:expr, $err:expr) => {
        if $left == $right {
            return ::core::result::Result::Err(::core::convert::Into::into($err));
        }
    };
}
