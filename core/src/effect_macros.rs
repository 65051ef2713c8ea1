//! Declarative macros for ergonomic effect construction

/// Create an `Effect::Future` from an async block
///
/// The block is moved into the future and must evaluate to `Option<Action>`.
///
/// # Example
///
/// ```rust,ignore
/// use platter_core::async_effect;
///
/// async_effect! {
///     credentials.clear();
///     None
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}
