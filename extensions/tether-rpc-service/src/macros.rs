/// Defines a unit type describing one remote method.
///
/// ## Example
///
/// ```rust
/// use tether_rpc_service::{RpcMethod, rpc_method};
///
/// rpc_method!(pub Echo, "com.example.EchoService", "echo", String => String);
///
/// assert_eq!(Echo::INTERFACE_NAME, "com.example.EchoService");
/// assert_eq!(Echo::METHOD_NAME, "echo");
/// ```
#[macro_export]
macro_rules! rpc_method {
    (
        $(#[$meta:meta])*
        $vis:vis $name:ident, $interface:expr, $method:expr, $input:ty => $output:ty $(,)?
    ) => {
        $(#[$meta])*
        $vis struct $name;

        impl $crate::RpcMethod for $name {
            const INTERFACE_NAME: &'static str = $interface;
            const METHOD_NAME: &'static str = $method;

            type Input = $input;
            type Output = $output;
        }
    };
}

/// Defines every method of a service interface at once.
///
/// Each entry expands through [`rpc_method!`] with the shared interface name.
///
/// ## Example
///
/// ```rust
/// use tether_rpc_service::{RpcMethod, rpc_service};
///
/// rpc_service! {
///     "com.example.MathService" {
///         pub Square = "square"(i64) -> i64;
///         pub Negate = "negate"(i64) -> i64;
///     }
/// }
///
/// assert_eq!(Square::INTERFACE_NAME, Negate::INTERFACE_NAME);
/// assert_ne!(Square::METHOD_NAME, Negate::METHOD_NAME);
/// ```
#[macro_export]
macro_rules! rpc_service {
    (
        $interface:literal {
            $(
                $(#[$meta:meta])*
                $vis:vis $name:ident = $method:literal ($input:ty) -> $output:ty;
            )*
        }
    ) => {
        $(
            $crate::rpc_method!(
                $(#[$meta])*
                $vis $name, $interface, $method, $input => $output
            );
        )*
    };
}
