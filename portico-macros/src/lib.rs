//! Procedural macros for Portico.
//!
//! - `#[derive(TypedOperation)]` - Gives an operation its stable type name,
//!   optionally submitting it to the distributed operation collection

use proc_macro::TokenStream;

mod operation;

/// Derive macro for implementing the `TypedOperation` trait.
///
/// # Attributes
///
/// - `#[operation(name = "...")]`: the stable type name. Defaults to the
///   type's module path and ident, e.g. `my_crate::ops::ResetQuota`.
/// - `#[operation(collect)]`: also submit the type to the `inventory`
///   collection so `OperationRegistryBuilder::with_collected` picks it up.
///   Requires the `inventory` feature of `portico` and an `Operation` impl.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Debug, Deserialize, TypedOperation)]
/// #[operation(name = "acme.ResetQuota", collect)]
/// struct ResetQuota { email: String }
/// ```
#[proc_macro_derive(TypedOperation, attributes(operation))]
pub fn derive_typed_operation(input: TokenStream) -> TokenStream {
    operation::derive_typed_operation_impl(input)
}
