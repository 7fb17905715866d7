//! `#[derive(TypedOperation)]`.

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    DeriveInput, Ident, LitStr, Token,
    parse::{Parse, ParseStream},
    parse_macro_input,
};

/// Arguments of the `#[operation(...)]` helper attribute.
#[derive(Default)]
pub(crate) struct OperationArgs {
    pub name: Option<LitStr>,
    pub collect: bool,
}

impl Parse for OperationArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = OperationArgs::default();

        while !input.is_empty() {
            let ident: Ident = input.parse()?;

            match ident.to_string().as_str() {
                "name" => {
                    input.parse::<Token![=]>()?;
                    let lit: LitStr = input.parse()?;
                    if lit.value().is_empty() {
                        return Err(syn::Error::new(
                            lit.span(),
                            "operation name must not be empty",
                        ));
                    }
                    args.name = Some(lit);
                }
                "collect" => {
                    args.collect = true;
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {}", other),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(args)
    }
}

fn parse_args(input: &DeriveInput) -> syn::Result<OperationArgs> {
    let mut args = OperationArgs::default();
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("operation")) {
        let parsed: OperationArgs = attr.parse_args()?;
        if parsed.name.is_some() {
            args.name = parsed.name;
        }
        args.collect |= parsed.collect;
    }
    Ok(args)
}

/// Implementation of `#[derive(TypedOperation)]`.
pub fn derive_typed_operation_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let args = match parse_args(&input) {
        Ok(args) => args,
        Err(err) => return err.to_compile_error().into(),
    };

    if args.collect && !input.generics.params.is_empty() {
        return syn::Error::new_spanned(
            &input.generics,
            "#[operation(collect)] cannot be used on generic types",
        )
        .to_compile_error()
        .into();
    }

    let type_name = match args.name {
        Some(lit) => quote! { #lit },
        None => quote! { ::core::concat!(::core::module_path!(), "::", ::core::stringify!(#name)) },
    };

    let submit = args.collect.then(|| {
        quote! {
            ::portico::inventory::submit! {
                ::portico::OperationRegistration::of::<#name>()
            }
        }
    });

    let expanded = quote! {
        impl #impl_generics ::portico::TypedOperation for #name #ty_generics #where_clause {
            const TYPE_NAME: &'static str = #type_name;
        }

        #submit
    };

    TokenStream::from(expanded)
}
