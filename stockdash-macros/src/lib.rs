use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

/// Derives JSON decoding helpers for wire types of the `stockdash` crate.
///
/// The generated `from_bytes` decodes a whole response body and `from_slice`
/// decodes a borrowed slice such as a single NDJSON line. Both map failures
/// to `crate::Error::JsonParse`, so the derive is only usable inside
/// `stockdash` itself.
#[proc_macro_derive(FromJson)]
pub fn derive_from_json(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics #name #ty_generics #where_clause {
            pub fn from_bytes(bytes: ::bytes::Bytes) -> crate::Result<Self> {
                ::serde_json::from_slice(&bytes).map_err(crate::Error::JsonParse)
            }

            pub fn from_slice(slice: &[u8]) -> crate::Result<Self> {
                ::serde_json::from_slice(slice).map_err(crate::Error::JsonParse)
            }
        }
    };
    TokenStream::from(expanded)
}
