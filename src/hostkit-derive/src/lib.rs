mod attrs;
mod impls;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use syn::Result as SynResult;

#[proc_macro_derive(Inject, attributes(inject))]
pub fn derive_inject(item: TokenStream) -> TokenStream {
    match derive_inject_impl(item) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

fn derive_inject_impl(item: TokenStream) -> SynResult<TokenStream2> {
    let input = syn::parse::<syn::DeriveInput>(item)?;
    impls::expand_implementation(input)
}
