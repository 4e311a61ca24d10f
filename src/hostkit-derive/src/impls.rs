use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::spanned::Spanned;
use syn::{
    Data, DeriveInput, Error as SynError, Field, Fields, GenericArgument, Ident, PathArguments,
    Result as SynResult, Type, Visibility,
};

use crate::attrs::{self, FieldAttribute};

#[derive(Debug)]
struct SlotData<'a> {
    field: &'a Ident,
    service: &'a Type,
}

pub fn expand_implementation(input: DeriveInput) -> SynResult<TokenStream2> {
    let fields = get_named_fields(&input)?;
    let slots = fields
        .into_iter()
        .map(parse_slot)
        .filter_map(Result::transpose)
        .collect::<SynResult<Vec<_>>>()?;

    let self_type = &input.ident;
    let (impl_generics, type_generics, where_clause) = input.generics.split_for_impl();

    let assignments = slots
        .iter()
        .map(|SlotData { field, service }| {
            quote! {
                if self.#field.is_none() {
                    self.#field = services.get::<#service>();
                }
            }
        })
        .collect::<TokenStream2>();

    Ok(quote! {
        impl #impl_generics hostkit::service::Inject for #self_type #type_generics #where_clause {
            #[allow(unused_variables)]
            fn inject(&mut self, services: &hostkit::service::ServiceRegistry) {
                #assignments
            }
        }
    })
}

fn get_named_fields(input: &DeriveInput) -> SynResult<Vec<&Field>> {
    let message = "`#[derive(Inject)]` should be applied to a struct with named fields";
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(fields.named.iter().collect()),
            Fields::Unit => Ok(Vec::new()),
            Fields::Unnamed(fields) => Err(SynError::new(fields.span(), message)),
        },
        Data::Enum(data) => Err(SynError::new(data.enum_token.span(), message)),
        Data::Union(data) => Err(SynError::new(data.union_token.span(), message)),
    }
}

/// Returns the slot described by `field`, or `None` if the field is not
/// injectable.
fn parse_slot(field: &Field) -> SynResult<Option<SlotData<'_>>> {
    let attr = attrs::parse_field_attributes(&field.attrs)?;
    if attr == FieldAttribute::Skip || !matches!(field.vis, Visibility::Public(_)) {
        return Ok(None);
    }

    let Some(field_ident) = field.ident.as_ref() else {
        return Ok(None);
    };

    Ok(get_service_type(&field.ty).map(|service| SlotData {
        field: field_ident,
        service,
    }))
}

/// Extracts `S` from `Option<Arc<S>>`.
fn get_service_type(ty: &Type) -> Option<&Type> {
    let option_arg = get_single_type_argument(ty, "Option")?;
    get_single_type_argument(option_arg, "Arc")
}

fn get_single_type_argument<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }

    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }

    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }

    match args.args.first()? {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    }
}
