use syn::{Attribute, Result as SynResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAttribute {
    Default,
    Skip,
}

pub fn parse_field_attributes(attrs: &[Attribute]) -> SynResult<FieldAttribute> {
    let mut res = FieldAttribute::Default;

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("inject")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                res = FieldAttribute::Skip;
                Ok(())
            } else {
                Err(meta.error("expects `#[inject(skip)]`"))
            }
        })?;
    }

    Ok(res)
}
