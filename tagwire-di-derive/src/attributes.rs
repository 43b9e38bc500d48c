use syn::{Attribute, Error, Expr, ExprLit, ExprPath, Lit, LitStr, Meta, Result, Token};

pub const INJECT: &str = "inject";
pub const INJECTABLE: &str = "injectable";
pub const TAG: &str = "tag";

pub enum DefaultDefinition {
    Default,
    Expr(ExprPath),
}

/// `#[injectable(...)]` on a struct.
#[derive(Default)]
pub struct StructAttributes {
    pub tag: Option<LitStr>,
    pub is_singleton: bool,
    pub has_injection_points: bool,
}

impl TryFrom<&Attribute> for StructAttributes {
    type Error = Error;

    fn try_from(value: &Attribute) -> Result<Self> {
        let mut result = Self::default();
        value.parse_nested_meta(|meta| {
            if meta.path.is_ident("tag") {
                result.tag = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("singleton") {
                result.is_singleton = true;
            } else if meta.path.is_ident("injection_points") {
                result.has_injection_points = true;
            } else {
                return Err(meta.error("Unsupported injectable attribute!"));
            }

            Ok(())
        })?;

        Ok(result)
    }
}

/// `#[injectable(...)]` on a non-injected field.
pub struct FieldAttributes {
    pub default: Option<DefaultDefinition>,
}

impl TryFrom<&Attribute> for FieldAttributes {
    type Error = Error;

    fn try_from(value: &Attribute) -> Result<Self> {
        let mut default = None;
        value.parse_nested_meta(|meta| {
            if meta.path.is_ident("default") {
                if meta.input.peek(Token![=]) {
                    let value = meta.value()?;
                    let expr: LitStr = value.parse()?;
                    default = Some(DefaultDefinition::Expr(expr.parse()?));
                } else {
                    default = Some(DefaultDefinition::Default);
                }
            } else {
                return Err(meta.error("Unsupported injectable field attribute!"));
            }

            Ok(())
        })?;

        Ok(Self { default })
    }
}

/// `#[inject]` or `#[inject(tag = "...")]` on a field, constructor or method.
pub struct InjectAttributes {
    pub tag: Option<LitStr>,
}

impl TryFrom<&Attribute> for InjectAttributes {
    type Error = Error;

    fn try_from(value: &Attribute) -> Result<Self> {
        let mut tag = None;
        if let Meta::Path(_) = value.meta {
            return Ok(Self { tag });
        }

        value.parse_nested_meta(|meta| {
            if meta.path.is_ident("tag") {
                tag = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("Unsupported inject attribute!"))
            }
        })?;

        Ok(Self { tag })
    }
}

/// Reads a `#[tag = "..."]` parameter attribute.
pub fn parse_tag(value: &Attribute) -> Result<LitStr> {
    if let Meta::NameValue(name_value) = &value.meta {
        if let Expr::Lit(ExprLit {
            lit: Lit::Str(tag), ..
        }) = &name_value.value
        {
            return Ok(tag.clone());
        }
    }

    Err(Error::new_spanned(value, "Expected #[tag = \"name\"]!"))
}

pub fn find_attribute<'a>(attributes: &'a [Attribute], name: &str) -> Option<&'a Attribute> {
    attributes
        .iter()
        .find(|attribute| attribute.path().is_ident(name))
}
