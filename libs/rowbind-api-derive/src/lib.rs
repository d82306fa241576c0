use proc_macro::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::meta::ParseNestedMeta;
use syn::{
    parse_macro_input, Data, DeriveInput, Fields, GenericArgument, LitStr, PathArguments, Token,
    Type,
};

/// Derive macro for destination records.
///
/// Implements `rowbind_api::record::Record` for the annotated struct:
///
/// - `fields()` — field table in declaration order (name, alias, kind).
/// - `set_field(index, Option<Scalar>)`: stores a coerced value into the
///   field, or clears it on `None`.
///
/// The struct must implement `Default`, which only has to construct it.
///
/// Column names come from, in order: `#[column(alias = "..")]`,
/// `#[serde(rename = "..")]`, a struct-level `#[serde(rename_all = "..")]`
/// applied to the field name. `#[column(skip)]`, `#[serde(skip)]` and
/// `#[serde(skip_deserializing)]` leave a field out of the table.
///
/// # Example
///
/// ```ignore
/// #[derive(Record, Default)]
/// pub struct Trade {
///     #[column(alias = "trade_id")]
///     pub id: u64,
///
///     pub price: f64,
///
///     #[serde(rename = "sym")]
///     pub symbol: String,
///
///     pub venue: Option<String>,
///
///     #[column(skip)]
///     pub cache: Vec<u8>,
/// }
/// ```
///
/// Supported field types: `i8`..`i64`, `isize`, `u8`..`u64`, `usize`, `f32`,
/// `f64`, `bool`, `String`, and `Option` of any of them. Other types are
/// registered as unsupported and fail only when a column is written into them.
#[proc_macro_derive(Record, attributes(column, serde))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_impl(&input) {
        Ok(tokens) => tokens,
        Err(e) => e.to_compile_error().into(),
    }
}

fn derive_impl(input: &DeriveInput) -> Result<TokenStream, syn::Error> {
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Record only supports structs with named fields",
                ))
            }
        },
        _ => return Err(syn::Error::new_spanned(name, "Record only supports structs")),
    };

    let rename_all = container_rename_all(&input.attrs)?;

    let mut desc_tokens = Vec::new();
    let mut setter_tokens = Vec::new();
    let mut seen_aliases: Vec<String> = Vec::new();

    for field in fields {
        let field_ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected named field"))?;
        let field_name_str = field_ident.unraw().to_string();
        let field_ty = &field.ty;

        // #[column(alias = "...", skip)] and #[serde(rename = "...")].
        let mut column_alias: Option<String> = None;
        let mut serde_rename: Option<String> = None;
        let mut skip = false;

        for attr in &field.attrs {
            if attr.path().is_ident("column") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("alias") {
                        let value: LitStr = meta.value()?.parse()?;
                        column_alias = Some(value.value());
                    } else if meta.path.is_ident("skip") {
                        skip = true;
                    } else {
                        return Err(meta.error("expected `alias = \"...\"` or `skip`"));
                    }
                    Ok(())
                })?;
            } else if attr.path().is_ident("serde") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename") && meta.input.peek(Token![=]) {
                        let value: LitStr = meta.value()?.parse()?;
                        serde_rename = Some(value.value());
                        Ok(())
                    } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_deserializing")
                    {
                        skip = true;
                        Ok(())
                    } else {
                        skip_nested_meta(&meta)
                    }
                })?;
            }
        }

        if skip {
            continue;
        }

        let alias = column_alias.or(serde_rename).or_else(|| {
            rename_all
                .map(|rule| rule.apply(&field_name_str))
                .filter(|renamed| *renamed != field_name_str)
        });
        if let Some(alias) = &alias {
            if seen_aliases.contains(alias) {
                return Err(syn::Error::new_spanned(
                    field_ident,
                    format!("duplicate column alias '{alias}'"),
                ));
            }
            seen_aliases.push(alias.clone());
        }
        let alias_expr = match &alias {
            Some(alias) => quote! {
                ::core::option::Option::Some(::std::borrow::Cow::Borrowed(#alias))
            },
            None => quote! { ::core::option::Option::None },
        };

        let (value_ty, optional) = match option_inner(field_ty) {
            Some(inner) => (inner, true),
            None => (field_ty, false),
        };

        let index = desc_tokens.len();
        match kind_variant(value_ty) {
            Some(variant) => {
                desc_tokens.push(quote! {
                    ::rowbind_api::record::FieldDesc {
                        name: ::std::borrow::Cow::Borrowed(#field_name_str),
                        alias: #alias_expr,
                        kind: ::rowbind_api::record::FieldKind::#variant,
                        optional: #optional,
                    }
                });
                setter_tokens.push(quote! {
                    #index => {
                        self.#field_ident =
                            ::rowbind_api::record::FromScalar::from_cell(__value)?;
                        ::core::result::Result::Ok(())
                    }
                });
            }
            None => {
                let type_name = quote!(#field_ty).to_string().replace(' ', "");
                desc_tokens.push(quote! {
                    ::rowbind_api::record::FieldDesc {
                        name: ::std::borrow::Cow::Borrowed(#field_name_str),
                        alias: #alias_expr,
                        kind: ::rowbind_api::record::FieldKind::Unsupported(#type_name),
                        optional: #optional,
                    }
                });
                setter_tokens.push(quote! {
                    #index => match __value {
                        ::core::option::Option::None => ::core::result::Result::Ok(()),
                        ::core::option::Option::Some(_) => ::core::result::Result::Err(
                            ::rowbind_api::error::CoerceError::Unsupported {
                                type_name: #type_name,
                            },
                        ),
                    },
                });
            }
        }
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::rowbind_api::record::Record for #name #ty_generics #where_clause {
            fn fields() -> &'static [::rowbind_api::record::FieldDesc] {
                static FIELDS: &[::rowbind_api::record::FieldDesc] = &[
                    #(#desc_tokens),*
                ];
                FIELDS
            }

            #[allow(unused_variables)]
            fn set_field(
                &mut self,
                __index: usize,
                __value: ::core::option::Option<::rowbind_api::value::Scalar>,
            ) -> ::core::result::Result<(), ::rowbind_api::error::CoerceError> {
                match __index {
                    #(#setter_tokens)*
                    other => ::core::result::Result::Err(
                        ::rowbind_api::error::CoerceError::NoSuchField(other),
                    ),
                }
            }
        }
    };

    Ok(TokenStream::from(expanded))
}

/// serde's `rename_all` rules, applied to snake_case field names.
#[derive(Clone, Copy)]
enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl RenameRule {
    fn parse(lit: &LitStr) -> Result<Self, syn::Error> {
        Ok(match lit.value().as_str() {
            "lowercase" => Self::Lower,
            "UPPERCASE" => Self::Upper,
            "PascalCase" => Self::Pascal,
            "camelCase" => Self::Camel,
            "snake_case" => Self::Snake,
            "SCREAMING_SNAKE_CASE" => Self::ScreamingSnake,
            "kebab-case" => Self::Kebab,
            "SCREAMING-KEBAB-CASE" => Self::ScreamingKebab,
            other => {
                return Err(syn::Error::new_spanned(
                    lit,
                    format!("unknown rename_all rule '{other}'"),
                ))
            }
        })
    }

    fn apply(self, field: &str) -> String {
        match self {
            Self::Lower | Self::Snake => field.to_string(),
            Self::Upper | Self::ScreamingSnake => field.to_ascii_uppercase(),
            Self::Pascal => {
                let mut out = String::with_capacity(field.len());
                let mut capitalize = true;
                for ch in field.chars() {
                    if ch == '_' {
                        capitalize = true;
                    } else if capitalize {
                        out.push(ch.to_ascii_uppercase());
                        capitalize = false;
                    } else {
                        out.push(ch);
                    }
                }
                out
            }
            Self::Camel => {
                let pascal = Self::Pascal.apply(field);
                let mut chars = pascal.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            }
            Self::Kebab => field.replace('_', "-"),
            Self::ScreamingKebab => field.to_ascii_uppercase().replace('_', "-"),
        }
    }
}

/// Struct-level `#[serde(rename_all = "..")]`.
///
/// The `rename_all(deserialize = "..")` form is honored; a lone `serialize`
/// rule is not, since columns are only ever read.
fn container_rename_all(attrs: &[syn::Attribute]) -> Result<Option<RenameRule>, syn::Error> {
    let mut rule = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if !meta.path.is_ident("rename_all") {
                return skip_nested_meta(&meta);
            }
            if meta.input.peek(Token![=]) {
                let value: LitStr = meta.value()?.parse()?;
                rule = Some(RenameRule::parse(&value)?);
                return Ok(());
            }
            meta.parse_nested_meta(|inner| {
                let value: LitStr = inner.value()?.parse()?;
                if inner.path.is_ident("deserialize") {
                    rule = Some(RenameRule::parse(&value)?);
                }
                Ok(())
            })
        })?;
    }
    Ok(rule)
}

/// Consume a serde key this macro does not interpret.
fn skip_nested_meta(meta: &ParseNestedMeta<'_>) -> Result<(), syn::Error> {
    if meta.input.peek(Token![=]) {
        let _: syn::Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in meta.input);
        let _: proc_macro2::TokenStream = content.parse()?;
    }
    Ok(())
}

/// `Option<T>` → `T`.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

/// `FieldKind` variant for a supported scalar type.
fn kind_variant(ty: &Type) -> Option<proc_macro2::TokenStream> {
    let variant = match type_ident_name(ty)?.as_str() {
        "i8" => quote! { I8 },
        "i16" => quote! { I16 },
        "i32" => quote! { I32 },
        "i64" => quote! { I64 },
        "isize" => quote! { Isize },
        "u8" => quote! { U8 },
        "u16" => quote! { U16 },
        "u32" => quote! { U32 },
        "u64" => quote! { U64 },
        "usize" => quote! { Usize },
        "f32" => quote! { F32 },
        "f64" => quote! { F64 },
        "bool" => quote! { Bool },
        "String" => quote! { Str },
        _ => return None,
    };
    Some(variant)
}

/// Extract the last path segment ident name from a type (e.g. `u64`, `String`).
///
/// Segments carrying generic arguments are not scalar and yield `None`.
fn type_ident_name(ty: &Type) -> Option<String> {
    if let Type::Path(type_path) = ty {
        type_path
            .path
            .segments
            .last()
            .filter(|seg| seg.arguments.is_none())
            .map(|seg| seg.ident.to_string())
    } else {
        None
    }
}
