use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Expr, Fields, Lit, Meta};

const TAGS: [&str; 5] = ["env", "envdef", "envsep", "envjson", "validate"];

/// Derive `envbind::Bind` from field tag attributes.
///
/// ```ignore
/// #[derive(Bind, Default)]
/// struct Config {
///     #[env = "PORT,required"]
///     #[validate = "min=1,max=65535"]
///     port: u16,
///     #[env = "HOSTS"]
///     #[envsep = ";"]
///     hosts: Vec<String>,
/// }
/// ```
#[proc_macro_derive(Bind, attributes(env, envdef, envsep, envjson, validate))]
pub fn derive_bind(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generate_bind(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn generate_bind(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Bind can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Bind can only be derived for structs",
            ));
        }
    };

    let mut descriptors = Vec::new();
    let mut bind_calls = Vec::new();

    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let Some(tags) = parse_field_tags(&field.attrs)? else {
            continue;
        };

        let field_str = field_name.to_string();
        let FieldTags {
            key,
            required,
            default,
            separator,
            json,
            rule,
        } = tags;
        let default = option_tokens(default);
        let rule_tokens = option_tokens(rule.clone());

        let descriptor = quote! {
            ::envbind::FieldDescriptor {
                field: #field_str,
                key: #key,
                required: #required,
                default: #default,
                separator: #separator,
                json: #json,
                rule: #rule_tokens,
            }
        };

        let method = match (json, rule.is_some()) {
            (true, true) => quote!(json_checked),
            (true, false) => quote!(json),
            (false, _) => quote!(field),
        };
        bind_calls.push(quote! {
            binder.#method(&mut self.#field_name, &#descriptor);
        });
        descriptors.push(descriptor);
    }

    Ok(quote! {
        impl #impl_generics ::envbind::Bind for #struct_name #ty_generics #where_clause {
            fn descriptors() -> ::std::vec::Vec<::envbind::FieldDescriptor> {
                ::std::vec![#(#descriptors),*]
            }

            #[allow(unused_variables)]
            fn bind_fields<__EnvbindLookup: ::envbind::Lookup + ?Sized>(
                &mut self,
                binder: &mut ::envbind::Binder<'_, __EnvbindLookup>,
            ) {
                #(#bind_calls)*
            }
        }
    })
}

#[derive(Debug)]
struct FieldTags {
    key: String,
    required: bool,
    default: Option<String>,
    separator: String,
    json: bool,
    rule: Option<String>,
}

fn option_tokens(value: Option<String>) -> proc_macro2::TokenStream {
    match value {
        Some(v) => quote!(::std::option::Option::Some(#v)),
        None => quote!(::std::option::Option::None),
    }
}

/// Read `#[tag = "text"]`; a bare `#[tag]` yields `None`
fn tag_value(attr: &Attribute) -> syn::Result<Option<String>> {
    match &attr.meta {
        Meta::Path(_) => Ok(None),
        Meta::NameValue(nv) => match &nv.value {
            Expr::Lit(expr) => match &expr.lit {
                Lit::Str(s) => Ok(Some(s.value())),
                _ => Err(syn::Error::new_spanned(
                    &nv.value,
                    "tag value must be a string literal",
                )),
            },
            _ => Err(syn::Error::new_spanned(
                &nv.value,
                "tag value must be a string literal",
            )),
        },
        Meta::List(list) => {
            let s: syn::LitStr = list.parse_args()?;
            Ok(Some(s.value()))
        }
    }
}

/// Split `NAME,required` into the key and its requiredness
fn parse_env_tag(tag: &str) -> (String, bool) {
    match tag.split_once(',') {
        Some((name, options)) => (
            name.trim().to_string(),
            options.split(',').any(|o| o.trim() == "required"),
        ),
        None => (tag.trim().to_string(), false),
    }
}

fn parse_field_tags(attrs: &[Attribute]) -> syn::Result<Option<FieldTags>> {
    let mut env_attr = None;
    let mut default = None;
    let mut separator = None;
    let mut json = false;
    let mut rule = None;
    let mut first_tag = None;

    for attr in attrs {
        let Some(ident) = attr.path().get_ident() else {
            continue;
        };
        let name = ident.to_string();
        if !TAGS.contains(&name.as_str()) {
            continue;
        }
        first_tag.get_or_insert(attr);

        let value = tag_value(attr)?;
        match name.as_str() {
            "env" => {
                let text = value.ok_or_else(|| {
                    syn::Error::new_spanned(attr, "env needs a name: #[env = \"NAME\"]")
                })?;
                env_attr = Some((attr, text));
            }
            "envdef" => default = value.filter(|v| !v.is_empty()),
            "envsep" => separator = value.filter(|v| !v.is_empty()),
            "envjson" => {
                json = value.map_or(true, |v| v.trim().eq_ignore_ascii_case("true"));
            }
            "validate" => rule = value.filter(|v| !v.trim().is_empty()),
            _ => {}
        }
    }

    let Some((attr, text)) = env_attr else {
        return match first_tag {
            Some(attr) => Err(syn::Error::new_spanned(
                attr,
                "binding tags need an #[env = \"NAME\"] on the same field",
            )),
            None => Ok(None),
        };
    };

    let (key, required) = parse_env_tag(&text);
    if key.is_empty() {
        return Err(syn::Error::new_spanned(attr, "env name must not be empty"));
    }

    Ok(Some(FieldTags {
        key,
        required,
        default,
        separator: separator.unwrap_or_else(|| ",".to_string()),
        json,
        rule,
    }))
}
