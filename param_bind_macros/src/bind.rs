use proc_macro::TokenStream;
use proc_macro2::{Literal, TokenStream as TokenStream2};
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Field, Fields, LitStr, Meta};

enum Role {
    Plain,
    Bound { tag: String, marker: bool },
    Inject,
    Nested,
}

pub fn derive_bind(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Bind derive: only structs with named fields are supported",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Bind derive: only structs are supported",
            ))
        }
    };

    let mut descriptors = Vec::new();
    let mut arms = Vec::new();

    for (index, field) in fields.iter().enumerate() {
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "Bind derive: unnamed field"))?;
        let ty = &field.ty;
        let field_name = ident.to_string();
        let field_name = field_name.trim_start_matches("r#");
        let ordinal = Literal::usize_unsuffixed(index);

        let descriptor = match field_role(field)? {
            Role::Plain => quote! {
                ::param_bind::FieldDescriptor::plain::<#ty>(#field_name)
            },
            Role::Bound { tag, marker: true } => quote! {
                ::param_bind::FieldDescriptor::tagged::<#ty>(#field_name, #tag)
            },
            Role::Bound { tag, marker: false } => quote! {
                ::param_bind::FieldDescriptor::typed::<#ty>(#field_name, #tag)
            },
            Role::Inject => quote! {
                ::param_bind::FieldDescriptor::inject::<#ty>(#field_name)
            },
            Role::Nested => {
                arms.push(quote! {
                    [#ordinal, rest @ ..] if !rest.is_empty() => {
                        ::param_bind::Bind::slot_mut(&mut self.#ident, rest)
                    }
                });
                quote! {
                    ::param_bind::FieldDescriptor::nested::<#ty>(#field_name)
                }
            }
        };
        descriptors.push(descriptor);
        arms.push(quote! {
            [#ordinal] => ::std::option::Option::Some(&mut self.#ident as &mut dyn ::std::any::Any),
        });
    }

    Ok(quote! {
        impl #impl_generics ::param_bind::Bind for #name #ty_generics #where_clause {
            fn fields() -> ::std::vec::Vec<::param_bind::FieldDescriptor> {
                ::std::vec![#(#descriptors),*]
            }

            fn slot_mut(
                &mut self,
                path: &[usize],
            ) -> ::std::option::Option<&mut dyn ::std::any::Any> {
                match path {
                    #(#arms)*
                    _ => ::std::option::Option::None,
                }
            }
        }

        impl #impl_generics ::param_bind::Param for #name #ty_generics #where_clause {
            fn kind() -> ::param_bind::ParamKind {
                ::param_bind::ParamKind::structure::<Self>()
            }
        }
    })
}

fn field_role(field: &Field) -> syn::Result<Role> {
    let attrs: Vec<&Attribute> = field
        .attrs
        .iter()
        .filter(|attr| attr.path().is_ident("bind"))
        .collect();

    let attr = match attrs.as_slice() {
        [] => return Ok(Role::Plain),
        [attr] => *attr,
        [_, second, ..] => {
            return Err(syn::Error::new_spanned(
                second,
                "Bind derive: at most one #[bind] attribute per field",
            ))
        }
    };

    // `#[bind]` alone: bind by type.
    if let Meta::Path(_) = attr.meta {
        return Ok(Role::Bound {
            tag: String::new(),
            marker: false,
        });
    }

    let mut segments: Vec<String> = Vec::new();
    let mut inject = false;
    let mut nested = false;

    attr.parse_nested_meta(|meta| {
        let key = meta
            .path
            .get_ident()
            .map(|ident| ident.to_string())
            .ok_or_else(|| meta.error("expected an identifier"))?;

        if meta.input.peek(syn::Token![=]) {
            let value: LitStr = meta.value()?.parse()?;
            let value = value.value();
            if value.contains(',') {
                return Err(meta.error("tag values cannot contain `,`"));
            }
            segments.push(format!("{}={}", key, value));
            return Ok(());
        }

        match key.as_str() {
            "inject" => inject = true,
            "nested" => nested = true,
            _ => segments.push(key),
        }
        Ok(())
    })?;

    match (inject, nested) {
        (true, true) => Err(syn::Error::new_spanned(
            attr,
            "Bind derive: `inject` and `nested` are exclusive",
        )),
        (true, false) | (false, true) if !segments.is_empty() => Err(syn::Error::new_spanned(
            attr,
            "Bind derive: `inject` and `nested` take no other options",
        )),
        (true, false) => Ok(Role::Inject),
        (false, true) => Ok(Role::Nested),
        (false, false) => {
            let marker = segments.first().map_or(false, |first| !first.contains('='));
            Ok(Role::Bound {
                tag: segments.join(","),
                marker,
            })
        }
    }
}
