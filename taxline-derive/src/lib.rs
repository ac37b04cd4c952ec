use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, Lit, LitStr, Meta};

/// Derive macro that exposes a form's line fields as a list of line items.
///
/// The struct carries `#[line(form = "...")]`. Each field that is a line on the
/// form carries `#[line(number = "...", label = "...")]`; fields without the
/// attribute (citations, metadata) are skipped. The field's doc comment becomes
/// the line description.
///
/// Generates an implementation of `crate::core::LineItems`.
#[proc_macro_derive(LineItems, attributes(line))]
pub fn derive_line_items(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let form = match line_attr(&input.attrs, &["form"]) {
        Ok(mut values) => values.remove("form"),
        Err(err) => return err.to_compile_error().into(),
    };
    let Some(form) = form else {
        return syn::Error::new_spanned(name, "LineItems requires #[line(form = \"...\")]")
            .to_compile_error()
            .into();
    };

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => panic!("LineItems only supports structs with named fields"),
        },
        _ => panic!("LineItems only supports structs"),
    };

    let mut entries = Vec::new();
    for field in fields {
        if !field.attrs.iter().any(|a| a.path().is_ident("line")) {
            continue;
        }
        let mut values = match line_attr(&field.attrs, &["number", "label"]) {
            Ok(values) => values,
            Err(err) => return err.to_compile_error().into(),
        };
        let ident = field.ident.as_ref().unwrap();
        let number = values.remove("number").unwrap_or_default();
        let label = values
            .remove("label")
            .unwrap_or_else(|| ident.to_string().replace('_', " "));
        let description = get_doc_comment(&field.attrs);

        entries.push(quote! {
            crate::core::LineItem {
                form: #form,
                number: #number,
                label: #label,
                description: #description,
                amount: self.#ident,
            }
        });
    }

    let expanded = quote! {
        impl crate::core::LineItems for #name {
            fn form(&self) -> &'static str {
                #form
            }

            fn line_items(&self) -> Vec<crate::core::LineItem> {
                vec![#(#entries),*]
            }
        }
    };

    TokenStream::from(expanded)
}

/// Collect `key = "value"` pairs from every `#[line(...)]` attribute,
/// rejecting keys not in `allowed`.
fn line_attr(
    attrs: &[Attribute],
    allowed: &[&str],
) -> syn::Result<std::collections::HashMap<String, String>> {
    let mut values = std::collections::HashMap::new();
    for attr in attrs {
        if !attr.path().is_ident("line") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            let Some(key) = meta.path.get_ident().map(|i| i.to_string()) else {
                return Err(meta.error("expected identifier"));
            };
            if !allowed.contains(&key.as_str()) {
                return Err(meta.error(format!("unsupported line attribute `{key}`")));
            }
            let value: LitStr = meta.value()?.parse()?;
            values.insert(key, value.value());
            Ok(())
        })?;
    }
    Ok(values)
}

fn get_doc_comment(attrs: &[Attribute]) -> String {
    attrs
        .iter()
        .filter_map(|attr| {
            if !attr.path().is_ident("doc") {
                return None;
            }
            if let Meta::NameValue(meta) = &attr.meta {
                if let syn::Expr::Lit(expr_lit) = &meta.value {
                    if let Lit::Str(lit_str) = &expr_lit.lit {
                        return Some(lit_str.value().trim().to_string());
                    }
                }
            }
            None
        })
        .collect::<Vec<_>>()
        .join(" ")
}
