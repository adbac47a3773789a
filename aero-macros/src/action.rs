//! The `#[action]` attribute.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    Expr, ExprLit, FnArg, Ident, ItemFn, Lit, LitStr, MetaNameValue, Pat, PatType, Token, Type,
    ext::IdentExt,
    parse::{Parse, ParseStream},
    parse_macro_input,
    punctuated::Punctuated,
};

/// Arguments for the `#[action]` macro.
///
/// Either `name = "shop:item:show"` or the bare literal `"shop:item:show"`.
/// Without a name the action is named after the function.
pub(crate) struct ActionArgs {
    pub name: Option<LitStr>,
}

impl Parse for ActionArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(LitStr) {
            let name = non_empty(input.parse()?)?;
            return Ok(Self { name: Some(name) });
        }

        let mut name = None;
        for pair in Punctuated::<MetaNameValue, Token![,]>::parse_terminated(input)? {
            if !pair.path.is_ident("name") {
                return Err(syn::Error::new_spanned(
                    &pair.path,
                    "expected `name = \"...\"`",
                ));
            }
            if name.is_some() {
                return Err(syn::Error::new_spanned(
                    &pair.path,
                    "`name` is given more than once",
                ));
            }
            let Expr::Lit(ExprLit { lit: Lit::Str(lit), .. }) = &pair.value else {
                return Err(syn::Error::new_spanned(
                    &pair.value,
                    "the action name must be a string literal",
                ));
            };
            name = Some(non_empty(lit.clone())?);
        }

        Ok(Self { name })
    }
}

fn non_empty(name: LitStr) -> syn::Result<LitStr> {
    if name.value().trim().is_empty() {
        return Err(syn::Error::new(name.span(), "the action name is empty"));
    }
    Ok(name)
}

/// How one parameter is bound.
enum Binding {
    /// By route parameter name, parsed.
    Named,
    /// `&T`: by type, passed as a reference.
    Borrowed,
    /// `#[context] x: T`: by type, cloned out of the pool.
    Cloned,
}

struct Param {
    name: String,
    /// The bound type (the referent for `&T`).
    ty: Type,
    binding: Binding,
    default: Option<Expr>,
}

fn parse_param(arg: &mut PatType) -> syn::Result<Param> {
    let name = match &*arg.pat {
        Pat::Ident(pat) => pat.ident.unraw().to_string(),
        other => {
            return Err(syn::Error::new_spanned(
                other,
                "action parameters must be plain identifiers",
            ));
        }
    };

    let mut context = false;
    let mut default = None;
    let mut kept = Vec::with_capacity(arg.attrs.len());
    for attr in arg.attrs.drain(..) {
        if attr.path().is_ident("context") {
            context = true;
        } else if attr.path().is_ident("default") {
            default = Some(attr.parse_args::<Expr>()?);
        } else {
            kept.push(attr);
        }
    }
    arg.attrs = kept;

    let (ty, binding) = match &*arg.ty {
        Type::Reference(reference) => {
            if let Some(mutability) = &reference.mutability {
                return Err(syn::Error::new_spanned(
                    mutability,
                    "action parameters cannot be `&mut`; context values are shared",
                ));
            }
            ((*reference.elem).clone(), Binding::Borrowed)
        }
        ty if context => (ty.clone(), Binding::Cloned),
        ty => (ty.clone(), Binding::Named),
    };

    Ok(Param {
        name,
        ty,
        binding,
        default,
    })
}

/// Implementation of the `#[action]` macro.
pub fn action_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as ActionArgs);
    let input = parse_macro_input!(item as ItemFn);

    match expand(args, input) {
        Ok(tokens) => tokens.into(),
        Err(error) => error.to_compile_error().into(),
    }
}

fn expand(args: ActionArgs, mut input: ItemFn) -> syn::Result<TokenStream2> {
    if let Some(asyncness) = &input.sig.asyncness {
        return Err(syn::Error::new_spanned(
            asyncness,
            "actions are synchronous; remove `async`",
        ));
    }
    if !input.sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.sig.generics,
            "action functions cannot be generic",
        ));
    }

    let fn_name = input.sig.ident.clone();
    let fn_vis = input.vis.clone();
    let action_name = args
        .name
        .map_or_else(|| fn_name.unraw().to_string(), |name| name.value());

    let mut params = Vec::with_capacity(input.sig.inputs.len());
    for arg in input.sig.inputs.iter_mut() {
        match arg {
            FnArg::Typed(pat_type) => params.push(parse_param(pat_type)?),
            FnArg::Receiver(receiver) => {
                return Err(syn::Error::new_spanned(
                    receiver,
                    "actions are free functions; remove `self`",
                ));
            }
        }
    }

    let specs = params.iter().map(|param| {
        let name = &param.name;
        let ty = &param.ty;
        let spec = match param.binding {
            Binding::Named => quote! { ::aero::controller::ParamSpec::named(#name) },
            Binding::Borrowed | Binding::Cloned => {
                quote! { ::aero::controller::ParamSpec::typed::<#ty>(#name) }
            }
        };
        match &param.default {
            Some(default) => quote! { .param(#spec.with_default::<#ty>(#default)) },
            None => quote! { .param(#spec) },
        }
    });

    let slots: Vec<Ident> = (0..params.len()).map(|i| format_ident!("__arg{}", i)).collect();
    let bindings = params.iter().zip(&slots).enumerate().map(|(index, (param, slot))| {
        let ty = &param.ty;
        match param.binding {
            Binding::Named => quote! {
                let #slot: #ty = __args.value::<#ty>(#index)?;
            },
            Binding::Borrowed => quote! {
                let #slot: ::std::sync::Arc<#ty> = __args.context::<#ty>(#index)?;
            },
            Binding::Cloned => quote! {
                let #slot: #ty = ::std::clone::Clone::clone(&*__args.context::<#ty>(#index)?);
            },
        }
    });
    let call_args = params.iter().zip(&slots).map(|(param, slot)| match param.binding {
        Binding::Borrowed => quote! { &*#slot },
        Binding::Named | Binding::Cloned => quote! { #slot },
    });

    input.sig.ident = format_ident!("__action");
    input.vis = syn::Visibility::Inherited;

    Ok(quote! {
        #[allow(non_camel_case_types)]
        #[derive(Clone, Copy, Debug, Default)]
        #[doc = concat!("Action generated by `#[aero::action]` on `", stringify!(#fn_name), "`")]
        #fn_vis struct #fn_name;

        impl #fn_name {
            #[allow(clippy::too_many_arguments)]
            #input
        }

        impl ::aero::controller::Action for #fn_name {
            fn descriptor(&self) -> &::aero::controller::ActionDescriptor {
                static DESCRIPTOR: ::std::sync::OnceLock<::aero::controller::ActionDescriptor> =
                    ::std::sync::OnceLock::new();
                DESCRIPTOR.get_or_init(|| {
                    ::aero::controller::ActionDescriptor::new(#action_name)
                        #(#specs)*
                })
            }

            fn call(
                &self,
                __args: ::aero::controller::Arguments,
            ) -> ::core::result::Result<::aero::controller::ActionOutput, ::aero::BoxError> {
                #(#bindings)*
                ::aero::controller::IntoActionOutput::into_action_output(
                    Self::__action(#(#call_args),*)
                )
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_of(attr: &str) -> syn::Result<Option<String>> {
        syn::parse_str::<ActionArgs>(attr).map(|args| args.name.map(|lit| lit.value()))
    }

    #[test]
    fn test_name_forms() {
        assert_eq!(name_of("").unwrap(), None);
        assert_eq!(name_of(r#"name = "shop:item:show""#).unwrap().as_deref(), Some("shop:item:show"));
        assert_eq!(name_of(r#"name = "a","#).unwrap().as_deref(), Some("a"));
        assert_eq!(name_of(r#""shop:item:list""#).unwrap().as_deref(), Some("shop:item:list"));
    }

    #[test]
    fn test_rejected_arguments() {
        assert!(name_of(r#"priority = "1""#).is_err());
        assert!(name_of(r#"name = "a", name = "b""#).is_err());
        assert!(name_of("name = 3").is_err());
        assert!(name_of(r#"name = " ""#).is_err());
    }
}
