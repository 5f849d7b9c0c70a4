extern crate proc_macro;
#[macro_use]
extern crate quote;
extern crate syn;
extern crate uuid;

use proc_macro::TokenStream;

use syn::{parse_macro_input, Error, LitStr};

/// Expands a GUID string literal into a `::uuid::Uuid` built from its bytes.
///
/// The literal uses the textual GUID form found in the UEFI specification,
/// e.g. `uuid!("C12A7328-F81F-11D2-BA4B-00A0C93EC93B")`. A malformed literal
/// is reported at compile time.
#[proc_macro]
pub fn uuid(ts: TokenStream) -> TokenStream {
    let s = parse_macro_input!(ts as LitStr);

    let uuid = match uuid::Uuid::parse_str(&s.value()) {
        Ok(x) => x,
        Err(e) => {
            return Error::new(s.span(), format!("invalid GUID literal: {}", e))
                .to_compile_error()
                .into()
        }
    };
    let bytes = uuid.as_bytes().iter();

    let t = quote! {
        ::uuid::Uuid::from_bytes([#(#bytes),*])
    };

    t.into()
}
