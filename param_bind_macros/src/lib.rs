mod bind;

use proc_macro::TokenStream;

// ============================================================================
// #[derive(Bind)]
// ============================================================================

/// Derive `param_bind::Bind` and `param_bind::Param` for a struct with named
/// fields.
///
/// # Field attributes
///
/// ```ignore
/// #[derive(Clone, Default, Bind)]
/// struct ListUsers {
///     #[bind(query)]                          // query key "page"
///     page: u32,
///     #[bind(query, name = "per_page")]       // query key "per_page"
///     limit: Option<u32>,
///     #[bind(header, name = "x-lang", default = "en")]
///     lang: String,
///     #[bind(query, all)]                     // every query pair
///     filters: HashMap<String, String>,
///     #[bind]                                 // by type, from a type parser
///     request: Request,
///     #[bind(nested)]                         // visit the fields of Paging
///     paging: Paging,
///     #[bind(inject)]                         // a provided singleton
///     db: Arc<Db>,
///     note: String,                           // left at its default
/// }
/// ```
///
/// Marker fields (`query`, `header`, ...) must implement
/// `serde::Deserialize`; `nested` fields must themselves derive `Bind`.
#[proc_macro_derive(Bind, attributes(bind))]
pub fn derive_bind(input: TokenStream) -> TokenStream {
    bind::derive_bind(input)
}
