/// Compile a CSS selector once and hand out a `&'static Selector`.
///
/// Only for literal selectors known to be valid; a typo panics on first use.
macro_rules! selector {
    ($css: literal) => {{
        static SELECTOR: once_cell::sync::Lazy<scraper::Selector> =
            once_cell::sync::Lazy::new(|| scraper::Selector::parse($css).expect("invalid static selector"));
        &*SELECTOR
    }};
}
