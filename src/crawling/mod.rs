// src/crawling/mod.rs
//! Site profiles, search URL generation and page fetching

pub mod fetcher;
pub mod site_registry;
pub mod url_generator;

pub use fetcher::{
    build_fetcher, resolve_iframe_src, FetchOptions, Fetcher, HttpFetcher, RenderServiceFetcher,
};
pub use site_registry::{detect_site, SiteKind, SiteProfile};
pub use url_generator::build_search_urls;
