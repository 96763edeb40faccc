mod archive;
mod cache;
mod fetch;
mod report;
mod spec;

pub use archive::extract_gem_archive;
pub use cache::{CACHE_DIR_ENV, cache_report, clear_cache, default_cache_root, resolve_gem};
pub use fetch::download_gem;
pub use report::{compare_gem_metadata, render_metadata_report};
pub use spec::{
    GemDependency, GemSpec, RequirementField, StringOrList, VersionField, fetch_gem_spec,
    parse_gem_spec,
};
