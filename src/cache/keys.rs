// Cache keys.
// One fixed key per cached collection.

use crate::github::RepositoryOptions;

pub const PROFILE: &str = "github-profile-cache";
pub const REPOSITORIES: &str = "github-repositories-cache";
pub const FEATURED: &str = "github-featured-cache";

/// Key for a repository listing. The default listing uses the bare key;
/// other sort orders and pages get their own entry.
pub fn repositories(options: &RepositoryOptions) -> String {
    if *options == RepositoryOptions::default() {
        REPOSITORIES.to_string()
    } else {
        format!("{}:{}", REPOSITORIES, options)
    }
}

/// Key for a batch of named repositories looked up outside the configured list.
pub fn featured_batch<S: AsRef<str>>(names: &[S]) -> String {
    let names: Vec<&str> = names.iter().map(|name| name.as_ref()).collect();
    format!("{}:{}", FEATURED, names.join(","))
}
