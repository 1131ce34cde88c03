use git2::{
    AutotagOption, Config, Cred, CredentialType, FetchOptions, ProxyOptions, RemoteCallbacks,
};
use log::{debug, trace};

/// Fetch options for a single network operation.
///
/// The proxy only lives as long as the returned options: once the clone or fetch using them
/// returns, nothing of it remains in any git configuration. Without an explicit proxy the one
/// from the git configuration (or the environment) is used.
pub(super) fn fetch_options<'a>(
    git_config: &'a Config,
    proxy: Option<&'a str>,
) -> FetchOptions<'a> {
    let mut callbacks = RemoteCallbacks::new();
    // Consider using https://crates.io/crates/git2_credentials that supports
    // more authentication options
    callbacks.credentials(move |url, username, allowed_types| {
        trace!(
            "Requested credentials for {}, username {:?}, allowed types {:?}",
            url,
            username,
            allowed_types
        );
        if allowed_types.contains(CredentialType::USERNAME) {
            return Cred::username("git");
        }
        if allowed_types.contains(CredentialType::SSH_KEY) {
            return Cred::ssh_key_from_agent(username.unwrap_or("git"));
        }
        if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
            return Cred::credential_helper(git_config, url, username);
        }
        Err(git2::Error::from_str("no valid authentication available"))
    });

    let mut proxy_options = ProxyOptions::new();
    match proxy {
        Some(proxy) => {
            debug!("Using proxy {}", proxy);
            proxy_options.url(proxy);
        }
        None => {
            proxy_options.auto();
        }
    }

    let mut fetch_options = FetchOptions::new();
    fetch_options
        .remote_callbacks(callbacks)
        .proxy_options(proxy_options)
        .download_tags(AutotagOption::All);
    fetch_options
}
