//! Headless browser listing source

use async_trait::async_trait;
use careers_watch_domain::{FetchError, ListingSource, Snapshot};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::{ListingParser, listing_url};

const URL_PLACEHOLDER: &str = "{url}";

/// Renders the results page with an external command and parses its stdout
///
/// The command is expected to print the rendered DOM, e.g.
/// `chromium --headless --dump-dom {url}`. When no argument contains `{url}`
/// the URL is appended as the last argument.
pub struct CommandListingSource {
    command: String,
    args: Vec<String>,
    timeout: Duration,
    parser: ListingParser,
}

impl CommandListingSource {
    pub fn new(
        command: String,
        args: Vec<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            command,
            args,
            timeout,
            parser: ListingParser::new(base_url),
        }
    }

    async fn render(&self, url: &str) -> Result<String, FetchError> {
        let args = expand_args(&self.args, url);

        let mut command = Command::new(&self.command);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command.spawn().map_err(|e| {
            FetchError::Command(format!("Failed to spawn {}: {}", self.command, e))
        })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| FetchError::Command(e.to_string()))?,
            Err(_) => return Err(FetchError::Timeout(self.timeout)),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FetchError::Command(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl ListingSource for CommandListingSource {
    async fn fetch(&self, query: &str) -> Result<Snapshot, FetchError> {
        let url = listing_url(self.parser.base_url(), query)?;
        tracing::info!(url = %url, command = %self.command, "Getting page");

        let page = self.render(url.as_str()).await?;
        self.parser.parse(&page)
    }
}

fn expand_args(args: &[String], url: &str) -> Vec<String> {
    let mut used_placeholder = false;
    let mut expanded: Vec<String> = args
        .iter()
        .map(|arg| {
            if arg.contains(URL_PLACEHOLDER) {
                used_placeholder = true;
                arg.replace(URL_PLACEHOLDER, url)
            } else {
                arg.clone()
            }
        })
        .collect();

    if !used_placeholder {
        expanded.push(url.to_string());
    }
    expanded
}
