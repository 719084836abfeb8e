use crate::utils::identifiers::{NAME_PATTERN, USERNAME_PATTERN};

use anyhow::{bail, Context, Result};
use regex::Regex;

/// Optional format suffix plus optional trailing slash, appended uniformly
/// to every route pattern at table construction time.
const SUFFIX_TAIL: &str = r"(?:\.(?P<format>[a-z0-9]+))?/?$";

/// Handler binding for a repository route.
///
/// The route table treats handlers as opaque references. What a handler does with
/// the request (including which HTTP methods it accepts) is decided in [routes::repository][0].
///
/// [0]: crate::routes::repository
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum RepoHandler {
    Detail,
    Upload,
    Download
}

/// Response representation negotiated through the format suffix.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ResponseFormat {
    Json,
    Text
}

impl ResponseFormat {
    /// Maps a format suffix token to its representation, `None` if the token is not recognized.
    pub(crate) fn from_token(token: &str) -> Option<ResponseFormat> {
        match token {
            "json" => Some(ResponseFormat::Json),
            "txt" => Some(ResponseFormat::Text),
            _ => None
        }
    }
}

struct RouteEntry {
    suffix: &'static str,
    pattern: Regex,
    handler: RepoHandler
}

/// Successful lookup result: the bound handler plus the extracted path tokens.
#[derive(Debug)]
pub(crate) struct RouteMatch {
    pub(crate) handler: RepoHandler,
    pub(crate) username: String,
    pub(crate) name: String,
    pub(crate) format: Option<ResponseFormat>
}

/// Static table mapping repository paths to their handlers.
///
/// Built exactly once during startup and never mutated afterwards, so lookups
/// may run from any amount of workers in parallel without coordination.
pub(crate) struct RouteTable {
    entries: Vec<RouteEntry>
}

impl RouteTable {
    /// Builds the route table for the repository resource.
    ///
    /// Fails (and with it startup, serving with a partial table is unsafe) if a
    /// pattern does not compile or two entries share the same literal suffix.
    pub(crate) fn new() -> Result<RouteTable> {
        RouteTable::with_entries(&[
            ("repo", RepoHandler::Detail),
            ("repo/upload", RepoHandler::Upload),
            ("repo/download", RepoHandler::Download)
        ])
    }

    fn with_entries(bindings: &[(&'static str, RepoHandler)]) -> Result<RouteTable> {
        let mut entries = Vec::<RouteEntry>::with_capacity(bindings.len());

        for &(suffix, handler) in bindings {
            if entries.iter().any(|entry| entry.suffix == suffix) {
                bail!("Route suffix `{}` is bound twice", suffix);
            }

            let raw = format!("^/{}/{}/{}{}", USERNAME_PATTERN, NAME_PATTERN, regex::escape(suffix), SUFFIX_TAIL);
            let pattern = Regex::new(raw.as_str()).with_context(|| format!("Unable to compile route pattern for suffix `{}`", suffix))?;

            entries.push(RouteEntry {
                suffix,
                pattern,
                handler
            });
        }

        Ok(RouteTable { entries })
    }

    /// Looks up a request path, returning the first matching entry.
    ///
    /// Matching is anchored and case-sensitive on literal segments. A recognized
    /// format suffix is stripped and returned as part of the match; an unrecognized
    /// one makes the entry not match at all. A `None` result means no route exists
    /// for this path and the caller is expected to answer with a regular 404.
    pub(crate) fn lookup(&self, path: &str) -> Option<RouteMatch> {
        for entry in &self.entries {
            let captures = match entry.pattern.captures(path) {
                Some(captures) => captures,
                None => continue
            };

            let format = match captures.name("format") {
                Some(token) => match ResponseFormat::from_token(token.as_str()) {
                    Some(format) => Some(format),
                    None => continue
                },
                None => None
            };

            // The username and name groups always participate in a match
            let username = captures.name("username")?.as_str().to_owned();
            let name = captures.name("name")?.as_str().to_owned();

            return Some(RouteMatch {
                handler: entry.handler,
                username,
                name,
                format
            });
        }

        None
    }
}
