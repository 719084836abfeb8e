use once_cell::sync::Lazy;
use regex::Regex;
use tracing_unwrap::ResultExt;

/// Shared pattern for the `{username}` path placeholder.
///
/// This is declared exactly once and reused verbatim by every route in the
/// [route table](crate::routing::RouteTable) so the accepted grammar cannot
/// drift apart between routes.
pub(crate) const USERNAME_PATTERN: &str = r"(?P<username>[0-9A-Za-z_-]+)";

/// Shared pattern for the `{name}` path placeholder. See [USERNAME_PATTERN].
pub(crate) const NAME_PATTERN: &str = r"(?P<name>[0-9A-Za-z_-]+)";

static FILE_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9A-Za-z_-][0-9A-Za-z._ -]*$").unwrap_or_log()
});

/// Checks if the character is a valid repohub identifier.
///
/// Valid identifiers are either alphanumeric (`a-z`, `0-9`), dash (`-`) or underscore (`_`).
/// This is the character set behind [USERNAME_PATTERN] and [NAME_PATTERN].
pub(crate) fn is_valid(c: &char) -> bool {
    c.is_ascii_alphanumeric() || c == &'-' || c == &'_'
}

/// Checks if the string is an acceptable name for an uploaded file.
///
/// Dots are allowed for file extensions but not as the first character, which
/// also rules out `.` and `..`. Path separators are not in the grammar at all,
/// so a name can never escape the repository directory.
pub(crate) fn is_valid_file_name(input: &str) -> bool {
    FILE_NAME_REGEX.is_match(input)
}

/// Checks if the string is an acceptable single directory component for uploads.
/// Stricter than file names: identifier characters only, no dots or spaces.
pub(crate) fn is_valid_dir_name(input: &str) -> bool {
    !input.is_empty() && input.chars().all(|c| is_valid(&c))
}
