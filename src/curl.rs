//! cURL command generation.
//!
//! Renders a profile + request pair as a runnable cURL command, so an
//! exchange can be reproduced outside the workbench. The command carries
//! the same URL, headers, and body the dispatcher would send; Basic
//! credentials are rendered through `-u` instead of a raw
//! `Authorization` header.

use crate::auth::{detect_auth_scheme, AuthScheme};
use crate::dispatch::{merge_headers, query_pairs, resolve_url, DispatchError};
use crate::models::{ApiRequest, HttpMethod, Profile};

/// Generates a cURL command for a request as the dispatcher would send it.
///
/// Long commands are broken across lines with backslash continuations;
/// short ones stay on one line.
///
/// # Arguments
///
/// * `profile` - The profile supplying base URL, auth, and headers
/// * `request` - The request to render
///
/// # Errors
///
/// Fails with `DispatchError::InvalidUrl` when the profile base URL and
/// request path do not combine into a valid URL.
pub fn curl_command(profile: &Profile, request: &ApiRequest) -> Result<String, DispatchError> {
    let parts = command_parts(profile, request)?;
    Ok(format_multiline(&parts))
}

/// Generates a single-line cURL command.
pub fn curl_command_compact(
    profile: &Profile,
    request: &ApiRequest,
) -> Result<String, DispatchError> {
    let parts = command_parts(profile, request)?;
    Ok(parts.join(" "))
}

/// Assembles the escaped argument list shared by both renderings.
fn command_parts(profile: &Profile, request: &ApiRequest) -> Result<Vec<String>, DispatchError> {
    let mut url = resolve_url(&profile.base_url, &request.url)?;
    for (key, value) in query_pairs(&request.params) {
        url.query_pairs_mut().append_pair(&key, &value);
    }

    let mut headers = merge_headers(profile, request);

    let mut parts = vec!["curl".to_string()];

    if request.method != HttpMethod::GET {
        parts.push("-X".to_string());
        parts.push(request.method.as_str().to_string());
    }

    // Basic credentials read better through -u than a raw header.
    if let AuthScheme::Basic { username, password } = detect_auth_scheme(&headers) {
        headers.retain(|name, _| !name.eq_ignore_ascii_case("authorization"));
        parts.push("-u".to_string());
        parts.push(escape_shell_arg(&format!("{}:{}", username, password)));
    }

    let mut header_names: Vec<&String> = headers.keys().collect();
    header_names.sort();
    for name in header_names {
        parts.push("-H".to_string());
        parts.push(escape_shell_arg(&format!("{}: {}", name, headers[name])));
    }

    if let Some(body) = &request.body {
        if !body.is_null() {
            parts.push("-H".to_string());
            parts.push(escape_shell_arg("Content-Type: application/json"));
            parts.push("-d".to_string());
            parts.push(escape_shell_arg(&body.to_string()));
        }
    }

    parts.push(escape_shell_arg(url.as_str()));
    Ok(parts)
}

/// Escapes a string for safe use in shell commands.
///
/// Uses single quotes for safety, escaping any embedded single quotes.
fn escape_shell_arg(arg: &str) -> String {
    if needs_quoting(arg) {
        if arg.contains('\'') {
            format!("'{}'", arg.replace('\'', "'\\''"))
        } else {
            format!("'{}'", arg)
        }
    } else {
        arg.to_string()
    }
}

/// Checks if a string needs quoting for shell safety.
fn needs_quoting(s: &str) -> bool {
    let special_chars = [
        ' ', '\t', '\n', '\r', '|', '&', ';', '<', '>', '(', ')', '$', '`', '\\', '"', '\'', '*',
        '?', '[', ']', '#', '~', '=', '%', '{', '}',
    ];

    s.is_empty() || s.chars().any(|c| special_chars.contains(&c))
}

/// Formats command parts into a multi-line string with backslash
/// continuations, keeping short commands on one line.
fn format_multiline(parts: &[String]) -> String {
    let single_line = parts.join(" ");
    if single_line.len() <= 80 {
        return single_line;
    }

    let mut result = String::new();
    result.push_str(&parts[0]);
    for part in &parts[1..] {
        result.push_str(" \\\n  ");
        result.push_str(part);
    }
    result
}
