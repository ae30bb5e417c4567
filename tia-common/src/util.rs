//! Shared utilities for the launcher.

use shell_escape::escape;
use std::borrow::Cow;
use std::path::Path;

/// Render a spawn command line for logging, masking the access credential.
///
/// The token travels to the spawned process as a plain argument value; it
/// must never travel into the log output as well.
pub fn render_command_line(program: &Path, args: &[String]) -> String {
    let mut rendered = Vec::with_capacity(args.len() + 1);
    rendered.push(escape(Cow::from(program.display().to_string())).into_owned());
    let mut mask_next = false;
    for arg in args {
        if mask_next {
            rendered.push("***".to_string());
            mask_next = false;
            continue;
        }
        if arg == "--access-token" {
            mask_next = true;
        }
        rendered.push(escape(Cow::from(arg.as_str())).into_owned());
    }
    rendered.join(" ")
}
