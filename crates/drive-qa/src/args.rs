//! Flat `--name=value` argument lookup

/// Return the value of the first `--<name>=<value>` token, or `default` when no
/// token matches.
///
/// Everything after the first `=` is the value, so `--q=a=b` yields `a=b`.
/// Values are returned verbatim; parsing them is up to the caller.
pub fn get<I, S>(args: I, name: &str, default: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let prefix = format!("--{}=", name);
    args.into_iter()
        .find_map(|arg| arg.as_ref().strip_prefix(&prefix).map(str::to_string))
        .unwrap_or_else(|| default.to_string())
}
