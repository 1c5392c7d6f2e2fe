use serde::Deserialize;

/// The only frontmatter field we care about. Other keys are ignored.
#[derive(Debug, Deserialize)]
struct TitleOnly {
    title: Option<String>,
}

/// Split a `---` delimited YAML header from the body
pub(crate) fn split(content: &str) -> Option<(&str, &str)> {
    let rest = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))?;
    let end = rest.find("\n---")?;
    let yaml = &rest[..end];
    let after = &rest[end + 4..];
    let body = after.trim_start_matches(['\r', '\n']);
    Some((yaml, body))
}

/// Frontmatter title, if the note has a parseable header with a non-empty title
pub(crate) fn title(content: &str) -> Option<String> {
    let (yaml, _) = split(content)?;
    match serde_yaml::from_str::<TitleOnly>(yaml) {
        Ok(TitleOnly { title: Some(t) }) if !t.trim().is_empty() => Some(t.trim().to_string()),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(error = %e, "ignoring unparseable frontmatter");
            None
        }
    }
}
