use std::path::Path;

use anyhow::Context;

/// One query per line; surrounding whitespace is trimmed and blank lines
/// are skipped.
pub(crate) fn parse_queries(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Resolves the queries to run: the explicit `--search` value, or else the
/// lines of `input`.
pub(crate) fn load_queries(search: Option<&str>, input: &Path) -> anyhow::Result<Vec<String>> {
    if let Some(search) = search.map(str::trim).filter(|s| !s.is_empty()) {
        return Ok(vec![search.to_owned()]);
    }
    let content = std::fs::read_to_string(input).with_context(|| {
        format!(
            "no --search given and query file {} could not be read",
            input.display()
        )
    })?;
    let queries = parse_queries(&content);
    anyhow::ensure!(
        !queries.is_empty(),
        "query file {} contains no queries",
        input.display()
    );
    Ok(queries)
}
