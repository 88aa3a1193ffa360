use regex::Regex;

/// Strip a conventional-commit prefix from the first line of a commit
/// message and capitalize what remains. Lines after the first are kept
/// verbatim, trimmed as a block.
pub fn clean_commit_message(message: &str) -> String {
    let mut lines = message.split('\n');
    let first = lines.next().unwrap_or("");

    let stripped = match Regex::new(r"^(feat|fix|docs|style|refactor|test|chore)(\(.*?\))?:\s*") {
        Ok(re) => re.replace(first, "").into_owned(),
        Err(_) => first.to_string(),
    };
    let first_line = capitalize_first(&stripped);

    let rest: Vec<&str> = lines.collect();
    if rest.is_empty() {
        first_line
    } else {
        format!("{}\n{}", first_line, rest.join("\n").trim())
    }
}

/// Best-effort extraction of a short summary from a PR description.
///
/// Strips HTML tags, starts after the first line containing
/// "Description:" (or at the top when absent), and keeps at most 5
/// lines, skipping blanks and `:`-terminated sub-headings. This is a
/// truncation heuristic to keep prompts short, not a parser.
pub fn extract_description_text(description: Option<&str>) -> String {
    let description = match description {
        Some(text) if !text.is_empty() => text,
        _ => return String::new(),
    };

    let cleaned = match Regex::new(r"<[^>]+>") {
        Ok(re) => re.replace_all(description, "").into_owned(),
        Err(_) => description.to_string(),
    };

    let lines: Vec<&str> = cleaned.split('\n').collect();
    let start = lines
        .iter()
        .position(|line| line.contains("Description:"))
        .map(|i| i + 1)
        .unwrap_or(0);

    let relevant: Vec<&str> = lines
        .iter()
        .skip(start)
        .take(5)
        .map(|line| line.trim())
        .filter(|line| !line.is_empty() && !line.ends_with(':'))
        .collect();

    relevant.join(" ")
}

/// Uppercase the first character, leaving the rest untouched
fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_strips_conventional_prefix() {
        assert_eq!(clean_commit_message("feat: add login"), "Add login");
        assert_eq!(clean_commit_message("fix(auth): token refresh"), "Token refresh");
        assert_eq!(clean_commit_message("chore: bump deps"), "Bump deps");
        assert_eq!(clean_commit_message("refactor(core): split module"), "Split module");
    }

    #[test]
    fn test_clean_capitalizes_unprefixed_message() {
        assert_eq!(clean_commit_message("add login"), "Add login");
        assert_eq!(clean_commit_message("Add login"), "Add login");
    }

    #[test]
    fn test_clean_preserves_body_lines() {
        let message = "fix(x): bar\n\nDetails line one\nDetails line two\n";
        let cleaned = clean_commit_message(message);
        assert_eq!(cleaned, "Bar\nDetails line one\nDetails line two");
    }

    #[test]
    fn test_clean_only_touches_first_line() {
        let message = "feat: top\nfix: this line keeps its prefix";
        let cleaned = clean_commit_message(message);
        assert_eq!(cleaned, "Top\nfix: this line keeps its prefix");
    }

    #[test]
    fn test_clean_empty_message() {
        assert_eq!(clean_commit_message(""), "");
    }

    #[test]
    fn test_clean_unknown_prefix_left_alone() {
        assert_eq!(clean_commit_message("wip: half done"), "Wip: half done");
    }

    #[test]
    fn test_extract_after_description_heading() {
        let body = "<p>Description:</p>\nLine1\nLine2:\n\nLine3";
        assert_eq!(extract_description_text(Some(body)), "Line1 Line3");
    }

    #[test]
    fn test_extract_empty_and_missing() {
        assert_eq!(extract_description_text(None), "");
        assert_eq!(extract_description_text(Some("")), "");
    }

    #[test]
    fn test_extract_without_description_heading() {
        let body = "First line\nSecond line";
        assert_eq!(extract_description_text(Some(body)), "First line Second line");
    }

    #[test]
    fn test_extract_caps_at_five_lines() {
        let body = "Description:\none\ntwo\nthree\nfour\nfive\nsix";
        assert_eq!(extract_description_text(Some(body)), "one two three four five");
    }

    #[test]
    fn test_extract_strips_html_tags() {
        let body = "<h2>Description:</h2>\n<b>bold</b> text\n<img src='x'>trailing";
        assert_eq!(extract_description_text(Some(body)), "bold text trailing");
    }

    #[test]
    fn test_capitalize_first_multibyte() {
        assert_eq!(capitalize_first("über"), "Über");
        assert_eq!(capitalize_first(""), "");
    }
}
