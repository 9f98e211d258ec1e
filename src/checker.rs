//! Static checks for free-form additional-settings lines.
//!
//! These lines bypass the registry entirely and are appended verbatim to
//! the input file, so the only safety net is this advisory linter. It
//! never blocks anything; the caller decides what to do with the
//! findings.

/// Checks free-form settings lines for obvious mistakes.
///
/// Each line must contain exactly one `=` with a non-empty right-hand
/// side and balanced parentheses on the left. When a known-variable
/// universe is supplied, the bare variable name (index suffix stripped)
/// must belong to it. Line numbers in the findings are 1-based.
#[must_use]
pub fn check_extra_lines(lines: &[String], universe: Option<&[String]>) -> Vec<String> {
    let mut errors = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let line_nr = i + 1;

        if line.matches('=').count() != 1 {
            errors.push(format!("Line {line_nr}: missing or too many \"=\""));
        } else if line
            .split_once('=')
            .is_some_and(|(_, value)| value.trim().is_empty())
        {
            errors.push(format!("Line {line_nr}: missing variable value"));
        }

        let var = line.split('=').next().unwrap_or("").trim();
        if var.matches('(').count() != var.matches(')').count() {
            errors.push(format!("Line {line_nr}: parentheses do not match"));
        }

        // The index suffix is not part of the variable name
        let bare = var.split('(').next().unwrap_or("").trim();
        if let Some(known) = universe {
            if !known.iter().any(|name| name == bare) {
                errors.push(format!("Line {line_nr}: unknown variable \"{bare}\""));
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_valid_lines_pass() {
        let errors = check_extra_lines(&lines(&["qu_int = 3", "two_comp = .true."]), None);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_equals_sign_count() {
        let errors = check_extra_lines(&lines(&["qu_int 3", "a = b = c"]), None);
        assert_eq!(
            errors,
            vec![
                "Line 1: missing or too many \"=\"".to_string(),
                "Line 2: missing or too many \"=\"".to_string(),
            ]
        );
    }

    #[test]
    fn test_missing_value() {
        let errors = check_extra_lines(&lines(&["qu_int = "]), None);
        assert_eq!(errors, vec!["Line 1: missing variable value".to_string()]);
    }

    #[test]
    fn test_unbalanced_parentheses() {
        let errors = check_extra_lines(&lines(&["e0(1 = 500"]), None);
        assert_eq!(errors, vec!["Line 1: parentheses do not match".to_string()]);
    }

    #[test]
    fn test_unknown_variable_with_universe() {
        let universe = vec!["qu_int".to_string(), "e0".to_string()];
        let errors = check_extra_lines(
            &lines(&["e0(2) = 300", "bogus = 1"]),
            Some(&universe),
        );
        assert_eq!(errors, vec!["Line 2: unknown variable \"bogus\"".to_string()]);
    }

    #[test]
    fn test_universe_check_skipped_when_absent() {
        let errors = check_extra_lines(&lines(&["bogus = 1"]), None);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_multiple_findings_on_one_line() {
        let universe = vec!["e0".to_string()];
        let errors = check_extra_lines(&lines(&["bogus(1"]), Some(&universe));
        assert_eq!(
            errors,
            vec![
                "Line 1: missing or too many \"=\"".to_string(),
                "Line 1: parentheses do not match".to_string(),
                "Line 1: unknown variable \"bogus\"".to_string(),
            ]
        );
    }
}
