//! Parsing of processing code lists given as text.

use super::CodeError;

/// Parses one code or a list-like string of codes.
///
/// Accepts `"10110001"`, `"10110001,30109001"`, `"[10110001, 30109001]"` and
/// whitespace or semicolon separated forms.
pub fn parse_codes(text: &str) -> Result<Vec<u64>, CodeError> {
    let trimmed = text
        .trim()
        .trim_start_matches(['[', '('])
        .trim_end_matches([']', ')']);

    let codes = trimmed
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u64>()
                .map_err(|_| CodeError::NotNumeric(part.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if codes.is_empty() {
        return Err(CodeError::Empty);
    }
    Ok(codes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_code() {
        assert_eq!(parse_codes("10110001").unwrap(), vec![10110001]);
    }

    #[test]
    fn test_list_like_forms() {
        let expected = vec![10110001, 30109001];
        assert_eq!(parse_codes("10110001,30109001").unwrap(), expected);
        assert_eq!(parse_codes("[10110001, 30109001]").unwrap(), expected);
        assert_eq!(parse_codes(" 10110001 30109001 ").unwrap(), expected);
        assert_eq!(parse_codes("(10110001;30109001)").unwrap(), expected);
    }

    #[test]
    fn test_rejects_non_numeric_entry() {
        assert_eq!(
            parse_codes("10110001, abc"),
            Err(CodeError::NotNumeric("abc".to_string()))
        );
    }

    #[test]
    fn test_rejects_empty_list() {
        assert_eq!(parse_codes("[]"), Err(CodeError::Empty));
    }
}
