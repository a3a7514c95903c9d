// Intent proxy — how strongly a keyword signals purchase intent.

use crate::resolve::tokens::TokenTable;
use crate::sanitize::text::contains_ignore_case;

/// Sum of the weights of every token found in `text` (case-insensitive
/// substring match). Each token counts once, however often it appears.
pub fn intent_proxy(text: &str, tokens: &TokenTable) -> f64 {
    if text.trim().is_empty() || tokens.is_empty() {
        return 0.0;
    }
    tokens
        .iter()
        .filter(|(token, _)| contains_ignore_case(text, token))
        .map(|(_, weight)| weight)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::tokens::parse_token_list;

    #[test]
    fn test_single_token_match() {
        let tokens = parse_token_list("빅사이즈:1.0");
        assert_eq!(intent_proxy("빅사이즈 원피스", &tokens), 1.0);
    }

    #[test]
    fn test_weights_add_up_and_case_is_ignored() {
        let tokens = parse_token_list("long:0.5;니트:0.25;후드:0.4");
        assert!((intent_proxy("LONG 니트 니트", &tokens) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_empty_inputs_are_zero() {
        assert_eq!(intent_proxy("", &TokenTable::builtin()), 0.0);
        assert_eq!(intent_proxy("빅사이즈", &parse_token_list("")), 0.0);
    }
}
