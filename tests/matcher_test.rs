use news_router::{tokenize, Expr, Pattern};

/// Samples prefixed with `!` must not match; all others must.
fn check_matcher(label: &str, matches: impl Fn(&str) -> bool, samples: &[&str]) {
    for sample in samples {
        if let Some(miss) = sample.strip_prefix('!') {
            assert!(!matches(miss), "[{label}] must NOT match `{miss}`");
        } else {
            assert!(matches(sample), "[{label}] should match `{sample}`");
        }
    }
}

#[test]
fn tokenize_strips_edge_punctuation() {
    let given = "«Cобака-23»   с начала года провела: на 18,94% больше теле-шоу о NNN.!!! В размере до 10.007 P&G";
    let expected = [
        "Cобака-23",
        "с",
        "начала",
        "года",
        "провела",
        "на",
        "18,94",
        "больше",
        "теле-шоу",
        "о",
        "NNN",
        "В",
        "размере",
        "до",
        "10.007",
        "P&G",
    ];
    assert_eq!(tokenize(given), expected);

    assert!(tokenize(" ,:!. ... ,. ").is_empty());
    assert!(tokenize("").is_empty());
}

#[test]
fn pattern_matching_table() {
    let tests: &[&[&str]] = &[
        &[r"S(\x26)P", "S&P", "!S%P", "!s&p", "!sp", "S&Pxxx", "!xxxxS&P"],
        &["*tion", "situation", "Tion", "lllTiONrr"],
        &["*tion$", "situation", "!tiona"],
        &["tion", "!situation", "tiona"],
        &["ноч$ь", "ночью", "ночь", "!ночам"],
        &["д.ч(ер)?$Ь", "дичью", "дочерях", "дочь", "Д1ЧЕРЯМ"],
        &["", "anything", "вообще"],
    ];
    for test in tests {
        let pattern = Pattern::new(test[0])
            .unwrap_or_else(|e| panic!("pattern `{}` failed to compile: {e}", test[0]));
        check_matcher(test[0], |s| pattern.matches(s), &test[1..]);
    }
}

#[test]
fn pattern_compile_errors() {
    // unmatched closing parenthesis
    assert!(Pattern::new("a)b").is_err());
    // `*` outside parentheses and not first
    assert!(Pattern::new("a*b").is_err());
    // `$` inside parentheses
    assert!(Pattern::new("a($)b").is_err());
    // unknown morphology selector
    assert!(Pattern::new("аб$щ").is_err());
    assert!(Pattern::new("a$zc").is_err());
    // too many characters after `$`
    assert!(Pattern::new("a$bcd").is_err());
    // unclosed parenthesis surfaces as a regex compile failure
    assert!(Pattern::new("ab(cd").is_err());
}

#[test]
fn expr_matching_table() {
    let tests: &[&[&str]] = &[
        &[
            r"hello dot;world & s(\x26)p;*tion$ xa & in$ & Ferr",
            "xx S&P world xx",
            "xx world xx s&P",
            "hello DoT",
            "!dot hello",
            "sition xai in FERR",
            "!Ferr xai in sitution",
            "Ferr in tion XA",
            "!Ferr tion XA",
        ],
        &["aa;bbb;ccc", "xxx aa xxx", "AAa", "!xxxBCxx", "BbBbbb sss s s s"],
        &["aa & bb; cc & bb", "BB AA", "CCC Bbb", "!aaa ccccc"],
    ];
    for test in tests {
        let expr = Expr::new(test[0])
            .unwrap_or_else(|e| panic!("expr `{}` failed to compile: {e}", test[0]));
        check_matcher(test[0], |s| expr.matches(s), &test[1..]);
    }
}

#[test]
fn expr_is_order_insensitive_for_conjunctions() {
    let expr = Expr::new("aa & bb").unwrap();
    assert!(expr.matches("aa bb"));
    assert!(expr.matches("bb xx aa"));
    assert!(!expr.matches("aa cc"));
}

#[test]
fn expr_sequences_match_consecutive_words() {
    let expr = Expr::new("red square").unwrap();
    assert!(expr.matches("on Red Square today"));
    assert!(!expr.matches("red on square"));
}

#[test]
fn expr_compile_errors() {
    // empty condition
    assert!(Expr::new("").is_err());
    assert!(Expr::new(" ; ; ").is_err());
    // one sequence is a prefix of another, so one branch is redundant
    assert!(Expr::new("abc def; abc").is_err());
    // identical standalone branches
    assert!(Expr::new("aa; aa").is_err());
    // conjunction made redundant by a standalone branch
    assert!(Expr::new("aa; aa & bb").is_err());
    // sequence repeated within one conjunction
    assert!(Expr::new("aa & aa").is_err());
    // bad pattern inside a condition
    assert!(Expr::new("aa & b)b").is_err());
}

#[test]
fn expr_match_words_on_tokenized_input() {
    let expr = Expr::new("*пр.м & спг$ & яма").unwrap();
    let words = tokenize("«Газпромом»  заявил о росте конкуренции из-за запуска «Ямал СПГ»");
    assert!(expr.match_words(&words));
    assert!(!expr.match_words(&tokenize("Газпромом заявил о росте")));
}
