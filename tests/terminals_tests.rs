use anyhow::Result;
use parsnip::lexer::scanners::{self, whitespaces, whitespaces_and_comments};
use parsnip::lexer::terminals::{self, Terminals, TerminalsError};
use parsnip::lexer::{CaseSensitivity, Token, TokenKind, lexer};
use parsnip::parser::BoxedParser;

fn parser<T: 'static>(terminals: &Terminals, grammar: BoxedParser<Token, T>) -> BoxedParser<char, T> {
    grammar.from(terminals.tokenizer(), whitespaces())
}

fn assert_failure<T: std::fmt::Debug + 'static>(
    parser: &BoxedParser<char, T>,
    source: &str,
    line: usize,
    column: usize,
    message: &str,
) {
    let err = parser.parse(source).expect_err("parse should fail");
    assert_eq!((err.line, err.column), (line, column), "position for {source:?}: {err}");
    assert_eq!(err.message, message, "message for {source:?}");
}

fn operators() -> Result<Terminals> {
    Ok(Terminals::builder().operators(["+", "-"]).build()?)
}

fn keywords(case: CaseSensitivity) -> Result<Terminals> {
    Ok(Terminals::builder()
        .operators(["+", "-"])
        .keywords(["foo", "bar", "baz"])
        .case(case)
        .build()?)
}

// ===== single tokens =====

#[test]
fn token_with_one_name() -> Result<()> {
    let terminals = operators()?;
    let plus = parser(&terminals, terminals.token(&["+"]));

    let token = plus.parse("+")?;
    assert_eq!(token, Token::new(0, 1, TokenKind::Reserved("+".into()), "+"));
    assert_failure(&plus, "-", 1, 1, "+ expected, - encountered.");
    Ok(())
}

#[test]
fn token_with_several_names() -> Result<()> {
    let terminals = operators()?;
    let either = parser(&terminals, terminals.token(&["+", "-"]));

    assert_eq!(either.parse("-")?.reserved(), Some("-"));
    assert_failure(&either, "*", 1, 1, "+ or - expected, * encountered.");
    Ok(())
}

#[test]
fn token_without_names_never_matches() -> Result<()> {
    let terminals = operators()?;
    let none = parser(&terminals, terminals.token::<&str>(&[]));
    assert_failure(&none, "+", 1, 1, "unexpected +.");
    Ok(())
}

#[test]
fn unregistered_name_never_matches() -> Result<()> {
    let terminals = operators()?;
    let unknown = parser(&terminals, terminals.token(&["*"]));
    assert_failure(&unknown, "+", 1, 1, "* expected, + encountered.");
    Ok(())
}

// ===== case rules =====

#[test]
fn case_sensitive_keywords() -> Result<()> {
    let terminals = keywords(CaseSensitivity::Sensitive)?;
    let grammar = parser(&terminals, terminals.token(&["+", "-", "foo", "bar"]));

    let token = grammar.parse("foo")?;
    assert_eq!((token.start, token.end), (0, 3));
    assert_eq!(token.kind, TokenKind::Reserved("foo".into()));

    assert_failure(&grammar, "baz", 1, 1, "+, -, foo or bar expected, baz encountered.");
    assert_failure(&grammar, "Foo", 1, 1, "+, -, foo or bar expected, Foo encountered.");
    assert_failure(&grammar, "123", 1, 1, "+, -, foo or bar expected, 1 encountered.");

    let word = parser(&terminals, terminals::identifier());
    assert_eq!(word.parse("FOO")?, "FOO");
    Ok(())
}

#[test]
fn case_insensitive_keywords() -> Result<()> {
    let terminals = keywords(CaseSensitivity::Insensitive)?;
    let grammar = parser(&terminals, terminals.token(&["+", "-", "foo", "bar"]));

    let token = grammar.parse("Foo")?;
    assert_eq!(token.kind, TokenKind::Reserved("foo".into()));
    assert_eq!(token.text, "Foo");
    assert_failure(&grammar, "baz", 1, 1, "+, -, foo or bar expected, baz encountered.");

    let word = parser(&terminals, terminals::identifier());
    assert_eq!(word.parse("xxx")?, "xxx");
    assert_failure(&word, "BAR", 1, 1, "identifier expected, BAR encountered.");
    Ok(())
}

#[test]
fn case_insensitive_names_resolve() -> Result<()> {
    let terminals = Terminals::builder().keywords(["Select"]).case_insensitive().build()?;
    assert_eq!(terminals.resolve("SELECT"), Some("Select"));
    assert_eq!(terminals.case(), CaseSensitivity::Insensitive);

    let select = parser(&terminals, terminals.token(&["select"]));
    assert_eq!(select.parse("sElEcT")?.reserved(), Some("Select"));
    Ok(())
}

#[test]
fn custom_word_scanner() -> Result<()> {
    let terminals = Terminals::builder()
        .operators(["+", "-"])
        .keywords(["12", "34"])
        .words(scanners::integer())
        .build()?;
    let grammar = parser(&terminals, terminals.token(&["+", "-", "12", "34"]));

    assert_eq!(grammar.parse("12")?.kind, TokenKind::Reserved("12".into()));
    assert_failure(&grammar, "foo", 1, 1, "+, -, 12 or 34 expected, f encountered.");
    assert_failure(&grammar, "123", 1, 1, "+, -, 12 or 34 expected, 123 encountered.");

    let word = parser(&terminals, terminals::identifier());
    assert_eq!(word.parse("123")?, "123");
    Ok(())
}

// ===== configuration errors =====

#[test]
fn duplicates_depend_on_case_rule() {
    let sensitive = Terminals::builder().keywords(["a", "b"]).operators(["A", "B"]).build();
    assert!(sensitive.is_ok());

    let insensitive = Terminals::builder()
        .keywords(["a", "b"])
        .operators(["A", "B"])
        .case_insensitive()
        .build();
    let err = insensitive.unwrap_err();
    assert!(matches!(err, TerminalsError::Duplicate { .. }));
    assert_eq!(err.to_string(), "duplicate terminal: `a` collides with `A`");
}

#[test]
fn duplicates_across_categories() {
    let err = Terminals::builder().operators(["if"]).keywords(["if"]).build().unwrap_err();
    assert_eq!(
        err,
        TerminalsError::Duplicate {
            existing: "if".into(),
            duplicate: "if".into()
        }
    );
}

#[test]
fn empty_terminal_rejected() {
    let err = Terminals::builder().operators([""]).build().unwrap_err();
    assert_eq!(err, TerminalsError::Empty);
}

// ===== tokenizing =====

fn texts(tokens: &[Token]) -> Vec<&str> {
    tokens.iter().map(|token| token.text.as_str()).collect()
}

#[test]
fn longest_operator_wins() -> Result<()> {
    let terminals = Terminals::builder().operators(["=", "==", "=>"]).build()?;
    let tokens = lexer(terminals.tokenizer(), whitespaces()).parse("= == =>===")?;
    assert_eq!(texts(&tokens), vec!["=", "==", "=>", "==", "="]);
    Ok(())
}

#[test]
fn longer_word_beats_operator() -> Result<()> {
    let terminals = Terminals::builder().operators(["i"]).keywords(["in"]).build()?;
    let tokenizer = terminals.tokenizer();

    assert_eq!(tokenizer.parse("i")?.kind, TokenKind::Reserved("i".into()));
    assert_eq!(tokenizer.parse("in")?.kind, TokenKind::Reserved("in".into()));
    assert_eq!(tokenizer.parse("if")?.kind, TokenKind::Identifier("if".into()));
    Ok(())
}

#[test]
fn tokens_carry_positions() -> Result<()> {
    let terminals = keywords(CaseSensitivity::Sensitive)?;
    let tokens = lexer(terminals.tokenizer(), whitespaces()).parse("  foo + bar")?;
    let starts: Vec<usize> = tokens.iter().map(|token| token.start).collect();
    assert_eq!(starts, vec![2, 6, 8]);
    assert_eq!(tokens[2].kind, TokenKind::Reserved("bar".into()));
    Ok(())
}

// ===== phrases =====

fn greetings() -> Result<Terminals> {
    Ok(Terminals::builder().keywords(["hello", "world", "hell"]).build()?)
}

#[test]
fn phrase_matches_words_in_order() -> Result<()> {
    let terminals = greetings()?;
    let greeting = parser(&terminals, terminals.phrase(&["hello", "world"]));

    let tokens = greeting.parse("hello   world")?;
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[1].start, 8);
    Ok(())
}

#[test]
fn phrase_failures() -> Result<()> {
    let terminals = greetings()?;
    let greeting = parser(&terminals, terminals.phrase(&["hello", "world"]));

    assert_failure(&greeting, "hello hell", 1, 7, "world expected, hell encountered.");
    assert_failure(&greeting, "hell", 1, 1, "hello world expected, hell encountered.");
    assert_failure(&greeting, "hello", 1, 6, "world expected, EOF encountered.");
    Ok(())
}

// ===== two-stage glue =====

#[test]
fn unlexable_input_surfaces_after_last_token() -> Result<()> {
    let terminals = operators()?;
    let plus = parser(&terminals, terminals.token(&["+"]));
    assert_failure(&plus, "+ $", 1, 3, "EOF expected, $ encountered.");
    Ok(())
}

#[test]
fn comments_as_delimiters() -> Result<()> {
    let terminals = keywords(CaseSensitivity::Sensitive)?;
    let sum = terminals.token(&["foo"]) + terminals.token(&["+"]) + terminals.token(&["bar"]);
    let grammar = sum.from(terminals.tokenizer(), whitespaces_and_comments());

    assert!(grammar.parse("/* a */ foo // b\n + bar").is_ok());
    assert_failure(&grammar, "foo\n+ // c\nbaz", 3, 1, "bar expected, baz encountered.");
    Ok(())
}

#[test]
fn token_grammar_embeds_in_char_grammar() -> Result<()> {
    let terminals = operators()?;
    let inner = parser(&terminals, terminals.token(&["+"]));
    let outer = scanners::is_char('[') * inner - scanners::is_char(']');

    assert!(outer.parse("[ + ]").is_ok());
    assert_failure(&outer, "[ + ", 1, 5, "] expected, EOF encountered.");
    Ok(())
}

#[test]
fn fragments_by_category() -> Result<()> {
    let terminals = operators()?;
    let tokenizer =
        terminals.tokenizer() | terminals::integer_tokenizer() | terminals::identifier_tokenizer();
    let words = parsnip::parser::many(terminals::fragment(&["identifier", "integer"]));
    let words = words.from(tokenizer.clone(), whitespaces());

    assert_eq!(words.parse("x 42 y")?, vec!["x", "42", "y"]);
    assert_failure(&words, "x + 1", 1, 3, "identifier, integer or EOF expected, + encountered.");

    let operand = terminals::fragment(&["identifier", "integer"]).from(tokenizer.clone(), whitespaces());
    assert_failure(&operand, "+", 1, 1, "identifier or integer expected, + encountered.");

    let reserved = terminals::fragment(&["reserved"]).from(tokenizer, whitespaces());
    assert_eq!(reserved.parse("+")?, "+");
    assert_failure(&reserved, "x", 1, 1, "reserved expected, x encountered.");

    assert_eq!(TokenKind::Long(7).tag(), "long");
    assert_eq!(TokenKind::Str("s".into()).tag(), "string");
    Ok(())
}

#[test]
fn mixed_token_kinds() -> Result<()> {
    let terminals = Terminals::builder().operators(["(", ")", ","]).keywords(["max"]).build()?;
    let tokenizer = terminals.tokenizer() | terminals::long_tokenizer();

    let args = parsnip::parser::sep_by(terminals::long(), terminals.token(&[","]));
    let call = terminals.token(&["max"]) * terminals.token(&["("]) * args - terminals.token(&[")"]);
    let call = call.map(|args| args.into_iter().max());
    let grammar = call.from(tokenizer, whitespaces());

    assert_eq!(grammar.parse("max(3, 0x10, 07)")?, Some(16));
    assert_eq!(grammar.parse("max()")?, None);
    assert_failure(&grammar, "max(3,)", 1, 7, "integer expected, ) encountered.");
    Ok(())
}
