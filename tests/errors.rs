use chrono::NaiveDate;
use rstest::rstest;
use tabdoc::{ConvertOptions, ErrorKind, Position, TabdocError, convert};

fn options() -> ConvertOptions {
    ConvertOptions::new().with_date(NaiveDate::from_ymd_opt(2024, 5, 6).expect("valid date"))
}

fn fail(input: &str) -> (TabdocError, String) {
    let mut output = Vec::new();
    let err = convert(input.as_bytes(), &mut output, &options()).expect_err("should fail");
    (err, String::from_utf8(output).expect("utf-8 output"))
}

#[rstest]
#[case::section_zero("x(0)\n", ErrorKind::Preamble)]
#[case::section_too_large("x(12)\n", ErrorKind::Preamble)]
#[case::missing_name("(1)\n", ErrorKind::Preamble)]
#[case::missing_section("x\n", ErrorKind::Preamble)]
#[case::space_indent("x(1)\n  text\n", ErrorKind::Indentation)]
#[case::double_indent("x(1)\n\t\ttext\n", ErrorKind::Indentation)]
#[case::indented_table("x(1)\n\t|[ cell\n", ErrorKind::Indentation)]
#[case::table_row_indented("x(1)\n|[ a\n\t:[ b\n", ErrorKind::Indentation)]
#[case::literal_dedent("x(1)\n\t```\n\tok\nbad\n```\n", ErrorKind::Indentation)]
#[case::escape_at_eof("x(1)\ntext \\", ErrorKind::Escape)]
#[case::nested_bold_underline("x(1)\n*bold _under_*\n", ErrorKind::Formatting)]
#[case::nested_underline_bold("x(1)\n_under *bold*_\n", ErrorKind::Formatting)]
#[case::bad_row_marker("x(1)\n|[ a\n!x b\n", ErrorKind::Table)]
#[case::bad_alignment("x(1)\n|x a\n", ErrorKind::Table)]
#[case::missing_cell_space("x(1)\n|[a\n", ErrorKind::Table)]
#[case::cell_marker_at_line_end("x(1)\n|[\n", ErrorKind::Table)]
#[case::cell_marker_at_eof("x(1)\n|[ a\n:-", ErrorKind::Table)]
#[case::no_alignment_source("x(1)\n|  a\n", ErrorKind::Table)]
#[case::no_alignment_column("x(1)\n|[ a\n|[ b\n:  c\n", ErrorKind::Table)]
#[case::reserved_open("x(1)\n|[ T{ no\n", ErrorKind::Table)]
#[case::reserved_close("x(1)\n|[ no T}\n", ErrorKind::Table)]
#[case::short_fence("x(1)\n``\n", ErrorKind::Literal)]
#[case::fence_with_text("x(1)\n```rust\n", ErrorKind::Literal)]
#[case::unterminated_literal("x(1)\n```\ncode\n", ErrorKind::Literal)]
#[case::long_closing_fence("x(1)\n```\ncode\n````\n", ErrorKind::Literal)]
#[case::list_without_space("x(1)\n-X\n", ErrorKind::List)]
#[case::sibling_without_space("x(1)\n- a\n-b\n", ErrorKind::List)]
#[case::single_space_continuation("x(1)\n- a\n b\n", ErrorKind::List)]
#[case::heading_without_space("x(1)\n#NAME\n", ErrorKind::Heading)]
#[case::heading_too_deep("x(1)\n### NAME\n", ErrorKind::Heading)]
#[case::comment_without_space("x(1)\n;x\n", ErrorKind::Comment)]
fn malformed_input_is_fatal(#[case] input: &str, #[case] kind: ErrorKind) {
    let (err, _) = fail(input);
    assert_eq!(err.kind(), Some(kind), "{err}");
}

#[test]
fn invalid_utf8_is_fatal() {
    let mut output = Vec::new();
    let err = convert(&b"x(1)\nabc \xc3\x28\n"[..], &mut output, &options())
        .expect_err("invalid utf-8");
    assert_eq!(err.kind(), Some(ErrorKind::Encoding));
    assert_eq!(err.position(), Some(Position { line: 2, column: 5 }));
}

#[test]
fn list_error_emits_no_list_request() {
    let (err, roff) = fail("x(1)\n-X\n");
    assert_eq!(err.position(), Some(Position { line: 2, column: 2 }));
    assert!(!roff.contains(".IP"));
    assert!(!roff.contains(".RS"));
}

#[test]
fn error_message_names_line_and_column() {
    let (err, _) = fail("x(1)\nplain\n*a _b\n");
    assert_eq!(err.to_string(), "Error at 3:4: Cannot nest inline formatting");
}

#[test]
fn reserved_cell_text_reports_cell_position() {
    let (err, _) = fail("x(1)\n|[ a T{ b\n");
    assert_eq!(err.position(), Some(Position { line: 2, column: 4 }));
}

#[test]
fn output_before_error_is_kept() {
    let (_, roff) = fail("x(1)\n# NAME\nintro\n```\nunterminated\n");
    assert!(roff.contains(".SH NAME\nintro\n.nf\n.RS \"4\"\nunterminated\n"));
}
