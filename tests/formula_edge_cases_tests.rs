//! Formula edge case tests
//! Error propagation, coercion, range clamping and function semantics,
//! evaluated against programmatic tables and the `test-data/` fixtures

use cellforge::codec::{read_table, ReadOptions};
use cellforge::core::{apply_formula, evaluate_formula};
use cellforge::error::CellforgeError;
use cellforge::types::{Column, Table};
use cellforge::value::{ErrorKind, Value};
use std::path::Path;

fn eval(formula: &str, table: &Table) -> Value {
    evaluate_formula(formula, table, None)
}

fn number(n: f64) -> Value {
    Value::Number(n)
}

fn error(kind: ErrorKind) -> Value {
    Value::Error(kind)
}

/// Item | Price | Qty
/// widget 100 3 / gadget n/a 0 / gizmo 200 (blank) / doohickey 300 #DIV/0!
fn mixed() -> Table {
    read_table(Path::new("test-data/mixed.csv"), None, &ReadOptions::default()).unwrap()
}

/// A1 = 10, B1 = 0
fn ratio() -> Table {
    Table::new(vec![
        Column::new("A", vec![number(10.0)]),
        Column::new("B", vec![number(0.0)]),
    ])
    .unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════
// AGGREGATES OVER MIXED RANGES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_sum_skips_text() {
    assert_eq!(eval("=SUM(B1:B4)", &mixed()), number(600.0));
}

#[test]
fn test_average_count_counta() {
    let t = mixed();
    assert_eq!(eval("=AVERAGE(B1:B4)", &t), number(200.0));
    assert_eq!(eval("=COUNT(B1:B4)", &t), number(3.0));
    assert_eq!(eval("=COUNTA(B1:B4)", &t), number(4.0));
    // the blank Qty cell is not counted
    assert_eq!(eval("=COUNTA(C1:C4)", &t), number(3.0));
}

#[test]
fn test_min_max() {
    let t = mixed();
    assert_eq!(eval("=MIN(B1:B4)", &t), number(100.0));
    assert_eq!(eval("=MAX(B1:B4, 50, 400)", &t), number(400.0));
}

#[test]
fn test_error_cell_poisons_aggregate() {
    let t = mixed();
    assert_eq!(eval("=SUM(C1:C4)", &t), error(ErrorKind::DivByZero));
    assert_eq!(eval("=COUNT(C1:C4)", &t), number(2.0));
}

#[test]
fn test_error_argument_fails_count() {
    assert_eq!(eval("=COUNT(1/0)", &ratio()), error(ErrorKind::DivByZero));
    assert_eq!(eval("=COUNTA(A1/B1)", &ratio()), error(ErrorKind::DivByZero));
    assert_eq!(eval("=COUNT(A1, A1/B1)", &ratio()), error(ErrorKind::DivByZero));
    assert_eq!(eval("=OR(TRUE, A1/B1)", &ratio()), error(ErrorKind::DivByZero));
    // error cells reached through a reference follow each function's own rule
    assert_eq!(eval("=COUNTA(C1:C4)", &mixed()), number(3.0));
    assert_eq!(eval("=COUNT(C4)", &mixed()), number(0.0));
    assert_eq!(eval("=SUM(C4)", &mixed()), error(ErrorKind::DivByZero));
}

#[test]
fn test_overflowing_sum_is_value_error() {
    let t = ratio();
    assert_eq!(eval("=SUM(1e308, 1e308)", &t), error(ErrorKind::TypeMismatch));
    assert_eq!(eval("=AVERAGE(1e308, 1e308)", &t), error(ErrorKind::TypeMismatch));
    assert_eq!(eval("=SUM(1e308, -1e308)", &t), number(0.0));
}

#[test]
fn test_average_of_nothing_divides_by_zero() {
    assert_eq!(eval("=AVERAGE(A1:A4)", &mixed()), error(ErrorKind::DivByZero));
}

#[test]
fn test_function_names_are_case_insensitive() {
    assert_eq!(eval("=sum(B1:B4)", &mixed()), number(600.0));
}

// ═══════════════════════════════════════════════════════════════════════════
// REFERENCES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_out_of_bounds_cell_is_ref_error() {
    assert_eq!(eval("=Z100", &mixed()), error(ErrorKind::InvalidRef));
    assert_eq!(eval("=A5", &mixed()), error(ErrorKind::InvalidRef));
}

#[test]
fn test_range_is_clamped_past_the_edge() {
    assert_eq!(eval("=SUM(B1:B1000)", &mixed()), number(600.0));
}

#[test]
fn test_range_starting_outside_is_ref_error() {
    assert_eq!(eval("=SUM(Z1:Z5)", &mixed()), error(ErrorKind::InvalidRef));
}

#[test]
fn test_reversed_range_is_normalized() {
    assert_eq!(eval("=SUM(B4:B1)", &mixed()), number(600.0));
}

#[test]
fn test_lowercase_references() {
    assert_eq!(eval("=b1+b3", &mixed()), number(300.0));
}

// ═══════════════════════════════════════════════════════════════════════════
// ARITHMETIC AND COMPARISON
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_division_by_zero() {
    assert_eq!(eval("=A1/B1", &ratio()), error(ErrorKind::DivByZero));
}

#[test]
fn test_error_propagates_through_if_condition() {
    assert_eq!(
        eval("=IF(A1/B1=0,\"x\",\"y\")", &ratio()),
        error(ErrorKind::DivByZero)
    );
}

#[test]
fn test_precedence_and_associativity() {
    let t = ratio();
    assert_eq!(eval("=2+3*4", &t), number(14.0));
    assert_eq!(eval("=(2+3)*4", &t), number(20.0));
    assert_eq!(eval("=2^3^2", &t), number(512.0));
    assert_eq!(eval("=10-4-3", &t), number(3.0));
    assert_eq!(eval("=-A1+15", &t), number(5.0));
}

#[test]
fn test_missing_counts_as_zero_in_arithmetic() {
    assert_eq!(eval("=C3+1", &mixed()), number(1.0));
}

#[test]
fn test_text_in_arithmetic_is_type_mismatch() {
    assert_eq!(eval("=B2+1", &mixed()), error(ErrorKind::TypeMismatch));
}

#[test]
fn test_cross_type_comparison() {
    let t = ratio();
    assert_eq!(eval("=\"a\"=1", &t), Value::Boolean(false));
    assert_eq!(eval("=\"a\"<>1", &t), Value::Boolean(true));
    assert_eq!(eval("=\"a\"<1", &t), error(ErrorKind::TypeMismatch));
    assert_eq!(eval("=1+1=2", &t), Value::Boolean(true));
}

// ═══════════════════════════════════════════════════════════════════════════
// LOGIC
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_if_only_evaluates_taken_branch() {
    let t = ratio();
    assert_eq!(eval("=IF(TRUE, 1, ZZ99)", &t), number(1.0));
    assert_eq!(eval("=IF(FALSE, A1/B1, 2)", &t), number(2.0));
    assert_eq!(eval("=IF(FALSE, 1)", &t), Value::Boolean(false));
}

#[test]
fn test_if_with_non_boolean_condition() {
    assert_eq!(eval("=IF(\"yes\", 1, 2)", &ratio()), error(ErrorKind::TypeMismatch));
}

#[test]
fn test_and_or_not() {
    let t = ratio();
    assert_eq!(eval("=AND(TRUE, A1>5)", &t), Value::Boolean(true));
    assert_eq!(eval("=OR(FALSE, B1)", &t), Value::Boolean(false));
    assert_eq!(eval("=NOT(B1)", &t), Value::Boolean(true));
    assert_eq!(eval("=AND(A1/B1, TRUE)", &t), error(ErrorKind::DivByZero));
}

// ═══════════════════════════════════════════════════════════════════════════
// TEXT, MATH, LOOKUP
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_text_functions() {
    let t = mixed();
    assert_eq!(eval("=CONCAT(A1,\"-\",B1)", &t), Value::from("widget-100"));
    assert_eq!(eval("=CONCATENATE(\"a\",\"b\")", &t), Value::from("ab"));
    assert_eq!(eval("=LEN(A4)", &t), number(9.0));
    assert_eq!(eval("=\"say \"\"hi\"\"\"", &t), Value::from("say \"hi\""));
}

#[test]
fn test_round_and_abs() {
    let t = ratio();
    assert_eq!(eval("=ROUND(2.346, 2)", &t), number(2.35));
    assert_eq!(eval("=ROUND(1234, -2)", &t), number(1200.0));
    assert_eq!(eval("=ROUND(2.5)", &t), number(3.0));
    assert_eq!(eval("=ABS(-7)", &t), number(7.0));
}

#[test]
fn test_round_never_yields_non_finite() {
    let t = ratio();
    assert_eq!(eval("=ROUND(1, 400)", &t), error(ErrorKind::TypeMismatch));
    assert_eq!(eval("=ROUND(1, 308)", &t), number(1.0));
    assert_eq!(eval("=ROUND(1234, -1e10)", &t), number(0.0));
}

#[test]
fn test_sumif_countif() {
    let t = mixed();
    assert_eq!(eval("=SUMIF(B1:B4,\">150\")", &t), number(500.0));
    assert_eq!(eval("=COUNTIF(A1:A4,\"widget\")", &t), number(1.0));
    assert_eq!(eval("=SUMIF(A1:A4,\"gizmo\",B1:B4)", &t), number(200.0));
}

#[test]
fn test_vlookup() {
    let t = mixed();
    assert_eq!(eval("=VLOOKUP(\"gizmo\", A1:C4, 2)", &t), number(200.0));
    assert_eq!(
        eval("=VLOOKUP(\"nope\", A1:C4, 2)", &t),
        error(ErrorKind::InvalidRef)
    );
    assert_eq!(
        eval("=VLOOKUP(\"gizmo\", A1:C4, 0)", &t),
        error(ErrorKind::TypeMismatch)
    );
}

#[test]
fn test_vlookup_range_lookup_argument() {
    let t = mixed();
    assert_eq!(eval("=VLOOKUP(\"gizmo\", A1:C4, 2, FALSE)", &t), number(200.0));

    let tiers = Table::new(vec![
        Column::new("From", vec![number(10.0), number(20.0), number(30.0)]),
        Column::new("Rate", vec![number(0.1), number(0.2), number(0.3)]),
    ])
    .unwrap();
    assert_eq!(eval("=VLOOKUP(25, A1:B3, 2, TRUE)", &tiers), number(0.2));
    assert_eq!(eval("=VLOOKUP(25, A1:B3, 2, FALSE)", &tiers), error(ErrorKind::InvalidRef));
    assert_eq!(eval("=VLOOKUP(5, A1:B3, 2, TRUE)", &tiers), error(ErrorKind::InvalidRef));
}

#[test]
fn test_row_uses_target_row() {
    let t = ratio();
    assert_eq!(evaluate_formula("=ROW()", &t, Some(2)), number(3.0));
    assert_eq!(evaluate_formula("=ROW()", &t, None), error(ErrorKind::InvalidRef));
    assert_eq!(eval("=ROW(C7)", &t), number(7.0));
}

// ═══════════════════════════════════════════════════════════════════════════
// MALFORMED INPUT
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_unknown_function() {
    assert_eq!(eval("=FROB(1)", &ratio()), error(ErrorKind::UnknownFunction));
}

#[test]
fn test_wrong_arity_is_parse_error() {
    assert_eq!(eval("=ROUND()", &ratio()), error(ErrorKind::ParseError));
    assert_eq!(eval("=NOT(1, 2)", &ratio()), error(ErrorKind::ParseError));
}

#[test]
fn test_syntax_errors() {
    let t = ratio();
    for formula in ["=1+", "=SUM(A1", "=\"open", "=1 2", "=)", "=@A1"] {
        assert_eq!(eval(formula, &t), error(ErrorKind::ParseError), "{}", formula);
    }
}

#[test]
fn test_deep_nesting_is_parse_error() {
    let t = ratio();
    let deep = format!("={}1{}", "(".repeat(200_000), ")".repeat(200_000));
    assert_eq!(eval(&deep, &t), error(ErrorKind::ParseError));
    let signs = format!("={}1", "-".repeat(200_000));
    assert_eq!(eval(&signs, &t), error(ErrorKind::ParseError));

    let shallow = format!("={}1{}", "(".repeat(100), ")".repeat(100));
    assert_eq!(eval(&shallow, &t), number(1.0));
}

// ═══════════════════════════════════════════════════════════════════════════
// APPLY
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_apply_writes_new_table() {
    let t = ratio();
    let updated = apply_formula("=A1*3", &t, "B2").unwrap();
    assert_eq!(updated.cell(1, 1), Some(&number(30.0)));
    assert_eq!(updated.cell(1, 0), Some(&Value::Missing));
    assert_eq!(t.row_count(), 1);
}

#[test]
fn test_apply_keeps_error_values() {
    let updated = apply_formula("=A1/B1", &ratio(), "C1").unwrap();
    assert_eq!(updated.cell(0, 2), Some(&error(ErrorKind::DivByZero)));
}

#[test]
fn test_apply_rejects_bad_target_and_syntax() {
    assert!(matches!(
        apply_formula("=1", &ratio(), "1A"),
        Err(CellforgeError::Reference(_))
    ));
    assert!(matches!(
        apply_formula("=1+", &ratio(), "A1"),
        Err(CellforgeError::Parse(_))
    ));
}

#[test]
fn test_apply_target_must_fit_a_worksheet() {
    let t = ratio();
    for target in ["A18446744073709551615", "A99999999", "ZZZZ1"] {
        assert!(
            matches!(apply_formula("=1", &t, target), Err(CellforgeError::Reference(_))),
            "{}",
            target
        );
    }
    assert_eq!(t.row_count(), 1);
}
