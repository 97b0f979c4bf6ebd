//! Expression Generation Tests
//!
//! Rendering of every expression kind through the public API.

use proptest::prelude::*;
use xcrud_sql::expressions::{ColumnIdentifier, ContentType, DocumentPathItem, Expression};
use xcrud_sql::{compile_document_path, compile_expression, Error, Generator};

fn doc(expr: &Expression) -> String {
    compile_expression(expr, false).unwrap()
}

fn table(expr: &Expression) -> String {
    compile_expression(expr, true).unwrap()
}

// ============================================================================
// Identifiers and document paths
// ============================================================================

mod identifiers {
    use super::*;

    #[test]
    fn test_document_field() {
        let expr = Expression::document_field(
            "doc",
            [DocumentPathItem::member("a"), DocumentPathItem::ArrayIndex(0)],
        );
        assert_eq!(doc(&expr), "JSON_EXTRACT(`doc`,'$.a[0]')");
        assert_eq!(table(&expr), "JSON_EXTRACT(`doc`,'$.a[0]')");
    }

    #[test]
    fn test_bare_path_uses_doc_column() {
        let expr = Expression::document_path([DocumentPathItem::member("name")]);
        assert_eq!(doc(&expr), "JSON_EXTRACT(`doc`,'$.name')");
    }

    #[test]
    fn test_table_qualified_path() {
        let ident = ColumnIdentifier::default()
            .with_table("t")
            .with_document_path([DocumentPathItem::DoubleAsterisk, DocumentPathItem::member("x")]);
        assert_eq!(
            table(&Expression::Identifier(ident)),
            "JSON_EXTRACT(`t`.`doc`,'$**.x')"
        );
    }

    #[test]
    fn test_root_path() {
        assert_eq!(compile_document_path(&[DocumentPathItem::root()]).unwrap(), "'$'");
        let expr = Expression::document_field("doc", [DocumentPathItem::root()]);
        assert_eq!(doc(&expr), "JSON_EXTRACT(`doc`,'$')");
    }

    #[test]
    fn test_member_needing_quotes() {
        let path = [DocumentPathItem::member("first name"), DocumentPathItem::member("$ok")];
        assert_eq!(
            compile_document_path(&path).unwrap(),
            "'$.\\\"first name\\\".$ok'"
        );
    }

    #[test]
    fn test_non_ascii_member_is_quoted() {
        let path = [DocumentPathItem::member("\u{24B6}")];
        assert_eq!(
            compile_document_path(&path).unwrap(),
            "'$.\\\"\u{24B6}\\\"'"
        );

        let path = [DocumentPathItem::member("\u{0345}x")];
        assert_eq!(
            compile_document_path(&path).unwrap(),
            "'$.\\\"\u{0345}x\\\"'"
        );
    }

    #[test]
    fn test_member_cannot_break_out_of_literal() {
        let path = [DocumentPathItem::member("a') OR 1=1 -- ")];
        let sql = compile_document_path(&path).unwrap();
        assert_eq!(sql, "'$.\\\"a\\') OR 1=1 -- \\\"'");
    }
}

// ============================================================================
// Literals
// ============================================================================

mod literals {
    use super::*;

    #[test]
    fn test_octets_dispatch() {
        assert_eq!(
            doc(&Expression::octets("POINT", ContentType::Geometry)),
            "ST_GEOMETRYFROMWKB('POINT')"
        );
        assert_eq!(
            doc(&Expression::octets("[1,2]", ContentType::Json)),
            "CAST('[1,2]' AS JSON)"
        );
        assert_eq!(doc(&Expression::octets("p", ContentType::Plain)), "'p'");
        assert_eq!(doc(&Expression::octets("<x/>", ContentType::Xml)), "'<x/>'");
    }

    #[test]
    fn test_numbers_are_locale_independent() {
        assert_eq!(doc(&Expression::uint(1_000_000)), "1000000");
        assert_eq!(doc(&Expression::sint(-1_000_000)), "-1000000");
        assert_eq!(doc(&Expression::double(1234567.5)), "1234567.5");
        assert_eq!(doc(&Expression::double(1e-7)), "1e-7");
    }
}

// ============================================================================
// Operators
// ============================================================================

mod operators {
    use super::*;

    fn op(name: &str, args: Vec<Expression>) -> String {
        table(&Expression::operator(name, args))
    }

    #[test]
    fn test_binary() {
        let a = Expression::column("a");
        assert_eq!(op("==", vec![a.clone(), Expression::uint(1)]), "(`a` = 1)");
        assert_eq!(op("&&", vec![a.clone(), Expression::boolean(true)]), "(`a` AND TRUE)");
        assert_eq!(op("is_not", vec![a.clone(), Expression::null()]), "(`a` IS NOT NULL)");
        assert_eq!(op("div", vec![a, Expression::uint(2)]), "(`a` DIV 2)");
    }

    #[test]
    fn test_nested() {
        let expr = Expression::operator(
            "||",
            [
                Expression::operator("<", [Expression::column("a"), Expression::uint(1)]),
                Expression::operator("not", [Expression::column("b")]),
            ],
        );
        assert_eq!(table(&expr), "((`a` < 1) OR (NOT `b`))");
    }

    #[test]
    fn test_unary() {
        assert_eq!(op("sign_minus", vec![Expression::column("a")]), "(-`a`)");
        assert_eq!(op("!", vec![Expression::column("a")]), "(NOT `a`)");
    }

    #[test]
    fn test_in_between_like() {
        let a = Expression::column("a");
        assert_eq!(
            op("in", vec![a.clone(), Expression::uint(1), Expression::uint(2)]),
            "(`a` IN (1,2))"
        );
        assert_eq!(
            op("not_between", vec![a.clone(), Expression::uint(1), Expression::uint(9)]),
            "(`a` NOT BETWEEN 1 AND 9)"
        );
        assert_eq!(
            op("like", vec![a.clone(), Expression::string("x%")]),
            "(`a` LIKE 'x%')"
        );
        assert_eq!(
            op("not_like", vec![a, Expression::string("x!%"), Expression::string("!")]),
            "(`a` NOT LIKE 'x!%' ESCAPE '!')"
        );
    }

    #[test]
    fn test_cast_and_intervals() {
        let a = Expression::column("a");
        assert_eq!(
            op("cast", vec![a.clone(), Expression::octets("unsigned integer", ContentType::Plain)]),
            "CAST(`a` AS UNSIGNED INTEGER)"
        );
        assert_eq!(
            op("date_add", vec![a.clone(), Expression::uint(1), Expression::string("day")]),
            "DATE_ADD(`a`,INTERVAL 1 DAY)"
        );
        assert_eq!(
            op("date_sub", vec![a, Expression::uint(2), Expression::string("HOUR")]),
            "DATE_SUB(`a`,INTERVAL 2 HOUR)"
        );
    }

    #[test]
    fn test_zero_argument_forms() {
        assert_eq!(op("*", vec![]), "*");
        assert_eq!(op("default", vec![]), "DEFAULT");
        assert_eq!(
            table(&Expression::function("COUNT", [Expression::operator("*", [])])),
            "COUNT(*)"
        );
    }

    #[test]
    fn test_bad_operators() {
        let bad = [
            Expression::operator("===", [Expression::uint(1), Expression::uint(1)]),
            Expression::operator("==", [Expression::uint(1)]),
            Expression::operator("in", [Expression::uint(1)]),
            Expression::operator("like", [Expression::uint(1)]),
            Expression::operator("default", [Expression::uint(1)]),
        ];
        for expr in &bad {
            assert!(
                matches!(compile_expression(expr, true), Err(Error::BadMessage(_))),
                "{expr:?}"
            );
        }
    }

    #[test]
    fn test_keyword_operands_are_validated() {
        let cast = Expression::operator(
            "cast",
            [Expression::column("a"), Expression::string("SIGNED) FROM t; --")],
        );
        assert!(matches!(compile_expression(&cast, true), Err(Error::BadTypeValue(_))));

        let cast = Expression::operator("cast", [Expression::column("a"), Expression::column("b")]);
        assert!(matches!(compile_expression(&cast, true), Err(Error::BadTypeValue(_))));

        let add = Expression::operator(
            "date_add",
            [Expression::column("a"), Expression::uint(1), Expression::string("fortnight")],
        );
        assert!(matches!(compile_expression(&add, true), Err(Error::BadTypeValue(_))));
    }
}

// ============================================================================
// Composite values
// ============================================================================

mod composites {
    use super::*;

    #[test]
    fn test_nested_object() {
        let expr = Expression::object([
            ("name", Expression::string("Ann")),
            (
                "address",
                Expression::object([("zip", Expression::uint(12345))]),
            ),
            ("tags", Expression::array(Vec::new())),
        ]);
        assert_eq!(
            doc(&expr),
            "JSON_OBJECT('name','Ann','address',JSON_OBJECT('zip',12345),'tags',JSON_ARRAY())"
        );
    }

    #[test]
    fn test_object_key_is_escaped() {
        let expr = Expression::object([("k'", Expression::null())]);
        assert_eq!(doc(&expr), "JSON_OBJECT('k\\'',NULL)");
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let expr = Expression::object([
            (
                "v",
                Expression::document_field("doc", [DocumentPathItem::member("a")]),
            ),
            ("w", Expression::function("UPPER", [Expression::string("x")])),
        ]);
        let generator = Generator::new();
        let first = generator.generate(&expr).unwrap();
        let second = generator.generate(&expr).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, expr.sql().unwrap());
    }

    fn arb_expression() -> impl Strategy<Value = Expression> {
        let leaf = prop_oneof![
            Just(Expression::null()),
            any::<u64>().prop_map(Expression::uint),
            any::<i64>().prop_map(Expression::sint),
            any::<bool>().prop_map(Expression::boolean),
            any::<String>().prop_map(|s| Expression::string(s)),
            "[a-z_`'][a-z0-9_ `']{0,8}".prop_map(|name| Expression::column(name)),
            prop::collection::vec("[a-z $\"']{1,6}", 1..3).prop_map(|members| {
                let path = members.into_iter().map(|m| DocumentPathItem::member(m));
                Expression::document_field("doc", path)
            }),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4)
                    .prop_map(|elements| Expression::array(elements)),
                prop::collection::vec(("[a-z']{0,6}", inner.clone()), 0..4)
                    .prop_map(|fields| Expression::object(fields)),
                (inner.clone(), inner.clone())
                    .prop_map(|(l, r)| Expression::operator("==", [l, r])),
                prop::collection::vec(inner, 0..3)
                    .prop_map(|args| Expression::function("CONCAT", args)),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_rendering_is_idempotent(expr in arb_expression()) {
            let generator = Generator::new();
            let first = generator.generate(&expr);
            let second = generator.generate(&expr.clone());
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first, expr.sql());

            let relational = Generator::new().relational(true);
            prop_assert_eq!(relational.generate(&expr), relational.generate(&expr));
        }
    }
}
