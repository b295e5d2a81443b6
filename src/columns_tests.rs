#[cfg(test)]
mod tests {
    use crate::columns::{ColumnSpec, DeriveContext, columns_of, derive_columns, value_at};
    use crate::field_mapper::{identity_mapper, set_default_field_mapper_scoped, snake_case};
    use crate::record::{FieldShape, Record, RecordType};
    use crate::value::SqlValue;
    use crate::valuer::{ScanError, SqlScanner, SqlValuer, ValuerError};
    use crate::dialect::MySql;
    use crate::translate::Translator;
    use crate::{Arg, record};
    use pretty_assertions::assert_eq;
    use time::PrimitiveDateTime;
    use time::macros::datetime;

    /// 写入时是叶子，读取时展开。
    #[derive(Debug, Clone, Default)]
    struct Money {
        cents: i64,
        currency: String,
    }

    impl SqlValuer for Money {
        fn value(&self) -> Result<SqlValue, ValuerError> {
            Ok(SqlValue::from(format!("{} {}", self.cents, self.currency)))
        }
    }

    /// 读取时是叶子，写入时展开。
    #[derive(Debug, Clone, Default)]
    struct Point {
        x: i64,
        y: i64,
    }

    impl SqlScanner for Point {
        fn scan(&mut self, value: SqlValue) -> Result<(), ScanError> {
            let text = match value {
                SqlValue::String(s) => s,
                other => {
                    return Err(ScanError::UnsupportedValue {
                        got: other.kind_name(),
                        target: "Point",
                    });
                }
            };
            let (x, y) = text
                .split_once(',')
                .ok_or_else(|| ScanError::Invalid(format!("bad point {text:?}")))?;
            self.x = x.trim().parse().map_err(|_| ScanError::Invalid(x.to_string()))?;
            self.y = y.trim().parse().map_err(|_| ScanError::Invalid(y.to_string()))?;
            Ok(())
        }
    }

    #[derive(Debug, Clone, Default)]
    struct Audit {
        created_by: String,
        note: String,
    }

    #[derive(Debug, Clone)]
    struct Order {
        id: i64,
        price: Money,
        place: Point,
        created_at: PrimitiveDateTime,
        audit: Audit,
        hidden: Audit,
        version: i64,
    }

    #[derive(Debug, Clone)]
    struct Item {
        id: i64,
        r#type: String,
    }

    crate::sql_record! {
        impl Item {
            id: i64,
            r#type: String,
        }

        impl Money [valuer] {
            cents: i64,
            currency: String,
        }

        impl Point [scanner] {
            x: i64,
            y: i64 => "pos_y",
        }

        impl Audit {
            created_by: String,
            note: String => ",noupdate",
        }

        impl Order {
            id: i64 => ",selectonly",
            price: Money,
            place: Point,
            created_at: PrimitiveDateTime,
            audit: Audit => ",omitinsert",
            hidden: Audit => "-",
            version: i64 => "ver,noupdate",
        }
    }

    fn order() -> Order {
        Order {
            id: 9,
            price: Money {
                cents: 150,
                currency: "EUR".into(),
            },
            place: Point { x: 1, y: 2 },
            created_at: datetime!(2020-01-02 03:04:05),
            audit: Audit {
                created_by: "ann".into(),
                note: "n".into(),
            },
            hidden: Audit::default(),
            version: 3,
        }
    }

    fn names(cols: &[ColumnSpec]) -> Vec<&str> {
        cols.iter().map(|c| c.name.as_str()).collect()
    }

    fn derive(ctx: DeriveContext) -> Vec<ColumnSpec> {
        derive_columns(Order::FIELDS, ctx, &snake_case())
    }

    #[test]
    fn insert_context() {
        let cols = derive(DeriveContext::Insert);
        assert_eq!(names(&cols), vec!["price", "x", "pos_y", "created_at", "ver"]);
        assert_eq!(cols[1].path, vec![2, 0]);
    }

    #[test]
    fn update_context() {
        let cols = derive(DeriveContext::Update);
        assert_eq!(
            names(&cols),
            vec!["id", "price", "x", "pos_y", "created_at", "created_by"]
        );
    }

    #[test]
    fn read_context_uses_scanner_leaves() {
        let cols = derive(DeriveContext::Read);
        assert_eq!(
            names(&cols),
            vec!["id", "cents", "currency", "place", "created_at", "created_by", "note", "ver"]
        );
        let id = &cols[0];
        assert!(!id.insertable);
        assert!(id.updatable);
        let note = &cols[6];
        assert_eq!(note.path, vec![4, 1]);
        assert!(!note.insertable);
        assert!(!note.updatable);
    }

    #[test]
    fn derivation_is_deterministic() {
        for ctx in [DeriveContext::Insert, DeriveContext::Update, DeriveContext::Read] {
            assert_eq!(derive(ctx), derive(ctx));
        }
    }

    #[test]
    fn explicit_names_bypass_mapper() {
        let cols = derive_columns(Order::FIELDS, DeriveContext::Read, &identity_mapper());
        assert_eq!(cols[7].name, "ver");
        assert_eq!(cols[4].name, "created_at");
    }

    #[test]
    fn columns_of_uses_default_mapper() {
        let upper: crate::field_mapper::FieldMapperFunc =
            std::sync::Arc::new(|s: &str| s.to_ascii_uppercase());
        let _g = set_default_field_mapper_scoped(upper);
        assert_eq!(
            names(&columns_of::<Point>(DeriveContext::Read)),
            vec!["X", "pos_y"]
        );
    }

    #[test]
    fn shapes_reflect_capabilities() {
        let price = Order::FIELDS[1].shape;
        assert!(matches!(
            price,
            FieldShape::Record {
                type_name: "Money",
                valuer: true,
                scanner: false,
                ..
            }
        ));
        assert_eq!(Order::FIELDS[3].shape, FieldShape::Time);
        assert_eq!(Order::FIELDS[0].shape, FieldShape::Leaf);
    }

    #[test]
    fn value_at_follows_paths() {
        let o = order();
        let cols = derive(DeriveContext::Read);
        let got: Vec<String> = cols
            .iter()
            .map(|c| match value_at(&o, &c.path) {
                Some(Arg::Value(v)) => format!("{v:?}"),
                Some(Arg::Record(r)) => r.type_name().to_string(),
                other => format!("{other:?}"),
            })
            .collect();
        assert_eq!(got[0], "I64(9)");
        assert_eq!(got[1], "I64(150)");
        assert_eq!(got[3], "Point");
        assert_eq!(got[6], r#"String("n")"#);
        assert!(value_at(&o, &[99]).is_none());
        assert!(value_at(&o, &[0, 1]).is_none());
        assert!(value_at(&o, &[]).is_none());
    }

    #[test]
    fn scanner_capability_is_reachable() {
        let mut p = Point::default();
        let scanner = p.as_scanner_mut().expect("Point is a scanner");
        scanner.scan(SqlValue::from("3, 4")).unwrap();
        assert_eq!((p.x, p.y), (3, 4));

        let mut m = Money::default();
        assert!(m.as_scanner_mut().is_none());
        assert!(m.as_valuer().is_some());
        assert_eq!(
            Point::default().as_scanner_mut().map(|s| s.scan(SqlValue::I64(1))),
            Some(Err(ScanError::UnsupportedValue {
                got: "i64",
                target: "Point"
            }))
        );
    }

    #[test]
    fn raw_identifier_fields_map_to_plain_names() {
        assert_eq!(Item::FIELDS[1].ident, "type");
        assert_eq!(
            names(&derive_columns(Item::FIELDS, DeriveContext::Insert, &snake_case())),
            vec!["id", "type"]
        );
        let item = Item {
            id: 1,
            r#type: "a".into(),
        };
        assert_eq!(
            Translator::new(&MySql)
                .with_field_mapper(snake_case())
                .translate("INSERT INTO [item] ?values", &[record(item)])
                .unwrap(),
            "INSERT INTO `item` (`id`, `type`) VALUES (1, 'a')"
        );
    }
}
