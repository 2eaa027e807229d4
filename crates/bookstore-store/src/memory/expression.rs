use bson::{Bson, Document};

use super::compare::get_path;
use crate::error::StoreError;

/// A BSON number with the server's widening rules: int32 overflows into
/// int64, int64 overflows into double, and anything touching a double is
/// a double.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Number {
    Int32(i32),
    Int64(i64),
    Double(f64),
}

impl Number {
    pub(crate) fn from_bson(value: &Bson) -> Option<Self> {
        match value {
            Bson::Int32(n) => Some(Number::Int32(*n)),
            Bson::Int64(n) => Some(Number::Int64(*n)),
            Bson::Double(n) => Some(Number::Double(*n)),
            _ => None,
        }
    }

    pub(crate) fn into_bson(self) -> Bson {
        match self {
            Number::Int32(n) => Bson::Int32(n),
            Number::Int64(n) => Bson::Int64(n),
            Number::Double(n) => Bson::Double(n),
        }
    }

    pub(crate) fn as_f64(self) -> f64 {
        match self {
            Number::Int32(n) => n as f64,
            Number::Int64(n) => n as f64,
            Number::Double(n) => n,
        }
    }

    fn as_i64(self) -> Option<i64> {
        match self {
            Number::Int32(n) => Some(n as i64),
            Number::Int64(n) => Some(n),
            Number::Double(_) => None,
        }
    }

    fn is_int32(self) -> bool {
        std::matches!(self, Number::Int32(_))
    }
}

/// Narrow an integer result back to the narrowest width both operands allow.
fn integer_result(value: i64, both_int32: bool) -> Number {
    if both_int32 {
        if let Ok(n) = i32::try_from(value) {
            return Number::Int32(n);
        }
    }
    Number::Int64(value)
}

pub(crate) fn add(a: Number, b: Number) -> Number {
    match (a.as_i64(), b.as_i64()) {
        (Some(x), Some(y)) => match x.checked_add(y) {
            Some(sum) => integer_result(sum, a.is_int32() && b.is_int32()),
            None => Number::Double(x as f64 + y as f64),
        },
        _ => Number::Double(a.as_f64() + b.as_f64()),
    }
}

fn subtract(a: Number, b: Number) -> Number {
    match (a.as_i64(), b.as_i64()) {
        (Some(x), Some(y)) => match x.checked_sub(y) {
            Some(diff) => integer_result(diff, a.is_int32() && b.is_int32()),
            None => Number::Double(x as f64 - y as f64),
        },
        _ => Number::Double(a.as_f64() - b.as_f64()),
    }
}

fn multiply(a: Number, b: Number) -> Number {
    match (a.as_i64(), b.as_i64()) {
        (Some(x), Some(y)) => match x.checked_mul(y) {
            Some(product) => integer_result(product, a.is_int32() && b.is_int32()),
            None => Number::Double(x as f64 * y as f64),
        },
        _ => Number::Double(a.as_f64() * b.as_f64()),
    }
}

fn modulo(a: Number, b: Number) -> Result<Number, StoreError> {
    match (a.as_i64(), b.as_i64()) {
        (_, Some(0)) => Err(StoreError::InvalidQuery("$mod by zero".into())),
        (Some(x), Some(y)) => Ok(integer_result(x % y, a.is_int32() && b.is_int32())),
        _ => Ok(Number::Double(a.as_f64() % b.as_f64())),
    }
}

/// Evaluate an aggregation expression against one document.
///
/// `"$field.path"` reads from the document (missing reads as null), a
/// single-key `{ "$op": args }` document applies an operator, any other
/// document or array is evaluated element-wise, and everything else is a
/// literal.
pub(crate) fn evaluate(expr: &Bson, doc: &Document) -> Result<Bson, StoreError> {
    match expr {
        Bson::String(s) if s.starts_with('$') => {
            Ok(get_path(doc, &s[1..]).cloned().unwrap_or(Bson::Null))
        }
        Bson::Document(sub) => {
            if let Some((op, args)) = operator(sub) {
                return apply_operator(op, args, doc);
            }
            let mut out = Document::new();
            for (k, v) in sub {
                out.insert(k.clone(), evaluate(v, doc)?);
            }
            Ok(Bson::Document(out))
        }
        Bson::Array(items) => items
            .iter()
            .map(|item| evaluate(item, doc))
            .collect::<Result<Vec<_>, _>>()
            .map(Bson::Array),
        literal => Ok(literal.clone()),
    }
}

fn operator(sub: &Document) -> Option<(&str, &Bson)> {
    let mut iter = sub.iter();
    match (iter.next(), iter.next()) {
        (Some((k, v)), None) if k.starts_with('$') => Some((k.as_str(), v)),
        _ => None,
    }
}

/// Evaluate operator arguments into numbers. `None` means an argument was
/// null or missing, which makes the whole expression null.
fn numeric_args(op: &str, args: &Bson, doc: &Document) -> Result<Option<Vec<Number>>, StoreError> {
    let values = match args {
        Bson::Array(items) => items
            .iter()
            .map(|item| evaluate(item, doc))
            .collect::<Result<Vec<_>, _>>()?,
        single => vec![evaluate(single, doc)?],
    };

    let mut numbers = Vec::with_capacity(values.len());
    for value in &values {
        match value {
            Bson::Null | Bson::Undefined => return Ok(None),
            other => numbers.push(Number::from_bson(other).ok_or_else(|| {
                StoreError::InvalidQuery(format!("{op} only supports numeric types, not {other}"))
            })?),
        }
    }
    Ok(Some(numbers))
}

fn binary(op: &str, numbers: &[Number]) -> Result<(Number, Number), StoreError> {
    match numbers {
        [a, b] => Ok((*a, *b)),
        _ => Err(StoreError::InvalidQuery(format!(
            "{op} takes exactly 2 arguments, got {}",
            numbers.len()
        ))),
    }
}

fn apply_operator(op: &str, args: &Bson, doc: &Document) -> Result<Bson, StoreError> {
    if op == "$literal" {
        return Ok(args.clone());
    }

    let numbers = match op {
        "$add" | "$subtract" | "$multiply" | "$divide" | "$mod" | "$floor" => {
            match numeric_args(op, args, doc)? {
                Some(numbers) => numbers,
                None => return Ok(Bson::Null),
            }
        }
        _ => return Err(StoreError::InvalidQuery(format!("unknown expression operator: {op}"))),
    };

    let result = match op {
        "$add" => numbers
            .iter()
            .copied()
            .fold(Number::Int32(0), add),
        "$multiply" => numbers
            .iter()
            .copied()
            .fold(Number::Int32(1), multiply),
        "$subtract" => {
            let (a, b) = binary(op, &numbers)?;
            subtract(a, b)
        }
        "$divide" => {
            let (a, b) = binary(op, &numbers)?;
            if b.as_f64() == 0.0 {
                return Err(StoreError::InvalidQuery("can't $divide by zero".into()));
            }
            Number::Double(a.as_f64() / b.as_f64())
        }
        "$mod" => {
            let (a, b) = binary(op, &numbers)?;
            modulo(a, b)?
        }
        _ => match numbers.as_slice() {
            [Number::Double(n)] => Number::Double(n.floor()),
            [n] => *n,
            _ => {
                return Err(StoreError::InvalidQuery(format!(
                    "$floor takes exactly 1 argument, got {}",
                    numbers.len()
                )));
            }
        },
    };
    Ok(result.into_bson())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn field_paths_and_literals() {
        let d = doc! { "genre": "Fiction" };
        assert_eq!(evaluate(&Bson::String("$genre".into()), &d).unwrap(), Bson::String("Fiction".into()));
        assert_eq!(evaluate(&Bson::String("$missing".into()), &d).unwrap(), Bson::Null);
        assert_eq!(evaluate(&Bson::Int32(1), &d).unwrap(), Bson::Int32(1));
    }

    #[test]
    fn decade_expression() {
        let expr = Bson::Document(doc! { "$floor": { "$divide": ["$published_year", 10] } });
        let key = evaluate(&expr, &doc! { "published_year": 1923 }).unwrap();
        assert_eq!(key, Bson::Double(192.0));
        let scaled = evaluate(
            &Bson::Document(doc! { "$multiply": ["$_id", 10] }),
            &doc! { "_id": key },
        )
        .unwrap();
        assert_eq!(scaled, Bson::Double(1920.0));
    }

    #[test]
    fn integer_arithmetic_keeps_width() {
        let d = doc! {};
        let sum = evaluate(&Bson::Document(doc! { "$add": [1, 2, 3] }), &d).unwrap();
        assert_eq!(sum, Bson::Int32(6));
        let wide = evaluate(&Bson::Document(doc! { "$add": [i32::MAX, 1] }), &d).unwrap();
        assert_eq!(wide, Bson::Int64(i32::MAX as i64 + 1));
        let rem = evaluate(&Bson::Document(doc! { "$mod": [1925, 10] }), &d).unwrap();
        assert_eq!(rem, Bson::Int32(5));
    }

    #[test]
    fn null_operand_yields_null() {
        let out = evaluate(
            &Bson::Document(doc! { "$divide": ["$published_year", 10] }),
            &doc! { "title": "Untitled" },
        )
        .unwrap();
        assert_eq!(out, Bson::Null);
    }

    #[test]
    fn non_numeric_operand_errors() {
        let err = evaluate(
            &Bson::Document(doc! { "$subtract": ["$title", 1] }),
            &doc! { "title": "Emma" },
        )
        .unwrap_err();
        assert!(err.to_string().contains("only supports numeric types"), "{err}");
    }

    #[test]
    fn divide_by_zero_errors() {
        assert!(evaluate(&Bson::Document(doc! { "$divide": [1, 0] }), &doc! {}).is_err());
    }
}
