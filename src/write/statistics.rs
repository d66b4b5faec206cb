use std::sync::Arc;

use crate::error::{Error, Result};
use crate::schema::types::PhysicalType;
use crate::statistics::*;
use crate::types::NativeType;

/// Reduces the statistics of a chunk's pages into the chunk's statistics.
pub fn reduce(stats: &[&Option<Arc<dyn Statistics>>]) -> Result<Option<Arc<dyn Statistics>>> {
    if stats.is_empty() {
        return Ok(None);
    }
    let stats = stats
        .iter()
        .filter_map(|x| x.as_ref())
        .map(|x| x.as_ref())
        .collect::<Vec<&dyn Statistics>>();
    if stats.is_empty() {
        return Ok(None);
    };

    let same_type = stats
        .iter()
        .skip(1)
        .all(|x| x.physical_type() == stats[0].physical_type());
    if !same_type {
        return Err(Error::InvalidParameter(
            "the statistics to reduce do not share a physical type".to_string(),
        ));
    };
    Ok(match stats[0].physical_type() {
        PhysicalType::Boolean => {
            let stats = stats.iter().map(|x| x.as_any().downcast_ref().unwrap());
            Some(Arc::new(reduce_boolean(stats)))
        }
        PhysicalType::Int32 => {
            let stats = stats.iter().map(|x| x.as_any().downcast_ref().unwrap());
            Some(Arc::new(reduce_primitive::<i32, _>(stats)))
        }
        PhysicalType::Int64 => {
            let stats = stats.iter().map(|x| x.as_any().downcast_ref().unwrap());
            Some(Arc::new(reduce_primitive::<i64, _>(stats)))
        }
        PhysicalType::Float => {
            let stats = stats.iter().map(|x| x.as_any().downcast_ref().unwrap());
            Some(Arc::new(reduce_primitive::<f32, _>(stats)))
        }
        PhysicalType::Double => {
            let stats = stats.iter().map(|x| x.as_any().downcast_ref().unwrap());
            Some(Arc::new(reduce_primitive::<f64, _>(stats)))
        }
        PhysicalType::ByteArray => {
            let stats = stats.iter().map(|x| x.as_any().downcast_ref().unwrap());
            Some(Arc::new(reduce_binary(stats)))
        }
        PhysicalType::FixedLenByteArray(_) => {
            let stats = stats.iter().map(|x| x.as_any().downcast_ref().unwrap());
            Some(Arc::new(reduce_fixed_len(stats)))
        }
    })
}

fn reduce_binary<'a, I: Iterator<Item = &'a BinaryStatistics>>(mut stats: I) -> BinaryStatistics {
    let initial = stats.next().unwrap().clone();
    stats.fold(initial, |mut acc, new| {
        acc.min_value = merge(acc.min_value, new.min_value.clone(), |x, y| {
            ord_binary(x, y, false)
        });
        acc.max_value = merge(acc.max_value, new.max_value.clone(), |x, y| {
            ord_binary(x, y, true)
        });
        acc.null_count = sum_counts(acc.null_count, new.null_count);
        acc.distinct_count = None;
        acc
    })
}

fn reduce_fixed_len<'a, I: Iterator<Item = &'a FixedLenStatistics>>(
    mut stats: I,
) -> FixedLenStatistics {
    let initial = stats.next().unwrap().clone();
    stats.fold(initial, |mut acc, new| {
        acc.min_value = merge(acc.min_value, new.min_value.clone(), |x, y| {
            ord_binary(x, y, false)
        });
        acc.max_value = merge(acc.max_value, new.max_value.clone(), |x, y| {
            ord_binary(x, y, true)
        });
        acc.null_count = sum_counts(acc.null_count, new.null_count);
        acc.distinct_count = None;
        acc
    })
}

fn merge<T, F: Fn(T, T) -> T>(lhs: Option<T>, rhs: Option<T>, pick: F) -> Option<T> {
    match (lhs, rhs) {
        (None, None) => None,
        (Some(x), None) => Some(x),
        (None, Some(x)) => Some(x),
        (Some(x), Some(y)) => Some(pick(x, y)),
    }
}

fn sum_counts(lhs: Option<i64>, rhs: Option<i64>) -> Option<i64> {
    match (lhs, rhs) {
        (None, None) => None,
        (Some(x), None) => Some(x),
        (None, Some(x)) => Some(x),
        (Some(x), Some(y)) => Some(x + y),
    }
}

fn ord_binary(a: Vec<u8>, b: Vec<u8>, max: bool) -> Vec<u8> {
    for (v1, v2) in a.iter().zip(b.iter()) {
        match v1.cmp(v2) {
            std::cmp::Ordering::Greater => {
                if max {
                    return a;
                } else {
                    return b;
                }
            }
            std::cmp::Ordering::Less => {
                if max {
                    return b;
                } else {
                    return a;
                }
            }
            _ => {}
        }
    }
    // equal prefix: the shorter sorts first
    if (a.len() < b.len()) != max {
        a
    } else {
        b
    }
}

fn reduce_boolean<'a, I: Iterator<Item = &'a BooleanStatistics>>(
    mut stats: I,
) -> BooleanStatistics {
    let initial = stats.next().unwrap().clone();
    stats.fold(initial, |mut acc, new| {
        acc.min_value = merge(acc.min_value, new.min_value, |x, y| x & y);
        acc.max_value = merge(acc.max_value, new.max_value, |x, y| x | y);
        acc.null_count = sum_counts(acc.null_count, new.null_count);
        acc.distinct_count = None;
        acc
    })
}

fn reduce_primitive<'a, T: NativeType + PartialOrd, I: Iterator<Item = &'a PrimitiveStatistics<T>>>(
    mut stats: I,
) -> PrimitiveStatistics<T> {
    let initial = stats.next().unwrap().clone();
    stats.fold(initial, |mut acc, new| {
        acc.min_value = merge(acc.min_value, new.min_value, |x, y| {
            if x > y {
                y
            } else {
                x
            }
        });
        acc.max_value = merge(acc.max_value, new.max_value, |x, y| {
            if x < y {
                y
            } else {
                x
            }
        });
        acc.null_count = sum_counts(acc.null_count, new.null_count);
        acc.distinct_count = None;
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduce_primitives() {
        let a: Option<Arc<dyn Statistics>> = Some(Arc::new(PrimitiveStatistics::<i32> {
            null_count: Some(1),
            distinct_count: None,
            min_value: Some(3),
            max_value: Some(10),
        }));
        let b: Option<Arc<dyn Statistics>> = Some(Arc::new(PrimitiveStatistics::<i32> {
            null_count: Some(2),
            distinct_count: None,
            min_value: Some(-1),
            max_value: Some(4),
        }));
        let reduced = reduce(&[&a, &b]).unwrap().unwrap();
        let reduced = reduced
            .as_any()
            .downcast_ref::<PrimitiveStatistics<i32>>()
            .unwrap();
        assert_eq!(reduced.min_value, Some(-1));
        assert_eq!(reduced.max_value, Some(10));
        assert_eq!(reduced.null_count, Some(3));
    }

    #[test]
    fn reduce_binary_prefixes() {
        assert_eq!(ord_binary(b"ab".to_vec(), b"abc".to_vec(), false), b"ab");
        assert_eq!(ord_binary(b"ab".to_vec(), b"abc".to_vec(), true), b"abc");
        assert_eq!(ord_binary(b"b".to_vec(), b"abc".to_vec(), true), b"b");
    }

    #[test]
    fn mixed_types_rejected() {
        let a: Option<Arc<dyn Statistics>> = Some(Arc::new(PrimitiveStatistics::<i32> {
            null_count: None,
            distinct_count: None,
            min_value: None,
            max_value: None,
        }));
        let b: Option<Arc<dyn Statistics>> = Some(Arc::new(BooleanStatistics {
            null_count: None,
            distinct_count: None,
            min_value: None,
            max_value: None,
        }));
        assert!(reduce(&[&a, &b]).is_err());
    }
}
