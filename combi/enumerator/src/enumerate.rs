use crate::{error::EnumerationError, sink::CombinationSink};

/// Emits every strictly increasing extension of `path[..path_len]` to length
/// `k` whose new elements lie in `start..=n`, in lexicographic order.
///
/// The prefix is trusted. `n` must be below `u32::MAX` so that `i + 1` stays
/// representable; [`enumerate`] checks this, direct callers must. `path` must
/// hold at least `min(k, n)` slots; slots at or beyond `path_len` are scratch
/// and are overwritten without undo.
///
/// Returns early with the first sink error.
pub fn generate<S>(
    n: u32,
    k: usize,
    start: u32,
    path: &mut [u32],
    path_len: usize,
    sink: &mut S,
) -> Result<(), EnumerationError>
where
    S: CombinationSink + ?Sized,
{
    debug_assert!(path_len <= k);
    debug_assert!(n < u32::MAX, "n must be below u32::MAX");
    if path_len == k {
        return sink.emit(&path[..k]);
    }
    for i in start..=n {
        path[path_len] = i;
        generate(n, k, i + 1, path, path_len + 1, sink)?;
    }
    Ok(())
}

/// Enumerates all k-combinations of `1..=n` into `sink` and returns how many
/// were emitted.
///
/// `k > n` is not an error: nothing is emitted. `k == 0` emits the empty
/// combination once.
pub fn enumerate<S>(n: u32, k: usize, sink: &mut S) -> Result<u64, EnumerationError>
where
    S: CombinationSink + ?Sized,
{
    validate_upper_bound(n)?;
    // A branch can never hold more than n elements, so k > n needs only n slots.
    let capacity = k.min(usize::try_from(n).unwrap_or(usize::MAX));
    let mut path = vec![0; capacity];
    let mut counted = Counted {
        inner: sink,
        emitted: 0,
    };
    generate(n, k, 1, &mut path, 0, &mut counted)?;
    Ok(counted.emitted)
}

/// Number of k-combinations of n elements, `None` when it overflows `u64`.
#[must_use]
pub fn binomial(n: u32, k: usize) -> Option<u64> {
    let n = u64::from(n);
    let k = u64::try_from(k).ok()?;
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let mut acc: u64 = 1;
    for i in 0..k {
        // acc == C(n, i) here, so the division is exact.
        let next = u128::from(acc) * u128::from(n - i) / u128::from(i + 1);
        acc = u64::try_from(next).ok()?;
    }
    Some(acc)
}

pub(crate) fn validate_upper_bound(n: u32) -> Result<(), EnumerationError> {
    if n == u32::MAX {
        return Err(EnumerationError::InvalidArgument(format!(
            "n must be below {}",
            u32::MAX
        )));
    }
    Ok(())
}

struct Counted<'a, S: ?Sized> {
    inner: &'a mut S,
    emitted: u64,
}

impl<S> CombinationSink for Counted<'_, S>
where
    S: CombinationSink + ?Sized,
{
    fn emit(&mut self, combination: &[u32]) -> Result<(), EnumerationError> {
        self.inner.emit(combination)?;
        self.emitted += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{format_combination, CollectingSink};
    use rand::{rngs::SmallRng, Rng, SeedableRng};
    use std::collections::HashSet;
    use std::io;

    fn lines(n: u32, k: usize) -> Vec<String> {
        let mut sink = CollectingSink::new();
        enumerate(n, k, &mut sink).unwrap();
        sink.combinations()
            .iter()
            .map(|c| format_combination(c))
            .collect()
    }

    #[test]
    fn four_choose_two_in_order() {
        assert_eq!(
            lines(4, 2),
            vec!["[1, 2]", "[1, 3]", "[1, 4]", "[2, 3]", "[2, 4]", "[3, 4]"]
        );
    }

    #[test]
    fn full_selection_emits_single_line() {
        assert_eq!(lines(3, 3), vec!["[1, 2, 3]"]);
    }

    #[test]
    fn empty_selection_emits_empty_combination() {
        assert_eq!(lines(0, 0), vec!["[]"]);
        assert_eq!(lines(5, 0), vec!["[]"]);
    }

    #[test]
    fn k_above_n_emits_nothing() {
        let mut sink = CollectingSink::new();
        assert_eq!(enumerate(3, 4, &mut sink).unwrap(), 0);
        assert_eq!(enumerate(0, 1, &mut sink).unwrap(), 0);
        assert!(sink.combinations().is_empty());
    }

    #[test]
    fn randomized_sweep_matches_combinatorial_properties() {
        let mut rng = SmallRng::seed_from_u64(0x0c0b_1a7e);
        for _ in 0..40 {
            let n: u32 = rng.gen_range(0..=12);
            let k: usize = rng.gen_range(0..=n as usize + 1);
            let mut sink = CollectingSink::new();
            let emitted = enumerate(n, k, &mut sink).unwrap();
            let combos = sink.into_inner();

            assert_eq!(Some(emitted), binomial(n, k), "count for n={n} k={k}");
            assert_eq!(combos.len() as u64, emitted);
            for combo in &combos {
                assert_eq!(combo.len(), k);
                assert!(combo.iter().all(|v| (1..=n).contains(v)));
                assert!(combo.windows(2).all(|w| w[0] < w[1]));
            }
            for pair in combos.windows(2) {
                assert!(pair[0] < pair[1], "lexicographic order for n={n} k={k}");
            }
            let unique: HashSet<_> = combos.iter().collect();
            assert_eq!(unique.len(), combos.len());
        }
    }

    #[test]
    fn generate_extends_existing_prefix() {
        let mut path = [2, 0, 0];
        let mut sink = CollectingSink::new();
        generate(5, 3, 3, &mut path, 1, &mut sink).unwrap();
        assert_eq!(
            sink.into_inner(),
            vec![
                vec![2, 3, 4],
                vec![2, 3, 5],
                vec![2, 4, 5],
            ]
        );
    }

    #[test]
    fn generate_with_exhausted_start_is_silent() {
        let mut path = [1, 0];
        let mut sink = CollectingSink::new();
        generate(1, 2, 2, &mut path, 1, &mut sink).unwrap();
        assert!(sink.combinations().is_empty());
    }

    #[test]
    fn sink_error_stops_enumeration() {
        let mut calls = 0;
        let mut sink = |_: &[u32]| {
            calls += 1;
            if calls == 3 {
                Err(EnumerationError::Sink(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "closed",
                )))
            } else {
                Ok(())
            }
        };
        let err = enumerate(4, 2, &mut sink).unwrap_err();
        assert!(matches!(err, EnumerationError::Sink(_)));
        assert_eq!(calls, 3);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "n must be below u32::MAX")]
    fn generate_asserts_representable_upper_bound() {
        let mut path = [0];
        let mut sink = CollectingSink::new();
        let _ = generate(u32::MAX, 1, u32::MAX, &mut path, 0, &mut sink);
    }

    #[test]
    fn rejects_unrepresentable_upper_bound() {
        let mut sink = CollectingSink::new();
        assert!(matches!(
            enumerate(u32::MAX, 1, &mut sink),
            Err(EnumerationError::InvalidArgument(_))
        ));
    }

    #[test]
    fn binomial_values() {
        assert_eq!(binomial(4, 2), Some(6));
        assert_eq!(binomial(0, 0), Some(1));
        assert_eq!(binomial(10, 0), Some(1));
        assert_eq!(binomial(10, 10), Some(1));
        assert_eq!(binomial(3, 4), Some(0));
        assert_eq!(binomial(52, 5), Some(2_598_960));
        assert_eq!(binomial(67, 33), Some(14_226_520_737_620_288_370));
        assert_eq!(binomial(68, 34), None);
    }
}
