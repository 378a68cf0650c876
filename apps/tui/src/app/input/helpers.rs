/// Index after `index` in a list of `len`, wrapping to the start.
pub const fn wrap_increment(index: usize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (index + 1) % len
}

/// Index before `index` in a list of `len`, wrapping to the end.
pub fn wrap_decrement(index: usize, len: usize) -> usize {
    match (index, len) {
        (_, 0) => 0,
        (0, _) => len - 1,
        _ => (index - 1).min(len - 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selections_wrap_both_ways() {
        assert_eq!(wrap_increment(4, 5), 0);
        assert_eq!(wrap_increment(1, 5), 2);
        assert_eq!(wrap_decrement(0, 3), 2);
        assert_eq!(wrap_decrement(2, 3), 1);
        assert_eq!(wrap_decrement(9, 3), 2);
        assert_eq!(wrap_increment(0, 0), 0);
        assert_eq!(wrap_decrement(0, 0), 0);
    }
}
