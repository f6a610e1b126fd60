use itertools::Itertools;

// Whether both slices hold the same elements the same number of times,
// in any order
pub fn same_elements<T: Ord>(a: &[T], b: &[T]) -> bool {
    a.len() == b.len() && a.iter().sorted().eq(b.iter().sorted())
}

// Whether `collection` holds a sequence equal to `sequence`, element by element
pub fn contains_sequence<T: PartialEq, S: AsRef<[T]>>(collection: &[S], sequence: &[T]) -> bool {
    collection.iter().any(|candidate| candidate.as_ref() == sequence)
}

// Index of the `n`th (counting from zero) occurrence of `element`
pub fn nth_position<T: PartialEq>(sequence: &[T], element: &T, n: usize) -> Option<usize> {
    sequence.iter().positions(|item| item == element).nth(n)
}
