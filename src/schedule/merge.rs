use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Anything positioned on the benchmark timeline.
pub trait Timed {
    /// Seconds since benchmark start.
    fn offset(&self) -> f64;
}

impl Timed for f64 {
    fn offset(&self) -> f64 {
        *self
    }
}

impl<T> Timed for (f64, T) {
    fn offset(&self) -> f64 {
        self.0
    }
}

/// Merges ascending sources into one ascending stream of
/// `(source index, item)`.
///
/// Only one pending item per source is held at a time, so sources may be
/// lazy or unbounded. Equal offsets are yielded in source order.
pub fn merge_schedules<I>(sources: impl IntoIterator<Item = I>) -> MergedSchedule<I>
where
    I: Iterator,
    I::Item: Timed,
{
    let mut sources: Vec<I> = sources.into_iter().collect();
    let mut heads = BinaryHeap::with_capacity(sources.len());
    for (source, iter) in sources.iter_mut().enumerate() {
        if let Some(item) = iter.next() {
            heads.push(Head::new(source, item));
        }
    }
    MergedSchedule { sources, heads }
}

pub struct MergedSchedule<I>
where
    I: Iterator,
{
    sources: Vec<I>,
    heads: BinaryHeap<Head<I::Item>>,
}

impl<I> Iterator for MergedSchedule<I>
where
    I: Iterator,
    I::Item: Timed,
{
    type Item = (usize, I::Item);

    fn next(&mut self) -> Option<Self::Item> {
        let head = self.heads.pop()?;
        if let Some(next) = self.sources.get_mut(head.source).and_then(Iterator::next) {
            self.heads.push(Head::new(head.source, next));
        }
        Some((head.source, head.item))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.heads.len(), None)
    }
}

struct Head<T> {
    offset: f64,
    source: usize,
    item: T,
}

impl<T: Timed> Head<T> {
    fn new(source: usize, item: T) -> Self {
        Self {
            offset: item.offset(),
            source,
            item,
        }
    }
}

// `BinaryHeap` is a max-heap; the ordering is reversed so the earliest
// offset (then the lowest source index) pops first.
impl<T> Ord for Head<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .offset
            .total_cmp(&self.offset)
            .then_with(|| other.source.cmp(&self.source))
    }
}

impl<T> PartialOrd for Head<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> PartialEq for Head<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl<T> Eq for Head<T> {}
