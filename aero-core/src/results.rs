//! Listener results of a single trigger.

/// Values that can be judged "set" or "empty".
///
/// [`ResultStack::get`] uses this to pick the first meaningful result when no
/// selector is given.
pub trait Truthy {
    /// Whether the value counts as present.
    fn is_truthy(&self) -> bool;
}

impl Truthy for () {
    fn is_truthy(&self) -> bool {
        false
    }
}

impl Truthy for bool {
    fn is_truthy(&self) -> bool {
        *self
    }
}

impl Truthy for String {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl Truthy for &str {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl<T> Truthy for Option<T> {
    fn is_truthy(&self) -> bool {
        self.is_some()
    }
}

impl<T> Truthy for Vec<T> {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

macro_rules! impl_truthy_numeric {
    ($($t:ty),+) => {
        $(
            impl Truthy for $t {
                fn is_truthy(&self) -> bool {
                    *self != 0
                }
            }
        )+
    };
}

impl_truthy_numeric!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

/// The results of one trigger, in listener invocation order.
///
/// `stopped` is true iff the trigger halted early, either because a listener
/// stopped propagation or because the trigger's selector accepted a result.
/// In that case the stack holds exactly the results produced up to and
/// including the listener that stopped it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultStack<R> {
    results: Vec<R>,
    stopped: bool,
}

impl<R> Default for ResultStack<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> ResultStack<R> {
    /// Create an empty stack.
    pub const fn new() -> Self {
        Self {
            results: Vec::new(),
            stopped: false,
        }
    }

    /// Append a listener result.
    pub fn push(&mut self, result: R) {
        self.results.push(result);
    }

    /// Mark the stack as stopped (or not).
    pub fn set_stopped(&mut self, stopped: bool) {
        self.stopped = stopped;
    }

    /// Whether the trigger halted before running every listener.
    pub fn stopped(&self) -> bool {
        self.stopped
    }

    /// The result of the first listener that ran.
    pub fn first(&self) -> Option<&R> {
        self.results.first()
    }

    /// The result of the last listener that ran.
    pub fn last(&self) -> Option<&R> {
        self.results.last()
    }

    /// Consume the stack, returning the last result.
    pub fn into_last(mut self) -> Option<R> {
        self.results.pop()
    }

    /// Whether a result equal to `value` was produced.
    pub fn contains(&self, value: &R) -> bool
    where
        R: PartialEq,
    {
        self.results.contains(value)
    }

    /// Pick a result.
    ///
    /// With a single result, that result is returned as-is. Otherwise the
    /// first [truthy](Truthy) result wins.
    pub fn get(&self) -> Option<&R>
    where
        R: Truthy,
    {
        if self.results.len() == 1 {
            return self.results.first();
        }
        self.results.iter().find(|r| r.is_truthy())
    }

    /// The first result accepted by `selector`.
    pub fn get_by<F>(&self, selector: F) -> Option<&R>
    where
        F: FnMut(&&R) -> bool,
    {
        self.results.iter().find(selector)
    }

    /// Consume the stack, returning the first result accepted by `selector`.
    pub fn take_by<F>(self, selector: F) -> Option<R>
    where
        F: FnMut(&R) -> bool,
    {
        self.results.into_iter().find(selector)
    }

    /// Iterate results in invocation order.
    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.results.iter()
    }

    /// Number of collected results.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether no result was collected.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Consume the stack, returning the results in invocation order.
    pub fn into_vec(self) -> Vec<R> {
        self.results
    }
}

impl<R> IntoIterator for ResultStack<R> {
    type Item = R;
    type IntoIter = std::vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl<'a, R> IntoIterator for &'a ResultStack<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack<R>(values: impl IntoIterator<Item = R>) -> ResultStack<R> {
        let mut stack = ResultStack::new();
        for v in values {
            stack.push(v);
        }
        stack
    }

    #[test]
    fn test_get_single_result_returned_even_if_falsy() {
        let results = stack([0_i32]);
        assert_eq!(results.get(), Some(&0));
    }

    #[test]
    fn test_get_first_truthy_result() {
        let results = stack([None, Some("a"), Some("b")]);
        assert_eq!(results.get(), Some(&Some("a")));

        let empty = stack([String::new(), String::new()]);
        assert_eq!(empty.get(), None);
    }

    #[test]
    fn test_first_last_contains() {
        let results = stack([1, 2, 3]);
        assert_eq!(results.first(), Some(&1));
        assert_eq!(results.last(), Some(&3));
        assert!(results.contains(&2));
        assert!(!results.contains(&4));
        assert_eq!(results.get_by(|v| **v > 1), Some(&2));
        assert_eq!(results.into_last(), Some(3));

        let empty: ResultStack<i32> = ResultStack::new();
        assert_eq!(empty.last(), None);
        assert!(!empty.stopped());
    }
}
