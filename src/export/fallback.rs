//! Ordered fallback strategies
//!
//! Strategies are tried in order; the first success wins and earlier
//! failures are kept so callers can report what degraded.

use std::fmt;

/// One way of turning `I` into `O`
pub trait Strategy<I: ?Sized, O, E> {
    fn name(&self) -> &'static str;
    fn attempt(&self, input: &I) -> Result<O, E>;
}

#[derive(Debug)]
pub struct StrategyFailure<E> {
    pub strategy: &'static str,
    pub error: E,
}

impl<E: fmt::Display> fmt::Display for StrategyFailure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.strategy, self.error)
    }
}

/// Successful run of a chain
#[derive(Debug)]
pub struct Attempted<O, E> {
    pub value: O,
    /// Name of the strategy that produced `value`
    pub strategy: &'static str,
    /// Strategies that failed before it, in order
    pub failures: Vec<StrategyFailure<E>>,
}

impl<O, E> Attempted<O, E> {
    /// Whether the first strategy succeeded
    pub fn is_primary(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct FallbackChain<'a, I: ?Sized, O, E> {
    strategies: Vec<Box<dyn Strategy<I, O, E> + 'a>>,
}

impl<'a, I: ?Sized, O, E: fmt::Display> FallbackChain<'a, I, O, E> {
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    pub fn then(mut self, strategy: impl Strategy<I, O, E> + 'a) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Run strategies until one succeeds. Returns every failure if none do.
    pub fn run(&self, input: &I) -> Result<Attempted<O, E>, Vec<StrategyFailure<E>>> {
        let mut failures = Vec::new();

        for strategy in &self.strategies {
            match strategy.attempt(input) {
                Ok(value) => {
                    return Ok(Attempted {
                        value,
                        strategy: strategy.name(),
                        failures,
                    })
                }
                Err(error) => {
                    tracing::warn!("Strategy '{}' failed: {}", strategy.name(), error);
                    failures.push(StrategyFailure {
                        strategy: strategy.name(),
                        error,
                    });
                }
            }
        }

        Err(failures)
    }
}

impl<'a, I: ?Sized, O, E: fmt::Display> Default for FallbackChain<'a, I, O, E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Fixed {
        name: &'static str,
        result: Result<u32, String>,
        calls: Cell<u32>,
    }

    impl Fixed {
        fn ok(name: &'static str, value: u32) -> Self {
            Self { name, result: Ok(value), calls: Cell::new(0) }
        }

        fn err(name: &'static str) -> Self {
            Self { name, result: Err(format!("{} broke", name)), calls: Cell::new(0) }
        }
    }

    impl Strategy<str, u32, String> for &Fixed {
        fn name(&self) -> &'static str {
            self.name
        }

        fn attempt(&self, _input: &str) -> Result<u32, String> {
            self.calls.set(self.calls.get() + 1);
            self.result.clone()
        }
    }

    #[test]
    fn test_first_success_short_circuits() {
        let a = Fixed::err("a");
        let b = Fixed::ok("b", 2);
        let c = Fixed::ok("c", 3);
        let chain = FallbackChain::new().then(&a).then(&b).then(&c);

        let attempted = chain.run("input").unwrap();
        assert_eq!(attempted.value, 2);
        assert_eq!(attempted.strategy, "b");
        assert_eq!(attempted.failures.len(), 1);
        assert!(!attempted.is_primary());
        assert_eq!(c.calls.get(), 0);
    }

    #[test]
    fn test_all_failures_collected() {
        let a = Fixed::err("a");
        let b = Fixed::err("b");
        let chain = FallbackChain::new().then(&a).then(&b);

        let failures = chain.run("input").unwrap_err();
        let names: Vec<_> = failures.iter().map(|f| f.strategy).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(failures[1].to_string(), "b: b broke");
    }

    #[test]
    fn test_empty_chain_fails() {
        let chain: FallbackChain<'_, str, u32, String> = FallbackChain::new();
        assert!(chain.is_empty());
        assert!(chain.run("x").unwrap_err().is_empty());
    }
}
