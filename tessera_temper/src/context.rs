// Root evaluation context.
//
// Owned by the surrounding interpreter, read by the core: the reference
// pitch absolute arithmetic resolves against, the sizes of one "up" and one
// "lift" step, and the prime-component width new monzos are built with. The
// core never constructs one of these during evaluation; it only consults
// the instance it is handed.

use tessera_number::monzo::TimeMonzo;

use crate::interval::Interval;

#[derive(Debug, Clone)]
pub struct RootContext {
    pub title: String,
    /// Reference pitch; a relative context uses the scalar unison.
    pub c4: TimeMonzo,
    /// Size of one up inflection.
    pub up: Interval,
    /// Size of one lift inflection.
    pub lift: Interval,
    pub number_of_components: usize,
}

impl RootContext {
    /// A fresh relative context: unison reference, one step up, five
    /// steps per lift.
    pub fn new(number_of_components: usize) -> Self {
        RootContext {
            title: String::new(),
            c4: TimeMonzo::one(number_of_components),
            up: Interval::from_steps(1, number_of_components),
            lift: Interval::from_steps(5, number_of_components),
            number_of_components,
        }
    }

    /// True when no absolute reference pitch has been declared.
    pub fn is_relative(&self) -> bool {
        self.c4.is_scalar() && self.c4.is_unity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_context_is_relative() {
        let context = RootContext::new(5);
        assert!(context.is_relative());
        assert_eq!(context.up.steps(), 1);
        assert_eq!(context.lift.steps(), 5);
    }

    #[test]
    fn absolute_context_detected() {
        let mut context = RootContext::new(3);
        context.c4 = TimeMonzo::one_hertz(3);
        assert!(!context.is_relative());
    }
}
