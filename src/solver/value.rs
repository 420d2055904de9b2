/// The base trait for any value that can live in a variable's domain.
///
/// This establishes the minimum requirements for a domain value: it must be
/// cloneable, debuggable, equatable, and hashable. This is a marker trait,
/// so any type that satisfies these bounds implements `Value`.
pub trait Value: Clone + std::fmt::Debug + Eq + std::hash::Hash + 'static {}
impl<T> Value for T where T: Clone + std::fmt::Debug + Eq + std::hash::Hash + 'static {}
