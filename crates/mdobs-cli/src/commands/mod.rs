pub mod observables;
pub mod replay;
