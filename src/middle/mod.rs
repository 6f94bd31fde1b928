//! The AST is lowered here into TAC (three-address code): expression trees
//! are flattened into an ordered list of single-operator instructions whose
//! intermediate results live in numbered temporaries.

pub mod tac;
